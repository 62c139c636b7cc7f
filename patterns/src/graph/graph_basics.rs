//! Degrees, mutual edges, two-hop paths and triangles over a small social
//! network.

use super::TOPIC;
use crate::support::{banner, query, read_csv_file, register_view, section};
use dalgo_common::data_path;
use dalgo_core::FlowContext;
use dalgo_sql::show;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::SessionContext;

pub const EDGES: &str = "edges";

/// Load `social_network.csv` (src, dst, relationship) as the `edges` table.
pub async fn register_edges(ctx: &FlowContext) -> anyhow::Result<DataFrame> {
    let edges = read_csv_file(ctx, data_path(TOPIC, "social_network.csv")).await?;
    register_view(ctx.sql(), EDGES, edges.clone())?;
    Ok(edges)
}

pub async fn vertices(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "SELECT src AS id FROM edges UNION SELECT dst AS id FROM edges ORDER BY id",
    )
    .await
}

/// In, out and total degree per vertex. Vertices missing on one side of the
/// full outer join get a zero count for it.
pub async fn degrees(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "WITH in_deg AS (SELECT dst AS id, COUNT(*) AS in_degree FROM edges GROUP BY dst), \
         out_deg AS (SELECT src AS id, COUNT(*) AS out_degree FROM edges GROUP BY src) \
         SELECT COALESCE(i.id, o.id) AS id, \
                COALESCE(i.in_degree, 0) AS in_degree, \
                COALESCE(o.out_degree, 0) AS out_degree, \
                COALESCE(i.in_degree, 0) + COALESCE(o.out_degree, 0) AS total_degree \
         FROM in_deg i FULL OUTER JOIN out_deg o ON i.id = o.id \
         ORDER BY total_degree DESC, id",
    )
    .await
}

/// Pairs with an edge in both directions, reported once with `a < b`.
pub async fn bidirectional(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "SELECT e1.src AS person_a, e1.dst AS person_b, \
                e1.relationship AS a_to_b, e2.relationship AS b_to_a \
         FROM edges e1 JOIN edges e2 ON e1.src = e2.dst AND e1.dst = e2.src \
         WHERE e1.src < e1.dst \
         ORDER BY person_a, person_b",
    )
    .await
}

/// Distinct two-hop paths `person -> through -> suggestion` that do not
/// return to the start.
pub async fn friends_of_friends(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "SELECT DISTINCT e1.src AS person, e1.dst AS through, e2.dst AS suggestion \
         FROM edges e1 JOIN edges e2 ON e1.dst = e2.src \
         WHERE e1.src <> e2.dst \
         ORDER BY person, suggestion, through",
    )
    .await
}

/// Directed cycles `a -> b -> c -> a`; requiring `a < b < c` on the first
/// two edges reports every triangle once.
pub async fn triangles(ctx: &SessionContext) -> anyhow::Result<DataFrame> {
    query(
        ctx,
        "SELECT DISTINCT e1.src AS vertex_a, e1.dst AS vertex_b, e2.dst AS vertex_c \
         FROM edges e1 \
         JOIN edges e2 ON e1.dst = e2.src \
         JOIN edges e3 ON e2.dst = e3.src AND e3.dst = e1.src \
         WHERE e1.src < e1.dst AND e2.src < e2.dst \
         ORDER BY vertex_a",
    )
    .await
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Graph Basics: Building and Querying Graphs");
    let edges = register_edges(ctx).await?;
    let sql = ctx.sql();

    println!("Vertices:");
    show(&vertices(sql).await?, 20).await?;
    println!("Edges:");
    show(&edges, 20).await?;

    section("Degree metrics (in + out)");
    show(&degrees(sql).await?, 20).await?;

    section("Bidirectional relationships");
    show(&bidirectional(sql).await?, 20).await?;

    section("Friends of friends (2-hop paths)");
    show(&friends_of_friends(sql).await?, 50).await?;

    section("Triangles (unique)");
    let found = triangles(sql).await?;
    show(&found, 20).await?;
    println!("Unique triangles found: {}", found.count().await?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;
    use dalgo_sql::collect_rows;

    async fn setup() -> FlowContext {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        register_edges(&ctx).await.unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_degrees_fill_missing_sides_with_zero() {
        let ctx = setup().await;
        let rows = collect_rows(degrees(ctx.sql()).await.unwrap()).await.unwrap();
        let totals: Vec<(String, String)> = rows
            .iter()
            .map(|row| (row[0].clone(), row[3].clone()))
            .collect();
        assert_eq!(totals[0], ("alice".to_string(), "4".to_string()));
        assert_eq!(
            rows.last().unwrap(),
            &vec!["grace", "1", "0", "1"]
        );
        assert_eq!(rows.len(), 7);
    }

    #[tokio::test]
    async fn test_bidirectional_pairs() {
        let ctx = setup().await;
        let rows = collect_rows(bidirectional(ctx.sql()).await.unwrap()).await.unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["alice", "bob", "friend", "friend"],
                vec!["carol", "dave", "colleague", "colleague"],
            ]
        );
    }

    #[tokio::test]
    async fn test_friends_of_friends_excludes_self() {
        let ctx = setup().await;
        let rows = collect_rows(friends_of_friends(ctx.sql()).await.unwrap())
            .await
            .unwrap();
        assert_eq!(rows.len(), 14);
        assert!(rows.iter().all(|row| row[0] != row[2]));
        assert_eq!(rows[0], vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_triangles_reported_once() {
        let ctx = setup().await;
        let rows = collect_rows(triangles(ctx.sql()).await.unwrap()).await.unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["alice", "bob", "carol"],
                vec!["dave", "erin", "frank"],
            ]
        );
    }
}
