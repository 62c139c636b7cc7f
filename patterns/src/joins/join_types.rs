//! Inner, left and right joins with DataFrames, and an inner join built by
//! hand from tagging, union and grouping.

use super::TOPIC;
use crate::support::{banner, lines_without_header, read_csv_file, section, sorted};
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd};
use dalgo_sql::show;
use datafusion::common::JoinType;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::ident;
use serde::{Deserialize, Serialize};

/// Source table of a tagged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    T1,
    T2,
}

/// Load a `key,value` table with its value column renamed to `value_column`.
pub async fn load_table(ctx: &FlowContext, file: &str, value_column: &str) -> anyhow::Result<DataFrame> {
    let df = read_csv_file(ctx, data_path(TOPIC, file)).await?;
    Ok(df.with_column_renamed("value", value_column)?)
}

/// Join on `key`, keeping one `key` column: the left one for inner and
/// left joins, the right one for right joins.
pub fn join_on_key(t1: DataFrame, t2: DataFrame, join_type: JoinType) -> anyhow::Result<DataFrame> {
    let t2 = t2.with_column_renamed("key", "t2_key")?;
    let joined = t1.join(t2, join_type, &["key"], &["t2_key"], None)?;
    let (key, order_by) = match join_type {
        JoinType::Right => ("t2_key", "T2_value"),
        _ => ("key", "T1_value"),
    };
    Ok(joined
        .select(vec![
            ident(key).alias("key"),
            ident("T1_value"),
            ident("T2_value"),
        ])?
        .sort(vec![
            ident("key").sort(true, false),
            ident(order_by).sort(true, false),
        ])?)
}

pub fn parse_key_value(line: &str) -> Option<(String, i64)> {
    let (key, value) = line.split_once(',')?;
    Some((key.trim().to_string(), value.trim().parse().ok()?))
}

pub fn load_pairs(ctx: &FlowContext, file: &str) -> anyhow::Result<FlowRdd<(String, i64)>> {
    Ok(lines_without_header(ctx, TOPIC, file, 2)?.flat_map(|line| parse_key_value(&line)))
}

pub fn tag(pairs: &FlowRdd<(String, i64)>, side: Side) -> FlowRdd<(String, (Side, i64))> {
    pairs.map_values(move |value| (side, value))
}

/// Every `(t1, t2)` combination of one key's tagged values; nothing when
/// either side is missing.
pub fn cartesian_product(
    (key, values): (String, Vec<(Side, i64)>),
) -> Vec<(String, (i64, i64))> {
    let pick = |wanted: Side| -> Vec<i64> {
        values
            .iter()
            .filter(|(side, _)| *side == wanted)
            .map(|(_, value)| *value)
            .collect()
    };
    let (left, right) = (pick(Side::T1), pick(Side::T2));
    let mut joined = Vec::with_capacity(left.len() * right.len());
    for l in &left {
        for r in &right {
            joined.push((key.clone(), (*l, *r)));
        }
    }
    joined
}

/// Map: tag by source. Shuffle: group by key. Reduce: cross the sides.
pub fn custom_inner_join(
    t1: &FlowRdd<(String, i64)>,
    t2: &FlowRdd<(String, i64)>,
) -> FlowRdd<(String, (i64, i64))> {
    tag(t1, Side::T1)
        .union(&tag(t2, Side::T2))
        .group_by_key()
        .flat_map(cartesian_product)
}

async fn demonstrate_df_joins(ctx: &FlowContext) -> anyhow::Result<()> {
    section("DataFrame joins");
    let t1 = load_table(ctx, "table_t1.csv", "T1_value").await?;
    let t2 = load_table(ctx, "table_t2.csv", "T2_value").await?;
    println!("Table T1:");
    show(&t1, 20).await?;
    println!("Table T2:");
    show(&t2, 20).await?;

    for (title, join_type) in [
        ("INNER JOIN (only matching keys)", JoinType::Inner),
        ("LEFT JOIN (all T1 rows, NULLs for missing T2)", JoinType::Left),
        ("RIGHT JOIN (all T2 rows, NULLs for missing T1)", JoinType::Right),
    ] {
        println!("{title}:");
        show(&join_on_key(t1.clone(), t2.clone(), join_type)?, 20).await?;
    }
    Ok(())
}

fn demonstrate_rdd_join(ctx: &FlowContext) -> anyhow::Result<()> {
    section("custom RDD join (MapReduce style)");
    let t1 = load_pairs(ctx, "table_t1.csv")?;
    let t2 = load_pairs(ctx, "table_t2.csv")?;
    println!("T1 (tagged):");
    for record in tag(&t1, Side::T1).collect()? {
        println!("  {record:?}");
    }
    println!("\nT2 (tagged):");
    for record in tag(&t2, Side::T2).collect()? {
        println!("  {record:?}");
    }

    println!("\nCustom INNER JOIN result (key, (t1, t2)):");
    for (key, (left, right)) in sorted(custom_inner_join(&t1, &t2).collect()?) {
        println!("  key={key}  T1={left}  T2={right}");
    }
    println!("\nBuilt-in join (same result):");
    for (key, (left, right)) in sorted(t1.join(&t2).collect()?) {
        println!("  key={key}  T1={left}  T2={right}");
    }
    Ok(())
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Join Design Patterns: Join Types");
    demonstrate_df_joins(ctx).await?;
    demonstrate_rdd_join(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;
    use dalgo_sql::collect_rows;

    async fn joined_rows(join_type: JoinType) -> Vec<Vec<String>> {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let t1 = load_table(&ctx, "table_t1.csv", "T1_value").await.unwrap();
        let t2 = load_table(&ctx, "table_t2.csv", "T2_value").await.unwrap();
        collect_rows(join_on_key(t1, t2, join_type).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_dataframe_join_types() {
        let inner = joined_rows(JoinType::Inner).await;
        assert_eq!(inner.len(), 5);
        assert_eq!(inner[0], vec!["a", "1", "10"]);

        let left = joined_rows(JoinType::Left).await;
        assert_eq!(left.len(), 6);
        assert_eq!(left[5], vec!["d", "5", "null"]);

        let right = joined_rows(JoinType::Right).await;
        assert_eq!(right.len(), 6);
        assert_eq!(right[5], vec!["e", "null", "50"]);
    }

    #[test]
    fn test_cartesian_product_needs_both_sides() {
        let values = vec![(Side::T1, 1), (Side::T2, 10), (Side::T2, 20)];
        assert_eq!(
            cartesian_product(("k".to_string(), values)),
            vec![("k".to_string(), (1, 10)), ("k".to_string(), (1, 20))]
        );
        assert!(cartesian_product(("k".to_string(), vec![(Side::T1, 1)])).is_empty());
    }

    #[test]
    fn test_custom_join_matches_built_in() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let t1 = load_pairs(&ctx, "table_t1.csv").unwrap();
        let t2 = load_pairs(&ctx, "table_t2.csv").unwrap();
        let custom = sorted(custom_inner_join(&t1, &t2).collect().unwrap());
        assert_eq!(custom, sorted(t1.join(&t2).collect().unwrap()));
        assert_eq!(
            custom,
            vec![
                ("a".to_string(), (1, 10)),
                ("a".to_string(), (2, 10)),
                ("b".to_string(), (3, 20)),
                ("b".to_string(), (3, 30)),
                ("c".to_string(), (4, 40)),
            ]
        );
    }
}
