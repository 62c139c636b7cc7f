//! PageRank over a small directed web graph.
//!
//! `PR(n) = (1 - d) + d * sum(PR(m) / outdegree(m))` over every `m` linking
//! to `n`, iterated a fixed number of times from an initial rank of 1.0.

use super::TOPIC;
use crate::support::{banner, section, sorted};
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd, RddResult};
use tracing::{debug, warn};

pub const DAMPING: f64 = 0.85;

pub const REPORTED_ITERATIONS: [usize; 4] = [1, 5, 10, 20];

/// `src,dst` into a directed edge; anything else is rejected.
pub fn parse_edge(line: &str) -> Option<(String, String)> {
    let (src, dst) = line.trim().split_once(',')?;
    let (src, dst) = (src.trim(), dst.trim());
    if src.is_empty() || dst.is_empty() {
        return None;
    }
    Some((src.to_string(), dst.to_string()))
}

/// Deduplicated adjacency lists, cached for reuse across iterations.
pub fn build_adjacency(edges: &FlowRdd<(String, String)>) -> FlowRdd<(String, Vec<String>)> {
    edges.distinct().group_by_key().cache()
}

fn contributions((_, (neighbors, rank)): (String, (Vec<String>, f64))) -> Vec<(String, f64)> {
    let share = rank / neighbors.len() as f64;
    neighbors.into_iter().map(|n| (n, share)).collect()
}

pub fn apply_damping(sum: f64) -> f64 {
    (1.0 - DAMPING) + DAMPING * sum
}

/// Ranks after `iterations` rounds. Nodes nobody links to drop out after
/// the first round; nodes without outgoing links stop contributing.
pub fn run_pagerank(
    links: &FlowRdd<(String, Vec<String>)>,
    iterations: usize,
) -> FlowRdd<(String, f64)> {
    let mut ranks = links.map_values(|_| 1.0);
    for iteration in 0..iterations {
        debug!(iteration, "pagerank iteration");
        ranks = links
            .join(&ranks)
            .flat_map(contributions)
            .reduce_by_key(|a, b| a + b)
            .map_values(apply_damping);
    }
    ranks
}

/// Ranks highest first, ties by node id.
pub fn ranked(ranks: &FlowRdd<(String, f64)>) -> RddResult<Vec<(String, f64)>> {
    let mut ranks = ranks.collect()?;
    ranks.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(ranks)
}

pub fn load_edges(ctx: &FlowContext) -> anyhow::Result<FlowRdd<(String, String)>> {
    let lines = ctx.text_file(data_path(TOPIC, "web_graph.txt"), 2)?;
    Ok(lines.flat_map(|line| {
        let edge = parse_edge(&line);
        if edge.is_none() && !line.trim().is_empty() {
            warn!(%line, "skipping malformed edge");
        }
        edge
    }))
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("PageRank: Iterative Node Importance");
    let links = build_adjacency(&load_edges(ctx)?);

    section("graph (adjacency list)");
    for (node, neighbors) in sorted(links.collect()?) {
        println!("  {node} -> {:?}", sorted(neighbors));
    }
    println!();

    for iterations in REPORTED_ITERATIONS {
        section(&format!("after {iterations} iteration(s)"));
        let ranks = ranked(&run_pagerank(&links, iterations))?;
        for (node, rank) in &ranks {
            println!("  {node}: {rank:.4}");
        }
        let total: f64 = ranks.iter().map(|(_, rank)| rank).sum();
        println!("  sum of ranks: {total:.4}\n");
    }

    let last = REPORTED_ITERATIONS[REPORTED_ITERATIONS.len() - 1];
    if let Some((node, rank)) = ranked(&run_pagerank(&links, last))?.first() {
        println!("Most important node: {node} (rank {rank:.4})");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    fn rank_of(ranks: &[(String, f64)], node: &str) -> f64 {
        ranks.iter().find(|(n, _)| n == node).map(|(_, r)| *r).unwrap()
    }

    #[test]
    fn test_parse_edge() {
        assert_eq!(parse_edge(" A, B "), Some(("A".to_string(), "B".to_string())));
        assert_eq!(parse_edge("A"), None);
        assert_eq!(parse_edge("A,"), None);
    }

    #[test]
    fn test_adjacency_drops_duplicate_edges() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let links = build_adjacency(&load_edges(&ctx).unwrap());
        let adjacency: Vec<(String, Vec<String>)> = sorted(links.collect().unwrap())
            .into_iter()
            .map(|(node, neighbors)| (node, sorted(neighbors)))
            .collect();
        assert_eq!(adjacency.len(), 5);
        assert_eq!(adjacency[1], ("B".to_string(), vec!["C".to_string()]));
    }

    #[test]
    fn test_single_iteration() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let links = build_adjacency(&load_edges(&ctx).unwrap());
        let ranks = ranked(&run_pagerank(&links, 1)).unwrap();
        // D and E have no incoming links.
        assert_eq!(ranks.len(), 3);
        assert_eq!(ranks[0].0, "C");
        assert!((rank_of(&ranks, "A") - 1.425).abs() < 1e-9);
        assert!((rank_of(&ranks, "B") - 0.575).abs() < 1e-9);
        assert!((rank_of(&ranks, "C") - 2.7).abs() < 1e-9);
    }

    #[test]
    fn test_second_iteration_propagates() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let links = build_adjacency(&load_edges(&ctx).unwrap());
        let ranks = ranked(&run_pagerank(&links, 2)).unwrap();
        assert_eq!(ranks[0].0, "A");
        assert!((rank_of(&ranks, "A") - 2.445).abs() < 1e-9);
        assert!((rank_of(&ranks, "C") - (0.15 + 0.85 * 1.2875)).abs() < 1e-9);
    }
}
