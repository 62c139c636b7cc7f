//! Rank product: genes ranked inside every study, then combined by the
//! geometric mean of their ranks. Lower is more consistently top-ranked.

use super::TOPIC;
use crate::support::{banner, load_records, section, sorted_by_key};
use dalgo_core::{FlowContext, FlowRdd, RddResult};
use serde::{Deserialize, Serialize};

pub const STUDIES: [&str; 3] = ["study_1.csv", "study_2.csv", "study_3.csv"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankProduct {
    pub gene_id: String,
    pub rank_product: f64,
    pub num_studies: u32,
}

pub fn parse_gene_record(row: &[String]) -> Option<(String, f64)> {
    match row {
        [gene, value, ..] => Some((gene.trim().to_string(), value.trim().parse().ok()?)),
        _ => None,
    }
}

pub fn load_study(ctx: &FlowContext, file: &str) -> anyhow::Result<FlowRdd<(String, f64)>> {
    Ok(ctx.parallelize(load_records(TOPIC, file, parse_gene_record)?))
}

/// Mean value per gene from `(sum, count)` combiners.
pub fn mean_per_gene(values: &FlowRdd<(String, f64)>) -> FlowRdd<(String, f64)> {
    values
        .combine_by_key(
            |v| (v, 1u32),
            |(sum, count), v| (sum + v, count + 1),
            |a, b| (a.0 + b.0, a.1 + b.1),
        )
        .map_values(|(sum, count)| sum / count as f64)
}

/// 1-based rank by descending absolute mean.
pub fn assign_ranks(means: &FlowRdd<(String, f64)>) -> RddResult<FlowRdd<(String, u64)>> {
    Ok(means
        .sort_by(|(_, mean)| mean.abs(), false)?
        .zip_with_index()?
        .map(|((gene, _), index)| (gene, index + 1)))
}

/// Geometric mean of every gene's ranks across the studies it appears in.
pub fn rank_product(ctx: &FlowContext, ranks: &[FlowRdd<(String, u64)>]) -> FlowRdd<RankProduct> {
    ctx.union(ranks)
        .combine_by_key(
            |rank| (rank as f64, 1u32),
            |(product, count), rank| (product * rank as f64, count + 1),
            |a, b| (a.0 * b.0, a.1 + b.1),
        )
        .map(|(gene_id, (product, count))| RankProduct {
            gene_id,
            rank_product: product.powf(1.0 / count as f64),
            num_studies: count,
        })
}

/// Results ordered by rank product ascending, ties by gene.
pub fn sorted_results(results: &FlowRdd<RankProduct>) -> RddResult<Vec<RankProduct>> {
    let mut results = results.collect()?;
    results.sort_by(|a, b| {
        a.rank_product
            .total_cmp(&b.rank_product)
            .then_with(|| a.gene_id.cmp(&b.gene_id))
    });
    Ok(results)
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Rank Product: Ranking Genes Across Multiple Studies");

    let mut all_ranks = Vec::with_capacity(STUDIES.len());
    for (index, file) in STUDIES.iter().enumerate() {
        let means = mean_per_gene(&load_study(ctx, file)?);
        let ranks = assign_ranks(&means)?;
        section(&format!("study {}: {file}", index + 1));
        println!("  means: {:?}", sorted_by_key(means.collect()?));
        println!("  ranks: {:?}\n", sorted_by_key(ranks.collect()?));
        all_ranks.push(ranks);
    }

    section("rank product (lower = more consistently top-ranked)");
    let results = sorted_results(&rank_product(ctx, &all_ranks))?;
    println!("{:<8} {:<16} Studies", "Gene", "Rank Product");
    println!("{}", "-".repeat(40));
    for result in &results {
        println!(
            "{:<8} {:<16.4} {}",
            result.gene_id, result.rank_product, result.num_studies
        );
    }
    println!("\nTotal genes ranked: {}", results.len());
    Ok(())
}
