//! Inspecting and changing the partitioning of an RDD.

use crate::support::{banner, round2, section};
use dalgo_core::{FlowContext, FlowRdd, RddResult};
use serde::{Deserialize, Serialize};

pub fn numbers() -> Vec<i64> {
    (1..=12).collect()
}

/// `(sum, count)` of a partition; empty partitions emit nothing.
pub fn partition_sum(values: impl Iterator<Item = i64>) -> Option<(i64, u64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, 1)),
        Some((sum, count)) => Some((sum + v, count + 1)),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub count: u64,
    pub sum: i64,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
}

pub fn partition_summary(values: impl Iterator<Item = i64>) -> Option<PartitionSummary> {
    let values: Vec<i64> = values.collect();
    let min = *values.iter().min()?;
    let max = *values.iter().max()?;
    let sum: i64 = values.iter().sum();
    let count = values.len() as u64;
    Some(PartitionSummary {
        count,
        sum,
        min,
        max,
        mean: round2(sum as f64 / count as f64),
    })
}

pub fn partition_sizes(rdd: &FlowRdd<i64>) -> RddResult<Vec<usize>> {
    Ok(rdd.glom_collect()?.iter().map(Vec::len).collect())
}

fn show_partitions(rdd: &FlowRdd<i64>, label: &str) -> RddResult<()> {
    println!("{label}");
    println!("  Partitions: {}", rdd.num_partitions());
    for (index, part) in rdd.glom_collect()?.iter().enumerate() {
        println!("  Partition {index}: {part:?}");
    }
    println!();
    Ok(())
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Partition Basics: RDD Partition Management");
    println!("Data: {:?}\n", numbers());

    show_partitions(
        &ctx.parallelize(numbers()),
        "1. Default partitioning (session parallelism):",
    )?;
    let rdd_3 = ctx.parallelize_with_partitions(numbers(), 3);
    show_partitions(&rdd_3, "2. Explicit 3 partitions at creation:")?;
    show_partitions(&rdd_3.repartition(6), "3. repartition(6), a full shuffle:")?;
    show_partitions(&rdd_3.coalesce(2), "4. coalesce(2), no shuffle:")?;

    section("5. mapPartitions(): sum per partition");
    let sums = rdd_3.map_partitions(|part| partition_sum(part)).collect()?;
    for (sum, count) in &sums {
        println!("  Partition sum={sum}, count={count}");
    }
    println!("  Grand total: {}\n", sums.iter().map(|(sum, _)| sum).sum::<i64>());

    section("6. mapPartitions(): statistics per partition");
    for (index, summary) in rdd_3
        .map_partitions(|part| partition_summary(part))
        .collect()?
        .iter()
        .enumerate()
    {
        println!("  Partition {index}: {summary:?}");
    }
    println!();

    section("7. Partition count and parallelism");
    for parts in [1, 4, 12] {
        let sizes = partition_sizes(&ctx.parallelize_with_partitions(numbers(), parts))?;
        println!("  {parts:2} partitions -> sizes: {sizes:?}");
    }
    Ok(())
}
