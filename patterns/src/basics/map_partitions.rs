//! Per-partition summaries with `mapPartitions`.

use super::TOPIC;
use crate::support::{banner, section};
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd, RddResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

const FALLBACK_SAMPLE: [&str; 12] = [
    "-5", "0", "10", "-3", "7", "0", "15", "-1", "0", "20", "8", "-2",
];

/// Negative, zero and positive counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignCounts {
    pub negative: u64,
    pub zero: u64,
    pub positive: u64,
}

impl SignCounts {
    fn merge(self, other: SignCounts) -> SignCounts {
        SignCounts {
            negative: self.negative + other.negative,
            zero: self.zero + other.zero,
            positive: self.positive + other.positive,
        }
    }
}

/// Min, max, sum and count of one partition; min and max are `None` when
/// the partition holds no integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionStats {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub sum: i64,
    pub count: u64,
}

fn integers(lines: impl Iterator<Item = String>) -> impl Iterator<Item = i64> {
    lines.filter_map(|line| line.trim().parse::<i64>().ok())
}

pub fn sign_counts(lines: impl Iterator<Item = String>) -> SignCounts {
    integers(lines).fold(SignCounts::default(), |mut counts, n| {
        match n.signum() {
            -1 => counts.negative += 1,
            0 => counts.zero += 1,
            _ => counts.positive += 1,
        }
        counts
    })
}

pub fn partition_stats(lines: impl Iterator<Item = String>) -> PartitionStats {
    integers(lines).fold(PartitionStats::default(), |stats, n| PartitionStats {
        min: Some(stats.min.map_or(n, |m| m.min(n))),
        max: Some(stats.max.map_or(n, |m| m.max(n))),
        sum: stats.sum + n,
        count: stats.count + 1,
    })
}

pub fn per_partition_sign_counts(lines: &FlowRdd<String>) -> RddResult<Vec<SignCounts>> {
    lines.map_partitions(|part| [sign_counts(part)]).collect()
}

pub fn total_sign_counts(lines: &FlowRdd<String>) -> RddResult<SignCounts> {
    Ok(lines
        .map_partitions(|part| [sign_counts(part)])
        .reduce(SignCounts::merge)?
        .unwrap_or_default())
}

pub fn per_partition_stats(lines: &FlowRdd<String>) -> RddResult<Vec<PartitionStats>> {
    lines.map_partitions(|part| [partition_stats(part)]).collect()
}

fn load_numbers(ctx: &FlowContext) -> FlowRdd<String> {
    match ctx.text_file(data_path(TOPIC, "sample_numbers.txt"), 3) {
        Ok(lines) => lines,
        Err(error) => {
            warn!(%error, "sample numbers unavailable, using inline sample");
            ctx.parallelize_with_partitions(
                FALLBACK_SAMPLE.iter().map(|s| s.to_string()).collect(),
                3,
            )
        }
    }
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("mapPartitions()");
    let lines = load_numbers(ctx);
    println!("Partitions: {}", lines.num_partitions());

    section("partition contents (glom)");
    for (index, part) in lines.glom_collect()?.iter().enumerate() {
        println!("  partition {index}: {part:?}");
    }
    println!();

    section("sign counts per partition");
    for (index, counts) in per_partition_sign_counts(&lines)?.iter().enumerate() {
        println!(
            "  partition {index}: negative={} zero={} positive={}",
            counts.negative, counts.zero, counts.positive
        );
    }
    let totals = total_sign_counts(&lines)?;
    println!(
        "  total: negative={} zero={} positive={}\n",
        totals.negative, totals.zero, totals.positive
    );

    section("(min, max, sum, count) per partition");
    for (index, stats) in per_partition_stats(&lines)?.iter().enumerate() {
        println!(
            "  partition {index}: ({:?}, {:?}, {}, {})",
            stats.min, stats.max, stats.sum, stats.count
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[test]
    fn test_sign_counts_over_sample_file() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let lines = load_numbers(&ctx);
        assert_eq!(lines.num_partitions(), 3);
        assert_eq!(
            total_sign_counts(&lines).unwrap(),
            SignCounts {
                negative: 4,
                zero: 3,
                positive: 5
            }
        );
        let per_partition = per_partition_sign_counts(&lines).unwrap();
        assert_eq!(per_partition.len(), 3);
    }

    #[test]
    fn test_stats_skip_non_integers_and_empty_partitions() {
        let lines = ["7", "n/a", "-2", "4"].iter().map(|s| s.to_string());
        assert_eq!(
            partition_stats(lines),
            PartitionStats {
                min: Some(-2),
                max: Some(7),
                sum: 9,
                count: 3
            }
        );
        assert_eq!(
            partition_stats(std::iter::empty()),
            PartitionStats {
                min: None,
                max: None,
                sum: 0,
                count: 0
            }
        );
    }
}
