//! Top-N and min/max as partition-level summaries: every partition emits a
//! bounded local answer and the driver merges the handful of candidates.

use super::TOPIC;
use crate::support::{banner, lines_without_header, section};
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd, RddResult};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub const N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: i64,
    pub max: i64,
    pub count: u64,
}

impl MinMax {
    fn merge(self, other: MinMax) -> MinMax {
        MinMax {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            count: self.count + other.count,
        }
    }
}

/// `url,frequency`.
pub fn parse_url_frequency(line: &str) -> Option<(String, u64)> {
    let (url, frequency) = line.split_once(',')?;
    Some((url.trim().to_string(), frequency.trim().parse().ok()?))
}

/// The `n` highest frequencies, kept in a min-heap of size `n`. Among equal
/// frequencies the smaller url wins.
pub fn local_top_n(pairs: impl Iterator<Item = (String, u64)>, n: usize) -> Vec<(u64, String)> {
    let mut heap: BinaryHeap<Reverse<(u64, Reverse<String>)>> = BinaryHeap::with_capacity(n + 1);
    for (url, frequency) in pairs {
        heap.push(Reverse((frequency, Reverse(url))));
        if heap.len() > n {
            heap.pop();
        }
    }
    heap.into_iter()
        .map(|Reverse((frequency, Reverse(url)))| (frequency, url))
        .collect()
}

/// The `n` smallest `(frequency, url)` pairs, kept in a max-heap of size `n`.
pub fn local_bottom_n(pairs: impl Iterator<Item = (String, u64)>, n: usize) -> Vec<(u64, String)> {
    let mut heap: BinaryHeap<(u64, String)> = BinaryHeap::with_capacity(n + 1);
    for (url, frequency) in pairs {
        heap.push((frequency, url));
        if heap.len() > n {
            heap.pop();
        }
    }
    heap.into_vec()
}

fn into_results(entries: Vec<(u64, String)>) -> Vec<(String, u64)> {
    entries.into_iter().map(|(frequency, url)| (url, frequency)).collect()
}

/// Global top-N, highest frequency first, then by url.
pub fn find_top_n(urls: &FlowRdd<(String, u64)>, n: usize) -> RddResult<Vec<(String, u64)>> {
    let candidates = urls
        .map_partitions(move |part| local_top_n(part, n))
        .collect()?;
    let mut top = local_top_n(candidates.into_iter().map(|(f, url)| (url, f)), n);
    top.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(into_results(top))
}

/// Global bottom-N, lowest frequency first.
pub fn find_bottom_n(urls: &FlowRdd<(String, u64)>, n: usize) -> RddResult<Vec<(String, u64)>> {
    let candidates = urls
        .map_partitions(move |part| local_bottom_n(part, n))
        .collect()?;
    let mut bottom = local_bottom_n(candidates.into_iter().map(|(f, url)| (url, f)), n);
    bottom.sort();
    Ok(into_results(bottom))
}

/// Top-N through the built-in `takeOrdered`.
pub fn take_top_n(urls: &FlowRdd<(String, u64)>, n: usize) -> RddResult<Vec<(String, u64)>> {
    urls.take_ordered_by(n, |(url, frequency)| (Reverse(*frequency), url.clone()))
}

/// `(min, max, count)` of the comma-separated integers of a partition;
/// `None` for a partition without any.
pub fn partition_minmax(records: impl Iterator<Item = String>) -> Option<MinMax> {
    records
        .flat_map(|record| {
            record
                .split(',')
                .filter_map(|token| token.trim().parse::<i64>().ok())
                .collect::<Vec<_>>()
        })
        .map(|n| MinMax {
            min: n,
            max: n,
            count: 1,
        })
        .reduce(MinMax::merge)
}

pub fn partition_minmaxes(records: &FlowRdd<String>) -> RddResult<Vec<MinMax>> {
    records.map_partitions(|part| partition_minmax(part)).collect()
}

pub fn find_minmax(records: &FlowRdd<String>) -> RddResult<Option<MinMax>> {
    Ok(partition_minmaxes(records)?.into_iter().reduce(MinMax::merge))
}

pub fn load_urls(ctx: &FlowContext) -> anyhow::Result<FlowRdd<(String, u64)>> {
    Ok(lines_without_header(ctx, TOPIC, "url_frequencies.csv", 2)?
        .flat_map(|line| parse_url_frequency(&line)))
}

fn print_urls(urls: &[(String, u64)]) {
    for (url, frequency) in urls {
        println!("  {url:40} freq={frequency}");
    }
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Top-N and MinMax Design Patterns");

    section("Top-N (mapPartitions)");
    let urls = load_urls(ctx)?;
    let mut all = urls.collect()?;
    all.sort_by(|a, b| b.1.cmp(&a.1));
    println!("All URLs ({} total):", all.len());
    print_urls(&all);

    println!("\nTop-{N}:");
    print_urls(&find_top_n(&urls, N)?);
    println!("\nBottom-{N}:");
    print_urls(&find_bottom_n(&urls, N)?);
    println!("\nTop-{N} via takeOrdered:");
    print_urls(&take_top_n(&urls, N)?);
    let top_frequencies = urls.map(|(_, frequency)| frequency).top(N)?;
    println!("Top-{N} frequencies via top: {top_frequencies:?}\n");

    section("MinMax (mapPartitions)");
    let path = data_path(TOPIC, "numbers.csv");
    let numbers = ctx.text_file(&path, 6)?;
    println!("Input: {}", path.display());
    println!("Records: {}", numbers.count()?);
    println!("Partition summaries: {:?}\n", partition_minmaxes(&numbers)?);
    match find_minmax(&numbers)? {
        Some(result) => {
            println!("  Minimum: {}", result.min);
            println!("  Maximum: {}", result.max);
            println!("  Count:   {}", result.count);
        }
        None => println!("  no numbers found"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    fn urls(names: &[(&str, u64)]) -> Vec<(String, u64)> {
        names
            .iter()
            .map(|(url, f)| (format!("example.com/{url}"), *f))
            .collect()
    }

    #[test]
    fn test_top_and_bottom_n() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let rdd = load_urls(&ctx).unwrap();
        let expected_top = urls(&[
            ("docs", 980),
            ("login", 540),
            ("blog", 310),
            ("pricing", 205),
            ("home", 120),
        ]);
        assert_eq!(find_top_n(&rdd, N).unwrap(), expected_top);
        assert_eq!(take_top_n(&rdd, N).unwrap(), expected_top);
        assert_eq!(
            find_bottom_n(&rdd, N).unwrap(),
            urls(&[
                ("terms", 3),
                ("careers", 8),
                ("contact", 12),
                ("about", 45),
                ("faq", 67),
            ])
        );
    }

    #[test]
    fn test_tied_frequencies_agree_with_take_ordered() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let rdd = ctx.parallelize_with_partitions(
            urls(&[("d", 7), ("a", 7), ("z", 9), ("c", 7), ("b", 7), ("y", 1)]),
            3,
        );
        let expected = urls(&[("z", 9), ("a", 7), ("b", 7)]);
        assert_eq!(find_top_n(&rdd, 3).unwrap(), expected);
        assert_eq!(take_top_n(&rdd, 3).unwrap(), expected);
    }

    #[test]
    fn test_local_top_n_is_bounded() {
        let pairs = urls(&[("a", 1), ("b", 9), ("c", 5)]).into_iter();
        let mut top = local_top_n(pairs, 2);
        top.sort();
        assert_eq!(
            top,
            vec![(5, "example.com/c".to_string()), (9, "example.com/b".to_string())]
        );
    }

    #[test]
    fn test_minmax_skips_empty_partitions() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let numbers = ctx.text_file(data_path(TOPIC, "numbers.csv"), 6).unwrap();
        assert_eq!(partition_minmaxes(&numbers).unwrap().len(), 4);
        assert_eq!(
            find_minmax(&numbers).unwrap(),
            Some(MinMax {
                min: -17,
                max: 99,
                count: 10
            })
        );
        assert_eq!(partition_minmax(std::iter::empty()), None);
    }
}
