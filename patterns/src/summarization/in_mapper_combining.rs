//! Character frequencies three ways, from one pair per character to one
//! combined map per partition. Fewer pairs reach the shuffle with every step.

use super::TOPIC;
use crate::support::{banner, measure_shuffle, section};
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd, RddResult};
use std::collections::{BTreeMap, HashMap};

pub type CharCounts = BTreeMap<char, u64>;

type Strategy = fn(&FlowRdd<String>) -> RddResult<CharCounts>;

pub const STRATEGIES: [(&str, Strategy); 3] = [
    ("Basic MapReduce (char, 1)", char_freq_basic),
    ("Per-record combining", char_freq_per_record),
    ("Per-partition combining", char_freq_per_partition),
];

/// Lowercased characters of every whitespace-separated word.
fn word_chars(record: &str) -> impl Iterator<Item = char> + '_ {
    record
        .split_whitespace()
        .flat_map(str::chars)
        .flat_map(char::to_lowercase)
}

pub fn basic_mapper(record: &str) -> Vec<(char, u64)> {
    word_chars(record).map(|c| (c, 1)).collect()
}

pub fn per_record_combiner(record: &str) -> Vec<(char, u64)> {
    let mut counts: HashMap<char, u64> = HashMap::new();
    for c in word_chars(record) {
        *counts.entry(c).or_default() += 1;
    }
    counts.into_iter().collect()
}

pub fn per_partition_combiner(records: impl Iterator<Item = String>) -> Vec<(char, u64)> {
    let mut counts: HashMap<char, u64> = HashMap::new();
    for record in records {
        for c in word_chars(&record) {
            *counts.entry(c).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

pub fn char_freq_basic(records: &FlowRdd<String>) -> RddResult<CharCounts> {
    let counts = records
        .flat_map(|record| basic_mapper(&record))
        .reduce_by_key(|a, b| a + b)
        .collect()?;
    Ok(counts.into_iter().collect())
}

pub fn char_freq_per_record(records: &FlowRdd<String>) -> RddResult<CharCounts> {
    let counts = records
        .flat_map(|record| per_record_combiner(&record))
        .reduce_by_key(|a, b| a + b)
        .collect()?;
    Ok(counts.into_iter().collect())
}

pub fn char_freq_per_partition(records: &FlowRdd<String>) -> RddResult<CharCounts> {
    let counts = records
        .map_partitions(|part| per_partition_combiner(part))
        .reduce_by_key(|a, b| a + b)
        .collect()?;
    Ok(counts.into_iter().collect())
}

/// Pairs handed to the shuffle by each strategy before map-side combining.
pub fn emitted_pairs(records: &FlowRdd<String>) -> RddResult<[usize; 3]> {
    Ok([
        records.flat_map(|record| basic_mapper(&record)).count()?,
        records.flat_map(|record| per_record_combiner(&record)).count()?,
        records
            .map_partitions(|part| per_partition_combiner(part))
            .count()?,
    ])
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("In-Mapper Combining: Character Frequency");
    let path = data_path(TOPIC, "corpus.txt");
    let records = ctx.text_file(&path, 2)?;
    println!("Input: {}", path.display());
    println!("Records: {}\n", records.count()?);
    let [basic, per_record, per_partition] = emitted_pairs(&records)?;
    println!("Pairs emitted: basic={basic} per-record={per_record} per-partition={per_partition}\n");

    for (name, strategy) in STRATEGIES {
        section(name);
        let (counts, shuffled) = measure_shuffle(ctx, || Ok(strategy(&records)?))?;
        let total: u64 = counts.values().sum();
        println!("  Unique characters: {}, Total count: {total}", counts.len());
        for (c, count) in &counts {
            println!("    '{c}': {count}");
        }
        println!("  Shuffle: {shuffled}\n");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[test]
    fn test_mappers() {
        assert_eq!(basic_mapper("Ab a"), vec![('a', 1), ('b', 1), ('a', 1)]);
        let mut combined = per_record_combiner("Ab a");
        combined.sort();
        assert_eq!(combined, vec![('a', 2), ('b', 1)]);
    }

    #[test]
    fn test_strategies_agree_on_corpus() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let records = ctx.text_file(data_path(TOPIC, "corpus.txt"), 2).unwrap();
        let expected: CharCounts = [
            ('a', 6),
            ('b', 2),
            ('d', 2),
            ('f', 1),
            ('g', 2),
            ('i', 4),
            ('k', 1),
            ('p', 1),
            ('r', 1),
            ('s', 4),
            ('t', 3),
        ]
        .into_iter()
        .collect();
        for (name, strategy) in STRATEGIES {
            assert_eq!(strategy(&records).unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn test_combining_emits_fewer_pairs() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let records = ctx.text_file(data_path(TOPIC, "corpus.txt"), 2).unwrap();
        assert_eq!(emitted_pairs(&records).unwrap(), [27, 21, 17]);
    }
}
