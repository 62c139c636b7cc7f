//! DNA base counting over FASTA lines, five ways.
//!
//! Header lines (`>...`) count once under the key `z`; sequence characters
//! are uppercased and counted when they are one of `ATCGN`.

use crate::support::{banner, measure_shuffle, section};
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd, RddResult, ShuffleMetrics};
use std::collections::{BTreeMap, HashMap};

pub const TOPIC: &str = "dna";

pub const VALID_BASES: &str = "ATCGN";

/// Key under which FASTA records are counted.
pub const RECORD_KEY: char = 'z';

pub const SAMPLE_FASTA: [&str; 6] = [
    ">sequence1",
    "ATCGATCGATCG",
    "GCTAGCTAGCTA",
    ">sequence2",
    "AAATTTTCCCCGGGG",
    "NNNNATCGATCG",
];

pub type BaseCounts = BTreeMap<char, u64>;

fn is_header(line: &str) -> bool {
    line.starts_with('>')
}

fn bases(line: &str) -> impl Iterator<Item = char> + '_ {
    line.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| VALID_BASES.contains(*c))
}

/// `(base, 1)` for every counted character of a line.
pub fn base_ones(line: &str) -> Vec<(char, u64)> {
    if is_header(line) {
        return vec![(RECORD_KEY, 1)];
    }
    bases(line).map(|base| (base, 1)).collect()
}

fn add_line(counts: &mut HashMap<char, u64>, line: &str) {
    if is_header(line) {
        *counts.entry(RECORD_KEY).or_default() += 1;
    } else {
        for base in bases(line) {
            *counts.entry(base).or_default() += 1;
        }
    }
}

/// Counts of one line, combined before anything is emitted.
pub fn line_counts(line: &str) -> Vec<(char, u64)> {
    let mut counts = HashMap::new();
    add_line(&mut counts, line);
    counts.into_iter().collect()
}

/// Counts of a whole partition, combined before anything is emitted.
pub fn partition_counts(lines: impl Iterator<Item = String>) -> Vec<(char, u64)> {
    let mut counts = HashMap::new();
    for line in lines {
        add_line(&mut counts, &line);
    }
    counts.into_iter().collect()
}

/// Split every line into characters, keep the valid ones, then reduce.
pub fn count_basic(lines: &FlowRdd<String>) -> RddResult<BaseCounts> {
    let counts = lines
        .flat_map(|line| {
            if is_header(&line) {
                vec![(RECORD_KEY, 1u64)]
            } else {
                line.chars()
                    .map(|c| (c.to_ascii_uppercase(), 1u64))
                    .filter(|(c, _)| VALID_BASES.contains(*c))
                    .collect()
            }
        })
        .reduce_by_key(|a, b| a + b)
        .collect()?;
    Ok(counts.into_iter().collect())
}

/// One `(base, 1)` pair per character.
pub fn count_flat_map(lines: &FlowRdd<String>) -> RddResult<BaseCounts> {
    let counts = lines
        .flat_map(|line| base_ones(&line))
        .reduce_by_key(|a, b| a + b)
        .collect()?;
    Ok(counts.into_iter().collect())
}

/// Combine inside every record first.
pub fn count_per_record(lines: &FlowRdd<String>) -> RddResult<BaseCounts> {
    let counts = lines
        .flat_map(|line| line_counts(&line))
        .reduce_by_key(|a, b| a + b)
        .collect()?;
    Ok(counts.into_iter().collect())
}

/// Combine inside every partition first.
pub fn count_per_partition(lines: &FlowRdd<String>) -> RddResult<BaseCounts> {
    let counts = lines
        .map_partitions(|part| partition_counts(part))
        .reduce_by_key(|a, b| a + b)
        .collect()?;
    Ok(counts.into_iter().collect())
}

pub fn sample_lines(ctx: &FlowContext, num_partitions: usize) -> FlowRdd<String> {
    ctx.parallelize_with_partitions(
        SAMPLE_FASTA.iter().map(|s| s.to_string()).collect(),
        num_partitions,
    )
}

fn print_counts(counts: &BaseCounts) {
    println!("Total FASTA records: {}", counts.get(&RECORD_KEY).unwrap_or(&0));
    println!("Base frequencies:");
    let mut total = 0;
    for base in VALID_BASES.chars() {
        let count = counts.get(&base).copied().unwrap_or_default();
        total += count;
        println!("  {base}: {count}");
    }
    println!("Total bases: {total}\n");
}

fn run_strategy(
    ctx: &FlowContext,
    title: &str,
    lines: &FlowRdd<String>,
    strategy: fn(&FlowRdd<String>) -> RddResult<BaseCounts>,
) -> anyhow::Result<(BaseCounts, ShuffleMetrics)> {
    section(title);
    let (counts, shuffled) = measure_shuffle(ctx, || Ok(strategy(lines)?))?;
    print_counts(&counts);
    println!("Shuffle: {shuffled}\n");
    Ok((counts, shuffled))
}

fn fasta_lines(ctx: &FlowContext) -> anyhow::Result<FlowRdd<String>> {
    let path = data_path(TOPIC, "sample.fasta");
    let lines = ctx.text_file(&path, ctx.default_parallelism().min(4))?;
    println!("Input file: {}", path.display());
    println!("Total lines: {}", lines.count()?);
    println!("Partitions: {}\n", lines.num_partitions());
    Ok(lines)
}

pub async fn run_basic(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("DNA Base Count (basic MapReduce)");
    let lines = fasta_lines(ctx)?;
    run_strategy(ctx, "flatMap + reduceByKey", &lines, count_basic)?;
    Ok(())
}

pub async fn run_flat_map(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("DNA Base Count - Version 1 (one pair per base)");
    let lines = fasta_lines(ctx)?;
    run_strategy(ctx, "flatMap emitting (base, 1)", &lines, count_flat_map)?;
    Ok(())
}

pub async fn run_per_record(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("DNA Base Count - Version 2 (combiner per record)");
    let lines = fasta_lines(ctx)?;
    run_strategy(ctx, "flatMap emitting per-record counts", &lines, count_per_record)?;
    Ok(())
}

pub async fn run_per_partition(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("DNA Base Count - Version 3 (combiner per partition)");
    let lines = fasta_lines(ctx)?;
    let (counts, _) = run_strategy(
        ctx,
        "mapPartitions emitting per-partition counts",
        &lines,
        count_per_partition,
    )?;

    section("all strategies agree");
    let strategies: [(&str, fn(&FlowRdd<String>) -> RddResult<BaseCounts>); 3] = [
        ("basic", count_basic),
        ("flatMap", count_flat_map),
        ("per record", count_per_record),
    ];
    for (name, strategy) in strategies {
        println!("  {name}: {}", strategy(&lines)? == counts);
    }
    Ok(())
}

pub async fn run_map_partitions_sample(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("DNA Base Count (mapPartitions over the inline sample)");
    let lines = sample_lines(ctx, 2);
    for (index, part) in lines.glom_collect()?.iter().enumerate() {
        println!("  partition {index}: {part:?}");
    }
    println!();
    run_strategy(ctx, "mapPartitions + reduceByKey", &lines, count_per_partition)?;
    Ok(())
}
