//! A tour of the common transformations and actions on small inline data.

use crate::support::{banner, section, sorted};
use dalgo_core::{FlowContext, RddResult};

pub const SENTENCES: [&str; 4] = [
    "hello world",
    "spark is great",
    "pyspark rocks",
    "Python is also great",
];

pub const SCORES: [(&str, i64); 4] = [("alice", 85), ("bob", 92), ("carol", 78), ("dave", 95)];

/// Everything the overview prints, computed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub evens: Vec<i64>,
    pub words: Vec<String>,
    pub grouped: Vec<(String, Vec<i64>)>,
    pub summed: Vec<(String, i64)>,
    pub word_counts: Vec<(String, u64)>,
    pub cartesian: Vec<(i64, String)>,
    pub top_scores: Vec<(String, i64)>,
}

fn letter_pairs() -> Vec<(String, i64)> {
    [("a", 1), ("b", 2), ("a", 3), ("b", 4), ("a", 5)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

pub fn overview(ctx: &FlowContext) -> RddResult<Overview> {
    let evens = ctx
        .parallelize((1..=10).collect::<Vec<i64>>())
        .filter(|n| n % 2 == 0)
        .collect()?;

    let sentences = ctx.parallelize(SENTENCES.iter().map(|s| s.to_string()).collect());
    let words = sentences.flat_map(|line| {
        line.split_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>()
    });

    let pairs = ctx.parallelize(letter_pairs());
    let grouped = pairs
        .group_by_key()
        .map_values(|mut values| {
            values.sort();
            values
        })
        .collect()?;
    let summed = pairs.reduce_by_key(|a, b| a + b).collect()?;

    // Descending by count, then by word for a stable listing.
    let word_counts = words
        .map(|word| (word.to_lowercase(), 1u64))
        .reduce_by_key(|a, b| a + b)
        .sort_by(|(word, count)| (u64::MAX - count, word.clone()), true)?
        .collect()?;

    let numbers = ctx.parallelize(vec![1i64, 2]);
    let letters = ctx.parallelize(vec!["a".to_string(), "b".to_string()]);
    let cartesian = numbers.cartesian(&letters).collect()?;

    let scores = ctx.parallelize(
        SCORES
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect(),
    );
    let top_scores = scores.take_ordered_by(2, |(_, score)| -score)?;

    Ok(Overview {
        evens,
        words: words.collect()?,
        grouped: sorted(grouped),
        summed: sorted(summed),
        word_counts,
        cartesian: sorted(cartesian),
        top_scores,
    })
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("RDD Transformations Overview");
    let report = overview(ctx)?;

    section("filter(): even numbers of 1..=10");
    println!("{:?}\n", report.evens);

    section("flatMap(): split sentences into words");
    println!("{:?}\n", report.words);

    section("groupByKey()");
    for (key, values) in &report.grouped {
        println!("  {key}: {values:?}");
    }
    println!();

    section("reduceByKey(): sum per key");
    println!("{:?}\n", report.summed);

    section("word count sorted by frequency");
    for (word, count) in &report.word_counts {
        println!("  {word}: {count}");
    }
    println!();

    section("cartesian()");
    println!("{:?}\n", report.cartesian);

    section("takeOrdered(2) by descending score");
    println!("{:?}", report.top_scores);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[test]
    fn test_overview() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let report = overview(&ctx).unwrap();
        assert_eq!(report.evens, vec![2, 4, 6, 8, 10]);
        assert_eq!(report.words.len(), 11);
        assert_eq!(
            report.grouped,
            vec![
                ("a".to_string(), vec![1, 3, 5]),
                ("b".to_string(), vec![2, 4])
            ]
        );
        assert_eq!(
            report.summed,
            vec![("a".to_string(), 9), ("b".to_string(), 6)]
        );
        assert_eq!(report.word_counts[0], ("great".to_string(), 2));
        assert_eq!(report.word_counts[1], ("is".to_string(), 2));
        assert_eq!(report.cartesian.len(), 4);
        assert_eq!(
            report.top_scores,
            vec![("dave".to_string(), 95), ("bob".to_string(), 92)]
        );
    }
}
