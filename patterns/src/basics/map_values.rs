//! `mapValues` transforms values and leaves keys (and partitioning) alone.

use crate::support::{banner, round2, section, sorted, sorted_by_key};
use dalgo_core::{FlowContext, FlowRdd, RddResult};

pub fn pairs(ctx: &FlowContext) -> FlowRdd<(String, i64)> {
    ctx.parallelize(
        [("a", 1), ("b", 2), ("c", 3), ("a", 4), ("b", 5)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

pub fn score_pairs(ctx: &FlowContext) -> FlowRdd<(String, (i64, u64))> {
    ctx.parallelize(
        [("alice", 85), ("alice", 92), ("bob", 90), ("bob", 88)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), (v, 1)))
            .collect(),
    )
}

/// Average score per student from `(score, 1)` pairs.
pub fn average_scores(scores: &FlowRdd<(String, (i64, u64))>) -> RddResult<Vec<(String, f64)>> {
    let averages = scores
        .reduce_by_key(|a, b| (a.0 + b.0, a.1 + b.1))
        .map_values(|(sum, count)| round2(sum as f64 / count as f64))
        .collect()?;
    Ok(sorted_by_key(averages))
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("mapValues()");
    let rdd = pairs(ctx);
    println!("Original: {:?}\n", rdd.collect()?);

    section("double");
    println!("{:?}", rdd.map_values(|v| v * 2).collect()?);
    section("square");
    println!("{:?}", rdd.map_values(|v| v * v).collect()?);
    section("format");
    println!("{:?}\n", rdd.map_values(|v| format!("value_{v}")).collect()?);

    section("average with (score, 1) pairs");
    for (name, average) in average_scores(&score_pairs(ctx))? {
        println!("  {name}: {average:.2}");
    }
    println!();

    let offsets = ctx.parallelize(vec![("x".to_string(), 10), ("y".to_string(), 20)]);
    let via_map = offsets.map(|(k, v)| (k, v + 100)).collect()?;
    let via_map_values = offsets.map_values(|v| v + 100).collect()?;
    section("map vs mapValues (+100)");
    println!("map:       {via_map:?}");
    println!("mapValues: {via_map_values:?}");
    println!("same result: {}", sorted(via_map) == sorted(via_map_values));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[test]
    fn test_map_values_keeps_keys() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let doubled = pairs(&ctx).map_values(|v| v * 2).collect().unwrap();
        let keys: Vec<&str> = doubled.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "a", "b"]);
        assert_eq!(doubled[3].1, 8);
    }

    #[test]
    fn test_average_scores() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        assert_eq!(
            average_scores(&score_pairs(&ctx)).unwrap(),
            vec![("alice".to_string(), 88.5), ("bob".to_string(), 89.0)]
        );
    }
}
