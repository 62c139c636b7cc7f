//! Four reductions computing the same sums per key.

use crate::support::{banner, sorted};
use dalgo_core::{FlowContext, FlowRdd, RddResult};

pub const SAMPLE: [(&str, i64); 10] = [
    ("alex", 2),
    ("alex", 4),
    ("alex", 8),
    ("jane", 3),
    ("jane", 7),
    ("rafa", 1),
    ("rafa", 3),
    ("rafa", 5),
    ("rafa", 6),
    ("clint", 9),
];

pub type Pairs = FlowRdd<(String, i64)>;

pub fn sample(ctx: &FlowContext) -> Pairs {
    ctx.parallelize(
        SAMPLE
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
    )
}

pub fn sum_with_reduce_by_key(rdd: &Pairs) -> Pairs {
    rdd.reduce_by_key(|a, b| a + b)
}

/// Ships every value across the shuffle before summing.
pub fn sum_with_group_by_key(rdd: &Pairs) -> Pairs {
    rdd.group_by_key().map_values(|values| values.into_iter().sum())
}

pub fn sum_with_aggregate_by_key(rdd: &Pairs) -> Pairs {
    rdd.aggregate_by_key(0, |acc, v| acc + v, |a, b| a + b)
}

pub fn sum_with_combine_by_key(rdd: &Pairs) -> Pairs {
    rdd.combine_by_key(|v| v, |c, v| c + v, |a, b| a + b)
}

pub type Approach = (&'static str, fn(&Pairs) -> Pairs);

pub const APPROACHES: [Approach; 4] = [
    ("reduceByKey()", sum_with_reduce_by_key),
    ("groupByKey()", sum_with_group_by_key),
    ("aggregateByKey()", sum_with_aggregate_by_key),
    ("combineByKey()", sum_with_combine_by_key),
];

pub fn sorted_sums(rdd: &Pairs, approach: fn(&Pairs) -> Pairs) -> RddResult<Vec<(String, i64)>> {
    Ok(sorted(approach(rdd).collect()?))
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Reduction Warmup: Four Approaches Compared");
    let rdd = sample(ctx);
    println!("Input data: {:?}\n", rdd.collect()?);
    println!("Expected: alex=14, jane=10, rafa=15, clint=9\n");
    for (name, approach) in APPROACHES {
        println!("  {name:<25} -> {:?}", sorted_sums(&rdd, approach)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[test]
    fn test_all_approaches_agree() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let rdd = sample(&ctx);
        let expected: Vec<(String, i64)> = [("alex", 14), ("clint", 9), ("jane", 10), ("rafa", 15)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        for (name, approach) in APPROACHES {
            assert_eq!(sorted_sums(&rdd, approach).unwrap(), expected, "{name}");
        }
    }
}
