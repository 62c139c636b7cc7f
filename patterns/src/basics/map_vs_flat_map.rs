//! `map` keeps one output per input; `flatMap` flattens what it returns.

use crate::support::{banner, section};
use dalgo_core::{FlowContext, RddResult};

pub fn nested_items() -> Vec<Vec<String>> {
    let rows: [&[&str]; 5] = [
        &["item_11", "item_12", "item_13"],
        &["item_21", "item_22"],
        &[],
        &["item_31", "item_32", "item_33", "item_34"],
        &[],
    ];
    rows.iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

pub const SENTENCES: [&str; 3] = ["hello world", "spark is awesome", "pyspark flatmap demo"];

/// `(map count, flatMap count)` for the same input.
pub fn compare_counts(ctx: &FlowContext) -> RddResult<(usize, usize)> {
    let rdd = ctx.parallelize(nested_items());
    let mapped = rdd.map(|items| items.len()).count()?;
    let flattened = rdd.flat_map(|items| items).count()?;
    Ok((mapped, flattened))
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("map() vs flatMap()");

    let nested = ctx.parallelize(nested_items());
    section("map(): one output per input");
    println!("{:?}", nested.map(|items| items.len()).collect()?);
    section("flatMap(): empty inputs disappear");
    println!("{:?}\n", nested.flat_map(|items| items).collect()?);

    let sentences = ctx.parallelize(SENTENCES.iter().map(|s| s.to_string()).collect());
    section("map(split) keeps the nesting");
    for words in sentences
        .map(|s| s.split(' ').map(str::to_string).collect::<Vec<_>>())
        .collect()?
    {
        println!("  {words:?}");
    }
    section("flatMap(split) yields words");
    println!(
        "{:?}\n",
        sentences
            .flat_map(|s| s.split(' ').map(str::to_string).collect::<Vec<_>>())
            .collect()?
    );

    let numbers = ctx.parallelize(vec![1u32, 2, 3]);
    section("map(range)");
    println!(
        "{:?}",
        numbers.map(|n| (0..n).collect::<Vec<_>>()).collect()?
    );
    section("flatMap(range)");
    println!("{:?}", numbers.flat_map(|n| 0..n).collect()?);

    let (mapped, flattened) = compare_counts(ctx)?;
    println!("\nmap produced {mapped} elements, flatMap produced {flattened}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[test]
    fn test_flat_map_drops_empty_rows() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        assert_eq!(compare_counts(&ctx).unwrap(), (5, 9));
    }

    #[test]
    fn test_flat_map_range() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let values = ctx
            .parallelize(vec![1u32, 2, 3])
            .flat_map(|n| 0..n)
            .collect()
            .unwrap();
        assert_eq!(values, vec![0, 0, 1, 0, 1, 2]);
    }
}
