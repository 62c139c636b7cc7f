//! Integration tests for shuffle operations
//!
//! These tests focus specifically on shuffle-based operations like
//! reduceByKey, groupByKey, join, cogroup, and sortByKey.

mod common;

use common::*;
use dalgo_core::{CustomPartitioner, HashPartitioner, Partitioner};
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn test_reduce_by_key_single_partition() {
    let context = create_test_context("reduce-by-key-single");
    let rdd = context.parallelize_with_partitions(create_test_string_i32_data(), 1);

    let result: HashMap<String, i32> = rdd
        .reduce_by_key(|a, b| a + b)
        .collect_as_map()
        .unwrap();

    assert_eq!(result.get("a"), Some(&10)); // 1 + 3 + 6
    assert_eq!(result.get("b"), Some(&7)); // 2 + 5
    assert_eq!(result.get("c"), Some(&4));
}

#[test]
fn test_reduce_by_key_multiple_partitions() {
    let context = create_test_context("reduce-by-key-multi");
    let rdd = context.parallelize_with_partitions(create_test_string_i32_data(), 3);

    let reduced = rdd.reduce_by_key_with_partitions(|a, b| a + b, 4);
    assert_eq!(reduced.num_partitions(), 4);

    let result = reduced.collect_as_map().unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result["a"], 10);
    assert_eq!(result["b"], 7);
    assert_eq!(result["c"], 4);
}

#[test]
fn test_group_by_key_keeps_first_seen_order() {
    let context = create_test_context("group-by-key-test");
    let data = vec![
        ("x".to_string(), 1),
        ("y".to_string(), 2),
        ("x".to_string(), 3),
        ("z".to_string(), 4),
        ("x".to_string(), 5),
        ("y".to_string(), 6),
    ];
    let grouped = context
        .parallelize_with_partitions(data, 2)
        .group_by_key_with_partitions(1)
        .collect()
        .unwrap();

    assert_eq!(
        grouped,
        vec![
            ("x".to_string(), vec![1, 3, 5]),
            ("y".to_string(), vec![2, 6]),
            ("z".to_string(), vec![4]),
        ]
    );
}

#[test]
fn test_map_side_combine_shrinks_the_shuffle() {
    let context = create_test_context("metrics-test");
    let words: Vec<(String, u32)> = "a b a c a b a a"
        .split(' ')
        .map(|w| (w.to_string(), 1))
        .collect();
    let pairs = context.parallelize_with_partitions(words, 2);

    let before = context.shuffle_metrics();
    let reduced = pairs.reduce_by_key(|a, b| a + b).collect_as_map().unwrap();
    let after_reduce = context.shuffle_metrics();
    let grouped = pairs.group_by_key().map_values(|v| v.len()).collect_as_map().unwrap();
    let after_group = context.shuffle_metrics();

    assert_eq!(reduced["a"], 5);
    assert_eq!(grouped["a"], 5);

    let reduce_cost = after_reduce.since(&before);
    let group_cost = after_group.since(&after_reduce);
    assert_eq!(reduce_cost.shuffles, 1);
    assert_eq!(group_cost.records_written, 8);
    // [a b a c] and [a b a a] combine to 3 + 2 records
    assert_eq!(reduce_cost.records_written, 5);
    assert!(reduce_cost.bytes_written < group_cost.bytes_written);
}

#[test]
fn test_aggregate_and_combine_by_key_average() {
    let context = create_test_context("average-test");
    let ratings = vec![
        ("alex".to_string(), 4.0),
        ("jane".to_string(), 3.0),
        ("alex".to_string(), 2.0),
        ("jane".to_string(), 5.0),
        ("alex".to_string(), 3.0),
    ];
    let rdd = context.parallelize_with_partitions(ratings, 2);

    let sums = rdd
        .aggregate_by_key(
            (0.0, 0u32),
            |(sum, count), v: f64| (sum + v, count + 1),
            |(s1, c1), (s2, c2)| (s1 + s2, c1 + c2),
        )
        .map_values(|(sum, count)| sum / count as f64)
        .collect_as_map()
        .unwrap();
    assert_eq!(sums["alex"], 3.0);
    assert_eq!(sums["jane"], 4.0);

    let combined = rdd
        .combine_by_key(
            |v: f64| vec![v],
            |mut acc: Vec<f64>, v| {
                acc.push(v);
                acc
            },
            |mut a, b| {
                a.extend(b);
                a
            },
        )
        .map_values(|values| values.len())
        .collect_as_map()
        .unwrap();
    assert_eq!(combined["alex"], 3);
}

#[test]
fn test_joins() {
    let context = create_test_context("join-test");
    let left = context.parallelize(vec![
        (1, "apple".to_string()),
        (2, "banana".to_string()),
        (3, "cherry".to_string()),
    ]);
    let right = context.parallelize(vec![(1, 10), (3, 30), (3, 31), (4, 40)]);

    let mut inner = left.join(&right).collect().unwrap();
    inner.sort_by_key(|(k, (_, w))| (*k, *w));
    assert_eq!(
        inner,
        vec![
            (1, ("apple".to_string(), 10)),
            (3, ("cherry".to_string(), 30)),
            (3, ("cherry".to_string(), 31)),
        ]
    );

    let left_outer = left.left_outer_join(&right).collect_as_map().unwrap();
    assert_eq!(left_outer[&2], ("banana".to_string(), None));

    let right_outer = left.right_outer_join(&right).collect_as_map().unwrap();
    assert_eq!(right_outer[&4], (None, 40));

    let full = left.full_outer_join(&right).collect().unwrap();
    assert_eq!(full.len(), 5);
    assert!(full.contains(&(2, (Some("banana".to_string()), None))));
    assert!(full.contains(&(4, (None, Some(40)))));
}

#[test]
fn test_cogroup_uses_larger_partition_count() {
    let context = create_test_context("cogroup-test");
    let left = context.parallelize_with_partitions(vec![("k".to_string(), 1)], 1);
    let right = context.parallelize_with_partitions(vec![("k".to_string(), 'x')], 3);

    let grouped = left.cogroup(&right);
    assert_eq!(grouped.num_partitions(), 3);
    assert_eq!(
        grouped.collect().unwrap(),
        vec![("k".to_string(), (vec![1], vec!['x']))]
    );
}

#[test]
fn test_sort_by_key_descending() {
    let context = create_test_context("sort-by-key-test");
    let data = vec![(3, "c"), (1, "a"), (5, "e"), (2, "b"), (4, "d")]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect::<Vec<_>>();
    let sorted = context
        .parallelize_with_partitions(data, 2)
        .sort_by_key(false)
        .unwrap()
        .keys()
        .collect()
        .unwrap();

    assert_eq!(sorted, vec![5, 4, 3, 2, 1]);
}

#[test]
fn test_partition_by_custom_partitioner() {
    let context = create_test_context("partition-by-test");
    let partitioner: Arc<dyn Partitioner<i32>> =
        Arc::new(CustomPartitioner::new(2, |k: &i32| (*k % 2) as usize));
    let parts = context
        .parallelize((1..=6).map(|k| (k, k * k)).collect::<Vec<_>>())
        .partition_by(partitioner)
        .glom_collect()
        .unwrap();

    assert_eq!(parts[0], vec![(2, 4), (4, 16), (6, 36)]);
    assert_eq!(parts[1], vec![(1, 1), (3, 9), (5, 25)]);
}

#[test]
fn test_count_by_key_and_hash_partitioner() {
    let context = create_test_context("count-by-key-test");
    let counts = context
        .parallelize(create_test_string_i32_data())
        .count_by_key()
        .unwrap();
    assert_eq!(counts["a"], 3);
    assert_eq!(counts["c"], 1);

    let partitioner = HashPartitioner::new(4);
    let first = Partitioner::<String>::get_partition(&partitioner, &"key".to_string());
    let second = Partitioner::<String>::get_partition(&partitioner, &"key".to_string());
    assert_eq!(first, second);
    assert!(first < 4);
}
