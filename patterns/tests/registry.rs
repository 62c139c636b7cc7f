//! Integration tests for the example registry

mod common;

use common::*;
use dalgo_patterns::{find_example, registry};
use std::collections::HashSet;

#[test]
fn test_every_topic_has_examples() {
    let topics: HashSet<&str> = registry().iter().map(|e| e.topic).collect();
    for topic in [
        "basics",
        "dna",
        "reductions",
        "partitioning",
        "graph",
        "formats",
        "ranking",
        "design_patterns",
        "summarization",
        "joins",
        "features",
    ] {
        assert!(topics.contains(topic), "missing topic {topic}");
    }
    assert_eq!(topics.len(), 11);
}

#[test]
fn test_summaries_are_filled_in() {
    for example in registry() {
        assert!(!example.summary.is_empty(), "{}", example.id);
        assert!(!example.id.contains(' '), "{}", example.id);
    }
}

#[tokio::test]
async fn test_every_example_runs_on_bundled_data() {
    for example in registry() {
        let ctx = create_test_context(example.id);
        if let Err(err) = (example.run)(&ctx).await {
            panic!("example {} failed: {err:#}", example.id);
        }
    }
}

#[tokio::test]
async fn test_find_example_runs_the_registered_function() {
    let ctx = create_test_context("lookup");
    let example = find_example("reduction_warmup").unwrap();
    assert_eq!(example.topic, "reductions");
    (example.run)(&ctx).await.unwrap();
}
