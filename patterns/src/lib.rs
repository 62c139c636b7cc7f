//! Dalgo Patterns - data-algorithm examples
//!
//! Every example family lives in its own module with pure, tested
//! computation functions and a `run` function that prints a walkthrough.
//! [`registry`] lists all of them under stable ids for the `dalgo` binary.

pub mod basics;
pub mod design_patterns;
pub mod dna;
pub mod features;
pub mod formats;
pub mod graph;
pub mod joins;
pub mod partitioning;
pub mod ranking;
pub mod reductions;
pub mod summarization;
pub mod support;

use dalgo_core::FlowContext;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

pub type RunFn = for<'a> fn(&'a FlowContext) -> LocalBoxFuture<'a, anyhow::Result<()>>;

/// A runnable example.
#[derive(Clone, Copy)]
pub struct Example {
    pub id: &'static str,
    pub topic: &'static str,
    pub summary: &'static str,
    pub run: RunFn,
}

impl std::fmt::Debug for Example {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Example")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}

macro_rules! example {
    ($id:literal, $topic:expr, $summary:literal, $run:path) => {
        Example {
            id: $id,
            topic: $topic,
            summary: $summary,
            run: |ctx| $run(ctx).boxed_local(),
        }
    };
}

/// All examples in presentation order.
pub fn registry() -> Vec<Example> {
    vec![
        example!("average_by_key", basics::TOPIC, "mean value per name from (sum, count) pairs", basics::average_by_key::run),
        example!("rdd_map", basics::TOPIC, "map lines to records, then filter", basics::rdd_map::run),
        example!("transformations_overview", basics::TOPIC, "a tour of the common RDD transformations", basics::transformations_overview::run),
        example!("map_vs_flat_map", basics::TOPIC, "map keeps nesting, flatMap flattens", basics::map_vs_flat_map::run),
        example!("map_values", basics::TOPIC, "transform values while keeping keys", basics::map_values::run),
        example!("map_partitions", basics::TOPIC, "per-partition summaries with mapPartitions", basics::map_partitions::run),
        example!("dna_base_count", dna::TOPIC, "DNA base count with flatMap and reduceByKey", dna::run_basic),
        example!("dna_base_count_v1", dna::TOPIC, "DNA base count emitting one pair per base", dna::run_flat_map),
        example!("dna_base_count_v2", dna::TOPIC, "DNA base count with a per-record combiner", dna::run_per_record),
        example!("dna_base_count_v3", dna::TOPIC, "DNA base count with a per-partition combiner", dna::run_per_partition),
        example!("dna_base_count_sample", dna::TOPIC, "DNA base count over an inline sample", dna::run_map_partitions_sample),
        example!("reduction_warmup", reductions::TOPIC, "sums by key with four reducers", reductions::warmup::run),
        example!("movie_avg_rating", reductions::TOPIC, "average movie rating, wrong and right", reductions::movie_avg_rating::run),
        example!("partition_basics", partitioning::TOPIC, "glom, repartition, coalesce and partition stats", partitioning::partition_basics::run),
        example!("physical_partitioning", partitioning::TOPIC, "year/month partitioned CSV and Parquet", partitioning::physical_partitioning::run),
        example!("graph_basics", graph::TOPIC, "degrees, mutual friends and triangles with joins", graph::graph_basics::run),
        example!("flight_analysis", graph::TOPIC, "routes, delays and connecting flights", graph::flight_analysis::run),
        example!("dataframe_basics", formats::TOPIC, "filter, select, withColumn and groupBy", formats::dataframe_basics::run),
        example!("etl_census", formats::TOPIC, "JSON census ETL to CSV", formats::etl_census::run),
        example!("csv_json_operations", formats::TOPIC, "CSV and JSON reading and writing", formats::csv_json_operations::run),
        example!("parquet_operations", formats::TOPIC, "Parquet pruning, filters and partitions", formats::parquet_operations::run),
        example!("pagerank", ranking::TOPIC, "iterative PageRank over a web graph", ranking::pagerank::run),
        example!("rank_product", ranking::TOPIC, "rank product of genes across studies", ranking::rank_product::run),
        example!("design_patterns", design_patterns::TOPIC, "filtering, grouping, joins and combiners", design_patterns::classic_patterns::run),
        example!("inverted_index", design_patterns::TOPIC, "word postings across documents", design_patterns::inverted_index::run),
        example!("binning_and_sorting", summarization::TOPIC, "two-level binning and the sorting APIs", summarization::binning_and_sorting::run),
        example!("in_mapper_combining", summarization::TOPIC, "character frequency with in-mapper combining", summarization::in_mapper_combining::run),
        example!("top_n_minmax", summarization::TOPIC, "top-N and min/max per partition", summarization::top_n_minmax::run),
        example!("join_types", joins::TOPIC, "inner, left, right and hand-built joins", joins::join_types::run),
        example!("map_side_join", joins::TOPIC, "broadcast lookups instead of a shuffle join", joins::map_side_join::run),
        example!("categorical_encoding", features::TOPIC, "string indexing, one-hot and assembly", features::categorical_encoding::run),
        example!("feature_transformations", features::TOPIC, "scaling, normalizing and bucketing", features::feature_transformations::run),
        example!("text_features", features::TOPIC, "TF-IDF with hashing and a vocabulary", features::text_features::run),
    ]
}

pub fn find_example(id: &str) -> Option<Example> {
    registry().into_iter().find(|example| example.id == id)
}
