//! Two-level binning of genomic variants into partitioned Parquet, and the
//! RDD and DataFrame sorting APIs.
//!
//! A variant key reads `chromosome:start:end:allele`. Level one bins by
//! `chr<chromosome>`, level two by `start % 101`.

use super::TOPIC;
use crate::support::{
    banner, lines_without_header, query, read_csv_file, register_view, section,
};
use dalgo_common::{data_path, output_path};
use dalgo_core::{FlowContext, FlowRdd, RddResult};
use dalgo_sql::{SqlResult, create_dataframe, list_partitions, read_parquet, show, write_parquet};
use datafusion::arrow::datatypes::DataType;
use datafusion::dataframe::DataFrame;
use datafusion::functions_aggregate::expr_fn::count;
use datafusion::prelude::{SessionContext, col, ident, lit};
use datafusion::scalar::ScalarValue;
use std::collections::BTreeMap;
use std::path::Path;

/// Prime bin count for the second level.
pub const NUM_BINS: u64 = 101;

pub const BIN_COLUMNS: [&str; 2] = ["CHR_ID", "MODULO"];

pub const LANGUAGES: [(&str, i64); 5] = [
    ("spark", 9500),
    ("python", 8200),
    ("java", 12000),
    ("scala", 6800),
    ("sql", 11500),
];

pub fn chromosome_id(variant_key: &str) -> Option<String> {
    let chromosome = variant_key.split(':').next()?.trim();
    (!chromosome.is_empty()).then(|| format!("chr{chromosome}"))
}

pub fn modulo_bin(variant_key: &str) -> Option<u64> {
    let start: u64 = variant_key.split(':').nth(1)?.trim().parse().ok()?;
    Some(start % NUM_BINS)
}

/// Add `CHR_ID` and `MODULO` columns derived from `variant_key`.
pub async fn apply_binning(ctx: &SessionContext, df: DataFrame) -> anyhow::Result<DataFrame> {
    register_view(ctx, "variants", df)?;
    query(
        ctx,
        &format!(
            "SELECT *, \
             'chr' || split_part(variant_key, ':', 1) AS \"CHR_ID\", \
             CAST(split_part(variant_key, ':', 2) AS BIGINT) % {NUM_BINS} AS \"MODULO\" \
             FROM variants"
        ),
    )
    .await
}

pub fn bin_distribution(binned: DataFrame) -> anyhow::Result<DataFrame> {
    Ok(binned
        .aggregate(
            vec![ident("CHR_ID"), ident("MODULO")],
            vec![count(lit(1)).alias("count")],
        )?
        .sort(vec![
            ident("CHR_ID").sort(true, false),
            ident("MODULO").sort(true, false),
        ])?)
}

/// Variants per `(CHR_ID, MODULO)` bin computed on the RDD side; keys that
/// do not parse are skipped.
pub fn bin_counts(variant_keys: &FlowRdd<String>) -> RddResult<BTreeMap<(String, u64), u64>> {
    let counts = variant_keys
        .flat_map(|key| Some((chromosome_id(&key)?, modulo_bin(&key)?)))
        .map(|bin| (bin, ()))
        .count_by_key()?;
    Ok(counts.into_iter().collect())
}

/// Rows of one chromosome read back through partition pruning.
pub async fn read_chromosome(
    ctx: &SessionContext,
    dir: &Path,
    chromosome: &str,
) -> anyhow::Result<DataFrame> {
    let df = read_parquet(ctx, dir, &BIN_COLUMNS).await?;
    Ok(df.filter(ident("CHR_ID").eq(lit(chromosome)))?)
}

pub fn language_pairs(ctx: &FlowContext) -> FlowRdd<(String, i64)> {
    ctx.parallelize(
        LANGUAGES
            .iter()
            .map(|(name, popularity)| (name.to_string(), *popularity))
            .collect(),
    )
}

pub fn sorted_by_language(pairs: &FlowRdd<(String, i64)>) -> RddResult<Vec<(String, i64)>> {
    pairs.sort_by_key(true)?.collect()
}

pub fn sorted_by_popularity_desc(pairs: &FlowRdd<(String, i64)>) -> RddResult<Vec<(String, i64)>> {
    pairs.sort_by(|(_, popularity)| *popularity, false)?.collect()
}

pub fn languages_frame(ctx: &SessionContext) -> SqlResult<DataFrame> {
    let rows = LANGUAGES
        .iter()
        .map(|(name, popularity)| {
            vec![
                ScalarValue::Utf8(Some(name.to_string())),
                ScalarValue::Int64(Some(*popularity)),
            ]
        })
        .collect();
    create_dataframe(
        ctx,
        &[("language", DataType::Utf8), ("popularity", DataType::Int64)],
        rows,
    )
}

async fn demonstrate_sorting(ctx: &FlowContext) -> anyhow::Result<()> {
    section("sorting APIs");
    let pairs = language_pairs(ctx);
    println!("  RDD sortByKey (ascending):");
    for (language, popularity) in sorted_by_language(&pairs)? {
        println!("    {language:10} {popularity}");
    }
    println!("\n  RDD sortBy popularity (descending):");
    for (language, popularity) in sorted_by_popularity_desc(&pairs)? {
        println!("    {language:10} {popularity}");
    }

    let df = languages_frame(ctx.sql())?;
    println!("\n  DataFrame sort (ascending by language):");
    show(&df.clone().sort(vec![col("language").sort(true, false)])?, 20).await?;
    println!("  DataFrame sort (descending by popularity):");
    show(&df.sort(vec![col("popularity").sort(false, false)])?, 20).await?;
    Ok(())
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Binning and Sorting Design Patterns");
    let path = data_path(TOPIC, "variants.csv");
    let df = read_csv_file(ctx, &path).await?;
    println!("Original data:");
    show(&df, 20).await?;

    let binned = apply_binning(ctx.sql(), df).await?;
    println!("After two-level binning (CHR_ID + MODULO):");
    show(&binned, 20).await?;
    println!("Bin distribution:");
    show(&bin_distribution(binned.clone())?, 20).await?;

    let keys = lines_without_header(ctx, TOPIC, "variants.csv", 2)?
        .flat_map(|line| line.split(',').next().map(str::to_string));
    println!("RDD bin counts: {:?}\n", bin_counts(&keys)?);

    let out = output_path(TOPIC, "binned_variants");
    write_parquet(binned, &out, &BIN_COLUMNS).await?;
    println!("Partitioned Parquet written to {}", out.display());
    for partition in list_partitions(&out)? {
        println!("  {partition}");
    }
    println!();

    section("reading CHR_ID=chr5 only");
    show(&read_chromosome(ctx.sql(), &out, "chr5").await?, 20).await?;

    demonstrate_sorting(ctx).await
}
