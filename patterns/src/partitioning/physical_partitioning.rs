//! Writing a DataFrame partitioned by column values into
//! `year=YYYY/month=M` directories, then reading it back with pruning.

use super::TOPIC;
use crate::support::{banner, query, read_csv_file, register_view, section};
use dalgo_common::{data_path, output_dir};
use dalgo_core::FlowContext;
use dalgo_sql::{list_partitions, read_parquet, show, write_csv, write_parquet};
use datafusion::dataframe::DataFrame;
use datafusion::prelude::{SessionContext, col, lit};
use std::path::Path;

pub const PARTITION_COLUMNS: [&str; 2] = ["year", "month"];

/// Add integer `year` and `month` columns from a `DD/MM/YYYY` date.
pub async fn add_partition_columns(ctx: &SessionContext, df: DataFrame) -> anyhow::Result<DataFrame> {
    register_view(ctx, "transactions_raw", df)?;
    query(
        ctx,
        "SELECT *, \
         CAST(split_part(\"date\", '/', 3) AS INT) AS year, \
         CAST(split_part(\"date\", '/', 2) AS INT) AS month \
         FROM transactions_raw",
    )
    .await
}

/// Write `df` as partitioned CSV and Parquet under `base/csv` and
/// `base/parquet`.
pub async fn write_partitioned(df: DataFrame, base: &Path) -> anyhow::Result<()> {
    write_csv(df.clone(), base.join("csv"), true, b',', &PARTITION_COLUMNS).await?;
    write_parquet(df, base.join("parquet"), &PARTITION_COLUMNS).await?;
    Ok(())
}

/// Rows of one `year`/`month` partition; only that directory is scanned.
pub async fn query_partition(
    ctx: &SessionContext,
    parquet_dir: &Path,
    year: &str,
    month: &str,
) -> anyhow::Result<DataFrame> {
    let df = read_parquet(ctx, parquet_dir, &PARTITION_COLUMNS).await?;
    Ok(df.filter(col("year").eq(lit(year)).and(col("month").eq(lit(month))))?)
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Physical Partitioning: Write Data by Columns");
    let input = data_path(TOPIC, "transactions.csv");
    let raw = read_csv_file(ctx, &input).await?;
    println!("Input: {}", input.display());
    println!("Total records: {}\n", raw.clone().count().await?);
    println!("Raw data (first 5 rows):");
    show(&raw, 5).await?;

    let df = add_partition_columns(ctx.sql(), raw).await?;
    println!("With partition columns (year, month):");
    show(&df, 5).await?;

    let base = output_dir(TOPIC);
    section(&format!("writing partitioned CSV and Parquet to {}", base.display()));
    write_partitioned(df, &base).await?;

    println!("CSV partitions:");
    for partition in list_partitions(base.join("csv"))? {
        println!("  {partition}");
    }
    println!("Parquet partitions:");
    for partition in list_partitions(base.join("parquet"))? {
        println!("  {partition}");
    }
    println!();

    section("query year=2024, month=9 (partition pruning)");
    let result = query_partition(ctx.sql(), &base.join("parquet"), "2024", "9").await?;
    show(&result, 20).await?;
    println!("Records matching filter: {}", result.count().await?);
    Ok(())
}
