//! Extract census JSON, keep the seniors, add a total and load the result
//! as CSV.

use super::TOPIC;
use crate::support::banner;
use dalgo_common::{data_path, output_path};
use dalgo_core::FlowContext;
use dalgo_sql::{CsvSource, SqlResult, print_schema, read_csv, read_json, show, write_csv};
use datafusion::dataframe::DataFrame;
use datafusion::logical_expr::Partitioning;
use datafusion::prelude::{SessionContext, col, lit};
use std::path::Path;

pub const SENIOR_AGE: i64 = 54;

pub async fn extract(ctx: &SessionContext, input: &Path) -> SqlResult<DataFrame> {
    read_json(ctx, input).await
}

/// Rows with `age > 54` and a `total = males + females` column.
pub fn transform(df: DataFrame) -> SqlResult<DataFrame> {
    Ok(df
        .filter(col("age").gt(lit(SENIOR_AGE)))?
        .with_column("total", col("males") + col("females"))?)
}

/// Write a single headered CSV file into `dir`.
pub async fn load(df: DataFrame, dir: &Path) -> SqlResult<()> {
    let single = df.repartition(Partitioning::RoundRobinBatch(1))?;
    write_csv(single, dir, true, b',', &[]).await
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    let input = data_path(TOPIC, "census_2010.json");
    let output = output_path(TOPIC, "seniors");

    banner("ETL Step 1: Extraction");
    let census = extract(ctx.sql(), &input).await?;
    println!("Records extracted: {}", census.clone().count().await?);
    print_schema(&census);
    show(&census, 5).await?;

    banner("ETL Step 2: Transformation");
    let seniors = transform(census)?;
    println!("Senior records (age > {SENIOR_AGE}): {}", seniors.clone().count().await?);
    show(&seniors, 20).await?;

    banner("ETL Step 3: Loading");
    load(seniors, &output).await?;
    println!("Data written to: {}", output.display());
    let verification = read_csv(ctx.sql(), &output, &CsvSource::default()).await?;
    println!("Verification, records loaded: {}", verification.clone().count().await?);
    show(&verification, 20).await?;
    Ok(())
}
