//! Reading and writing CSV and JSON: headers, positional column names,
//! explicit schemas, custom delimiters and exploding array columns.

use super::TOPIC;
use crate::support::{banner, query, register_view, section};
use dalgo_common::{data_path, output_path};
use dalgo_core::FlowContext;
use dalgo_sql::{CsvSource, SqlResult, print_schema, read_csv, read_json, show, write_csv, write_json};
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::dataframe::DataFrame;
use datafusion::prelude::SessionContext;
use std::path::Path;

pub fn sensor_schema() -> Schema {
    Schema::new(vec![
        Field::new("sensor_id", DataType::Utf8, false),
        Field::new("temperature", DataType::Float64, true),
        Field::new("humidity", DataType::Float64, true),
        Field::new("reading_date", DataType::Utf8, true),
    ])
}

pub async fn read_employees(ctx: &SessionContext) -> SqlResult<DataFrame> {
    read_csv(ctx, data_path(TOPIC, "employees.csv"), &CsvSource::default()).await
}

/// Without a header the columns are named `column_1`, `column_2`, ...
pub async fn read_sensors_positional(ctx: &SessionContext) -> SqlResult<DataFrame> {
    read_csv(ctx, data_path(TOPIC, "sensors_no_header.csv"), &CsvSource::headerless()).await
}

pub async fn read_sensors_typed(ctx: &SessionContext) -> SqlResult<DataFrame> {
    let source = CsvSource::headerless().with_schema(sensor_schema());
    read_csv(ctx, data_path(TOPIC, "sensors_no_header.csv"), &source).await
}

/// Write `df` pipe-delimited with a header into `dir` and read it back.
pub async fn pipe_round_trip(ctx: &SessionContext, df: DataFrame, dir: &Path) -> SqlResult<DataFrame> {
    write_csv(df, dir, true, b'|', &[]).await?;
    read_csv(ctx, dir, &CsvSource::default().with_delimiter(b'|')).await
}

/// One row per `(name, skill)` from the `skills` array column.
pub fn explode_skills(df: DataFrame) -> SqlResult<DataFrame> {
    Ok(df
        .select_columns(&["name", "skills"])?
        .unnest_columns(&["skills"])?
        .with_column_renamed("skills", "skill")?)
}

pub async fn department_summary(ctx: &SessionContext, employees: DataFrame) -> anyhow::Result<DataFrame> {
    register_view(ctx, "employees", employees)?;
    query(
        ctx,
        "SELECT department, COUNT(*) AS headcount, ROUND(AVG(salary)) AS avg_salary \
         FROM employees GROUP BY department ORDER BY avg_salary DESC",
    )
    .await
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("CSV & JSON Operations: Readers and Writers");
    let sql = ctx.sql();

    section("1. CSV with header and inferred schema");
    let employees = read_employees(sql).await?;
    show(&employees, 20).await?;
    print_schema(&employees);

    section("2. CSV without header (positional column names)");
    let positional = read_sensors_positional(sql).await?;
    show(&positional, 20).await?;
    print_schema(&positional);

    section("3. CSV with an explicit schema");
    let typed = read_sensors_typed(sql).await?;
    show(&typed, 20).await?;
    print_schema(&typed);

    let pipe_dir = output_path(TOPIC, "employees_pipe_delimited");
    section(&format!("4. Writing CSV with '|' separator to {}", pipe_dir.display()));
    let back = pipe_round_trip(sql, employees.clone(), &pipe_dir).await?;
    println!("Written. Reading back:");
    show(&back, 20).await?;

    section("5. JSON with schema inference");
    let json = read_json(sql, data_path(TOPIC, "employees.json")).await?;
    show(&json, 20).await?;
    print_schema(&json);

    section("6. Exploding the skills array");
    show(&explode_skills(json.clone())?, 50).await?;

    let json_dir = output_path(TOPIC, "employees_json_output");
    section(&format!("7. Writing JSON to {}", json_dir.display()));
    write_json(json.select_columns(&["name", "department", "salary"])?, &json_dir).await?;
    println!("Written. Reading back:");
    show(&read_json(sql, &json_dir).await?, 20).await?;

    section("8. SQL over a registered DataFrame");
    show(&department_summary(sql, employees).await?, 20).await?;
    Ok(())
}
