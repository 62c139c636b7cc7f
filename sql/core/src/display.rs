//! Printing and inspecting DataFrames.

use crate::error::{SqlError, SqlResult};
use datafusion::arrow::array::{Array, ArrayRef, new_empty_array};
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::arrow::util::display::array_value_to_string;
use datafusion::arrow::util::pretty::pretty_format_batches;
use datafusion::common::ScalarValue;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::SessionContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The first `n` rows as a pretty table.
pub async fn format_rows(df: &DataFrame, n: usize) -> SqlResult<String> {
    let batches = df.clone().limit(0, Some(n))?.collect().await?;
    Ok(pretty_format_batches(&batches)?.to_string())
}

/// Print the first `n` rows.
pub async fn show(df: &DataFrame, n: usize) -> SqlResult<()> {
    println!("{}", format_rows(df, n).await?);
    Ok(())
}

fn type_name(data_type: &DataType) -> String {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "string".to_string(),
        DataType::Int8 => "byte".to_string(),
        DataType::Int16 => "short".to_string(),
        DataType::Int32 | DataType::UInt32 => "integer".to_string(),
        DataType::Int64 | DataType::UInt64 => "long".to_string(),
        DataType::Float32 => "float".to_string(),
        DataType::Float64 => "double".to_string(),
        DataType::Boolean => "boolean".to_string(),
        DataType::Date32 | DataType::Date64 => "date".to_string(),
        DataType::Timestamp(_, _) => "timestamp".to_string(),
        DataType::Decimal128(p, s) => format!("decimal({p},{s})"),
        DataType::List(field) | DataType::LargeList(field) => {
            format!("array<{}>", type_name(field.data_type()))
        }
        DataType::Dictionary(_, value) => type_name(value),
        other => other.to_string().to_lowercase(),
    }
}

/// Render the schema as a `root` tree.
pub fn format_schema(df: &DataFrame) -> String {
    let mut out = String::from("root\n");
    for field in df.schema().fields() {
        out.push_str(&format!(
            " |-- {}: {} (nullable = {})\n",
            field.name(),
            type_name(field.data_type()),
            field.is_nullable()
        ));
    }
    out
}

pub fn print_schema(df: &DataFrame) {
    print!("{}", format_schema(df));
}

/// Every row of `batches` as display strings; nulls become `"null"`.
pub fn batches_to_rows(batches: &[RecordBatch]) -> SqlResult<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for batch in batches {
        for row in 0..batch.num_rows() {
            let mut values = Vec::with_capacity(batch.num_columns());
            for column in batch.columns() {
                if column.is_null(row) {
                    values.push("null".to_string());
                } else {
                    values.push(array_value_to_string(column, row)?);
                }
            }
            rows.push(values);
        }
    }
    Ok(rows)
}

/// Collect `df` into display strings.
pub async fn collect_rows(df: DataFrame) -> SqlResult<Vec<Vec<String>>> {
    batches_to_rows(&df.collect().await?)
}

/// Build a DataFrame from literal rows; every row must have one value per column.
pub fn create_dataframe(
    ctx: &SessionContext,
    columns: &[(&str, DataType)],
    rows: Vec<Vec<ScalarValue>>,
) -> SqlResult<DataFrame> {
    if let Some(bad) = rows.iter().position(|row| row.len() != columns.len()) {
        return Err(SqlError::Schema(format!(
            "row {bad} has {} values, expected {}",
            rows[bad].len(),
            columns.len()
        )));
    }

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());
    for (index, (_, data_type)) in columns.iter().enumerate() {
        let array = if rows.is_empty() {
            new_empty_array(data_type)
        } else {
            ScalarValue::iter_to_array(rows.iter().map(|row| row[index].clone()))?
        };
        arrays.push(array);
    }

    let schema = Schema::new(
        columns
            .iter()
            .map(|(name, data_type)| Field::new(*name, data_type.clone(), true))
            .collect::<Vec<_>>(),
    );
    let batch = RecordBatch::try_new(Arc::new(schema), arrays)?;
    Ok(ctx.read_batch(batch)?)
}

/// Relative paths of the `key=value` leaf directories under `dir`, sorted.
pub fn list_partitions(dir: impl AsRef<Path>) -> SqlResult<Vec<String>> {
    fn walk(root: &Path, current: &Path, out: &mut Vec<String>) -> SqlResult<()> {
        let mut has_child_dir = false;
        for entry in std::fs::read_dir(current)? {
            let path = entry?.path();
            if path.is_dir() {
                has_child_dir = true;
                walk(root, &path, out)?;
            }
        }
        if !has_child_dir && current != root {
            let relative: PathBuf = current.strip_prefix(root).unwrap_or(current).to_path_buf();
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if parts.iter().all(|part| part.contains('=')) {
                out.push(parts.join("/"));
            }
        }
        Ok(())
    }

    let root = dir.as_ref();
    let mut partitions = Vec::new();
    walk(root, root, &mut partitions)?;
    partitions.sort();
    Ok(partitions)
}
