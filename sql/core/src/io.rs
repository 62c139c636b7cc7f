//! DataFrame readers and writers.
//!
//! Writers work in overwrite mode: the target directory is removed before
//! DataFusion writes into it.

use crate::error::{SqlError, SqlResult};
use datafusion::arrow::datatypes::{DataType, Schema};
use datafusion::common::config::{CsvOptions, JsonOptions};
use datafusion::dataframe::{DataFrame, DataFrameWriteOptions};
use datafusion::prelude::{
    CsvReadOptions, NdJsonReadOptions, ParquetReadOptions, SessionContext, cast, ident,
};
use std::path::Path;
use tracing::{debug, info};

/// How to read a delimited text file.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub header: bool,
    pub delimiter: u8,
    /// Explicit schema; inferred when `None`.
    pub schema: Option<Schema>,
}

impl Default for CsvSource {
    fn default() -> Self {
        Self {
            header: true,
            delimiter: b',',
            schema: None,
        }
    }
}

impl CsvSource {
    /// Headerless input; columns are named `column_1`, `column_2`, ...
    pub fn headerless() -> Self {
        Self {
            header: false,
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }
}

fn path_str(path: &Path) -> SqlResult<&str> {
    path.to_str()
        .ok_or_else(|| SqlError::DataSource(format!("non UTF-8 path: {}", path.display())))
}

fn ensure_exists(path: &Path) -> SqlResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SqlError::Io(format!("{} does not exist", path.display())))
    }
}

pub async fn read_csv(ctx: &SessionContext, path: impl AsRef<Path>, source: &CsvSource) -> SqlResult<DataFrame> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let mut options = CsvReadOptions::new()
        .has_header(source.header)
        .delimiter(source.delimiter)
        .file_extension(&extension);
    if let Some(schema) = &source.schema {
        options = options.schema(schema);
    }
    debug!(path = %path.display(), header = source.header, "reading csv");
    Ok(ctx.read_csv(path_str(path)?, options).await?)
}

/// Read newline-delimited JSON.
pub async fn read_json(ctx: &SessionContext, path: impl AsRef<Path>) -> SqlResult<DataFrame> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let extension = if path.is_dir() { ".json" } else { "" };
    let options = NdJsonReadOptions::default().file_extension(extension);
    debug!(path = %path.display(), "reading json");
    Ok(ctx.read_json(path_str(path)?, options).await?)
}

/// Read Parquet files, recovering `partition_cols` from `key=value`
/// directory names as string columns.
pub async fn read_parquet(
    ctx: &SessionContext,
    path: impl AsRef<Path>,
    partition_cols: &[&str],
) -> SqlResult<DataFrame> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let cols = partition_cols
        .iter()
        .map(|name| (name.to_string(), DataType::Utf8))
        .collect();
    let options = ParquetReadOptions::default().table_partition_cols(cols);
    debug!(path = %path.display(), ?partition_cols, "reading parquet");
    Ok(ctx.read_parquet(path_str(path)?, options).await?)
}

fn prepare_output(dir: &Path) -> SqlResult<String> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    let mut target = path_str(dir)?.to_string();
    if !target.ends_with('/') {
        target.push('/');
    }
    Ok(target)
}

/// Hive-style directories hold strings; cast the other partition columns.
fn string_partition_columns(mut df: DataFrame, partition_by: &[&str]) -> SqlResult<DataFrame> {
    for name in partition_by {
        let is_string = df
            .schema()
            .field_with_unqualified_name(name)?
            .data_type()
            == &DataType::Utf8;
        if !is_string {
            df = df.with_column(name, cast(ident(*name), DataType::Utf8))?;
        }
    }
    Ok(df)
}

fn write_options(partition_by: &[&str]) -> DataFrameWriteOptions {
    DataFrameWriteOptions::new()
        .with_partition_by(partition_by.iter().map(|c| c.to_string()).collect())
}

pub async fn write_csv(
    df: DataFrame,
    dir: impl AsRef<Path>,
    header: bool,
    delimiter: u8,
    partition_by: &[&str],
) -> SqlResult<()> {
    let dir = dir.as_ref();
    let df = string_partition_columns(df, partition_by)?;
    let target = prepare_output(dir)?;
    let csv_options = CsvOptions::default()
        .with_has_header(header)
        .with_delimiter(delimiter);
    df.write_csv(&target, write_options(partition_by), Some(csv_options))
        .await?;
    info!(dir = %dir.display(), ?partition_by, "wrote csv");
    Ok(())
}

pub async fn write_parquet(df: DataFrame, dir: impl AsRef<Path>, partition_by: &[&str]) -> SqlResult<()> {
    let dir = dir.as_ref();
    let df = string_partition_columns(df, partition_by)?;
    let target = prepare_output(dir)?;
    df.write_parquet(&target, write_options(partition_by), None)
        .await?;
    info!(dir = %dir.display(), ?partition_by, "wrote parquet");
    Ok(())
}

/// Write newline-delimited JSON.
pub async fn write_json(df: DataFrame, dir: impl AsRef<Path>) -> SqlResult<()> {
    let dir = dir.as_ref();
    let target = prepare_output(dir)?;
    df.write_json(&target, write_options(&[]), None::<JsonOptions>)
        .await?;
    info!(dir = %dir.display(), "wrote json");
    Ok(())
}
