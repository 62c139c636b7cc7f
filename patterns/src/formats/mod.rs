//! DataFrames and file formats: CSV, newline-delimited JSON and Parquet.

pub mod csv_json_operations;
pub mod dataframe_basics;
pub mod etl_census;
pub mod parquet_operations;

pub const TOPIC: &str = "formats";
