//! Dalgo SQL - DataFrame helpers on top of DataFusion
//!
//! Readers and writers for CSV, JSON and Parquet, Spark-style display
//! helpers, lookup UDFs and conversions between RDDs and DataFrames.

pub mod bridge;
pub mod columnar;
pub mod display;
pub mod error;
pub mod io;
pub mod udf;

pub use bridge::{rdd_to_dataframe, register_rdd};
pub use columnar::{FromArrowArray, RecordBatchBuilder, ToArrowArray, ToRecordBatch, extract_column};
pub use display::{
    batches_to_rows, collect_rows, create_dataframe, format_rows, format_schema, list_partitions,
    print_schema, show,
};
pub use error::{SqlError, SqlResult};
pub use io::{CsvSource, read_csv, read_json, read_parquet, write_csv, write_json, write_parquet};
pub use udf::register_lookup_udf;
