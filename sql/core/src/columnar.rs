//! Conversion between row-oriented RDD records and Arrow columns.
//!
//! Scalars become a single `value` column; tuples become `_1`, `_2`, ...
//! columns, the names Spark gives to tuple-backed DataFrames.

use crate::error::{SqlError, SqlResult};
use datafusion::arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray, UInt32Array, UInt64Array,
};
use datafusion::arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema, SchemaRef};
use datafusion::arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Trait for converting data types to Arrow arrays
pub trait ToArrowArray: Sized {
    /// Convert a vector of values to an Arrow array
    fn to_arrow_array(values: Vec<Self>) -> ArrayRef;

    /// Get the Arrow data type for this Rust type
    fn arrow_data_type() -> DataType;
}

macro_rules! impl_to_arrow_array {
    ($($ty:ty => $array:ty, $data_type:expr);* $(;)?) => {
        $(
            impl ToArrowArray for $ty {
                fn to_arrow_array(values: Vec<Self>) -> ArrayRef {
                    Arc::new(<$array>::from(values))
                }

                fn arrow_data_type() -> DataType {
                    $data_type
                }
            }
        )*
    };
}

impl_to_arrow_array! {
    i32 => Int32Array, DataType::Int32;
    i64 => Int64Array, DataType::Int64;
    u32 => UInt32Array, DataType::UInt32;
    u64 => UInt64Array, DataType::UInt64;
    f32 => Float32Array, DataType::Float32;
    f64 => Float64Array, DataType::Float64;
    String => StringArray, DataType::Utf8;
    bool => BooleanArray, DataType::Boolean;
}

/// Trait for converting RDD records into a RecordBatch.
pub trait ToRecordBatch: Sized {
    /// Get the Arrow schema corresponding to this type.
    fn to_schema() -> SchemaRef;

    /// Convert a vector of items into a single RecordBatch.
    fn to_record_batch(data: Vec<Self>) -> SqlResult<RecordBatch>;
}

macro_rules! impl_scalar_record_batch {
    ($($ty:ty),*) => {
        $(
            impl ToRecordBatch for $ty {
                fn to_schema() -> SchemaRef {
                    Arc::new(Schema::new(vec![Field::new(
                        "value",
                        <$ty>::arrow_data_type(),
                        false,
                    )]))
                }

                fn to_record_batch(data: Vec<Self>) -> SqlResult<RecordBatch> {
                    RecordBatch::try_new(Self::to_schema(), vec![<$ty>::to_arrow_array(data)])
                        .map_err(SqlError::from)
                }
            }
        )*
    };
}

impl_scalar_record_batch!(i32, i64, u32, u64, f32, f64, String, bool);

impl<A: ToArrowArray, B: ToArrowArray> ToRecordBatch for (A, B) {
    fn to_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("_1", A::arrow_data_type(), false),
            Field::new("_2", B::arrow_data_type(), false),
        ]))
    }

    fn to_record_batch(data: Vec<Self>) -> SqlResult<RecordBatch> {
        let (a, b): (Vec<A>, Vec<B>) = data.into_iter().unzip();
        RecordBatchBuilder::new(Self::to_schema())
            .add_column(a)
            .add_column(b)
            .build()
    }
}

impl<A: ToArrowArray, B: ToArrowArray, C: ToArrowArray> ToRecordBatch for (A, B, C) {
    fn to_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("_1", A::arrow_data_type(), false),
            Field::new("_2", B::arrow_data_type(), false),
            Field::new("_3", C::arrow_data_type(), false),
        ]))
    }

    fn to_record_batch(data: Vec<Self>) -> SqlResult<RecordBatch> {
        let mut a = Vec::with_capacity(data.len());
        let mut b = Vec::with_capacity(data.len());
        let mut c = Vec::with_capacity(data.len());
        for (x, y, z) in data {
            a.push(x);
            b.push(y);
            c.push(z);
        }
        RecordBatchBuilder::new(Self::to_schema())
            .add_column(a)
            .add_column(b)
            .add_column(c)
            .build()
    }
}

/// Trait for converting from Arrow arrays back to Rust types
pub trait FromArrowArray: Sized {
    /// Convert an Arrow array to a vector of values; nulls are rejected.
    fn from_arrow_array(array: &dyn Array) -> SqlResult<Vec<Self>>;
}

fn reject_nulls(array: &dyn Array) -> SqlResult<()> {
    if array.null_count() > 0 {
        return Err(SqlError::Schema("Null values not supported".to_string()));
    }
    Ok(())
}

impl FromArrowArray for i64 {
    fn from_arrow_array(array: &dyn Array) -> SqlResult<Vec<Self>> {
        reject_nulls(array)?;
        let values = array
            .as_primitive_opt::<Int64Type>()
            .ok_or_else(|| SqlError::Schema(format!("Expected Int64, got {}", array.data_type())))?;
        Ok(values.values().to_vec())
    }
}

impl FromArrowArray for f64 {
    fn from_arrow_array(array: &dyn Array) -> SqlResult<Vec<Self>> {
        reject_nulls(array)?;
        let values = array
            .as_primitive_opt::<Float64Type>()
            .ok_or_else(|| SqlError::Schema(format!("Expected Float64, got {}", array.data_type())))?;
        Ok(values.values().to_vec())
    }
}

impl FromArrowArray for String {
    fn from_arrow_array(array: &dyn Array) -> SqlResult<Vec<Self>> {
        reject_nulls(array)?;
        let strings = array
            .as_string_opt::<i32>()
            .ok_or_else(|| SqlError::Schema(format!("Expected Utf8, got {}", array.data_type())))?;
        Ok(strings.iter().flatten().map(str::to_string).collect())
    }
}

/// Utility for creating RecordBatches from typed columns
pub struct RecordBatchBuilder {
    schema: SchemaRef,
    columns: Vec<ArrayRef>,
}

impl RecordBatchBuilder {
    pub fn new(schema: SchemaRef) -> Self {
        Self {
            schema,
            columns: Vec::new(),
        }
    }

    pub fn add_column<T: ToArrowArray>(mut self, values: Vec<T>) -> Self {
        self.columns.push(T::to_arrow_array(values));
        self
    }

    /// Add an already built Arrow column.
    pub fn add_array(mut self, array: ArrayRef) -> Self {
        self.columns.push(array);
        self
    }

    pub fn build(self) -> SqlResult<RecordBatch> {
        if self.columns.len() != self.schema.fields().len() {
            return Err(SqlError::Schema(format!(
                "Column count mismatch: expected {}, got {}",
                self.schema.fields().len(),
                self.columns.len()
            )));
        }

        RecordBatch::try_new(self.schema, self.columns)
            .map_err(|e| SqlError::Schema(format!("Failed to create RecordBatch: {e}")))
    }
}

/// Extract column `index` of every batch into one vector.
pub fn extract_column<T: FromArrowArray>(batches: &[RecordBatch], index: usize) -> SqlResult<Vec<T>> {
    let mut values = Vec::new();
    for batch in batches {
        if index >= batch.num_columns() {
            return Err(SqlError::Schema(format!(
                "Column index {} out of bounds ({} columns)",
                index,
                batch.num_columns()
            )));
        }
        values.extend(T::from_arrow_array(batch.column(index).as_ref())?);
    }
    Ok(values)
}
