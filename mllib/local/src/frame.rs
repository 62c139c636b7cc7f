//! In-memory columnar frame the feature transformers operate on.

use crate::error::{MlError, MlResult};
use crate::linalg::Vector;
use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, ListArray, ListBuilder, StringArray, StringBuilder,
};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use indexmap::IndexMap;
use std::sync::Arc;

/// A single named column of a [`FeatureFrame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    String(Vec<String>),
    Numeric(Vec<f64>),
    Tokens(Vec<Vec<String>>),
    Vector(Vec<Vector>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::String(values) => values.len(),
            Column::Numeric(values) => values.len(),
            Column::Tokens(values) => values.len(),
            Column::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Column::String(_) => "string",
            Column::Numeric(_) => "numeric",
            Column::Tokens(_) => "tokens",
            Column::Vector(_) => "vector",
        }
    }

    fn to_arrow(&self) -> (DataType, ArrayRef) {
        match self {
            Column::String(values) => (
                DataType::Utf8,
                Arc::new(StringArray::from_iter_values(values)),
            ),
            Column::Numeric(values) => (
                DataType::Float64,
                Arc::new(Float64Array::from(values.clone())),
            ),
            Column::Tokens(rows) => {
                let mut builder = ListBuilder::new(StringBuilder::new());
                for tokens in rows {
                    for token in tokens {
                        builder.values().append_value(token);
                    }
                    builder.append(true);
                }
                let array: ListArray = builder.finish();
                (array.data_type().clone(), Arc::new(array))
            }
            Column::Vector(rows) => (
                DataType::Utf8,
                Arc::new(StringArray::from_iter_values(
                    rows.iter().map(|v| v.to_string()),
                )),
            ),
        }
    }

    fn from_arrow(name: &str, array: &ArrayRef) -> MlResult<Column> {
        if array.null_count() > 0 {
            return Err(MlError::InvalidInput(format!(
                "column '{name}' contains {} null values",
                array.null_count()
            )));
        }
        match array.data_type() {
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                let strings = cast(array, &DataType::Utf8)?;
                Ok(Column::String(
                    strings
                        .as_string::<i32>()
                        .iter()
                        .map(|v| v.unwrap_or_default().to_string())
                        .collect(),
                ))
            }
            DataType::List(field) if field.data_type() == &DataType::Utf8 => {
                let lists = array.as_list::<i32>();
                let mut rows = Vec::with_capacity(lists.len());
                for row in 0..lists.len() {
                    let values = lists.value(row);
                    rows.push(
                        values
                            .as_string::<i32>()
                            .iter()
                            .map(|v| v.unwrap_or_default().to_string())
                            .collect(),
                    );
                }
                Ok(Column::Tokens(rows))
            }
            data_type if data_type.is_numeric() => {
                let numbers = cast(array, &DataType::Float64)?;
                Ok(Column::Numeric(
                    numbers
                        .as_primitive::<arrow::datatypes::Float64Type>()
                        .values()
                        .to_vec(),
                ))
            }
            other => Err(MlError::InvalidInput(format!(
                "column '{name}' has unsupported type {other}"
            ))),
        }
    }
}

/// Named, equally long columns in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: IndexMap<String, Column>,
}

impl FeatureFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.values().next().map(Column::len).unwrap_or(0)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Add or replace a column. Its length must match the existing rows.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> MlResult<Self> {
        let name = name.into();
        let mut others = self.columns.iter().filter(|(existing, _)| **existing != name);
        if let Some((_, first)) = others.next() {
            if first.len() != column.len() {
                return Err(MlError::LengthMismatch {
                    column: name,
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }
        self.columns.insert(name, column);
        Ok(self)
    }

    pub fn column(&self, name: &str) -> MlResult<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| MlError::ColumnNotFound(name.to_string()))
    }

    fn mismatch(name: &str, expected: &'static str, actual: &Column) -> MlError {
        MlError::ColumnType {
            column: name.to_string(),
            expected,
            actual: actual.type_name(),
        }
    }

    pub fn strings(&self, name: &str) -> MlResult<&[String]> {
        match self.column(name)? {
            Column::String(values) => Ok(values),
            other => Err(Self::mismatch(name, "string", other)),
        }
    }

    pub fn numeric(&self, name: &str) -> MlResult<&[f64]> {
        match self.column(name)? {
            Column::Numeric(values) => Ok(values),
            other => Err(Self::mismatch(name, "numeric", other)),
        }
    }

    pub fn tokens(&self, name: &str) -> MlResult<&[Vec<String>]> {
        match self.column(name)? {
            Column::Tokens(values) => Ok(values),
            other => Err(Self::mismatch(name, "tokens", other)),
        }
    }

    pub fn vectors(&self, name: &str) -> MlResult<&[Vector]> {
        match self.column(name)? {
            Column::Vector(values) => Ok(values),
            other => Err(Self::mismatch(name, "vector", other)),
        }
    }

    /// A new frame holding only `names`, in that order.
    pub fn select(&self, names: &[&str]) -> MlResult<FeatureFrame> {
        let mut frame = FeatureFrame::new();
        for name in names {
            frame = frame.with_column(*name, self.column(name)?.clone())?;
        }
        Ok(frame)
    }

    /// Convert to Arrow. Vectors are rendered as display strings.
    pub fn to_record_batch(&self) -> MlResult<RecordBatch> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays = Vec::with_capacity(self.columns.len());
        for (name, column) in &self.columns {
            let (data_type, array) = column.to_arrow();
            fields.push(Field::new(name, data_type, false));
            arrays.push(array);
        }
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    /// Read string, numeric and `List<Utf8>` columns; nulls are rejected.
    pub fn from_record_batch(batch: &RecordBatch) -> MlResult<FeatureFrame> {
        let schema = batch.schema();
        let mut frame = FeatureFrame::new();
        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            let column = Column::from_arrow(field.name(), array)?;
            frame = frame.with_column(field.name().clone(), column)?;
        }
        Ok(frame)
    }

    pub fn from_batches(batches: &[RecordBatch]) -> MlResult<FeatureFrame> {
        match batches.first() {
            None => Ok(FeatureFrame::new()),
            Some(first) => {
                let batch = concat_batches(&first.schema(), batches)?;
                Self::from_record_batch(&batch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;

    fn sample() -> FeatureFrame {
        FeatureFrame::new()
            .with_column(
                "brand",
                Column::String(vec!["Audi".to_string(), "BMW".to_string()]),
            )
            .unwrap()
            .with_column("price", Column::Numeric(vec![30000.0, 45000.0]))
            .unwrap()
    }

    #[test]
    fn test_typed_access() {
        let frame = sample();
        assert_eq!(frame.num_rows(), 2);
        assert_eq!(frame.column_names(), vec!["brand", "price"]);
        assert_eq!(frame.numeric("price").unwrap(), &[30000.0, 45000.0]);
        assert!(matches!(
            frame.numeric("brand"),
            Err(MlError::ColumnType { expected: "numeric", actual: "string", .. })
        ));
        assert!(matches!(frame.column("nope"), Err(MlError::ColumnNotFound(_))));
    }

    #[test]
    fn test_with_column_checks_length_and_replaces() {
        let frame = sample();
        let err = frame
            .clone()
            .with_column("short", Column::Numeric(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, MlError::LengthMismatch { expected: 2, actual: 1, .. }));

        let replaced = frame
            .with_column("price", Column::Numeric(vec![1.0, 2.0]))
            .unwrap();
        assert_eq!(replaced.column_names(), vec!["brand", "price"]);
        assert_eq!(replaced.numeric("price").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_arrow_round_trip() {
        let frame = sample()
            .with_column(
                "words",
                Column::Tokens(vec![vec!["a".to_string()], vec![]]),
            )
            .unwrap();
        let batch = frame.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(FeatureFrame::from_record_batch(&batch).unwrap(), frame);
    }

    #[test]
    fn test_integers_become_numeric() {
        let schema = Arc::new(Schema::new(vec![Field::new("age", DataType::Int64, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Int64Array::from(vec![25, 41])) as ArrayRef],
        )
        .unwrap();
        let frame = FeatureFrame::from_batches(&[batch.clone(), batch]).unwrap();
        assert_eq!(frame.numeric("age").unwrap(), &[25.0, 41.0, 25.0, 41.0]);
    }

    #[test]
    fn test_vectors_render_as_strings() {
        let frame = FeatureFrame::new()
            .with_column("features", Column::Vector(vec![Vector::dense(vec![1.0, 2.0])]))
            .unwrap();
        let batch = frame.to_record_batch().unwrap();
        let rendered = batch.column(0).as_string::<i32>().value(0).to_string();
        assert_eq!(rendered, "[1.0,2.0]");
    }
}
