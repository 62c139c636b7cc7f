use crate::error::{MlError, MlResult};
use crate::frame::{Column, FeatureFrame};
use crate::linalg::Vector;
use crate::pipeline::{Estimator, Transformer};
use std::collections::HashMap;
use tracing::debug;

/// Maps string labels to indices, most frequent label first.
#[derive(Debug, Clone)]
pub struct StringIndexer {
    input_col: String,
    output_col: String,
}

impl StringIndexer {
    pub fn new(input_col: impl Into<String>, output_col: impl Into<String>) -> Self {
        Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
        }
    }
}

impl Estimator for StringIndexer {
    type Model = StringIndexerModel;

    fn fit(&self, frame: &FeatureFrame) -> MlResult<StringIndexerModel> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for label in frame.strings(&self.input_col)? {
            *counts.entry(label.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let labels: Vec<String> = ranked.into_iter().map(|(label, _)| label.to_string()).collect();
        debug!(column = %self.input_col, ?labels, "fitted string indexer");
        Ok(StringIndexerModel {
            input_col: self.input_col.clone(),
            output_col: self.output_col.clone(),
            labels,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StringIndexerModel {
    input_col: String,
    output_col: String,
    labels: Vec<String>,
}

impl StringIndexerModel {
    /// Labels in index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Transformer for StringIndexerModel {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let index: HashMap<&str, usize> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect();
        let indices = frame
            .strings(&self.input_col)?
            .iter()
            .map(|label| {
                index
                    .get(label.as_str())
                    .map(|i| *i as f64)
                    .ok_or_else(|| MlError::UnseenLabel {
                        column: self.input_col.clone(),
                        label: label.clone(),
                    })
            })
            .collect::<MlResult<Vec<_>>>()?;
        frame
            .clone()
            .with_column(&self.output_col, Column::Numeric(indices))
    }
}

/// Encodes category indices as sparse binary vectors.
///
/// With `drop_last` the last category maps to the all-zero vector, so
/// `n` categories produce vectors of size `n - 1`.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    input_col: String,
    output_col: String,
    drop_last: bool,
}

impl OneHotEncoder {
    pub fn new(input_col: impl Into<String>, output_col: impl Into<String>) -> Self {
        Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
            drop_last: true,
        }
    }

    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }
}

fn category_index(column: &str, value: f64) -> MlResult<usize> {
    if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
        return Err(MlError::InvalidInput(format!(
            "column '{column}' holds {value}, which is not a category index"
        )));
    }
    Ok(value as usize)
}

impl Estimator for OneHotEncoder {
    type Model = OneHotEncoderModel;

    fn fit(&self, frame: &FeatureFrame) -> MlResult<OneHotEncoderModel> {
        let mut categories = 0;
        for value in frame.numeric(&self.input_col)? {
            categories = categories.max(category_index(&self.input_col, *value)? + 1);
        }
        debug!(column = %self.input_col, categories, "fitted one-hot encoder");
        Ok(OneHotEncoderModel {
            input_col: self.input_col.clone(),
            output_col: self.output_col.clone(),
            categories,
            drop_last: self.drop_last,
        })
    }
}

#[derive(Debug, Clone)]
pub struct OneHotEncoderModel {
    input_col: String,
    output_col: String,
    categories: usize,
    drop_last: bool,
}

impl OneHotEncoderModel {
    pub fn categories(&self) -> usize {
        self.categories
    }
}

impl Transformer for OneHotEncoderModel {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let size = if self.drop_last {
            self.categories.saturating_sub(1)
        } else {
            self.categories
        };
        let vectors = frame
            .numeric(&self.input_col)?
            .iter()
            .map(|value| {
                let index = category_index(&self.input_col, *value)?;
                if index >= self.categories {
                    return Err(MlError::InvalidInput(format!(
                        "category {index} of column '{}' was not seen during fit",
                        self.input_col
                    )));
                }
                let entries = if index < size {
                    vec![(index, 1.0)]
                } else {
                    Vec::new()
                };
                Ok(Vector::sparse(size, entries))
            })
            .collect::<MlResult<Vec<_>>>()?;
        frame
            .clone()
            .with_column(&self.output_col, Column::Vector(vectors))
    }
}

/// Concatenates numeric and vector columns into one vector column.
#[derive(Debug, Clone)]
pub struct VectorAssembler {
    input_cols: Vec<String>,
    output_col: String,
}

impl VectorAssembler {
    pub fn new(input_cols: &[&str], output_col: impl Into<String>) -> Self {
        Self {
            input_cols: input_cols.iter().map(|c| c.to_string()).collect(),
            output_col: output_col.into(),
        }
    }
}

impl Transformer for VectorAssembler {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let rows = frame.num_rows();
        let mut entries: Vec<Vec<(usize, f64)>> = vec![Vec::new(); rows];
        let mut offset = 0;
        for name in &self.input_cols {
            match frame.column(name)? {
                Column::Numeric(values) => {
                    for (row, value) in values.iter().enumerate() {
                        entries[row].push((offset, *value));
                    }
                    offset += 1;
                }
                Column::Vector(vectors) => {
                    let width = vectors.first().map(Vector::size).unwrap_or(0);
                    for (row, vector) in vectors.iter().enumerate() {
                        if vector.size() != width {
                            return Err(MlError::InvalidInput(format!(
                                "column '{name}' mixes vector sizes {width} and {}",
                                vector.size()
                            )));
                        }
                        entries[row].extend(vector.active().into_iter().map(|(i, v)| (offset + i, v)));
                    }
                    offset += width;
                }
                other => {
                    return Err(MlError::ColumnType {
                        column: name.clone(),
                        expected: "numeric or vector",
                        actual: other.type_name(),
                    });
                }
            }
        }
        let vectors = entries
            .into_iter()
            .map(|row| Vector::sparse(offset, row).compressed())
            .collect();
        frame
            .clone()
            .with_column(&self.output_col, Column::Vector(vectors))
    }
}
