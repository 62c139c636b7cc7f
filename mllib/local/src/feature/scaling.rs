use crate::error::{MlError, MlResult};
use crate::frame::{Column, FeatureFrame};
use crate::linalg::Vector;
use crate::pipeline::{Estimator, Transformer};
use tracing::debug;

/// Rescales each vector feature linearly to `[min, max]`, default `[0, 1]`.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    input_col: String,
    output_col: String,
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    pub fn new(input_col: impl Into<String>, output_col: impl Into<String>) -> Self {
        Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
            min: 0.0,
            max: 1.0,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> MlResult<Self> {
        if min >= max {
            return Err(MlError::InvalidParameter(format!(
                "min ({min}) must be below max ({max})"
            )));
        }
        self.min = min;
        self.max = max;
        Ok(self)
    }
}

impl Estimator for MinMaxScaler {
    type Model = MinMaxScalerModel;

    fn fit(&self, frame: &FeatureFrame) -> MlResult<MinMaxScalerModel> {
        let vectors = frame.vectors(&self.input_col)?;
        let width = vectors.first().map(Vector::size).unwrap_or(0);
        let mut original_min = vec![f64::INFINITY; width];
        let mut original_max = vec![f64::NEG_INFINITY; width];
        for vector in vectors {
            if vector.size() != width {
                return Err(MlError::InvalidInput(format!(
                    "column '{}' mixes vector sizes {width} and {}",
                    self.input_col,
                    vector.size()
                )));
            }
            for (i, value) in vector.to_array().into_iter().enumerate() {
                original_min[i] = original_min[i].min(value);
                original_max[i] = original_max[i].max(value);
            }
        }
        debug!(column = %self.input_col, ?original_min, ?original_max, "fitted min-max scaler");
        Ok(MinMaxScalerModel {
            input_col: self.input_col.clone(),
            output_col: self.output_col.clone(),
            min: self.min,
            max: self.max,
            original_min,
            original_max,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MinMaxScalerModel {
    input_col: String,
    output_col: String,
    min: f64,
    max: f64,
    original_min: Vec<f64>,
    original_max: Vec<f64>,
}

impl MinMaxScalerModel {
    pub fn original_min(&self) -> &[f64] {
        &self.original_min
    }

    pub fn original_max(&self) -> &[f64] {
        &self.original_max
    }
}

impl Transformer for MinMaxScalerModel {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let scaled = frame
            .vectors(&self.input_col)?
            .iter()
            .map(|vector| {
                let values = vector
                    .to_array()
                    .into_iter()
                    .zip(self.original_min.iter().zip(&self.original_max))
                    .map(|(x, (lo, hi))| {
                        let range = hi - lo;
                        // constant features land in the middle of the range
                        let unit = if range != 0.0 { (x - lo) / range } else { 0.5 };
                        unit * (self.max - self.min) + self.min
                    })
                    .collect();
                Vector::dense(values)
            })
            .collect();
        frame
            .clone()
            .with_column(&self.output_col, Column::Vector(scaled))
    }
}

/// Scales each vector to unit p-norm. Zero vectors pass through unchanged.
#[derive(Debug, Clone)]
pub struct Normalizer {
    input_col: String,
    output_col: String,
    p: f64,
}

impl Normalizer {
    pub fn new(input_col: impl Into<String>, output_col: impl Into<String>, p: f64) -> MlResult<Self> {
        if p.is_nan() || p < 1.0 {
            return Err(MlError::InvalidParameter(format!("p must be >= 1, got {p}")));
        }
        Ok(Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
            p,
        })
    }
}

impl Transformer for Normalizer {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let normalized = frame
            .vectors(&self.input_col)?
            .iter()
            .map(|vector| {
                let norm = vector.norm(self.p);
                if norm == 0.0 {
                    vector.clone()
                } else {
                    vector.map_values(|_, v| v / norm)
                }
            })
            .collect();
        frame
            .clone()
            .with_column(&self.output_col, Column::Vector(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(rows: Vec<Vec<f64>>) -> FeatureFrame {
        FeatureFrame::new()
            .with_column(
                "features",
                Column::Vector(rows.into_iter().map(Vector::dense).collect()),
            )
            .unwrap()
    }

    #[test]
    fn test_min_max_scales_each_feature() {
        let frame = features(vec![vec![10.0, 5.0], vec![20.0, 5.0], vec![15.0, 5.0]]);
        let model = MinMaxScaler::new("features", "scaled").fit(&frame).unwrap();
        assert_eq!(model.original_min(), &[10.0, 5.0]);
        assert_eq!(model.original_max(), &[20.0, 5.0]);

        let scaled = model.transform(&frame).unwrap();
        let vectors = scaled.vectors("scaled").unwrap();
        assert_eq!(vectors[0], Vector::dense(vec![0.0, 0.5]));
        assert_eq!(vectors[1], Vector::dense(vec![1.0, 0.5]));
        assert_eq!(vectors[2], Vector::dense(vec![0.5, 0.5]));
    }

    #[test]
    fn test_min_max_custom_range() {
        let frame = features(vec![vec![0.0], vec![4.0]]);
        let scaled = MinMaxScaler::new("features", "scaled")
            .with_range(-1.0, 1.0)
            .unwrap()
            .fit(&frame)
            .unwrap()
            .transform(&frame)
            .unwrap();
        assert_eq!(scaled.vectors("scaled").unwrap()[0], Vector::dense(vec![-1.0]));
        assert!(MinMaxScaler::new("a", "b").with_range(1.0, 1.0).is_err());
    }

    #[test]
    fn test_normalizer_l1_l2() {
        let frame = features(vec![vec![3.0, -4.0], vec![0.0, 0.0]]);

        let l1 = Normalizer::new("features", "l1", 1.0)
            .unwrap()
            .transform(&frame)
            .unwrap();
        let l1 = l1.vectors("l1").unwrap();
        assert!((l1[0].get(0) - 3.0 / 7.0).abs() < 1e-12);
        assert!((l1[0].get(1) + 4.0 / 7.0).abs() < 1e-12);
        assert_eq!(l1[1], Vector::dense(vec![0.0, 0.0]));

        let l2 = Normalizer::new("features", "l2", 2.0)
            .unwrap()
            .transform(&frame)
            .unwrap();
        assert_eq!(l2.vectors("l2").unwrap()[0], Vector::dense(vec![0.6, -0.8]));
    }

    #[test]
    fn test_normalizer_keeps_sparse_form() {
        let frame = FeatureFrame::new()
            .with_column("v", Column::Vector(vec![Vector::sparse(10, vec![(7, 2.0)])]))
            .unwrap();
        let out = Normalizer::new("v", "n", 2.0).unwrap().transform(&frame).unwrap();
        assert_eq!(out.vectors("n").unwrap()[0].to_string(), "(10,[7],[1.0])");
        assert!(Normalizer::new("v", "n", 0.5).is_err());
    }
}
