use crate::error::{MlError, MlResult};
use crate::frame::{Column, FeatureFrame};
use crate::pipeline::{Estimator, Transformer};
use std::cmp::Ordering;
use tracing::debug;

/// Maps a numeric column to bucket indices.
///
/// Bucket `i` covers `[splits[i], splits[i + 1])`; the last bucket also
/// includes its upper bound.
#[derive(Debug, Clone)]
pub struct Bucketizer {
    input_col: String,
    output_col: String,
    splits: Vec<f64>,
}

impl Bucketizer {
    /// `splits` needs at least three strictly increasing values.
    pub fn new(
        input_col: impl Into<String>,
        output_col: impl Into<String>,
        splits: Vec<f64>,
    ) -> MlResult<Self> {
        if splits.len() < 3 {
            return Err(MlError::InvalidParameter(format!(
                "need at least 3 splits, got {}",
                splits.len()
            )));
        }
        if splits
            .windows(2)
            .any(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less))
        {
            return Err(MlError::InvalidParameter(format!(
                "splits must be strictly increasing: {splits:?}"
            )));
        }
        Ok(Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
            splits,
        })
    }

    pub fn splits(&self) -> &[f64] {
        &self.splits
    }

    pub fn bucket(&self, value: f64) -> MlResult<usize> {
        let last = self.splits.len() - 1;
        let out_of_range = || MlError::OutOfRange {
            column: self.input_col.clone(),
            value,
            lower: self.splits[0],
            upper: self.splits[last],
        };
        if value.is_nan() {
            return Err(out_of_range());
        }
        if value == self.splits[last] {
            return Ok(last - 1);
        }
        match self.splits.partition_point(|split| *split <= value) {
            0 => Err(out_of_range()),
            n if n > last => Err(out_of_range()),
            n => Ok(n - 1),
        }
    }
}

impl Transformer for Bucketizer {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let buckets = frame
            .numeric(&self.input_col)?
            .iter()
            .map(|value| self.bucket(*value).map(|b| b as f64))
            .collect::<MlResult<Vec<_>>>()?;
        frame
            .clone()
            .with_column(&self.output_col, Column::Numeric(buckets))
    }
}

/// Learns [`Bucketizer`] splits from the quantiles of a numeric column.
#[derive(Debug, Clone)]
pub struct QuantileDiscretizer {
    input_col: String,
    output_col: String,
    num_buckets: usize,
}

impl QuantileDiscretizer {
    pub fn new(
        input_col: impl Into<String>,
        output_col: impl Into<String>,
        num_buckets: usize,
    ) -> MlResult<Self> {
        if num_buckets < 2 {
            return Err(MlError::InvalidParameter(format!(
                "num_buckets must be at least 2, got {num_buckets}"
            )));
        }
        Ok(Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
            num_buckets,
        })
    }
}

/// The sample element of rank `ceil(i / buckets * n)` (1-based).
fn quantile(sorted: &[f64], i: usize, buckets: usize) -> f64 {
    let n = sorted.len();
    let rank = (i * n).div_ceil(buckets).clamp(1, n);
    sorted[rank - 1]
}

impl Estimator for QuantileDiscretizer {
    type Model = Bucketizer;

    fn fit(&self, frame: &FeatureFrame) -> MlResult<Bucketizer> {
        let mut sample: Vec<f64> = frame
            .numeric(&self.input_col)?
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();
        if sample.is_empty() {
            return Err(MlError::InvalidInput(format!(
                "column '{}' has no values to take quantiles from",
                self.input_col
            )));
        }
        sample.sort_by(f64::total_cmp);

        let mut splits = vec![f64::NEG_INFINITY];
        for i in 1..self.num_buckets {
            splits.push(quantile(&sample, i, self.num_buckets));
        }
        splits.push(f64::INFINITY);
        splits.dedup();
        debug!(column = %self.input_col, ?splits, "fitted quantile discretizer");
        Bucketizer::new(self.input_col.clone(), self.output_col.clone(), splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ages() -> FeatureFrame {
        FeatureFrame::new()
            .with_column("age", Column::Numeric(vec![22.0, 30.0, 35.0, 49.9, 50.0, 71.0]))
            .unwrap()
    }

    #[test]
    fn test_bucketizer_boundaries() {
        let bucketizer =
            Bucketizer::new("age", "bucket", vec![0.0, 30.0, 40.0, 50.0, f64::INFINITY]).unwrap();
        let out = bucketizer.transform(&ages()).unwrap();
        assert_eq!(
            out.numeric("bucket").unwrap(),
            &[0.0, 1.0, 1.0, 2.0, 3.0, 3.0]
        );
    }

    #[test]
    fn test_last_split_is_inclusive() {
        let bucketizer = Bucketizer::new("x", "b", vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(bucketizer.bucket(2.0).unwrap(), 1);
        assert!(matches!(bucketizer.bucket(2.5), Err(MlError::OutOfRange { .. })));
        assert!(matches!(bucketizer.bucket(-0.1), Err(MlError::OutOfRange { .. })));
        assert!(bucketizer.bucket(f64::NAN).is_err());
    }

    #[test]
    fn test_invalid_splits() {
        assert!(Bucketizer::new("x", "b", vec![0.0, 1.0]).is_err());
        assert!(Bucketizer::new("x", "b", vec![0.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_quantile_splits() {
        let frame = FeatureFrame::new()
            .with_column(
                "revenue",
                Column::Numeric(vec![90.0, 10.0, 50.0, 30.0, 70.0, 20.0]),
            )
            .unwrap();
        let model = QuantileDiscretizer::new("revenue", "bucket", 3)
            .unwrap()
            .fit(&frame)
            .unwrap();
        // sorted: 10 20 30 50 70 90; ranks ceil(2) and ceil(4)
        assert_eq!(
            model.splits(),
            &[f64::NEG_INFINITY, 20.0, 50.0, f64::INFINITY]
        );
        let out = model.transform(&frame).unwrap();
        assert_eq!(
            out.numeric("bucket").unwrap(),
            &[2.0, 0.0, 2.0, 1.0, 2.0, 1.0]
        );
    }

    #[test]
    fn test_quantile_dedups_splits() {
        let frame = FeatureFrame::new()
            .with_column("x", Column::Numeric(vec![5.0; 4]))
            .unwrap();
        let model = QuantileDiscretizer::new("x", "b", 4).unwrap().fit(&frame).unwrap();
        assert_eq!(model.splits(), &[f64::NEG_INFINITY, 5.0, f64::INFINITY]);
        assert!(QuantileDiscretizer::new("x", "b", 1).is_err());
    }
}
