//! Dalgo MLlib Local - single-machine feature transformers
//!
//! Transformers and estimators operate on an in-memory [`FeatureFrame`] of
//! named columns and can be chained with a [`Pipeline`]. Frames convert to
//! and from Arrow record batches so they can be displayed next to
//! DataFusion results.

pub mod error;
pub mod feature;
pub mod frame;
pub mod linalg;
pub mod pipeline;

pub use error::{MlError, MlResult};
pub use feature::*;
pub use frame::{Column, FeatureFrame};
pub use linalg::Vector;
pub use pipeline::{Estimator, FitStage, Pipeline, PipelineModel, PipelineStage, Transformer};
