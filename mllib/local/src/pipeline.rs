//! Transformer and estimator traits, and pipelines that chain them.

use crate::error::MlResult;
use crate::frame::FeatureFrame;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Maps one frame to another, usually by appending an output column.
pub trait Transformer: Send + Sync + Debug {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame>;
}

/// Learns a [`Transformer`] from a frame.
pub trait Estimator: Send + Sync + Debug {
    type Model: Transformer + 'static;

    fn fit(&self, frame: &FeatureFrame) -> MlResult<Self::Model>;
}

/// Object-safe view of an [`Estimator`] used inside pipelines.
pub trait FitStage: Send + Sync + Debug {
    fn fit_stage(&self, frame: &FeatureFrame) -> MlResult<Arc<dyn Transformer>>;
}

impl<E: Estimator> FitStage for E {
    fn fit_stage(&self, frame: &FeatureFrame) -> MlResult<Arc<dyn Transformer>> {
        Ok(Arc::new(self.fit(frame)?))
    }
}

#[derive(Debug)]
pub enum PipelineStage {
    Estimator(Box<dyn FitStage>),
    Transformer(Arc<dyn Transformer>),
}

impl PipelineStage {
    pub fn estimator<E: Estimator + 'static>(estimator: E) -> Self {
        PipelineStage::Estimator(Box::new(estimator))
    }

    pub fn transformer<T: Transformer + 'static>(transformer: T) -> Self {
        PipelineStage::Transformer(Arc::new(transformer))
    }
}

/// Ordered stages; fitting runs each estimator on the output of the
/// stages before it.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn new(stages: Vec<PipelineStage>) -> Self {
        Self { stages }
    }

    pub fn fit(&self, frame: &FeatureFrame) -> MlResult<PipelineModel> {
        let mut current = frame.clone();
        let mut fitted = Vec::with_capacity(self.stages.len());
        for (index, stage) in self.stages.iter().enumerate() {
            let transformer = match stage {
                PipelineStage::Estimator(estimator) => estimator.fit_stage(&current)?,
                PipelineStage::Transformer(transformer) => Arc::clone(transformer),
            };
            if index + 1 < self.stages.len() {
                current = transformer.transform(&current)?;
            }
            debug!(stage = index, ?transformer, "pipeline stage fitted");
            fitted.push(transformer);
        }
        Ok(PipelineModel { stages: fitted })
    }
}

/// A fitted pipeline: every stage is a transformer.
#[derive(Debug, Clone)]
pub struct PipelineModel {
    stages: Vec<Arc<dyn Transformer>>,
}

impl PipelineModel {
    pub fn stages(&self) -> &[Arc<dyn Transformer>] {
        &self.stages
    }
}

impl Transformer for PipelineModel {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let mut current = frame.clone();
        for stage in &self.stages {
            current = stage.transform(&current)?;
        }
        Ok(current)
    }
}
