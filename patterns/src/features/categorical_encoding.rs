//! Turning categorical columns into numbers: label indices, one-hot vectors
//! and a single assembled feature vector.

use super::{load_frame, show_frame};
use crate::support::{banner, section};
use dalgo_core::FlowContext;
use dalgo_mllib_local::{
    Estimator, FeatureFrame, MlResult, OneHotEncoder, Pipeline, PipelineModel, PipelineStage,
    StringIndexer, StringIndexerModel, Transformer, VectorAssembler,
};

pub const CATEGORICAL_COLUMNS: [&str; 3] = ["safety_level", "engine_type", "brand"];

pub fn index_safety(cars: &FeatureFrame) -> MlResult<(StringIndexerModel, FeatureFrame)> {
    let model = StringIndexer::new("safety_level", "safety_index").fit(cars)?;
    let indexed = model.transform(cars)?;
    Ok((model, indexed))
}

/// One indexer per column, writing `<column>_index`.
pub fn index_columns(cars: &FeatureFrame, columns: &[&str]) -> MlResult<FeatureFrame> {
    let stages = columns
        .iter()
        .map(|column| PipelineStage::estimator(StringIndexer::new(*column, format!("{column}_index"))))
        .collect();
    Pipeline::new(stages).fit(cars)?.transform(cars)
}

fn encoding_stages() -> Vec<PipelineStage> {
    vec![
        PipelineStage::estimator(StringIndexer::new("safety_level", "safety_index")),
        PipelineStage::estimator(StringIndexer::new("engine_type", "engine_index")),
        PipelineStage::estimator(OneHotEncoder::new("safety_index", "safety_vec")),
        PipelineStage::estimator(OneHotEncoder::new("engine_index", "engine_vec")),
    ]
}

pub fn one_hot_encode(cars: &FeatureFrame) -> MlResult<FeatureFrame> {
    Pipeline::new(encoding_stages()).fit(cars)?.transform(cars)
}

/// Index, one-hot encode, then assemble `price` with both encodings into
/// `features`.
pub fn feature_pipeline(cars: &FeatureFrame) -> MlResult<PipelineModel> {
    let mut stages = encoding_stages();
    stages.push(PipelineStage::transformer(VectorAssembler::new(
        &["price", "safety_vec", "engine_vec"],
        "features",
    )));
    Pipeline::new(stages).fit(cars)
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Categorical Feature Encoding");
    let cars = load_frame(ctx, "cars.csv").await?;

    section("StringIndexer");
    println!("Original data:");
    show_frame(ctx, &cars, &cars.column_names(), 20).await?;
    let (model, indexed) = index_safety(&cars)?;
    println!("Labels by frequency: {:?}", model.labels());
    println!("After StringIndexer (safety_level -> safety_index):");
    show_frame(ctx, &indexed, &["id", "safety_level", "safety_index"], 20).await?;

    let multi = index_columns(&cars, &CATEGORICAL_COLUMNS)?;
    println!("Multi-column StringIndexer:");
    show_frame(
        ctx,
        &multi,
        &[
            "id",
            "brand",
            "brand_index",
            "safety_level",
            "safety_level_index",
            "engine_type",
            "engine_type_index",
        ],
        20,
    )
    .await?;

    section("OneHotEncoder");
    let encoded = one_hot_encode(&cars)?;
    show_frame(
        ctx,
        &encoded,
        &[
            "id",
            "safety_level",
            "safety_index",
            "safety_vec",
            "engine_type",
            "engine_index",
            "engine_vec",
        ],
        20,
    )
    .await?;

    section("Full pipeline: StringIndexer -> OneHotEncoder -> VectorAssembler");
    let result = feature_pipeline(&cars)?.transform(&cars)?;
    println!("Feature vectors (price + safety one-hot + engine one-hot):");
    show_frame(
        ctx,
        &result,
        &["id", "brand", "price", "safety_level", "engine_type", "features"],
        20,
    )
    .await
}
