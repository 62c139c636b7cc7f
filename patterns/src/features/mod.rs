//! Feature engineering with the local transformers: categorical encoding,
//! numeric scaling and bucketing, and text vectorization.

pub mod categorical_encoding;
pub mod feature_transformations;
pub mod text_features;

use crate::support::read_csv_file;
use dalgo_common::data_path;
use dalgo_core::FlowContext;
use dalgo_mllib_local::FeatureFrame;
use dalgo_sql::show;

pub const TOPIC: &str = "features";

/// Read `data/features/<file>` through DataFusion into a feature frame.
pub async fn load_frame(ctx: &FlowContext, file: &str) -> anyhow::Result<FeatureFrame> {
    let batches = read_csv_file(ctx, data_path(TOPIC, file))
        .await?
        .collect()
        .await?;
    Ok(FeatureFrame::from_batches(&batches)?)
}

/// Print the first `n` rows of `columns`; vectors render in their
/// `(size,[indices],[values])` or `[values]` form.
pub async fn show_frame(
    ctx: &FlowContext,
    frame: &FeatureFrame,
    columns: &[&str],
    n: usize,
) -> anyhow::Result<()> {
    let batch = frame.select(columns)?.to_record_batch()?;
    show(&ctx.sql().read_batch(batch)?, n).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[tokio::test]
    async fn test_load_frame_types_columns() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let cars = load_frame(&ctx, "cars.csv").await.unwrap();
        assert_eq!(cars.num_rows(), 6);
        assert_eq!(
            cars.column_names(),
            vec!["id", "brand", "price", "safety_level", "engine_type"]
        );
        assert_eq!(cars.numeric("price").unwrap()[1], 45000.0);
        assert_eq!(cars.strings("brand").unwrap()[0], "Toyota");
    }
}
