//! Numeric feature transformations: min-max scaling, unit-norm rows,
//! fixed and quantile bucketing, and log transforms.

use super::{TOPIC, load_frame, show_frame};
use crate::support::{banner, query, read_csv_file, register_view, section};
use dalgo_common::data_path;
use dalgo_core::FlowContext;
use dalgo_mllib_local::{
    Bucketizer, Column, Estimator, FeatureFrame, MinMaxScaler, MlResult, Normalizer, Pipeline,
    PipelineStage, QuantileDiscretizer, Transformer, VectorAssembler,
};
use dalgo_sql::show;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::SessionContext;

pub const SCALED_COLUMNS: [&str; 2] = ["revenue", "num_of_days"];
pub const NORMALIZED_COLUMNS: [&str; 3] = ["revenue", "num_of_days", "age"];
pub const AGE_SPLITS: [f64; 5] = [0.0, 30.0, 40.0, 50.0, f64::INFINITY];
pub const REVENUE_BUCKETS: usize = 3;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Scale each of `columns` to `[0, 1]` on its own, adding
/// `<column>_scaled` rounded to four decimals.
pub fn min_max_scale(frame: &FeatureFrame, columns: &[&str]) -> MlResult<FeatureFrame> {
    let mut scaled = frame.clone();
    for column in columns {
        let vec_col = format!("{column}_vec");
        let scaled_vec_col = format!("{column}_scaled_vec");
        let pipeline = Pipeline::new(vec![
            PipelineStage::transformer(VectorAssembler::new(&[*column], &vec_col)),
            PipelineStage::estimator(MinMaxScaler::new(&vec_col, &scaled_vec_col)),
        ]);
        let transformed = pipeline.fit(&scaled)?.transform(&scaled)?;
        let values = transformed
            .vectors(&scaled_vec_col)?
            .iter()
            .map(|v| round4(v.get(0)))
            .collect();
        scaled = scaled.with_column(format!("{column}_scaled"), Column::Numeric(values))?;
    }
    Ok(scaled)
}

/// Assemble `NORMALIZED_COLUMNS` into `features` and add its L1 and L2
/// normalized forms.
pub fn normalize(frame: &FeatureFrame) -> MlResult<FeatureFrame> {
    let assembled = VectorAssembler::new(&NORMALIZED_COLUMNS, "features").transform(frame)?;
    let l1 = Normalizer::new("features", "features_L1", 1.0)?.transform(&assembled)?;
    Normalizer::new("features", "features_L2", 2.0)?.transform(&l1)
}

pub fn bucketize_age(frame: &FeatureFrame) -> MlResult<FeatureFrame> {
    Bucketizer::new("age", "age_bucket", AGE_SPLITS.to_vec())?.transform(frame)
}

/// Revenue split into quantile buckets; returns the learned splits too.
pub fn discretize_revenue(frame: &FeatureFrame) -> MlResult<(Vec<f64>, FeatureFrame)> {
    let bucketizer =
        QuantileDiscretizer::new("revenue", "revenue_bucket", REVENUE_BUCKETS)?.fit(frame)?;
    let discretized = bucketizer.transform(frame)?;
    Ok((bucketizer.splits().to_vec(), discretized))
}

pub async fn log_transform(ctx: &SessionContext, customers: DataFrame) -> anyhow::Result<DataFrame> {
    register_view(ctx, "customers", customers)?;
    query(
        ctx,
        "SELECT user_id, revenue, \
                ln(CAST(revenue AS DOUBLE)) AS log_revenue, \
                log10(CAST(revenue AS DOUBLE)) AS log10_revenue \
         FROM customers",
    )
    .await
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Numeric Feature Transformations");
    let customers = load_frame(ctx, "customers.csv").await?;

    section("MinMaxScaler (scale to [0, 1])");
    println!("Before scaling:");
    show_frame(ctx, &customers, &customers.column_names(), 20).await?;
    let scaled = min_max_scale(&customers, &SCALED_COLUMNS)?;
    println!("After MinMax scaling:");
    show_frame(ctx, &scaled, &scaled.column_names(), 20).await?;

    section("Normalizer (unit norm)");
    let normalized = normalize(&customers)?;
    println!("Features with L1 and L2 normalized vectors:");
    show_frame(
        ctx,
        &normalized,
        &["user_id", "features", "features_L1", "features_L2"],
        20,
    )
    .await?;

    section("Bucketizer (user-defined bins)");
    println!("Age buckets (0-30, 30-40, 40-50, 50+):");
    show_frame(ctx, &bucketize_age(&customers)?, &["user_id", "age", "age_bucket"], 20).await?;

    section("QuantileDiscretizer (bins from quantiles)");
    let (splits, discretized) = discretize_revenue(&customers)?;
    println!("Revenue quantile bins ({REVENUE_BUCKETS} buckets, splits {splits:?}):");
    show_frame(ctx, &discretized, &["user_id", "revenue", "revenue_bucket"], 20).await?;

    section("log transformation");
    let df = read_csv_file(ctx, data_path(TOPIC, "customers.csv")).await?;
    println!("Revenue with log transformations:");
    show(&log_transform(ctx.sql(), df).await?, 20).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;
    use dalgo_sql::extract_column;

    async fn customers() -> FeatureFrame {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        load_frame(&ctx, "customers.csv").await.unwrap()
    }

    #[tokio::test]
    async fn test_min_max_scaling_per_column() {
        let scaled = min_max_scale(&customers().await, &SCALED_COLUMNS).unwrap();
        assert_eq!(
            scaled.numeric("revenue_scaled").unwrap(),
            &[0.0947, 0.5368, 0.0, 1.0, 0.2316, 0.0474]
        );
        assert_eq!(scaled.numeric("num_of_days_scaled").unwrap()[3], 1.0);
        assert_eq!(scaled.numeric("num_of_days_scaled").unwrap()[0], 0.1228);
    }

    #[tokio::test]
    async fn test_normalized_rows_have_unit_norm() {
        let normalized = normalize(&customers().await).unwrap();
        for v in normalized.vectors("features_L1").unwrap() {
            assert!((v.norm(1.0) - 1.0).abs() < 1e-12);
        }
        for v in normalized.vectors("features_L2").unwrap() {
            assert!((v.norm(2.0) - 1.0).abs() < 1e-12);
        }
        let first = &normalized.vectors("features_L1").unwrap()[0];
        assert!((first.get(0) - 1200.0 / 1235.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_bucketing() {
        let customers = customers().await;
        let bucketed = bucketize_age(&customers).unwrap();
        assert_eq!(
            bucketed.numeric("age_bucket").unwrap(),
            &[0.0, 1.0, 3.0, 2.0, 0.0, 3.0]
        );

        let (splits, discretized) = discretize_revenue(&customers).unwrap();
        assert_eq!(splits, vec![f64::NEG_INFINITY, 750.0, 2500.0, f64::INFINITY]);
        assert_eq!(
            discretized.numeric("revenue_bucket").unwrap(),
            &[1.0, 2.0, 0.0, 2.0, 2.0, 1.0]
        );
    }

    #[tokio::test]
    async fn test_log_columns() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let df = read_csv_file(&ctx, data_path(TOPIC, "customers.csv")).await.unwrap();
        let batches = log_transform(ctx.sql(), df)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        let ln: Vec<f64> = extract_column(&batches, 2).unwrap();
        let log10: Vec<f64> = extract_column(&batches, 3).unwrap();
        assert!((ln[0] - 1200f64.ln()).abs() < 1e-9);
        assert!((log10[3] - 9800f64.log10()).abs() < 1e-9);
    }
}
