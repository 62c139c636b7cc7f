//! Printing and loading helpers shared by the examples.

use dalgo_common::{data_path, load_csv_as_tuples};
use dalgo_core::{FlowContext, FlowRdd, ShuffleMetrics};
use dalgo_sql::{CsvSource, read_csv};
use datafusion::dataframe::DataFrame;
use datafusion::prelude::SessionContext;
use std::path::Path;
use tracing::warn;

const RULE_WIDTH: usize = 60;

/// Example title framed by rules.
pub fn banner(title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{rule}\n{title}\n{rule}\n");
}

pub fn section(title: &str) {
    println!("--- {title} ---\n");
}

/// Load `data/<topic>/<file>` skipping its header; rows `parse` rejects are
/// dropped with a warning.
pub fn load_records<T, F>(topic: &str, file: &str, parse: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(&[String]) -> Option<T>,
{
    let path = data_path(topic, file);
    let rows = load_csv_as_tuples(&path, |row| (parse(&row), row), true)?;
    let mut records = Vec::with_capacity(rows.len());
    for (record, row) in rows {
        match record {
            Some(record) => records.push(record),
            None => warn!(file, ?row, "skipping malformed row"),
        }
    }
    Ok(records)
}

/// Lines of `data/<topic>/<file>` without the first (header) line.
pub fn lines_without_header(
    ctx: &FlowContext,
    topic: &str,
    file: &str,
    min_partitions: usize,
) -> anyhow::Result<FlowRdd<String>> {
    let lines = ctx.text_file(data_path(topic, file), min_partitions)?;
    let header = lines.first()?.unwrap_or_default();
    Ok(lines.filter(move |line| *line != header))
}

/// Read a headered CSV file through DataFusion with an inferred schema.
pub async fn read_csv_file(ctx: &FlowContext, path: impl AsRef<Path>) -> anyhow::Result<DataFrame> {
    Ok(read_csv(ctx.sql(), path, &CsvSource::default()).await?)
}

/// Register `df` as the SQL table `name`, replacing any earlier table of
/// that name.
pub fn register_view(ctx: &SessionContext, name: &str, df: DataFrame) -> anyhow::Result<()> {
    ctx.deregister_table(name)?;
    ctx.register_table(name, df.into_view())?;
    Ok(())
}

/// Run `sql` against the tables registered on `ctx`.
pub async fn query(ctx: &SessionContext, sql: &str) -> anyhow::Result<DataFrame> {
    Ok(ctx.sql(sql).await?)
}

/// Round to two decimals, halves to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn sorted<T: Ord>(mut items: Vec<T>) -> Vec<T> {
    items.sort();
    items
}

/// Sort pairs by key when the keys are only `PartialOrd`.
pub fn sorted_by_key<K: PartialOrd, V>(mut items: Vec<(K, V)>) -> Vec<(K, V)> {
    items.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    items
}

/// Shuffle traffic caused by `f`.
pub fn measure_shuffle<R>(
    ctx: &FlowContext,
    f: impl FnOnce() -> anyhow::Result<R>,
) -> anyhow::Result<(R, ShuffleMetrics)> {
    let before = ctx.shuffle_metrics();
    let result = f()?;
    Ok((result, ctx.shuffle_metrics().since(&before)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.675000001), 2.68);
        assert_eq!(round2(-1.005), -1.0);
        // halves go to the even neighbour
        assert_eq!(round2(4.125), 4.12);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn test_sorted_by_key_handles_floats() {
        let items = vec![(2.5, "b"), (-1.0, "a"), (10.0, "c")];
        assert_eq!(
            sorted_by_key(items),
            vec![(-1.0, "a"), (2.5, "b"), (10.0, "c")]
        );
    }
}
