//! Integration tests for DataFrame readers and writers

use dalgo_sql::{
    CsvSource, collect_rows, list_partitions, read_csv, read_json, read_parquet, write_csv,
    write_json, write_parquet,
};
use datafusion::prelude::SessionContext;

const TRANSACTIONS: &str = "\
id,year,month,amount
1,2024,9,10.5
2,2024,9,20.0
3,2024,10,5.25
4,2023,12,7.75
";

fn write_source(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("transactions.csv");
    std::fs::write(&path, TRANSACTIONS).unwrap();
    path
}

#[tokio::test]
async fn test_headerless_csv_uses_positional_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.csv");
    std::fs::write(&path, "alex,3\njane,5\n").unwrap();

    let ctx = SessionContext::new();
    let df = read_csv(&ctx, &path, &CsvSource::headerless()).await.unwrap();
    let names: Vec<String> = df
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    assert_eq!(names, vec!["column_1", "column_2"]);
}

#[tokio::test]
async fn test_missing_input_is_io_error() {
    let ctx = SessionContext::new();
    let result = read_csv(&ctx, "/no/such/file.csv", &CsvSource::default()).await;
    assert!(matches!(result, Err(dalgo_sql::SqlError::Io(_))));
}

#[tokio::test]
async fn test_partitioned_parquet_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let out = dir.path().join("parquet");

    let ctx = SessionContext::new();
    let df = read_csv(&ctx, &source, &CsvSource::default()).await.unwrap();
    write_parquet(df, &out, &["year", "month"]).await.unwrap();

    assert_eq!(
        list_partitions(&out).unwrap(),
        vec!["year=2023/month=12", "year=2024/month=10", "year=2024/month=9"]
    );

    let back = read_parquet(&ctx, &out, &["year", "month"]).await.unwrap();
    let rows = collect_rows(
        back.filter(
            datafusion::prelude::col("year")
                .eq(datafusion::prelude::lit("2024"))
                .and(datafusion::prelude::col("month").eq(datafusion::prelude::lit("9"))),
        )
        .unwrap()
        .select_columns(&["id"])
        .unwrap()
        .sort(vec![datafusion::prelude::col("id").sort(true, false)])
        .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(rows, vec![vec!["1"], vec!["2"]]);
}

#[tokio::test]
async fn test_upper_case_numeric_partition_column() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let out = dir.path().join("by_year");

    let ctx = SessionContext::new();
    let df = read_csv(&ctx, &source, &CsvSource::default())
        .await
        .unwrap()
        .with_column_renamed("year", "YEAR")
        .unwrap();
    write_parquet(df, &out, &["YEAR"]).await.unwrap();
    assert_eq!(list_partitions(&out).unwrap(), vec!["YEAR=2023", "YEAR=2024"]);

    let back = read_parquet(&ctx, &out, &["YEAR"]).await.unwrap();
    let recent = back
        .filter(datafusion::prelude::ident("YEAR").eq(datafusion::prelude::lit("2024")))
        .unwrap();
    assert_eq!(recent.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_csv_and_json_writers_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path());
    let csv_out = dir.path().join("csv");
    let json_out = dir.path().join("json");

    let ctx = SessionContext::new();
    for _ in 0..2 {
        let df = read_csv(&ctx, &source, &CsvSource::default()).await.unwrap();
        write_csv(df, &csv_out, true, b'|', &[]).await.unwrap();
    }
    let back = read_csv(&ctx, &csv_out, &CsvSource::default().with_delimiter(b'|'))
        .await
        .unwrap();
    assert_eq!(back.count().await.unwrap(), 4);

    let df = read_csv(&ctx, &source, &CsvSource::default()).await.unwrap();
    write_json(df, &json_out).await.unwrap();
    let back = read_json(&ctx, &json_out).await.unwrap();
    assert_eq!(back.count().await.unwrap(), 4);
}
