//! Creating a DataFrame from records, then filtering, projecting, adding a
//! column and grouping.

use crate::basics::{Person, load_people};
use crate::support::{banner, section};
use dalgo_core::FlowContext;
use dalgo_sql::{SqlResult, create_dataframe, print_schema, show};
use datafusion::arrow::datatypes::DataType;
use datafusion::dataframe::DataFrame;
use datafusion::functions_aggregate::expr_fn::avg;
use datafusion::prelude::{SessionContext, col, lit};
use datafusion::scalar::ScalarValue;

/// Columns `name`, `city` and `age`.
pub fn people_frame(ctx: &SessionContext, people: &[Person]) -> SqlResult<DataFrame> {
    let rows = people
        .iter()
        .map(|p| {
            vec![
                ScalarValue::Utf8(Some(p.name.clone())),
                ScalarValue::Utf8(Some(p.city.clone())),
                ScalarValue::Int64(Some(p.value)),
            ]
        })
        .collect();
    create_dataframe(
        ctx,
        &[
            ("name", DataType::Utf8),
            ("city", DataType::Utf8),
            ("age", DataType::Int64),
        ],
        rows,
    )
}

pub fn older_than(df: DataFrame, age: i64) -> SqlResult<DataFrame> {
    Ok(df.filter(col("age").gt(lit(age)))?)
}

pub fn city_contains(df: DataFrame, needle: &str) -> SqlResult<DataFrame> {
    Ok(df.filter(col("city").like(lit(format!("%{needle}%"))))?)
}

pub fn with_age_in_10_years(df: DataFrame) -> SqlResult<DataFrame> {
    Ok(df.with_column("age_in_10_years", col("age") + lit(10i64))?)
}

pub fn average_age_by_name(df: DataFrame) -> SqlResult<DataFrame> {
    Ok(df
        .aggregate(vec![col("name")], vec![avg(col("age")).alias("avg(age)")])?
        .sort(vec![col("name").sort(true, false)])?)
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("DataFrame Basics");
    let df = people_frame(ctx.sql(), &load_people()?)?;

    println!("Original DataFrame:");
    show(&df, 20).await?;
    print_schema(&df);
    println!();

    section("filter: age > 50");
    show(&older_than(df.clone(), 50)?, 20).await?;
    section("filter: city contains 'me'");
    show(&city_contains(df.clone(), "me")?, 20).await?;
    section("select name and age");
    show(&df.clone().select_columns(&["name", "age"])?, 20).await?;
    section("withColumn age_in_10_years");
    show(&with_age_in_10_years(df.clone())?, 20).await?;
    section("average age by name");
    show(&average_age_by_name(df)?, 20).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_sql::collect_rows;

    fn people() -> DataFrame {
        people_frame(&SessionContext::new(), &load_people().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_filters() {
        assert_eq!(older_than(people(), 50).unwrap().count().await.unwrap(), 3);
        let ames = collect_rows(city_contains(people(), "me").unwrap().select_columns(&["city"]).unwrap())
            .await
            .unwrap();
        assert_eq!(ames.len(), 3);
        assert!(ames.iter().all(|row| row[0] == "Ames"));
    }

    #[tokio::test]
    async fn test_with_column_and_grouping() {
        let rows = collect_rows(with_age_in_10_years(people()).unwrap()).await.unwrap();
        assert_eq!(rows[0], vec!["alex", "Ames", "20", "30"]);

        let averages = collect_rows(average_age_by_name(people()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            averages,
            vec![
                vec!["alex", "30.0"],
                vec!["jane", "50.0"],
                vec!["jeff", "50.0"],
                vec!["mary", "45.0"],
            ]
        );
    }
}
