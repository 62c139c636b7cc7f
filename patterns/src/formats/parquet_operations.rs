//! Parquet: self-describing columnar files with column pruning, predicate
//! pushdown and partition pruning.

use super::TOPIC;
use super::csv_json_operations::read_employees;
use crate::support::{banner, query, register_view, section};
use dalgo_common::output_path;
use dalgo_core::FlowContext;
use dalgo_sql::{SqlResult, print_schema, read_parquet, show, write_parquet};
use datafusion::dataframe::DataFrame;
use datafusion::functions_aggregate::expr_fn::{avg, count};
use datafusion::functions::math::expr_fn::round;
use datafusion::prelude::{SessionContext, col, lit};
use std::path::Path;

pub async fn write_and_read(ctx: &SessionContext, df: DataFrame, dir: &Path) -> SqlResult<DataFrame> {
    write_parquet(df, dir, &[]).await?;
    read_parquet(ctx, dir, &[]).await
}

/// Partition by `department` and read back only the `department` partition.
pub async fn department_partition(
    ctx: &SessionContext,
    df: DataFrame,
    dir: &Path,
    department: &str,
) -> SqlResult<DataFrame> {
    write_parquet(df, dir, &["department"]).await?;
    let partitioned = read_parquet(ctx, dir, &["department"]).await?;
    Ok(partitioned.filter(col("department").eq(lit(department)))?)
}

/// Headcount and average salary (2 dp) of employees aged 35 or more.
pub fn seniors_by_department(df: DataFrame) -> SqlResult<DataFrame> {
    Ok(df
        .filter(col("age").gt_eq(lit(35i64)))?
        .aggregate(
            vec![col("department")],
            vec![
                count(lit(1)).alias("senior_count"),
                avg(col("salary")).alias("avg_salary"),
            ],
        )?
        .with_column("avg_salary", round(vec![col("avg_salary"), lit(2)]))?
        .sort(vec![col("avg_salary").sort(false, false)])?)
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Parquet Operations: Columnar Storage for Analytics");
    let sql = ctx.sql();
    let employees = read_employees(sql).await?;
    println!("Source DataFrame:");
    show(&employees, 20).await?;

    let parquet_dir = output_path(TOPIC, "employees.parquet");
    section(&format!("1. Writing and reading Parquet at {}", parquet_dir.display()));
    let parquet = write_and_read(sql, employees.clone(), &parquet_dir).await?;
    show(&parquet, 20).await?;
    print_schema(&parquet);

    section("2. Column pruning (name, salary)");
    show(&parquet.clone().select_columns(&["name", "salary"])?, 20).await?;

    section("3. Predicate pushdown (salary > 90000)");
    show(&parquet.clone().filter(col("salary").gt(lit(90000i64)))?, 20).await?;

    let by_dept = output_path(TOPIC, "employees_by_dept.parquet");
    section(&format!("4. Partition by department into {}", by_dept.display()));
    let engineering = department_partition(sql, employees, &by_dept, "Engineering").await?;
    println!("Only the department=Engineering directory is scanned:");
    show(&engineering, 20).await?;

    section("5. SQL on Parquet");
    register_view(sql, "emp_parquet", parquet.clone())?;
    let summary = query(
        sql,
        "SELECT department, COUNT(*) AS headcount, ROUND(AVG(salary)) AS avg_salary, \
         MAX(salary) AS max_salary FROM emp_parquet \
         GROUP BY department ORDER BY avg_salary DESC",
    )
    .await?;
    show(&summary, 20).await?;

    section("6. Aggregation with pruning and pushdown (age >= 35)");
    show(&seniors_by_department(parquet)?, 20).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_sql::collect_rows;

    #[tokio::test]
    async fn test_round_trip_and_pushdown() {
        let ctx = SessionContext::new();
        let dir = tempfile::tempdir().unwrap();
        let employees = read_employees(&ctx).await.unwrap();
        let parquet = write_and_read(&ctx, employees, &dir.path().join("emp"))
            .await
            .unwrap();
        assert_eq!(parquet.clone().count().await.unwrap(), 10);
        let high = parquet.filter(col("salary").gt(lit(90000i64))).unwrap();
        assert_eq!(high.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_partition_pruning_reads_one_department() {
        let ctx = SessionContext::new();
        let dir = tempfile::tempdir().unwrap();
        let employees = read_employees(&ctx).await.unwrap();
        let engineering = department_partition(&ctx, employees, &dir.path().join("dept"), "Engineering")
            .await
            .unwrap();
        assert_eq!(engineering.count().await.unwrap(), 4);
        assert_eq!(
            dalgo_sql::list_partitions(dir.path().join("dept")).unwrap(),
            vec![
                "department=Engineering",
                "department=Finance",
                "department=Marketing"
            ]
        );
    }

    #[tokio::test]
    async fn test_seniors_by_department() {
        let ctx = SessionContext::new();
        let employees = read_employees(&ctx).await.unwrap();
        let rows = collect_rows(seniors_by_department(employees).unwrap())
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Engineering", "2", "112500.0"],
                vec!["Finance", "2", "88500.0"],
                vec!["Marketing", "2", "76000.0"],
            ]
        );
    }
}
