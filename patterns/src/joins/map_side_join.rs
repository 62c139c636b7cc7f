//! Map-side (broadcast) join: the small dimension table is shared with every
//! task and looked up while mapping over the fact table, so no shuffle runs.

use super::TOPIC;
use crate::support::{banner, query, read_csv_file, register_view, section, sorted};
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd};
use dalgo_sql::{extract_column, register_lookup_udf, show};
use datafusion::dataframe::DataFrame;
use datafusion::prelude::SessionContext;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

pub const UNKNOWN: &str = "UNKNOWN";

/// `dept_id -> (dept_name, location)`.
pub type Departments = HashMap<i64, (String, String)>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Employee {
    pub emp_id: i64,
    pub name: String,
    pub salary: i64,
    pub dept_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeWithDepartment {
    pub emp_id: i64,
    pub name: String,
    pub salary: i64,
    pub dept_name: String,
    pub location: String,
}

pub async fn load_departments(ctx: &FlowContext) -> anyhow::Result<(DataFrame, Departments)> {
    let df = read_csv_file(ctx, data_path(TOPIC, "departments.csv")).await?;
    let batches = df
        .clone()
        .select_columns(&["dept_id", "dept_name", "location"])?
        .collect()
        .await?;
    let ids: Vec<i64> = extract_column(&batches, 0)?;
    let names: Vec<String> = extract_column(&batches, 1)?;
    let locations: Vec<String> = extract_column(&batches, 2)?;
    let departments = ids
        .into_iter()
        .zip(names.into_iter().zip(locations))
        .collect();
    Ok((df, departments))
}

pub async fn load_employees(ctx: &FlowContext) -> anyhow::Result<(DataFrame, Vec<Employee>)> {
    let df = read_csv_file(ctx, data_path(TOPIC, "employees_dept.csv")).await?;
    let batches = df
        .clone()
        .select_columns(&["emp_id", "name", "salary", "dept_id"])?
        .collect()
        .await?;
    let ids: Vec<i64> = extract_column(&batches, 0)?;
    let names: Vec<String> = extract_column(&batches, 1)?;
    let salaries: Vec<i64> = extract_column(&batches, 2)?;
    let dept_ids: Vec<i64> = extract_column(&batches, 3)?;
    let employees = ids
        .into_iter()
        .zip(names)
        .zip(salaries.into_iter().zip(dept_ids))
        .map(|((emp_id, name), (salary, dept_id))| Employee {
            emp_id,
            name,
            salary,
            dept_id,
        })
        .collect();
    Ok((df, employees))
}

/// Look every employee's department up in a broadcast copy of
/// `departments`; unknown ids map to `UNKNOWN`.
pub fn rdd_map_side_join(
    ctx: &FlowContext,
    employees: &FlowRdd<Employee>,
    departments: Departments,
) -> FlowRdd<EmployeeWithDepartment> {
    let departments = ctx.broadcast(departments);
    employees.map(move |e| {
        let (dept_name, location) = departments
            .value()
            .get(&e.dept_id)
            .cloned()
            .unwrap_or_else(|| (UNKNOWN.to_string(), UNKNOWN.to_string()));
        EmployeeWithDepartment {
            emp_id: e.emp_id,
            name: e.name,
            salary: e.salary,
            dept_name,
            location,
        }
    })
}

/// Register `dept_name(id)` and `dept_location(id)` lookup UDFs backed by
/// `departments`.
pub fn register_department_udfs(ctx: &SessionContext, departments: &Departments) -> anyhow::Result<()> {
    let names = departments
        .iter()
        .map(|(id, (name, _))| (*id, name.clone()))
        .collect();
    let locations = departments
        .iter()
        .map(|(id, (_, location))| (*id, location.clone()))
        .collect();
    register_lookup_udf(ctx, "dept_name", names, UNKNOWN)?;
    register_lookup_udf(ctx, "dept_location", locations, UNKNOWN)?;
    debug!(entries = departments.len(), "registered department lookups");
    Ok(())
}

/// Fact rows enriched through the lookup UDFs.
pub async fn df_map_side_join(
    ctx: &SessionContext,
    employees: DataFrame,
    departments: &Departments,
) -> anyhow::Result<DataFrame> {
    register_department_udfs(ctx, departments)?;
    register_view(ctx, "employees", employees)?;
    query(
        ctx,
        "SELECT emp_id, name, salary, dept_id, \
                dept_name(dept_id) AS dept_name, dept_location(dept_id) AS location \
         FROM employees ORDER BY emp_id",
    )
    .await
}

/// The engine's own inner join; employees without a department drop out.
pub async fn engine_join(
    ctx: &SessionContext,
    employees: DataFrame,
    departments: DataFrame,
) -> anyhow::Result<DataFrame> {
    register_view(ctx, "employees", employees)?;
    register_view(ctx, "departments", departments)?;
    query(
        ctx,
        "SELECT e.emp_id, e.name, e.salary, e.dept_id, d.dept_name, d.location \
         FROM employees e JOIN departments d ON e.dept_id = d.dept_id \
         ORDER BY e.emp_id",
    )
    .await
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Map-Side Join (Broadcast Join)");
    let (dept_df, departments) = load_departments(ctx).await?;
    println!("Dimension table (departments, broadcast to every task):");
    show(&dept_df, 20).await?;
    let (emp_df, employees) = load_employees(ctx).await?;
    println!("Fact table (employees):");
    show(&emp_df, 20).await?;

    section("RDD map-side join (broadcast map)");
    let fact = ctx.parallelize(employees);
    println!("Result (emp_id, name, salary, dept_name, location):");
    for e in sorted(rdd_map_side_join(ctx, &fact, departments.clone()).collect()?) {
        println!(
            "  ({}, {}, {}, {}, {})",
            e.emp_id, e.name, e.salary, e.dept_name, e.location
        );
    }
    println!();

    section("DataFrame map-side join (lookup UDFs)");
    show(&df_map_side_join(ctx.sql(), emp_df.clone(), &departments).await?, 20).await?;

    section("engine join (for comparison)");
    show(&engine_join(ctx.sql(), emp_df, dept_df).await?, 20).await?;
    Ok(())
}
