//! Six classic data design patterns over a small employee file: map,
//! filter, map-reduce, reduce-side join, combiner correctness and
//! partition-level summarization.

use super::TOPIC;
use crate::support::{banner, lines_without_header, round2, section, sorted_by_key};
use dalgo_core::{FlowContext, FlowRdd};
use dalgo_sql::{SqlResult, create_dataframe, show};
use datafusion::arrow::datatypes::DataType;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::{SessionContext, col, lit};
use datafusion::scalar::ScalarValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIN_SALARY: i64 = 60_000;

const FEMALE_CODES: [&str; 3] = ["0", "f", "female"];
const MALE_CODES: [&str; 3] = ["1", "m", "male"];

pub const AGE_BRACKETS: [(u32, u32, &str); 5] = [
    (0, 25, "0-25"),
    (26, 35, "26-35"),
    (36, 45, "36-45"),
    (46, 55, "46-55"),
    (56, 100, "56-100"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub gender: String,
    pub age: u32,
    pub salary: i64,
}

pub fn normalize_gender(raw: &str) -> &'static str {
    let lowered = raw.trim().to_lowercase();
    if FEMALE_CODES.contains(&lowered.as_str()) {
        "female"
    } else if MALE_CODES.contains(&lowered.as_str()) {
        "male"
    } else {
        "unknown"
    }
}

/// `name,gender,age,salary` with the gender normalized.
pub fn parse_employee(line: &str) -> Option<Employee> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [name, gender, age, salary] = fields.as_slice() else {
        return None;
    };
    Some(Employee {
        name: name.to_string(),
        gender: normalize_gender(gender).to_string(),
        age: age.parse().ok()?,
        salary: salary.parse().ok()?,
    })
}

pub fn age_group(age: u32) -> &'static str {
    AGE_BRACKETS
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&age))
        .map_or("unknown", |(_, _, label)| label)
}

/// Input-Map-Output.
pub fn load_employees(ctx: &FlowContext) -> anyhow::Result<FlowRdd<Employee>> {
    Ok(lines_without_header(ctx, TOPIC, "employees.csv", 2)?.flat_map(|line| parse_employee(&line)))
}

/// Input-Filter-Output.
pub fn high_earners(employees: &FlowRdd<Employee>, min_salary: i64) -> FlowRdd<Employee> {
    employees.filter(move |e| e.salary >= min_salary)
}

pub fn employees_frame(ctx: &SessionContext, employees: &[Employee]) -> SqlResult<DataFrame> {
    let rows = employees
        .iter()
        .map(|e| {
            vec![
                ScalarValue::Utf8(Some(e.name.clone())),
                ScalarValue::Utf8(Some(e.gender.clone())),
                ScalarValue::UInt32(Some(e.age)),
                ScalarValue::Int64(Some(e.salary)),
            ]
        })
        .collect();
    create_dataframe(
        ctx,
        &[
            ("name", DataType::Utf8),
            ("gender", DataType::Utf8),
            ("age", DataType::UInt32),
            ("salary", DataType::Int64),
        ],
        rows,
    )
}

/// Input-Filter-Output with a DataFrame predicate.
pub fn high_earners_frame(df: DataFrame, min_salary: i64) -> SqlResult<DataFrame> {
    Ok(df.filter(col("salary").gt_eq(lit(min_salary)))?)
}

/// Input-Map-Reduce-Output: average salary per age bracket from
/// `(sum, count)` combiners.
pub fn avg_salary_by_age_group(employees: &FlowRdd<Employee>) -> FlowRdd<(String, f64)> {
    employees
        .map(|e| (age_group(e.age).to_string(), e.salary))
        .combine_by_key(
            |salary| (salary, 1u64),
            |(sum, count), salary| (sum + salary, count + 1),
            |a, b| (a.0 + b.0, a.1 + b.1),
        )
        .map_values(|(sum, count)| round2(sum as f64 / count as f64))
}

/// `movie_id,movie_name`; the name keeps any commas after the first.
pub fn parse_movie(line: &str) -> Option<(String, String)> {
    let (id, name) = line.split_once(',')?;
    Some((id.trim().to_string(), name.trim().to_string()))
}

/// `movie_id,rating,user_id` to `(movie_id, rating)`.
pub fn parse_movie_rating(line: &str) -> Option<(String, u32)> {
    let mut fields = line.split(',');
    let id = fields.next()?.trim().to_string();
    let rating = fields.next()?.trim().parse().ok()?;
    Some((id, rating))
}

/// Input-Multiple-Maps-Reduce-Output: join ratings to movie names, then
/// average per movie. Ratings of unknown movies and movies without ratings
/// drop out of the inner join.
pub fn average_movie_ratings(
    movies: &FlowRdd<(String, String)>,
    ratings: &FlowRdd<(String, u32)>,
) -> FlowRdd<(String, (String, f64))> {
    ratings
        .join(movies)
        .map_values(|(rating, name)| (name, rating))
        .group_by_key()
        .flat_map(|(id, values)| {
            let name = values.first()?.0.clone();
            let total: u32 = values.iter().map(|(_, rating)| rating).sum();
            Some((id, (name, round2(total as f64 / values.len() as f64))))
        })
}

/// Pairwise `(x + y) / 2` per gender: not associative, so the result
/// depends on partitioning.
pub fn avg_salary_by_gender_wrong(employees: &FlowRdd<Employee>) -> FlowRdd<(String, f64)> {
    employees
        .map(|e| (e.gender, e.salary as f64))
        .reduce_by_key(|x, y| (x + y) / 2.0)
}

pub fn avg_salary_by_gender(employees: &FlowRdd<Employee>) -> FlowRdd<(String, f64)> {
    employees
        .map(|e| (e.gender, (e.salary, 1u64)))
        .reduce_by_key(|a, b| (a.0 + b.0, a.1 + b.1))
        .map_values(|(sum, count)| round2(sum as f64 / count as f64))
}

/// One `(gender, (total, count))` per gender seen in the partition.
pub fn summarize_partition(employees: impl Iterator<Item = Employee>) -> Vec<(String, (i64, u64))> {
    let mut summary: HashMap<String, (i64, u64)> = HashMap::new();
    for employee in employees {
        let entry = summary.entry(employee.gender).or_default();
        entry.0 += employee.salary;
        entry.1 += 1;
    }
    summary.into_iter().collect()
}

/// Input-MapPartitions-Reduce-Output: `(total, count, average)` per gender.
pub fn salary_stats_by_gender(employees: &FlowRdd<Employee>) -> FlowRdd<(String, (i64, u64, f64))> {
    employees
        .map_partitions(|part| summarize_partition(part))
        .reduce_by_key(|a, b| (a.0 + b.0, a.1 + b.1))
        .map_values(|(total, count)| (total, count, round2(total as f64 / count as f64)))
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Classic Data Design Patterns");

    section("1. Input-Map-Output (normalize gender)");
    let employees = load_employees(ctx)?;
    for e in employees.collect()? {
        println!(
            "  {:8} gender={:8} age={} salary={}",
            e.name, e.gender, e.age, e.salary
        );
    }
    println!();

    section(&format!("2. Input-Filter-Output (salary >= {MIN_SALARY})"));
    for e in high_earners(&employees, MIN_SALARY).collect()? {
        println!("  {:8} salary={}", e.name, e.salary);
    }
    println!("\n  DataFrame equivalent:");
    let df = employees_frame(ctx.sql(), &employees.collect()?)?;
    show(&high_earners_frame(df, MIN_SALARY)?, 20).await?;

    section("3. Input-Map-Reduce-Output (average salary by age group)");
    for (group, avg) in sorted_by_key(avg_salary_by_age_group(&employees).collect()?) {
        println!("  {group:8} avg_salary={avg}");
    }
    println!();

    section("4. Reduce-side join (average movie rating)");
    let movies = lines_without_header(ctx, TOPIC, "movies.csv", 2)?.flat_map(|l| parse_movie(&l));
    let ratings =
        lines_without_header(ctx, TOPIC, "ratings.csv", 2)?.flat_map(|l| parse_movie_rating(&l));
    for (id, (name, avg)) in sorted_by_key(average_movie_ratings(&movies, &ratings).collect()?) {
        println!("  Movie {id}: {name:32} avg_rating={avg}");
    }
    println!();

    section("5. Combiner correctness (average salary by gender)");
    println!("  WRONG (mean of means):");
    for (gender, avg) in sorted_by_key(avg_salary_by_gender_wrong(&employees).collect()?) {
        println!("    {gender:8} avg_salary={avg}");
    }
    println!("  CORRECT ((sum, count) monoid):");
    for (gender, avg) in sorted_by_key(avg_salary_by_gender(&employees).collect()?) {
        println!("    {gender:8} avg_salary={avg}");
    }
    println!();

    section("6. Input-MapPartitions-Reduce-Output (salary by gender)");
    let partitioned = ctx.parallelize_with_partitions(employees.collect()?, 3);
    for (gender, (total, count, avg)) in sorted_by_key(salary_stats_by_gender(&partitioned).collect()?) {
        println!("  {gender:8} total={total:>7}  count={count}  avg={avg}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;
    use dalgo_sql::collect_rows;

    fn setup() -> (FlowContext, FlowRdd<Employee>) {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let employees = load_employees(&ctx).unwrap();
        (ctx, employees)
    }

    #[test]
    fn test_normalize_gender_and_brackets() {
        assert_eq!(normalize_gender(" F "), "female");
        assert_eq!(normalize_gender("1"), "male");
        assert_eq!(normalize_gender("Male"), "male");
        assert_eq!(normalize_gender("x"), "unknown");
        assert_eq!(age_group(25), "0-25");
        assert_eq!(age_group(26), "26-35");
        assert_eq!(age_group(101), "unknown");
        assert_eq!(parse_employee("bob,1,31"), None);
    }

    #[test]
    fn test_filter_and_age_groups() {
        let (_, employees) = setup();
        assert_eq!(employees.count().unwrap(), 9);
        assert_eq!(high_earners(&employees, MIN_SALARY).count().unwrap(), 6);
        assert_eq!(
            sorted_by_key(avg_salary_by_age_group(&employees).collect().unwrap()),
            vec![
                ("0-25".to_string(), 52000.0),
                ("26-35".to_string(), 65000.0),
                ("36-45".to_string(), 69000.0),
                ("46-55".to_string(), 81500.0),
                ("56-100".to_string(), 47000.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_dataframe_filter_matches_rdd_filter() {
        let (ctx, employees) = setup();
        let df = employees_frame(ctx.sql(), &employees.collect().unwrap()).unwrap();
        let rows = collect_rows(high_earners_frame(df, MIN_SALARY).unwrap())
            .await
            .unwrap();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|row| row[3].parse::<i64>().unwrap() >= MIN_SALARY));
    }

    #[test]
    fn test_reduce_side_join() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let movies = lines_without_header(&ctx, TOPIC, "movies.csv", 2)
            .unwrap()
            .flat_map(|l| parse_movie(&l));
        let ratings = lines_without_header(&ctx, TOPIC, "ratings.csv", 2)
            .unwrap()
            .flat_map(|l| parse_movie_rating(&l));
        assert_eq!(
            sorted_by_key(average_movie_ratings(&movies, &ratings).collect().unwrap()),
            vec![
                ("1".to_string(), ("The Matrix".to_string(), 4.5)),
                ("2".to_string(), ("Toy Story".to_string(), 3.67)),
                ("3".to_string(), ("Crouching Tiger, Hidden Dragon".to_string(), 3.5)),
            ]
        );
    }

    #[test]
    fn test_combiner_correctness() {
        let (ctx, employees) = setup();
        let correct = sorted_by_key(avg_salary_by_gender(&employees).collect().unwrap());
        assert_eq!(
            correct,
            vec![
                ("female".to_string(), 63000.0),
                ("male".to_string(), 74000.0),
                ("unknown".to_string(), 47000.0),
            ]
        );

        // Folding the four female salaries pairwise in one partition.
        let single = ctx.parallelize_with_partitions(employees.collect().unwrap(), 1);
        let wrong: HashMap<String, f64> = avg_salary_by_gender_wrong(&single)
            .collect()
            .unwrap()
            .into_iter()
            .collect();
        assert_ne!(wrong["female"], 63000.0);
        assert_eq!(wrong["unknown"], 47000.0);
    }

    #[test]
    fn test_partition_summaries_merge() {
        let (ctx, employees) = setup();
        let partitioned = ctx.parallelize_with_partitions(employees.collect().unwrap(), 3);
        assert_eq!(
            sorted_by_key(salary_stats_by_gender(&partitioned).collect().unwrap()),
            vec![
                ("female".to_string(), (252000, 4, 63000.0)),
                ("male".to_string(), (296000, 4, 74000.0)),
                ("unknown".to_string(), (47000, 1, 47000.0)),
            ]
        );
    }
}
