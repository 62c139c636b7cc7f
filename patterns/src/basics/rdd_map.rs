//! One-to-one `map` over text lines, then `filter` and key changes.

use super::{Person, TOPIC};
use crate::support::banner;
use dalgo_common::data_path;
use dalgo_core::{FlowContext, FlowRdd, RddResult};

/// Parse the lines of `people.csv`; the header and malformed lines drop out.
pub fn parse_lines(lines: &FlowRdd<String>) -> FlowRdd<Person> {
    lines
        .map(|line| {
            let fields: Vec<String> = line.split(',').map(str::to_string).collect();
            Person::parse(&fields)
        })
        .flat_map(|person| person)
}

pub fn name_value_pairs(people: &FlowRdd<Person>) -> FlowRdd<(String, i64)> {
    people.map(|person| (person.name, person.value))
}

/// People whose value is at least `threshold`.
pub fn at_least(people: &FlowRdd<Person>, threshold: i64) -> RddResult<Vec<Person>> {
    people.filter(move |person| person.value >= threshold).collect()
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("RDD map() Transformation");
    let lines = ctx.text_file(data_path(TOPIC, "people.csv"), 2)?;
    println!("Raw lines: {}", lines.count()?);

    let people = parse_lines(&lines);
    println!("Parsed records: {}", people.count()?);

    let pairs = name_value_pairs(&people);
    println!("\nAfter map(person -> (name, value)):\n  {:?}", pairs.collect()?);

    let incremented = pairs.map_values(|value| value + 5);
    println!("\nAfter mapValues(value + 5):\n  {:?}", incremented.collect()?);

    let by_city = people.map(|person| (person.city.clone(), person));
    println!("\nAfter map(person -> (city, person)):");
    for (city, person) in by_city.collect()? {
        println!("  {city}: {person:?}");
    }

    println!("\nAfter filter(value >= 50):\n  {:?}", at_least(&people, 50)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    fn people(ctx: &FlowContext) -> FlowRdd<Person> {
        parse_lines(&ctx.text_file(data_path(TOPIC, "people.csv"), 2).unwrap())
    }

    #[test]
    fn test_header_and_bad_lines_drop_out() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let lines = ctx.parallelize(vec![
            "name,city,value".to_string(),
            "alex,Ames,20".to_string(),
            "broken".to_string(),
        ]);
        assert_eq!(
            parse_lines(&lines).collect().unwrap(),
            vec![Person::new("alex", "Ames", 20)]
        );
    }

    #[test]
    fn test_map_and_filter_people() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let people = people(&ctx);
        assert_eq!(people.count().unwrap(), 10);

        let pairs = name_value_pairs(&people).collect().unwrap();
        assert_eq!(pairs[0], ("alex".to_string(), 20));
        assert_eq!(pairs[9], ("jane".to_string(), 50));

        let values: Vec<i64> = at_least(&people, 50)
            .unwrap()
            .into_iter()
            .map(|person| person.value)
            .collect();
        assert_eq!(values, vec![55, 60, 55, 50]);
    }
}
