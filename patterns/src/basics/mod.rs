//! First steps with RDDs: map, flatMap, mapValues, mapPartitions and
//! averaging by key.

pub mod average_by_key;
pub mod map_partitions;
pub mod map_values;
pub mod map_vs_flat_map;
pub mod rdd_map;
pub mod transformations_overview;

use serde::{Deserialize, Serialize};

pub const TOPIC: &str = "basics";

/// A `people.csv` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub city: String,
    pub value: i64,
}

impl Person {
    pub fn new(name: &str, city: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            city: city.to_string(),
            value,
        }
    }

    /// `name,city,value`; rows with a non-integer value are rejected.
    pub fn parse(row: &[String]) -> Option<Person> {
        match row {
            [name, city, value, ..] => Some(Person {
                name: name.trim().to_string(),
                city: city.trim().to_string(),
                value: value.trim().parse().ok()?,
            }),
            _ => None,
        }
    }
}

pub fn load_people() -> anyhow::Result<Vec<Person>> {
    crate::support::load_records(TOPIC, "people.csv", Person::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_parse_person() {
        assert_eq!(
            Person::parse(&row(&["alex", "Ames", " 20"])),
            Some(Person::new("alex", "Ames", 20))
        );
        assert_eq!(Person::parse(&row(&["alex", "Ames", "twenty"])), None);
        assert_eq!(Person::parse(&row(&["alex"])), None);
    }

    #[test]
    fn test_load_people() {
        let people = load_people().unwrap();
        assert_eq!(people.len(), 10);
        assert_eq!(people[0], Person::new("alex", "Ames", 20));
    }
}
