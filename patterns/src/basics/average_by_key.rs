//! Average per key with `reduceByKey` over `(sum, count)` pairs.

use super::{Person, load_people};
use crate::support::{banner, sorted_by_key};
use dalgo_core::{FlowContext, FlowRdd, RddResult};

/// `(name, (value, 1))`
pub fn to_sum_count(person: Person) -> (String, (i64, u64)) {
    (person.name, (person.value, 1))
}

pub fn add_pairs(a: (i64, u64), b: (i64, u64)) -> (i64, u64) {
    (a.0 + b.0, a.1 + b.1)
}

/// Mean value per name, sorted by name.
pub fn average_by_key(people: &FlowRdd<Person>) -> RddResult<Vec<(String, f64)>> {
    let averages = people
        .map(to_sum_count)
        .reduce_by_key(add_pairs)
        .map_values(|(sum, count)| sum as f64 / count as f64)
        .collect()?;
    Ok(sorted_by_key(averages))
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Average by Key using reduceByKey()");
    let people = load_people()?;
    println!("Input data: {people:?}\n");

    let rdd = ctx.parallelize(people);
    let sum_count = rdd.map(to_sum_count);
    println!("After map to (key, (value, 1)):\n  {:?}\n", sum_count.collect()?);

    let totals = sum_count.reduce_by_key(add_pairs);
    println!("After reduceByKey (sum totals and counts):\n  {:?}\n", totals.collect()?);

    println!("Final averages:");
    for (name, average) in average_by_key(&rdd)? {
        println!("  {name}: {average:.2}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[test]
    fn test_add_pairs() {
        assert_eq!(add_pairs((20, 1), (30, 2)), (50, 3));
        assert_eq!(to_sum_count(Person::new("alex", "Ames", 20)), ("alex".to_string(), (20, 1)));
    }

    #[test]
    fn test_average_by_key_on_people() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let people = ctx.parallelize(load_people().unwrap());
        assert_eq!(
            average_by_key(&people).unwrap(),
            vec![
                ("alex".to_string(), 30.0),
                ("jane".to_string(), 50.0),
                ("jeff".to_string(), 50.0),
                ("mary".to_string(), 45.0),
            ]
        );
    }

    #[test]
    fn test_partial_sums_combine_across_partitions() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let people = ctx.parallelize_with_partitions(
            vec![
                Person::new("a", "x", 1),
                Person::new("a", "y", 2),
                Person::new("b", "x", 10),
                Person::new("a", "z", 6),
            ],
            4,
        );
        assert_eq!(
            average_by_key(&people).unwrap(),
            vec![("a".to_string(), 3.0), ("b".to_string(), 10.0)]
        );
    }
}
