//! Average rating per user. The mean is not a monoid, so the correct
//! versions carry `(sum, count)` and divide last.

use super::TOPIC;
use crate::support::{banner, lines_without_header, round2, section, sorted_by_key};
use dalgo_core::{FlowContext, FlowRdd, RddResult};

/// `userId,movieId,rating,timestamp` to `(userId, rating)`.
pub fn parse_rating(line: &str) -> Option<(String, f64)> {
    let mut fields = line.split(',');
    let user = fields.next()?.trim();
    let rating = fields.nth(1)?.trim().parse().ok()?;
    Some((user.to_string(), rating))
}

pub fn load_ratings(ctx: &FlowContext) -> anyhow::Result<FlowRdd<(String, f64)>> {
    Ok(lines_without_header(ctx, TOPIC, "ratings.csv", 2)?.flat_map(|line| parse_rating(&line)))
}

/// Pairwise `(x + y) / 2`: the answer depends on how values are grouped.
pub fn mean_of_means(ratings: &FlowRdd<(String, f64)>) -> FlowRdd<(String, f64)> {
    ratings.reduce_by_key(|x, y| (x + y) / 2.0)
}

fn average((sum, count): (f64, u64)) -> f64 {
    round2(sum / count as f64)
}

fn merge(a: (f64, u64), b: (f64, u64)) -> (f64, u64) {
    (a.0 + b.0, a.1 + b.1)
}

pub fn avg_with_reduce_by_key(ratings: &FlowRdd<(String, f64)>) -> FlowRdd<(String, f64)> {
    ratings
        .map_values(|v| (v, 1u64))
        .reduce_by_key(merge)
        .map_values(average)
}

pub fn avg_with_aggregate_by_key(ratings: &FlowRdd<(String, f64)>) -> FlowRdd<(String, f64)> {
    ratings
        .aggregate_by_key((0.0, 0u64), |c, v| (c.0 + v, c.1 + 1), merge)
        .map_values(average)
}

pub fn avg_with_combine_by_key(ratings: &FlowRdd<(String, f64)>) -> FlowRdd<(String, f64)> {
    ratings
        .combine_by_key(|v| (v, 1u64), |c, v| (c.0 + v, c.1 + 1), merge)
        .map_values(average)
}

type Approach = (&'static str, fn(&FlowRdd<(String, f64)>) -> FlowRdd<(String, f64)>);

const APPROACHES: [Approach; 3] = [
    ("reduceByKey + (sum, count)", avg_with_reduce_by_key),
    ("aggregateByKey", avg_with_aggregate_by_key),
    ("combineByKey", avg_with_combine_by_key),
];

fn sorted_averages(rdd: FlowRdd<(String, f64)>) -> RddResult<Vec<(String, f64)>> {
    Ok(sorted_by_key(rdd.collect()?))
}

pub async fn run(ctx: &FlowContext) -> anyhow::Result<()> {
    banner("Movie Average Rating: The Monoid Pattern");
    let ratings = load_ratings(ctx)?;
    println!("Total ratings: {}\n", ratings.count()?);
    println!("Sample ratings (userId, rating):");
    for rating in ratings.take(5)? {
        println!("  {rating:?}");
    }
    println!();

    section("WRONG: reduceByKey with mean (not a monoid)");
    for (user, avg) in sorted_averages(mean_of_means(&ratings))? {
        println!("  User {user}: {avg:.2}  (INCORRECT)");
    }
    println!();

    for (name, approach) in APPROACHES {
        section(name);
        for (user, avg) in sorted_averages(approach(&ratings))? {
            println!("  User {user}: {avg}");
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalgo_common::SessionConfig;
    use dalgo_core::create_session_with;

    #[test]
    fn test_parse_rating() {
        assert_eq!(
            parse_rating("1,101,4.5,964982703"),
            Some(("1".to_string(), 4.5))
        );
        assert_eq!(parse_rating("userId,movieId,rating,timestamp"), None);
        assert_eq!(parse_rating("1"), None);
    }

    #[test]
    fn test_mean_of_means_differs_from_true_mean() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let ratings = ctx.parallelize_with_partitions(
            vec![
                ("u".to_string(), 4.0),
                ("u".to_string(), 3.0),
                ("u".to_string(), 5.0),
            ],
            1,
        );
        let wrong = mean_of_means(&ratings).collect().unwrap();
        assert_eq!(wrong, vec![("u".to_string(), 4.25)]);
        let right = avg_with_reduce_by_key(&ratings).collect().unwrap();
        assert_eq!(right, vec![("u".to_string(), 4.0)]);
    }

    #[test]
    fn test_correct_approaches_agree_on_file() {
        let ctx = create_session_with(SessionConfig::for_tests()).unwrap();
        let ratings = load_ratings(&ctx).unwrap();
        assert_eq!(ratings.count().unwrap(), 15);
        let expected = sorted_averages(avg_with_reduce_by_key(&ratings)).unwrap();
        assert_eq!(expected[0], ("1".to_string(), 4.12));
        assert_eq!(expected[4], ("5".to_string(), 4.5));
        for (name, approach) in APPROACHES {
            assert_eq!(sorted_averages(approach(&ratings)).unwrap(), expected, "{name}");
        }
    }
}
