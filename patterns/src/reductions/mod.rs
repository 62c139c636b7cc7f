//! Reductions by key: reduceByKey, groupByKey, aggregateByKey and
//! combineByKey, and the (sum, count) monoid for averages.

pub mod movie_avg_rating;
pub mod warmup;

pub const TOPIC: &str = "reductions";
