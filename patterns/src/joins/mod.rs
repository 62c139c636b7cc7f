//! Join design patterns: join types, reduce-side joins and map-side
//! (broadcast) joins.

pub mod join_types;
pub mod map_side_join;

pub const TOPIC: &str = "joins";
