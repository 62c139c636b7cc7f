//! Graph queries expressed as relational joins: vertices and edges are two
//! flat tables and every traversal is a self-join of the edge table.

pub mod flight_analysis;
pub mod graph_basics;

pub const TOPIC: &str = "graph";
