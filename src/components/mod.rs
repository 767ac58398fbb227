//! Reusable view components.

pub mod force_graph;
