//! Core data structures for the evogrid simulation.

pub mod events;
pub mod genome;
pub mod grid;
