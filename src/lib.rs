//! # Evogrid
//!
//! Headless driver for the evogrid simulation: builds a [`app::App`] from a
//! config or a snapshot, runs it for a number of ticks or generations, and
//! exports what the collaborators need.

pub mod app;

pub use app::{App, RunSummary};
