//! # Evogrid Core
//!
//! Simulation engine for evogrid, a grid-based artificial-life sandbox.
//!
//! Organisms carry a fixed-length genome that is compiled once into a small
//! feed-forward controller. Each tick the controller reads grid-derived
//! sensors and emits action levels that become a step on the grid. At the
//! end of every generation the population is scored, ranked and rebuilt
//! from elites and crossover offspring.
//!
//! ## Architecture
//!
//! - **brain**: genome operators, the pruning compiler and the evaluator
//! - **grid**: cell state machine with occupancy bookkeeping
//! - **lifecycle** / **reproduction**: per-organism tick rules
//! - **evolution**: fitness, ranking and breeding
//! - **world**: the deterministic tick driver, seeded from the config
//!
//! ## Example
//!
//! ```
//! use evogrid_core::brain::{GenomeLogic, NeuronCounts};
//! use evogrid_data::Genome;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let counts = NeuronCounts::with_hidden(4);
//! let genome = Genome::new_random_with_rng(16, counts, &mut rng);
//!
//! let mut brain = genome.compile(counts);
//! let levels = brain.evaluate(|_sensor| 0.5);
//! assert_eq!(levels.len(), counts.actions);
//! ```

/// Genome operators, compiler and feed-forward evaluator
pub mod brain;
/// Configuration management for simulation parameters
pub mod config;
/// Grid and world error types
pub mod error;
/// Fitness scoring, ranking and breeding
pub mod evolution;
/// Cell grid with occupancy tracking
pub mod grid;
/// Ageing, movement and death rules
pub mod lifecycle;
/// Run metrics and logging setup
pub mod metrics;
/// Organisms and populations
pub mod organism;
/// Asexual cloning and the mate pairing queue
pub mod reproduction;
/// Grid-derived sensor readings
pub mod sensors;
/// The tick driver
pub mod world;

pub use brain::{CompiledBrain, GenomeLogic, NeuronCounts};
pub use config::AppConfig;
pub use error::{GridError, SimError, SimResult};
pub use evolution::GenerationReport;
pub use grid::{Cell, Entry, Grid};
pub use metrics::{init_logging, Metrics};
pub use organism::{Organism, Population};
pub use world::{TickOutcome, World};
