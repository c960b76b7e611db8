//! # Evogrid Data
//!
//! Plain, serializable data shared by every evogrid crate: genes and
//! genomes, grid cell states and coordinates, organism handles and the
//! per-tick event log. Behavior lives in `evogrid_core`.

pub mod data;

pub use data::events::{DeathCause, LiveEvent};
pub use data::genome::{Gene, Genome, SinkKind, SourceKind, WEIGHT_SCALE};
pub use data::grid::{CellState, Coord, Direction, OrganismId};
