use super::grid::{Coord, OrganismId};
use serde::{Deserialize, Serialize};

/// Why an organism left the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Energy reached zero.
    Starvation,
    /// Age reached `max_age`.
    OldAge,
    /// Tried to enter a radioactive cell.
    Radiation,
}

/// Events emitted by a simulation tick, for status displays and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiveEvent {
    /// A child was placed on the grid by reproduction.
    Birth {
        id: OrganismId,
        parents: Vec<OrganismId>,
        at: Coord,
        tick: u64,
    },
    /// An organism died.
    Death {
        id: OrganismId,
        age: u32,
        cause: DeathCause,
        at: Coord,
        tick: u64,
    },
    /// The evolutionary loop ran and a new generation began.
    Generation {
        generation: u64,
        best_fitness: f32,
        mean_fitness: f32,
        population: usize,
    },
}
