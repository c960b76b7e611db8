//! Generational selection: scoring, ranking, elitism and breeding.
//!
//! Fitness is always in `[0, 1]` and higher is better. The population is
//! ranked with a stable sort, so organisms with equal fitness keep their
//! birth order and runs stay reproducible.

use crate::brain::{CompiledBrain, GenomeLogic, NeuronCounts};
use crate::config::{AppConfig, Goal};
use crate::organism::Organism;
use evogrid_data::{Coord, Genome};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Summary of one generation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation that was scored.
    pub generation: u64,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    /// Organisms alive at the boundary.
    pub scored: usize,
    pub elites: usize,
    pub offspring: usize,
    /// Distinct genome colors among the scored organisms.
    pub species: usize,
    /// Repopulation stopped early for lack of empty cells.
    pub grid_full: bool,
    /// The population had died out and was reseeded at random.
    pub reseeded: bool,
}

/// Fitness of a single organism against the configured goal.
#[must_use]
pub fn fitness(organism: &Organism, config: &AppConfig) -> f32 {
    match config.evolution.goal {
        Goal::Coordinate { x, y } => {
            coordinate_fitness(organism.position, Coord::new(x, y), config.world.size)
        }
        Goal::Food => (organism.energy / config.metabolism.max_energy).clamp(0.0, 1.0),
    }
}

/// `1 - dist / diag` with `diag` the grid's corner-to-corner distance.
#[must_use]
pub fn coordinate_fitness(position: Coord, goal: Coord, size: u16) -> f32 {
    let diag = (f32::from(size) - 1.0).max(1.0) * std::f32::consts::SQRT_2;
    (1.0 - position.distance(goal) / diag).clamp(0.0, 1.0)
}

/// Writes each organism's fitness.
pub fn score(organisms: &mut [Organism], config: &AppConfig) {
    #[cfg(feature = "rayon")]
    organisms
        .par_iter_mut()
        .for_each(|o| o.fitness = fitness(o, config));

    #[cfg(not(feature = "rayon"))]
    for o in organisms.iter_mut() {
        o.fitness = fitness(o, config);
    }
}

/// Stable descending sort by fitness.
pub fn rank(organisms: &mut [Organism]) {
    organisms.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap_or(Ordering::Equal));
}

/// How many top-ranked organisms survive unchanged.
#[must_use]
pub fn elite_count(config: &AppConfig, ranked: usize) -> usize {
    let target = config.world.initial_population as f32 * config.evolution.elitism_percent / 100.0;
    (target.round() as usize).min(ranked)
}

/// Size of the breeding pool at the top of the ranking; at least one when
/// anything is ranked.
#[must_use]
pub fn breeding_pool(config: &AppConfig, ranked: usize) -> usize {
    let pool = (ranked as f32 * config.evolution.top_percent_to_reproduce / 100.0).ceil() as usize;
    pool.clamp(ranked.min(1), ranked)
}

/// One child from two parents sampled uniformly from the breeding pool.
///
/// Variation comes from crossover alone; `mutation_probability` applies to
/// births during the generation, not to repopulation.
pub fn breed<R: Rng>(
    ranked: &[Organism],
    pool: usize,
    config: &AppConfig,
    counts: NeuronCounts,
    rng: &mut R,
) -> Genome {
    if pool == 0 || ranked.is_empty() {
        return Genome::new_random_with_rng(config.brain.gene_count, counts, rng);
    }
    let pool = pool.min(ranked.len());
    let a = &ranked[rng.gen_range(0..pool)].genome;
    let b = &ranked[rng.gen_range(0..pool)].genome;
    a.crossover_with_rng(b, config.evolution.crossover_mutation_percent, counts, rng)
}

/// Compiles genomes in order.
#[must_use]
pub fn compile_all(genomes: &[Genome], counts: NeuronCounts) -> Vec<CompiledBrain> {
    #[cfg(feature = "rayon")]
    let brains: Vec<CompiledBrain> = genomes.par_iter().map(|g| g.compile(counts)).collect();
    #[cfg(not(feature = "rayon"))]
    let brains: Vec<CompiledBrain> = genomes.iter().map(|g| g.compile(counts)).collect();
    brains
}

/// `(best, mean)` over the scored organisms.
#[must_use]
pub fn fitness_summary(organisms: &[Organism]) -> (f32, f32) {
    if organisms.is_empty() {
        return (0.0, 0.0);
    }
    let sum: f32 = organisms.iter().map(|o| o.fitness).sum();
    let best = organisms
        .iter()
        .map(|o| o.fitness)
        .fold(f32::NEG_INFINITY, f32::max);
    (best, sum / organisms.len() as f32)
}
