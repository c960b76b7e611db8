//! The tick driver tying grid, population and evolution together.
//!
//! A tick walks the population in birth order. Each organism sees the grid
//! as left by the organisms processed before it, so a move can fail because
//! an earlier organism just took the target cell. Children born during a
//! tick are first processed on the next one.

use crate::brain::{GenomeLogic, NeuronCounts};
use crate::config::{AppConfig, ReproductionMode};
use crate::error::{GridError, SimError, SimResult};
use crate::evolution::{self, GenerationReport};
use crate::grid::Grid;
use crate::lifecycle::{self, MoveOutcome};
use crate::metrics::Metrics;
use crate::organism::{Organism, Population};
use crate::reproduction::{self, PairingQueue};
use crate::sensors::SensorFrame;
use evogrid_data::{CellState, Coord, DeathCause, Genome, LiveEvent, OrganismId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything one call to [`World::tick`] produced.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub events: Vec<LiveEvent>,
    /// Present when this tick closed a generation.
    pub report: Option<GenerationReport>,
}

pub struct World {
    config: AppConfig,
    counts: NeuronCounts,
    grid: Grid,
    population: Population,
    pairing: PairingQueue,
    rng: ChaCha8Rng,
    tick: u64,
    generation: u64,
    best_fitness: f32,
    overall_best_fitness: f32,
    species: BTreeSet<u32>,
    last_report: Option<GenerationReport>,
    metrics: Metrics,
}

impl World {
    /// A world with terrain, food and a random initial population.
    pub fn new(config: AppConfig) -> SimResult<Self> {
        let mut world = Self::empty(config)?;
        world.seed_terrain()?;
        let gene_count = world.config.brain.gene_count;
        for _ in 0..world.config.world.initial_population {
            let genome = Genome::new_random_with_rng(gene_count, world.counts, &mut world.rng);
            if !world.spawn_random(genome)? {
                break;
            }
        }
        info!(
            population = world.population.len(),
            size = world.config.world.size,
            "World created"
        );
        Ok(world)
    }

    /// A world whose population is built from `genomes`, e.g. imported or
    /// resumed from a snapshot.
    pub fn with_genomes(config: AppConfig, genomes: Vec<Genome>) -> SimResult<Self> {
        let mut world = Self::empty(config)?;
        world.seed_terrain()?;
        for genome in genomes {
            if !world.spawn_random(genome)? {
                break;
            }
        }
        Ok(world)
    }

    /// A validated world with an empty grid and no organisms.
    pub fn empty(config: AppConfig) -> SimResult<Self> {
        config
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))?;
        let rng = match config.world.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            counts: config.neuron_counts(),
            grid: Grid::new(config.world.size),
            population: Population::new(),
            pairing: PairingQueue::new(config.reproduction.pairing_queue_capacity),
            rng,
            tick: 0,
            generation: 0,
            best_fitness: 0.0,
            overall_best_fitness: 0.0,
            species: BTreeSet::new(),
            last_report: None,
            metrics: Metrics::new(),
            config,
        })
    }

    fn seed_terrain(&mut self) -> SimResult<()> {
        let walls = self.config.world.walls;
        let hazards = self.config.world.radioactive;
        for (state, count) in [(CellState::Wall, walls), (CellState::Radioactive, hazards)] {
            for _ in 0..count {
                let at = self.grid.fetch_empty_cell(&mut self.rng)?;
                self.grid.place(at, state, None)?;
            }
        }
        self.top_up_food()?;
        Ok(())
    }

    /// Places food on random empty cells until `initial_food` food cells
    /// exist. Stops quietly when the grid is full.
    fn top_up_food(&mut self) -> SimResult<usize> {
        let missing = self
            .config
            .world
            .initial_food
            .saturating_sub(self.grid.food_count());
        let mut placed = 0;
        for _ in 0..missing {
            match self.grid.fetch_empty_cell(&mut self.rng) {
                Ok(at) => {
                    self.grid
                        .place_food(at, self.config.metabolism.energy_from_food)?;
                    placed += 1;
                }
                Err(GridError::GridFull) => {
                    warn!("Grid full, food top-up stopped");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(placed)
    }

    /// Spawns at a random empty cell. Returns `false` when the grid is full.
    fn spawn_random(&mut self, genome: Genome) -> SimResult<bool> {
        match self.grid.fetch_empty_cell(&mut self.rng) {
            Ok(at) => {
                self.spawn(at, genome)?;
                Ok(true)
            }
            Err(GridError::GridFull) => {
                warn!(
                    population = self.population.len(),
                    "Grid full, population growth halted"
                );
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Places a new organism with `initial_energy` at `at`.
    pub fn spawn(&mut self, at: Coord, genome: Genome) -> SimResult<OrganismId> {
        let cell = self.grid.get(at)?;
        if cell.state != CellState::Empty {
            return Err(GridError::Occupied { x: at.x, y: at.y }.into());
        }
        let id = self.population.spawn(
            at,
            genome,
            self.counts,
            self.config.metabolism.initial_energy,
        );
        self.grid.place(at, CellState::Organism, Some(id))?;
        if let Some(org) = self.population.get(id) {
            self.species.insert(org.color);
        }
        Ok(id)
    }

    /// Places food carrying `energy_from_food`.
    pub fn place_food(&mut self, at: Coord) -> SimResult<()> {
        self.grid
            .place_food(at, self.config.metabolism.energy_from_food)?;
        Ok(())
    }

    pub fn place_wall(&mut self, at: Coord) -> SimResult<()> {
        self.grid.place(at, CellState::Wall, None)?;
        Ok(())
    }

    pub fn place_radioactive(&mut self, at: Coord) -> SimResult<()> {
        self.grid.place(at, CellState::Radioactive, None)?;
        Ok(())
    }

    /// Runs one tick, and the evolutionary loop when the generation is over.
    pub fn tick(&mut self) -> SimResult<TickOutcome> {
        let start = Instant::now();
        self.tick += 1;
        let mut events = Vec::new();

        for id in self.population.ids() {
            self.step_organism(id, &mut events)?;
        }
        self.population.purge_dead();

        self.metrics.record_tick(
            start.elapsed(),
            self.population.len(),
            self.grid.food_count(),
        );

        let report = if self.tick >= self.config.evolution.ticks_per_generation {
            let report = self.evolve()?;
            events.push(LiveEvent::Generation {
                generation: report.generation,
                best_fitness: report.best_fitness,
                mean_fitness: report.mean_fitness,
                population: self.population.len(),
            });
            Some(report)
        } else {
            None
        };

        Ok(TickOutcome { events, report })
    }

    fn step_organism(&mut self, id: OrganismId, events: &mut Vec<LiveEvent>) -> SimResult<()> {
        let tick = self.tick;
        let Some(org) = self.population.get_mut(id) else {
            return Ok(());
        };
        if !org.is_alive() {
            return Ok(());
        }

        if let Some(cause) = lifecycle::age_and_metabolize(org, &self.config) {
            lifecycle::release_cell(org, &mut self.grid, &self.config)?;
            self.metrics.record_death();
            events.push(death_event(org, cause, tick));
            return Ok(());
        }

        if org.energy >= self.config.reproduction.min_energy_to_reproduce {
            match self.config.reproduction.mode {
                ReproductionMode::Disabled => {}
                ReproductionMode::Asexual => self.reproduce_asexual(id, events)?,
                ReproductionMode::Sexual => self.reproduce_sexual(id, events)?,
            }
        }

        let Some(org) = self.population.get_mut(id) else {
            return Ok(());
        };
        if !org.is_alive() {
            return Ok(());
        }

        let frame = SensorFrame::capture(&self.grid, org, &self.config, &mut self.rng);
        let levels = org.brain.evaluate(|sensor| frame.get(sensor));
        let Some(step) = lifecycle::decide_step(&levels, org.direction, &mut self.rng) else {
            return Ok(());
        };

        match lifecycle::apply_step(org, &mut self.grid, step, &self.config)? {
            MoveOutcome::Died(cause) => {
                self.metrics.record_death();
                events.push(death_event(org, cause, tick));
            }
            MoveOutcome::Ate(_) => self.metrics.record_meal(),
            MoveOutcome::Idle | MoveOutcome::Moved | MoveOutcome::Blocked => {}
        }
        Ok(())
    }

    fn reproduce_asexual(&mut self, id: OrganismId, events: &mut Vec<LiveEvent>) -> SimResult<()> {
        let Some(parent) = self.population.get(id) else {
            return Ok(());
        };
        let Some(at) = self.grid.random_empty_neighbour(parent.position, &mut self.rng) else {
            return Ok(());
        };
        let genome = reproduction::asexual_offspring(
            &parent.genome,
            self.config.evolution.mutation_probability,
            &mut self.rng,
        );
        let child = self.spawn(at, genome)?;
        self.record_birth(child, vec![id], at, events);
        self.charge_parent(id, events)
    }

    fn reproduce_sexual(&mut self, id: OrganismId, events: &mut Vec<LiveEvent>) -> SimResult<()> {
        if !self.pairing.contains(id) && !self.pairing.enqueue(id) {
            warn!(organism = %id, "Pairing queue full, mate request rejected");
            return Ok(());
        }

        let threshold = self.config.reproduction.min_energy_to_reproduce;
        let population = &self.population;
        let Some((a, b)) = self.pairing.pop_pair(|pid| {
            population
                .get(pid)
                .is_some_and(|o| o.is_alive() && o.energy >= threshold)
        }) else {
            return Ok(());
        };

        let (Some(pa), Some(pb)) = (self.population.get(a), self.population.get(b)) else {
            return Ok(());
        };
        let (left, right) = reproduction::sexual_offspring(
            &pa.genome,
            &pb.genome,
            self.config.evolution.mutation_probability,
            &mut self.rng,
        );
        debug!(first = %a, second = %b, "Mates paired");

        for (parent, genome) in [(a, left), (b, right)] {
            let Some(pos) = self.population.get(parent).map(|o| o.position) else {
                continue;
            };
            let Some(at) = self.grid.random_empty_neighbour(pos, &mut self.rng) else {
                continue;
            };
            let child = self.spawn(at, genome)?;
            self.record_birth(child, vec![a, b], at, events);
            self.charge_parent(parent, events)?;
        }
        Ok(())
    }

    fn record_birth(
        &mut self,
        child: OrganismId,
        parents: Vec<OrganismId>,
        at: Coord,
        events: &mut Vec<LiveEvent>,
    ) {
        debug!(child = %child, at = %at, "Organism born");
        self.metrics.record_birth();
        events.push(LiveEvent::Birth {
            id: child,
            parents,
            at,
            tick: self.tick,
        });
    }

    /// Deducts the reproduction cost, which may starve the parent.
    fn charge_parent(&mut self, id: OrganismId, events: &mut Vec<LiveEvent>) -> SimResult<()> {
        let Some(parent) = self.population.get_mut(id) else {
            return Ok(());
        };
        if parent.spend_energy(self.config.reproduction.reproduction_cost) {
            if let Some(cause) =
                lifecycle::die(parent, &mut self.grid, DeathCause::Starvation, &self.config)?
            {
                self.metrics.record_death();
                events.push(death_event(parent, cause, self.tick));
            }
        }
        Ok(())
    }

    /// Scores and ranks the generation, then builds the next one from
    /// elites and offspring at random empty cells.
    pub fn evolve(&mut self) -> SimResult<GenerationReport> {
        let scored_generation = self.generation;
        let mut ranked = self.population.take_all();
        ranked.retain(Organism::is_alive);
        for org in &ranked {
            if self.grid.get(org.position)?.owner == Some(org.id) {
                self.grid.place(org.position, CellState::Empty, None)?;
            }
        }
        self.pairing.clear();

        evolution::score(&mut ranked, &self.config);
        evolution::rank(&mut ranked);
        let (best, mean) = evolution::fitness_summary(&ranked);
        let scored = ranked.len();
        let species = ranked.iter().map(|o| o.color).collect::<BTreeSet<_>>().len();

        let target = self.config.world.initial_population;
        let reseeded = ranked.is_empty();
        if reseeded {
            warn!(
                generation = scored_generation,
                "Population died out, reseeding at random"
            );
        }

        let elites = evolution::elite_count(&self.config, ranked.len());
        let pool = evolution::breeding_pool(&self.config, ranked.len());
        let offspring: Vec<Genome> = (elites..target.max(elites))
            .map(|_| evolution::breed(&ranked, pool, &self.config, self.counts, &mut self.rng))
            .collect();
        let offspring_brains = evolution::compile_all(&offspring, self.counts);
        let elite_genomes: Vec<Genome> =
            ranked[..elites].iter().map(|o| o.genome.clone()).collect();
        let elite_brains = evolution::compile_all(&elite_genomes, self.counts);

        self.species.clear();
        let mut grid_full = false;
        let mut placed_elites = 0;
        for (mut elite, brain) in ranked.drain(..elites).zip(elite_brains) {
            let Some(at) = self.fetch_for_repopulation(&mut grid_full)? else {
                break;
            };
            elite.rebirth(at, brain, self.config.metabolism.initial_energy);
            self.grid.place(at, CellState::Organism, Some(elite.id))?;
            self.species.insert(elite.color);
            self.population.insert(elite);
            placed_elites += 1;
        }

        let mut placed_offspring = 0;
        if !grid_full {
            for (genome, brain) in offspring.into_iter().zip(offspring_brains) {
                let Some(at) = self.fetch_for_repopulation(&mut grid_full)? else {
                    break;
                };
                let id = self.population.next_id();
                let org = Organism::with_brain(
                    id,
                    at,
                    genome,
                    brain,
                    self.config.metabolism.initial_energy,
                );
                self.grid.place(at, CellState::Organism, Some(id))?;
                self.species.insert(org.color);
                self.population.insert(org);
                placed_offspring += 1;
            }
        }

        self.top_up_food()?;

        self.best_fitness = best;
        self.overall_best_fitness = self.overall_best_fitness.max(best);
        self.tick = 0;
        self.generation += 1;
        self.metrics.record_generation();

        let report = GenerationReport {
            generation: scored_generation,
            best_fitness: best,
            mean_fitness: mean,
            scored,
            elites: placed_elites,
            offspring: placed_offspring,
            species,
            grid_full,
            reseeded,
        };
        info!(
            generation = scored_generation,
            best = report.best_fitness,
            mean = report.mean_fitness,
            species,
            population = self.population.len(),
            "Generation complete"
        );
        self.last_report = Some(report.clone());
        Ok(report)
    }

    fn fetch_for_repopulation(&mut self, grid_full: &mut bool) -> SimResult<Option<Coord>> {
        match self.grid.fetch_empty_cell(&mut self.rng) {
            Ok(at) => Ok(Some(at)),
            Err(GridError::GridFull) => {
                warn!(
                    population = self.population.len(),
                    "Grid full, repopulation stopped"
                );
                *grid_full = true;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn counts(&self) -> NeuronCounts {
        self.counts
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for UI marks and scenario setup.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    #[must_use]
    pub fn organism(&self, id: OrganismId) -> Option<&Organism> {
        self.population.get(id)
    }

    pub fn organism_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.population.get_mut(id)
    }

    pub fn organisms(&self) -> impl Iterator<Item = &Organism> {
        self.population.iter()
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Continues the generation count of a restored population.
    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Best fitness of the last scored generation.
    #[must_use]
    pub fn best_fitness(&self) -> f32 {
        self.best_fitness
    }

    #[must_use]
    pub fn overall_best_fitness(&self) -> f32 {
        self.overall_best_fitness
    }

    /// Distinct genome colors born into the current generation.
    #[must_use]
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    #[must_use]
    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.last_report.as_ref()
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Genome of the fittest organism right now, under the configured goal.
    #[must_use]
    pub fn best_genome(&self) -> Option<&Genome> {
        self.population
            .iter()
            .filter(|o| o.is_alive())
            .map(|o| (evolution::fitness(o, &self.config), o))
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
            .map(|(_, o)| &o.genome)
    }

    /// Genomes of the whole population in birth order.
    #[must_use]
    pub fn genomes(&self) -> Vec<Genome> {
        self.population.iter().map(|o| o.genome.clone()).collect()
    }
}

fn death_event(org: &Organism, cause: DeathCause, tick: u64) -> LiveEvent {
    debug!(organism = %org.id, ?cause, age = org.age, "Organism died");
    LiveEvent::Death {
        id: org.id,
        age: org.age,
        cause,
        at: org.position,
        tick,
    }
}
