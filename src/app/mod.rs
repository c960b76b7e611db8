//! Headless application state.

mod summary;

pub use summary::RunSummary;

use anyhow::{Context, Result};
use evogrid_core::{AppConfig, World};
use evogrid_data::LiveEvent;
use evogrid_io::genome::export_genome_pretty;
use evogrid_io::PopulationSnapshot;
use tracing::info;

pub struct App {
    pub world: World,
    pub running: bool,
    summary: RunSummary,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let world = World::new(config).context("creating world")?;
        Ok(Self::from_world(world))
    }

    /// Rebuilds the population from a snapshot taken under a compatible
    /// config.
    pub fn resume(config: AppConfig, snapshot: PopulationSnapshot) -> Result<Self> {
        snapshot
            .check_compatible(&config)
            .context("snapshot does not fit the config")?;
        info!(
            generation = snapshot.generation,
            genomes = snapshot.genomes.len(),
            "Resuming from snapshot"
        );
        let generation = snapshot.generation;
        let mut world =
            World::with_genomes(config, snapshot.genomes).context("restoring world")?;
        world.set_generation(generation);
        Ok(Self::from_world(world))
    }

    fn from_world(world: World) -> Self {
        Self {
            world,
            running: true,
            summary: RunSummary::default(),
        }
    }

    /// Advances one tick and folds its events into the running summary.
    pub fn step(&mut self) -> Result<()> {
        let outcome = self.world.tick()?;
        self.summary.ticks += 1;
        for event in &outcome.events {
            match event {
                LiveEvent::Birth { .. } => self.summary.births += 1,
                LiveEvent::Death { .. } => self.summary.deaths += 1,
                LiveEvent::Generation { .. } => {}
            }
        }
        if let Some(report) = outcome.report {
            self.summary.generations += 1;
            self.summary.reports.push(report);
        }
        Ok(())
    }

    pub fn run_ticks(&mut self, ticks: u64) -> Result<&RunSummary> {
        for _ in 0..ticks {
            if !self.running {
                break;
            }
            self.step()?;
        }
        Ok(self.summary())
    }

    /// Runs until `generations` more generation boundaries have passed.
    pub fn run_generations(&mut self, generations: u64) -> Result<&RunSummary> {
        let target = self.world.generation() + generations;
        while self.running && self.world.generation() < target {
            self.step()?;
        }
        Ok(self.summary())
    }

    /// Current totals; refreshes the live fields from the world.
    pub fn summary(&mut self) -> &RunSummary {
        self.summary.population = self.world.population().len();
        self.summary.species = self.world.species_count();
        self.summary.best_fitness = self.world.best_fitness();
        self.summary.overall_best_fitness = self.world.overall_best_fitness();
        &self.summary
    }

    #[must_use]
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot::new(
            self.world.config(),
            self.world.generation(),
            self.world.genomes(),
        )
    }

    /// Pretty JSON of the fittest living organism's genome, if any.
    pub fn export_best(&self) -> Result<Option<String>> {
        let Some(genome) = self.world.best_genome() else {
            return Ok(None);
        };
        let json = export_genome_pretty(genome, self.world.counts())?;
        Ok(Some(json))
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}
