//! Configuration management for simulation parameters.
//!
//! Strongly-typed sections mapping onto a `config.toml` file. Every section
//! has defaults, so a file only needs the keys it overrides. The config is
//! passed by value into the world; there is no global holder.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! size = 64
//! initial_population = 200
//! seed = 42
//!
//! [reproduction]
//! mode = "Sexual"
//!
//! [evolution]
//! ticks_per_generation = 300
//! goal = { kind = "coordinate", x = 60, y = 4 }
//! ```

use crate::brain::NeuronCounts;
use evogrid_data::Coord;
use serde::{Deserialize, Serialize};

/// Grid dimensions and initial seeding.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length `S` of the square grid.
    pub size: u16,
    pub initial_population: usize,
    pub initial_food: usize,
    pub walls: usize,
    pub radioactive: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: 64,
            initial_population: 200,
            initial_food: 150,
            walls: 40,
            radioactive: 10,
            seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BrainConfig {
    pub gene_count: usize,
    pub hidden_neurons: usize,
    /// Ticks per full cycle of the oscillator sensor.
    pub oscillator_period: f32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            gene_count: 16,
            hidden_neurons: 4,
            oscillator_period: 30.0,
        }
    }
}

/// Energy economy and ageing.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MetabolismConfig {
    pub initial_energy: f32,
    pub max_energy: f32,
    pub energy_from_food: f32,
    /// Cost of an orthogonal step; diagonal steps pay double.
    pub move_cost: f32,
    pub idle_cost: f32,
    pub max_age: u32,
    pub drop_food_on_death: bool,
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        Self {
            initial_energy: 100.0,
            max_energy: 200.0,
            energy_from_food: 40.0,
            move_cost: 1.0,
            idle_cost: 0.0,
            max_age: 500,
            drop_food_on_death: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReproductionMode {
    Disabled,
    #[default]
    Asexual,
    Sexual,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReproductionConfig {
    pub mode: ReproductionMode,
    pub min_energy_to_reproduce: f32,
    pub reproduction_cost: f32,
    /// Maximum number of organisms waiting for a mate.
    pub pairing_queue_capacity: usize,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            mode: ReproductionMode::Asexual,
            min_energy_to_reproduce: 150.0,
            reproduction_cost: 60.0,
            pairing_queue_capacity: 64,
        }
    }
}

/// What the evolutionary loop rewards. Fitness is always in `[0, 1]` and
/// higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Goal {
    /// Reward closeness to a target cell.
    Coordinate { x: i32, y: i32 },
    /// Reward stored energy.
    Food,
}

impl Default for Goal {
    fn default() -> Self {
        Goal::Food
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    pub ticks_per_generation: u64,
    pub elitism_percent: f32,
    pub top_percent_to_reproduce: f32,
    /// Chance that a child born during a generation receives one point
    /// mutation. Repopulation at the generation boundary uses crossover only.
    pub mutation_probability: f32,
    /// Share of crossover positions filled with fresh random genes.
    pub crossover_mutation_percent: f32,
    pub goal: Goal,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            ticks_per_generation: 300,
            elitism_percent: 10.0,
            top_percent_to_reproduce: 30.0,
            mutation_probability: 0.05,
            crossover_mutation_percent: 1.0,
            goal: Goal::Food,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub brain: BrainConfig,
    pub metabolism: MetabolismConfig,
    pub reproduction: ReproductionConfig,
    pub evolution: EvolutionConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(self.world.size >= 2, "Grid size must be at least 2");
        anyhow::ensure!(self.world.size <= 1024, "Grid size too large (max 1024)");
        let cells = usize::from(self.world.size) * usize::from(self.world.size);
        anyhow::ensure!(
            self.world.initial_population
                + self.world.initial_food
                + self.world.walls
                + self.world.radioactive
                <= cells,
            "Initial population, food, walls and radioactive cells exceed {} grid cells",
            cells
        );

        // Brain validation
        anyhow::ensure!(self.brain.gene_count > 0, "Gene count must be positive");
        anyhow::ensure!(
            self.brain.gene_count <= 1024,
            "Gene count too large (max 1024)"
        );
        anyhow::ensure!(
            self.brain.hidden_neurons > 0,
            "Hidden neuron count must be positive"
        );
        anyhow::ensure!(
            self.brain.hidden_neurons <= 1024,
            "Hidden neuron count too large (max 1024)"
        );
        anyhow::ensure!(
            self.brain.oscillator_period > 0.0,
            "Oscillator period must be positive"
        );

        // Metabolism validation
        anyhow::ensure!(
            self.metabolism.max_energy > 0.0,
            "Max energy must be positive"
        );
        anyhow::ensure!(
            self.metabolism.initial_energy > 0.0
                && self.metabolism.initial_energy <= self.metabolism.max_energy,
            "Initial energy must be in (0, max_energy]"
        );
        anyhow::ensure!(
            self.metabolism.energy_from_food >= 0.0,
            "Energy from food must be non-negative"
        );
        anyhow::ensure!(
            self.metabolism.move_cost >= 0.0,
            "Move cost must be non-negative"
        );
        anyhow::ensure!(
            self.metabolism.idle_cost >= 0.0,
            "Idle cost must be non-negative"
        );
        anyhow::ensure!(self.metabolism.max_age > 0, "Max age must be positive");

        // Reproduction validation
        anyhow::ensure!(
            self.reproduction.reproduction_cost >= 0.0,
            "Reproduction cost must be non-negative"
        );
        anyhow::ensure!(
            self.reproduction.min_energy_to_reproduce >= self.reproduction.reproduction_cost,
            "Minimum energy to reproduce must cover the reproduction cost"
        );
        anyhow::ensure!(
            self.reproduction.mode != ReproductionMode::Sexual
                || self.reproduction.pairing_queue_capacity >= 2,
            "Sexual reproduction needs a pairing queue of at least 2"
        );

        // Evolution validation
        anyhow::ensure!(
            self.evolution.ticks_per_generation > 0,
            "Ticks per generation must be positive"
        );
        for (name, value) in [
            ("Elitism percent", self.evolution.elitism_percent),
            (
                "Top percent to reproduce",
                self.evolution.top_percent_to_reproduce,
            ),
            (
                "Crossover mutation percent",
                self.evolution.crossover_mutation_percent,
            ),
        ] {
            anyhow::ensure!(
                (0.0..=100.0).contains(&value),
                "{} must be in [0, 100]",
                name
            );
        }
        anyhow::ensure!(
            self.evolution.top_percent_to_reproduce > 0.0,
            "Top percent to reproduce must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.evolution.mutation_probability),
            "Mutation probability must be in [0.0, 1.0]"
        );
        if let Goal::Coordinate { x, y } = self.evolution.goal {
            let size = i32::from(self.world.size);
            anyhow::ensure!(
                (0..size).contains(&x) && (0..size).contains(&y),
                "Goal coordinate ({}, {}) lies outside the grid",
                x,
                y
            );
        }

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn neuron_counts(&self) -> NeuronCounts {
        NeuronCounts::with_hidden(self.brain.hidden_neurons)
    }

    /// Coordinate goal, if the objective is coordinate-seeking.
    #[must_use]
    pub fn goal_coord(&self) -> Option<Coord> {
        match self.evolution.goal {
            Goal::Coordinate { x, y } => Some(Coord::new(x, y)),
            Goal::Food => None,
        }
    }

    /// Digest of the simulation-relevant sections; the seed is excluded.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{}", self.world.size).as_bytes());
        hasher.update(format!("{:?}", self.brain).as_bytes());
        hasher.update(format!("{:?}", self.metabolism).as_bytes());
        hasher.update(format!("{:?}", self.reproduction).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hex::encode(hasher.finalize())
    }
}
