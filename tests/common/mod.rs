pub mod macros;

use evogrid_core::brain::{Action, Sensor};
use evogrid_core::config::AppConfig;
use evogrid_core::World;
use evogrid_data::{Coord, Gene, Genome, OrganismId, SinkKind, SourceKind};

/// Builds small hand-made worlds: nothing is seeded at random, every cell
/// and organism is placed explicitly.
#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    organisms: Vec<(Coord, Genome)>,
    food: Vec<Coord>,
    walls: Vec<Coord>,
    radioactive: Vec<Coord>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.size = 16;
        config.world.initial_population = 0;
        config.world.initial_food = 0;
        config.world.walls = 0;
        config.world.radioactive = 0;
        config.world.seed = Some(0);
        config.metabolism.idle_cost = 0.0;
        Self {
            config,
            organisms: Vec::new(),
            food: Vec::new(),
            walls: Vec::new(),
            radioactive: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, size: u16) -> Self {
        self.config.world.size = size;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_organism(mut self, x: i32, y: i32, genome: Genome) -> Self {
        self.organisms.push((Coord::new(x, y), genome));
        self
    }

    pub fn with_food(mut self, x: i32, y: i32) -> Self {
        self.food.push(Coord::new(x, y));
        self
    }

    pub fn with_wall(mut self, x: i32, y: i32) -> Self {
        self.walls.push(Coord::new(x, y));
        self
    }

    pub fn with_radioactive(mut self, x: i32, y: i32) -> Self {
        self.radioactive.push(Coord::new(x, y));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Builds the world and returns the organism ids in insertion order.
    pub fn build_with_ids(self) -> (World, Vec<OrganismId>) {
        let mut world = World::empty(self.config).expect("valid test config");
        for at in self.walls {
            world.place_wall(at).expect("wall placement");
        }
        for at in self.radioactive {
            world.place_radioactive(at).expect("radioactive placement");
        }
        for at in self.food {
            world.place_food(at).expect("food placement");
        }
        let ids = self
            .organisms
            .into_iter()
            .map(|(at, genome)| world.spawn(at, genome).expect("organism placement"))
            .collect();
        (world, ids)
    }

    pub fn build(self) -> World {
        self.build_with_ids().0
    }
}

/// Hand-wires genomes gene by gene.
#[allow(dead_code)]
#[derive(Default)]
pub struct GenomeBuilder {
    genes: Vec<Gene>,
}

#[allow(dead_code)]
impl GenomeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensor_to_action(mut self, sensor: Sensor, action: Action, weight: i16) -> Self {
        self.genes.push(Gene::new(
            SourceKind::Sensor,
            sensor.id(),
            SinkKind::Action,
            action.id(),
            weight,
        ));
        self
    }

    pub fn sensor_to_hidden(mut self, sensor: Sensor, hidden: u16, weight: i16) -> Self {
        self.genes.push(Gene::new(
            SourceKind::Sensor,
            sensor.id(),
            SinkKind::Hidden,
            hidden,
            weight,
        ));
        self
    }

    pub fn hidden_to_hidden(mut self, from: u16, to: u16, weight: i16) -> Self {
        self.genes.push(Gene::new(
            SourceKind::Hidden,
            from,
            SinkKind::Hidden,
            to,
            weight,
        ));
        self
    }

    pub fn hidden_to_action(mut self, hidden: u16, action: Action, weight: i16) -> Self {
        self.genes.push(Gene::new(
            SourceKind::Hidden,
            hidden,
            SinkKind::Action,
            action.id(),
            weight,
        ));
        self
    }

    pub fn build(self) -> Genome {
        Genome::from_genes(self.genes)
    }
}

/// A genome whose brain never fires an action.
#[allow(dead_code)]
pub fn inert_genome() -> Genome {
    Genome::default()
}
