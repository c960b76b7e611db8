pub mod crossover;
pub mod forward;
pub mod mutation;
pub mod topology;

pub use evogrid_data::{Gene, Genome, SinkKind, SourceKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use topology::{compile, random_gene_with_rng};

/// Output held by hidden neurons before their first update, and forever by
/// neurons that nothing drives.
pub const INITIAL_NEURON_OUTPUT: f32 = 0.5;

pub const SENSOR_LABELS: [&str; 14] = [
    "LocX",
    "LocY",
    "BoundaryDistX",
    "BoundaryDistY",
    "BoundaryDist",
    "LookNorth",
    "LookEast",
    "LookSouth",
    "LookWest",
    "Energy",
    "Age",
    "Random",
    "Oscillator",
    "Facing",
];

pub const ACTION_LABELS: [&str; 8] = [
    "MoveX",
    "MoveY",
    "MoveEast",
    "MoveWest",
    "MoveNorth",
    "MoveSouth",
    "MoveForward",
    "MoveRandom",
];

pub const SENSOR_COUNT: usize = SENSOR_LABELS.len();
pub const ACTION_COUNT: usize = ACTION_LABELS.len();

/// Sensor neuron ids, in gene index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Sensor {
    LocX = 0,
    LocY,
    BoundaryDistX,
    BoundaryDistY,
    BoundaryDist,
    LookNorth,
    LookEast,
    LookSouth,
    LookWest,
    Energy,
    Age,
    Random,
    Oscillator,
    Facing,
}

impl Sensor {
    pub const ALL: [Sensor; SENSOR_COUNT] = [
        Sensor::LocX,
        Sensor::LocY,
        Sensor::BoundaryDistX,
        Sensor::BoundaryDistY,
        Sensor::BoundaryDist,
        Sensor::LookNorth,
        Sensor::LookEast,
        Sensor::LookSouth,
        Sensor::LookWest,
        Sensor::Energy,
        Sensor::Age,
        Sensor::Random,
        Sensor::Oscillator,
        Sensor::Facing,
    ];

    #[must_use]
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    #[must_use]
    pub fn id(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        SENSOR_LABELS[self as usize]
    }
}

/// Action neuron ids, in gene index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Action {
    MoveX = 0,
    MoveY,
    MoveEast,
    MoveWest,
    MoveNorth,
    MoveSouth,
    MoveForward,
    MoveRandom,
}

impl Action {
    #[must_use]
    pub fn id(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        ACTION_LABELS[self as usize]
    }
}

/// Neuron population sizes a genome is compiled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeuronCounts {
    pub sensors: usize,
    pub hidden: usize,
    pub actions: usize,
}

impl NeuronCounts {
    /// The simulator's fixed sensor/action catalogue with `hidden` neurons.
    #[must_use]
    pub fn with_hidden(hidden: usize) -> Self {
        Self {
            sensors: SENSOR_COUNT,
            hidden,
            actions: ACTION_COUNT,
        }
    }
}

/// Runtime state of a surviving hidden neuron.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub output: f32,
    /// Undriven neurons keep `INITIAL_NEURON_OUTPUT` forever.
    pub driven: bool,
}

/// A genome compiled into a pruned, feed-forward ordered connection list.
///
/// Connections reuse the [`Gene`] shape with hidden ids renumbered densely
/// into `0..neurons.len()`. Every hidden-sink connection precedes every
/// action-sink connection; `first_action` marks the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledBrain {
    pub connections: Vec<Gene>,
    pub neurons: Vec<Neuron>,
    pub first_action: usize,
    pub counts: NeuronCounts,
}

impl CompiledBrain {
    /// Evaluates one tick. See [`forward::evaluate`].
    pub fn evaluate<F>(&mut self, sensor: F) -> Vec<f32>
    where
        F: FnMut(usize) -> f32,
    {
        forward::evaluate(self, sensor)
    }

    #[must_use]
    pub fn hidden_connections(&self) -> &[Gene] {
        &self.connections[..self.first_action]
    }

    #[must_use]
    pub fn action_connections(&self) -> &[Gene] {
        &self.connections[self.first_action..]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// Hereditary operations on genomes.
pub trait GenomeLogic {
    fn new_random_with_rng<R: Rng>(gene_count: usize, counts: NeuronCounts, rng: &mut R) -> Self;

    /// With probability `p_mutation`, flips one bit of one gene.
    fn mutate_with_rng<R: Rng>(&mut self, p_mutation: f32, rng: &mut R) -> bool;

    /// Index-wise crossover; each position comes from `self`, `other`, or a
    /// fresh random gene with probability `mutation_percent / 100`.
    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        mutation_percent: f32,
        counts: NeuronCounts,
        rng: &mut R,
    ) -> Self;

    /// Single cut-point recombination producing two complementary children.
    fn splice(&self, other: &Self, cut: usize) -> (Self, Self)
    where
        Self: Sized;

    /// Ids reduced modulo the neuron count of their kind.
    fn normalized(&self, counts: NeuronCounts) -> Self;

    /// Display-grouping color `0xRRGGBB`, stable for equal genomes.
    fn signature_color(&self) -> u32;

    fn compile(&self, counts: NeuronCounts) -> CompiledBrain;
}

impl GenomeLogic for Genome {
    fn new_random_with_rng<R: Rng>(gene_count: usize, counts: NeuronCounts, rng: &mut R) -> Self {
        let genes = (0..gene_count)
            .map(|_| topology::random_gene_with_rng(counts, rng))
            .collect();
        Genome::from_genes(genes)
    }

    fn mutate_with_rng<R: Rng>(&mut self, p_mutation: f32, rng: &mut R) -> bool {
        mutation::mutate_with_rng(self, p_mutation, rng)
    }

    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        mutation_percent: f32,
        counts: NeuronCounts,
        rng: &mut R,
    ) -> Self {
        crossover::crossover_with_rng(self, other, mutation_percent, counts, rng)
    }

    fn splice(&self, other: &Self, cut: usize) -> (Self, Self) {
        crossover::splice(self, other, cut)
    }

    fn normalized(&self, counts: NeuronCounts) -> Self {
        Genome::from_genes(topology::normalize(self, counts))
    }

    fn signature_color(&self) -> u32 {
        let mut hash = 0xcbf2_9ce4_8422_2325_u64;
        for gene in &self.genes {
            let source = gene.source_id.to_le_bytes();
            let sink = gene.sink_id.to_le_bytes();
            let weight = gene.weight.to_le_bytes();
            let bytes = [
                gene.source_kind as u8,
                source[0],
                source[1],
                gene.sink_kind as u8,
                sink[0],
                sink[1],
                weight[0],
                weight[1],
            ];
            for byte in bytes {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x0100_0000_01b3_u64);
            }
        }
        ((hash ^ (hash >> 32)) as u32) & 0x00ff_ffff
    }

    fn compile(&self, counts: NeuronCounts) -> CompiledBrain {
        topology::compile(self, counts)
    }
}
