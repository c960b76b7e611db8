use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Divisor that maps a raw `i16` weight onto roughly `[-5.0, 5.0)`.
pub const WEIGHT_SCALE: f32 = 6553.6;

/// Where a synapse draws its input from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Externally indexed sensor neuron.
    Sensor,
    /// Internal hidden neuron.
    Hidden,
}

impl SourceKind {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            SourceKind::Sensor => SourceKind::Hidden,
            SourceKind::Hidden => SourceKind::Sensor,
        }
    }
}

/// Where a synapse delivers its output.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Internal hidden neuron.
    Hidden,
    /// Externally indexed action neuron.
    Action,
}

impl SinkKind {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            SinkKind::Hidden => SinkKind::Action,
            SinkKind::Action => SinkKind::Hidden,
        }
    }
}

/// One candidate synapse of a genome.
///
/// Ids are raw until the brain compiler reduces them modulo the neuron count
/// of their kind, so any `u16` is a valid gene.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Gene {
    pub source_kind: SourceKind,
    pub source_id: u16,
    pub sink_kind: SinkKind,
    pub sink_id: u16,
    pub weight: i16,
}

impl Gene {
    #[must_use]
    pub fn new(
        source_kind: SourceKind,
        source_id: u16,
        sink_kind: SinkKind,
        sink_id: u16,
        weight: i16,
    ) -> Self {
        Self {
            source_kind,
            source_id,
            sink_kind,
            sink_id,
            weight,
        }
    }

    /// Weight as used by the evaluator.
    #[must_use]
    pub fn weight_as_f32(&self) -> f32 {
        f32::from(self.weight) / WEIGHT_SCALE
    }

    /// True when the gene connects a hidden neuron to itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source_kind == SourceKind::Hidden
            && self.sink_kind == SinkKind::Hidden
            && self.source_id == self.sink_id
    }
}

/// Fixed-length, ordered list of genes. Identity is positional.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[serde(transparent)]
pub struct Genome {
    pub genes: Vec<Gene>,
}

impl Genome {
    #[must_use]
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gene> {
        self.genes.iter()
    }
}

impl From<Vec<Gene>> for Genome {
    fn from(genes: Vec<Gene>) -> Self {
        Self { genes }
    }
}
