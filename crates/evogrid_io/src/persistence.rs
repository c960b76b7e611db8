//! Population snapshots: gzip-compressed JSON, plus raw rkyv archives for
//! grids and other archivable values.

use crate::error::{IoError, Result};
use chrono::Utc;
use evogrid_core::brain::{GenomeLogic, NeuronCounts};
use evogrid_core::config::AppConfig;
use evogrid_data::Genome;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rkyv::de::deserializers::SharedDeserializeMap;
use rkyv::ser::serializers::AllocSerializer;
use rkyv::ser::Serializer;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{info, warn};

pub const SNAPSHOT_VERSION: u32 = 1;

/// The genomes of a population at a generation boundary, enough to resume
/// evolution with [`evogrid_core::World::with_genomes`].
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct PopulationSnapshot {
    pub version: u32,
    pub generation: u64,
    /// RFC 3339 UTC timestamp.
    pub saved_at: String,
    pub config_fingerprint: String,
    pub hidden_neurons: usize,
    pub gene_count: usize,
    pub genomes: Vec<Genome>,
}

impl PopulationSnapshot {
    /// Genomes are stored normalized so that mutated ids always validate
    /// on import.
    #[must_use]
    pub fn new(config: &AppConfig, generation: u64, genomes: Vec<Genome>) -> Self {
        let counts = config.neuron_counts();
        let genomes = genomes.iter().map(|g| g.normalized(counts)).collect();
        Self {
            version: SNAPSHOT_VERSION,
            generation,
            saved_at: Utc::now().to_rfc3339(),
            config_fingerprint: config.fingerprint(),
            hidden_neurons: config.brain.hidden_neurons,
            gene_count: config.brain.gene_count,
            genomes,
        }
    }

    /// Checks that the genomes fit `config`. A different fingerprint is only
    /// logged since costs and rates may be tuned between runs.
    pub fn check_compatible(&self, config: &AppConfig) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(IoError::validation(format!(
                "snapshot version {} is not supported (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }
        if self.gene_count != config.brain.gene_count {
            return Err(IoError::validation(format!(
                "snapshot genomes have {} genes, config expects {}",
                self.gene_count, config.brain.gene_count
            )));
        }
        let counts = NeuronCounts::with_hidden(config.brain.hidden_neurons);
        for (idx, genome) in self.genomes.iter().enumerate() {
            crate::genome::validate_genome(genome, counts, config.brain.gene_count)
                .map_err(|e| e.with_context(format!("snapshot genome {}", idx)))?;
        }
        if self.config_fingerprint != config.fingerprint() {
            warn!(
                snapshot = %self.config_fingerprint,
                current = %config.fingerprint(),
                "Snapshot was taken under a different config"
            );
        }
        Ok(())
    }
}

pub fn save_snapshot<P: AsRef<Path>>(path: P, snapshot: &PopulationSnapshot) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("creating snapshot {}", path.display()))
    })?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut encoder, snapshot)?;
    encoder
        .finish()
        .and_then(|mut w| w.flush())
        .map_err(|e| IoError::compression(e.to_string()))?;
    info!(
        path = %path.display(),
        generation = snapshot.generation,
        genomes = snapshot.genomes.len(),
        "Snapshot saved"
    );
    Ok(())
}

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<PopulationSnapshot> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::not_found(path.display().to_string()));
    }
    let file = File::open(path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("opening snapshot {}", path.display()))
    })?;
    let mut json = String::new();
    GzDecoder::new(BufReader::new(file))
        .read_to_string(&mut json)
        .map_err(|e| IoError::compression(e.to_string()))?;
    let snapshot: PopulationSnapshot = serde_json::from_str(&json)?;
    Ok(snapshot)
}

pub fn save_rkyv<T, P>(data: &T, path: P) -> Result<()>
where
    T: RkyvSerialize<AllocSerializer<4096>>,
    P: AsRef<Path>,
{
    let mut serializer = AllocSerializer::<4096>::default();
    serializer
        .serialize_value(data)
        .map_err(|e| IoError::archive(format!("serialization failed: {:?}", e)))?;
    let bytes = serializer.into_serializer().into_inner();
    std::fs::write(path.as_ref(), &bytes).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing {}", path.as_ref().display()))
    })
}

pub fn load_rkyv<T, P>(path: P) -> Result<T>
where
    T: Archive,
    T::Archived: RkyvDeserialize<T, SharedDeserializeMap>
        + for<'a> rkyv::CheckBytes<rkyv::validation::validators::DefaultValidator<'a>>,
    P: AsRef<Path>,
{
    let bytes = std::fs::read(path.as_ref()).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading {}", path.as_ref().display()))
    })?;
    let archived = rkyv::check_archived_root::<T>(&bytes)
        .map_err(|e| IoError::archive(format!("validation failed: {:?}", e)))?;
    let mut deserializer = SharedDeserializeMap::default();
    archived
        .deserialize(&mut deserializer)
        .map_err(|e| IoError::archive(format!("deserialization failed: {:?}", e)))
}
