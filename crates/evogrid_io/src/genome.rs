//! Genome export and validated import.
//!
//! The exported unit is the modulo-reduced genome as a plain JSON array of
//! `{source_kind, source_id, sink_kind, sink_id, weight}` objects. Import
//! checks shape and ranges so the core only ever sees well-formed genomes.

use crate::error::{IoError, Result};
use crate::serialization::{from_hex_dna, from_json, to_hex_dna, to_json, to_json_pretty};
use evogrid_core::brain::{GenomeLogic, NeuronCounts};
use evogrid_data::{Gene, Genome, SinkKind, SourceKind};

/// Serializes the normalized form of `genome`.
pub fn export_genome(genome: &Genome, counts: NeuronCounts) -> Result<String> {
    to_json(&genome.normalized(counts))
}

pub fn export_genome_pretty(genome: &Genome, counts: NeuronCounts) -> Result<String> {
    to_json_pretty(&genome.normalized(counts))
}

/// Parses and validates an exported genome. `expected_len` is the
/// configured gene count.
pub fn import_genome(json: &str, counts: NeuronCounts, expected_len: usize) -> Result<Genome> {
    let genome: Genome = from_json(json)?;
    validate_genome(&genome, counts, expected_len)?;
    Ok(genome)
}

pub fn export_genome_hex(genome: &Genome, counts: NeuronCounts) -> Result<String> {
    to_hex_dna(&genome.normalized(counts))
}

pub fn import_genome_hex(hex: &str, counts: NeuronCounts, expected_len: usize) -> Result<Genome> {
    let genome: Genome = from_hex_dna(hex)?;
    validate_genome(&genome, counts, expected_len)?;
    Ok(genome)
}

/// Rejects genomes of the wrong length or with ids outside their kind's
/// neuron range.
pub fn validate_genome(genome: &Genome, counts: NeuronCounts, expected_len: usize) -> Result<()> {
    if genome.len() != expected_len {
        return Err(IoError::validation(format!(
            "genome has {} genes, expected {}",
            genome.len(),
            expected_len
        )));
    }
    for (idx, gene) in genome.iter().enumerate() {
        validate_gene(gene, counts).map_err(|e| e.with_context(format!("gene {}", idx)))?;
    }
    Ok(())
}

fn validate_gene(gene: &Gene, counts: NeuronCounts) -> Result<()> {
    let (source_label, source_limit) = match gene.source_kind {
        SourceKind::Sensor => ("sensor", counts.sensors),
        SourceKind::Hidden => ("hidden", counts.hidden),
    };
    if usize::from(gene.source_id) >= source_limit {
        return Err(IoError::validation(format!(
            "source {} id {} out of range (0..{})",
            source_label, gene.source_id, source_limit
        )));
    }
    let (sink_label, sink_limit) = match gene.sink_kind {
        SinkKind::Hidden => ("hidden", counts.hidden),
        SinkKind::Action => ("action", counts.actions),
    };
    if usize::from(gene.sink_id) >= sink_limit {
        return Err(IoError::validation(format!(
            "sink {} id {} out of range (0..{})",
            sink_label, gene.sink_id, sink_limit
        )));
    }
    Ok(())
}
