//! # Evogrid IO
//!
//! Boundary between the simulation core and the outside world.
//!
//! - Structured error handling with [`IoError`]
//! - JSON and HexDNA helpers
//! - Validated genome import and export
//! - TOML config loading
//! - Gzip population snapshots and rkyv archives

/// TOML configuration loading and saving
pub mod config;
/// Error types and result alias for I/O operations
pub mod error;
/// Genome export and validated import
pub mod genome;
/// Population snapshots and binary archives
pub mod persistence;
/// JSON and HexDNA helpers
pub mod serialization;

pub use config::{load_config, parse_config, save_config};
pub use error::{IoError, Result};
pub use genome::{export_genome, import_genome, validate_genome};
pub use persistence::{load_snapshot, save_snapshot, PopulationSnapshot};
pub use serialization::{
    from_hex_dna, from_json, is_valid_hex_dna, read_json_file, to_hex_dna, to_json, to_json_pretty,
    write_json_file,
};
