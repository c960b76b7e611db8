//! Error types for the evogrid_io crate.
//!
//! Everything that crosses the collaborator boundary (genome imports, population
//! snapshots, config files) fails through [`IoError`]. File system failures are
//! usually wrapped with [`IoError::with_context`] naming the path involved, so
//! callers that care about the kind of failure should match on [`IoError::root`].

use thiserror::Error;

/// Failures at the collaborator boundary: files, formats and validation of
/// imported data.
#[derive(Error, Debug)]
pub enum IoError {
    /// A genome or population could not be encoded to or decoded from JSON
    /// text (exported genomes, hex-wrapped genome strings).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A binary archive of the world or a genome failed to serialize, failed
    /// byte validation on load, or could not be deserialized.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Reading or writing a file failed.
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// The JSON body of a compressed snapshot is malformed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A config file is not valid TOML or does not match the config layout.
    #[error("Config error: {0}")]
    Config(String),

    /// The gzip stream around a snapshot could not be written or read.
    #[error("Compression error: {0}")]
    Compression(String),

    /// Well-formed data that breaks a domain rule (wrong genome length,
    /// out-of-range neuron id, invalid config value).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A snapshot or other required file does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// An inner error annotated with what was being attempted.
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    /// Creates a JSON encoding or decoding error.
    #[must_use]
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a binary archive error.
    #[must_use]
    pub fn archive<S: Into<String>>(msg: S) -> Self {
        Self::Archive(msg.into())
    }

    /// Creates a config parse or render error.
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a domain validation error.
    #[must_use]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a not-found error for the named resource.
    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound(resource.into())
    }

    /// Creates a gzip stream error.
    #[must_use]
    pub fn compression<S: Into<String>>(msg: S) -> Self {
        Self::Compression(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping context layers.
    #[must_use]
    pub fn root(&self) -> &IoError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IoError::validation("genome has 3 genes, expected 4");
        assert_eq!(
            err.to_string(),
            "Validation error: genome has 3 genes, expected 4"
        );
    }

    #[test]
    fn test_error_context() {
        let err = IoError::not_found("config.toml").with_context("loading config");
        assert!(err.to_string().starts_with("loading config"));
        assert!(matches!(err.root(), IoError::NotFound(_)));
    }

    #[test]
    fn test_nested_context_reaches_root() {
        let err = IoError::archive("validation failed")
            .with_context("reading world.bin")
            .with_context("resuming run");
        assert_eq!(
            err.to_string(),
            "resuming run: reading world.bin: Archive error: validation failed"
        );
        assert!(matches!(err.root(), IoError::Archive(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IoError = io_err.into();
        assert!(matches!(err, IoError::FileSystem(_)));
    }
}
