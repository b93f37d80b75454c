//! Error types for the migration engine
//!
//! Soft conditions (unreadable documents, validation failures, dangling
//! references) are log entries, not errors. The types here cover:
//! - Fatal step failures ([`MigrateError`], wrapped in [`Halted`])
//! - Registry self-check failures ([`RegistryError`])
//! - File and configuration I/O ([`StorageError`], [`ConfigError`])
//! - The batch runner ([`BatchError`])

use crate::family::Family;
use crate::log::MigrationLog;
use serde_json::Value;
use std::path::PathBuf;

/// Fatal conditions inside a family's migration chain
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Registry has no step for the document's current version
    #[error("no migration step registered for version {version}")]
    MissingStep {
        /// Family being migrated
        family: Family,
        /// Version without a step
        version: u32,
    },

    /// Operator answered with something outside the recognized codes
    #[error("invalid response {answer:?} for \"{device}\": expected one of {expected}")]
    InvalidOperatorResponse {
        /// Device the question was about
        device: String,
        /// Answer received
        answer: String,
        /// Recognized codes
        expected: String,
    },

    /// Operator resolver could not produce an answer
    #[error("operator resolver failed: {0}")]
    Resolver(#[source] std::io::Error),

    /// Final serialization failed
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A family's migration stopped on a fatal condition
///
/// Carries the log accumulated up to the failure. Nothing was written.
#[derive(Debug, thiserror::Error)]
#[error("{family} migration halted at version {version}: {error}")]
pub struct Halted {
    /// Family being migrated
    pub family: Family,
    /// Version the document was at when the chain stopped
    pub version: u32,
    /// Cause
    #[source]
    pub error: MigrateError,
    /// Log up to and including the fatal entry
    pub log: MigrationLog,
}

/// Reasons a document fails tag/shape validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationFailure {
    /// Tag class missing or different from the family's library class
    #[error("document is not a {expected} (found {})", .found.as_deref().unwrap_or("no class tag"))]
    WrongClass {
        /// Expected library class
        expected: &'static str,
        /// Class tag found, if any
        found: Option<String>,
    },

    /// Primary dictionary absent
    #[error("document has no '{key}' entry")]
    MissingPrimaryKey {
        /// Family's primary key
        key: &'static str,
    },

    /// Primary dictionary is not a mapping
    #[error("'{key}' is not a mapping")]
    PrimaryNotMapping {
        /// Family's primary key
        key: &'static str,
    },

    /// `version` is not a non-negative integer
    #[error("invalid version field: {0}")]
    BadVersion(Value),

    /// Document was written by a newer schema
    #[error("document version {found} is newer than supported version {target}")]
    NewerVersion {
        /// Version found in the document
        found: u32,
        /// Family's target version
        target: u32,
    },
}

/// Step registry self-check failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A version below the target has no step
    #[error("{family}: no step from version {version}")]
    Gap {
        /// Family whose registry is incomplete
        family: Family,
        /// First version without a step
        version: u32,
    },

    /// A step starts at or beyond the target version
    #[error("{family}: step from version {version} is beyond target version {target}")]
    Beyond {
        /// Family whose registry is inconsistent
        family: Family,
        /// Source version of the stray step
        version: u32,
        /// Family's target version
        target: u32,
    },
}

/// Errors writing documents back to disk
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error during file write
    #[error("io error writing {path}: {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors loading the batch configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Configuration file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML or has unknown keys
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors from the batch runner
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// A built-in registry failed its self-check
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A family's migration halted
    #[error("migration halted: {0}")]
    Halted(#[from] Box<Halted>),

    /// A migrated document could not be written
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<Halted> for BatchError {
    fn from(halted: Halted) -> Self {
        Self::Halted(Box::new(halted))
    }
}

/// Result type alias for batch operations
pub type BatchResult<T> = Result<T, BatchError>;
