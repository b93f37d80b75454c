//! labconf Migration Engine
//!
//! Upgrades versioned JSON library documents in place.
//!
//! # Core Concepts
//!
//! - [`Family`]: an independently versioned document kind (instruments,
//!   channels, sweeps, measurement filters)
//! - [`StepRegistry`]: ordered `source version → step` table per family
//! - [`migrate`]: drive one document to its family's target version
//! - [`Resolver`]: operator capability for steps that need a human answer
//! - [`MigrationLog`]: applied steps and soft conditions, returned with
//!   every result
//! - [`migrate_all`]: batch runner over a [`BatchConfig`]
//!
//! # Numbers
//!
//! Floats survive a migration bit for bit. Integers are exact within the
//! `i64`/`u64` range; larger literals are carried as `f64` and come back in
//! float notation.
//!
//! # Example
//!
//! ```rust
//! use labconf_migrate::{migrate, Family, FamilySpec, NoResolver};
//!
//! let raw = br#"{"x__class__": "SweepLibrary", "sweepDict": {}}"#;
//! let spec = FamilySpec::builtin(Family::Sweep);
//!
//! let migration = migrate(raw, &spec, &mut NoResolver).unwrap();
//! assert_eq!(migration.to_version, Some(1));
//! assert_eq!(migration.log.messages(), vec!["Sweep: version 0 to 1"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod batch;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod family;
pub mod filter;
pub mod log;
pub mod registry;
pub mod resolver;
pub mod snakeify;
pub mod steps;
pub mod storage;

pub use batch::{migrate_all, migrate_all_with, BatchOptions, BatchReport};
pub use config::BatchConfig;
pub use document::{tag_class, Document, Record};
pub use engine::{migrate, Migration};
pub use error::{
    BatchError, BatchResult, ConfigError, Halted, MigrateError, RegistryError, StorageError,
    ValidationFailure,
};
pub use family::{Family, FamilySpec};
pub use filter::{is_class, matching};
pub use log::{EntryKind, Level, LogEntry, MigrationLog};
pub use registry::{Step, StepContext, StepFn, StepRegistry};
pub use resolver::{NoResolver, Resolver, TerminalResolver};
pub use snakeify::{rec_snakeify, snakeify};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
