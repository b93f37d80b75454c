//! Batch runner
//!
//! Migrates every configured family, one after another, and writes each
//! migrated document back.

use crate::config::BatchConfig;
use crate::engine::migrate;
use crate::error::{BatchResult, Halted};
use crate::family::{Family, FamilySpec};
use crate::log::MigrationLog;
use crate::resolver::Resolver;
use crate::storage::{read_document, write_document};
use std::path::{Path, PathBuf};

/// Batch runner options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Record a halted family and continue with the next one
    pub keep_going: bool,
}

impl BatchOptions {
    /// Create default options (stop at the first fatal condition)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set keep-going mode
    #[inline]
    #[must_use]
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }
}

/// Result of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Concatenated log of every family
    pub log: MigrationLog,
    /// Files rewritten
    pub written: Vec<PathBuf>,
    /// Families that halted (only with `keep_going`)
    pub failures: Vec<Halted>,
}

impl BatchReport {
    /// Check if every family completed
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Migrate every configured family, stopping at the first fatal condition
///
/// # Errors
/// - `BatchError::Registry` if a built-in step table is incomplete
/// - `BatchError::Halted` if a family's migration halted
/// - `BatchError::Storage` if a migrated document cannot be written
pub fn migrate_all(config: &BatchConfig, resolver: &mut dyn Resolver) -> BatchResult<BatchReport> {
    migrate_all_with(config, BatchOptions::default(), resolver)
}

/// Migrate every configured family
///
/// # Errors
/// See [`migrate_all`]; with `keep_going`, halted families are reported in
/// [`BatchReport::failures`] instead.
pub fn migrate_all_with(
    config: &BatchConfig,
    options: BatchOptions,
    resolver: &mut dyn Resolver,
) -> BatchResult<BatchReport> {
    let families = config.families();
    let specs = families
        .iter()
        .map(|&(family, _)| {
            let spec = FamilySpec::builtin(family);
            spec.validate().map(|()| spec)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = BatchReport::default();
    for (spec, (family, path)) in specs.iter().zip(families) {
        tracing::info!(%family, path = %path.display(), "migrating library");
        match migrate_file(path, spec, resolver) {
            Ok((log, written)) => {
                report.log.extend(log);
                if written {
                    report.written.push(path.to_path_buf());
                }
            }
            Err(FileError::Halted(halted)) if options.keep_going => {
                report.log.extend(halted.log.clone());
                report.failures.push(halted);
            }
            Err(FileError::Halted(halted)) => return Err(halted.into()),
            Err(FileError::Storage(err)) => return Err(err.into()),
        }
    }
    Ok(report)
}

enum FileError {
    Halted(Halted),
    Storage(crate::error::StorageError),
}

/// Migrate one file in place; returns the log and whether the file was rewritten
fn migrate_file(
    path: &Path,
    spec: &FamilySpec,
    resolver: &mut dyn Resolver,
) -> Result<(MigrationLog, bool), FileError> {
    let family: Family = spec.family;
    let raw = match read_document(path) {
        Ok(raw) => raw,
        Err(err) => {
            let mut log = MigrationLog::new();
            log.unreadable(format!(
                "{family}: {} is not readable ({})",
                path.display(),
                err.kind()
            ));
            return Ok((log, false));
        }
    };

    let mut migration = migrate(&raw, spec, resolver).map_err(FileError::Halted)?;
    if migration.output.is_none() && migration.log.is_empty() {
        migration
            .log
            .unreadable(format!("{family}: {} is not a JSON mapping", path.display()));
    }
    let written = match &migration.output {
        // Already canonical at the target version
        Some(bytes) if *bytes == raw => false,
        Some(bytes) => {
            write_document(path, bytes).map_err(FileError::Storage)?;
            true
        }
        None => false,
    };
    Ok((migration.log, written))
}
