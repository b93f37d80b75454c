//! Migration engine
//!
//! Drives one document from its stored version to the family's target
//! version. The engine works on an owned copy: if any step fails, nothing is
//! produced and the caller has nothing to write.

use crate::document::{Document, Record};
use crate::error::{Halted, MigrateError, ValidationFailure};
use crate::family::FamilySpec;
use crate::log::MigrationLog;
use crate::registry::StepContext;
use crate::resolver::Resolver;
use serde_json::Value;

/// Outcome of a migration that did not halt
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    /// Serialized document at the target version, or `None` when the input
    /// was unreadable or failed validation
    pub output: Option<Vec<u8>>,
    /// Applied steps and soft conditions, in order
    pub log: MigrationLog,
    /// Version the document was loaded at (`None` if it never validated)
    pub from_version: Option<u32>,
    /// Version of `output`
    pub to_version: Option<u32>,
}

impl Migration {
    fn skipped(log: MigrationLog) -> Self {
        Self {
            output: None,
            log,
            from_version: None,
            to_version: None,
        }
    }

    /// Check if any step was applied
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!((self.from_version, self.to_version), (Some(from), Some(to)) if from != to)
    }
}

/// Migrate raw document bytes to `spec.target_version`
///
/// # Errors
/// Returns [`Halted`] when a step is missing or fails; the log it carries
/// ends with the fatal entry.
pub fn migrate(
    raw: &[u8],
    spec: &FamilySpec,
    resolver: &mut dyn Resolver,
) -> Result<Migration, Halted> {
    let family = spec.family;
    let mut log = MigrationLog::new();

    let root: Record = match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(root)) => root,
        Ok(_) => {
            tracing::debug!(%family, "document is not a JSON mapping");
            return Ok(Migration::skipped(log));
        }
        Err(err) => {
            tracing::debug!(%family, error = %err, "document is not valid JSON");
            return Ok(Migration::skipped(log));
        }
    };

    let mut document = match Document::from_root(root, spec) {
        Ok(document) => document,
        Err(failure) => {
            log.validation(format!("{family}: {failure}"));
            return Ok(Migration::skipped(log));
        }
    };

    let from_version = document.version();
    if from_version > spec.target_version {
        let failure = ValidationFailure::NewerVersion {
            found: from_version,
            target: spec.target_version,
        };
        log.validation(format!("{family}: {failure}"));
        return Ok(Migration::skipped(log));
    }

    while document.version() < spec.target_version {
        let version = document.version();
        let Some(step) = spec.steps.get(version).copied() else {
            return Err(halt(spec, version, MigrateError::MissingStep { family, version }, log));
        };

        tracing::debug!(%family, version, step = step.name, "applying step");
        let (header, primary) = document.parts_mut();
        let result = (step.run)(&mut StepContext {
            family,
            header,
            primary,
            log: &mut log,
            resolver: &mut *resolver,
        });
        if let Err(error) = result {
            return Err(halt(spec, version, error, log));
        }

        log.step(family, version);
        document.set_version(version + 1);
    }

    let to_version = document.version();
    let output = match document.to_bytes() {
        Ok(bytes) => bytes,
        Err(err) => return Err(halt(spec, to_version, MigrateError::Serialize(err), log)),
    };

    Ok(Migration {
        output: Some(output),
        log,
        from_version: Some(from_version),
        to_version: Some(to_version),
    })
}

fn halt(spec: &FamilySpec, version: u32, error: MigrateError, mut log: MigrationLog) -> Halted {
    log.fatal(format!("{}: {error}", spec.family));
    Halted {
        family: spec.family,
        version,
        error,
        log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::Family;
    use crate::log::EntryKind;
    use crate::resolver::NoResolver;

    #[test]
    fn unparsable_input_is_silent() {
        let spec = FamilySpec::builtin(Family::Sweep);
        for raw in [&b"{not json"[..], &b"[1, 2]"[..], &b""[..]] {
            let migration = migrate(raw, &spec, &mut NoResolver).unwrap();
            assert_eq!(migration.output, None);
            assert!(migration.log.is_empty());
            assert!(!migration.changed());
        }
    }

    #[test]
    fn validation_failure_logged() {
        let spec = FamilySpec::builtin(Family::Sweep);
        let raw = br#"{"x__class__": "Other", "sweepDict": {}}"#;
        let migration = migrate(raw, &spec, &mut NoResolver).unwrap();
        assert_eq!(migration.output, None);
        assert!(migration.log.contains_kind(EntryKind::Validation));
    }

    #[test]
    fn newer_version_left_alone() {
        let spec = FamilySpec::builtin(Family::Sweep);
        let migration = migrate(
            br#"{"x__class__": "SweepLibrary", "sweepDict": {}, "version": 9}"#,
            &spec,
            &mut NoResolver,
        )
        .unwrap();
        assert_eq!(migration.output, None);
        assert_eq!(
            migration.log.messages(),
            vec!["Sweep: document version 9 is newer than supported version 1"]
        );
    }

    #[test]
    fn sweep_gains_version() {
        let spec = FamilySpec::builtin(Family::Sweep);
        let raw = br#"{"x__class__": "SweepLibrary", "sweepDict": {}}"#;
        let migration = migrate(raw, &spec, &mut NoResolver).unwrap();
        let output: Value = serde_json::from_slice(migration.output.as_deref().unwrap()).unwrap();
        assert_eq!(output["version"], 1);
        assert_eq!(migration.log.messages(), vec!["Sweep: version 0 to 1"]);
        assert!(migration.changed());
    }

    #[test]
    fn missing_step_halts() {
        let mut spec = FamilySpec::builtin(Family::Instrument);
        spec.steps.remove(2);
        let halted = migrate(
            br#"{"x__class__": "InstrumentLibrary", "instrDict": {}, "version": 1}"#,
            &spec,
            &mut NoResolver,
        )
        .unwrap_err();

        assert!(matches!(
            halted.error,
            MigrateError::MissingStep {
                family: Family::Instrument,
                version: 2
            }
        ));
        assert_eq!(halted.version, 2);
        assert_eq!(
            halted.log.messages(),
            vec![
                "Instrument: version 1 to 2",
                "Instrument: no migration step registered for version 2"
            ]
        );
        assert!(halted.log.contains_kind(EntryKind::Fatal));
    }
}
