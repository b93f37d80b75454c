//! Migration step registry
//!
//! An explicit, ordered table `source version → step` per family. The chain
//! is strictly linear: the step registered at `n` takes a document to `n + 1`.

use crate::document::Record;
use crate::error::{MigrateError, RegistryError};
use crate::family::Family;
use crate::log::MigrationLog;
use crate::resolver::Resolver;
use std::collections::BTreeMap;

/// Step function
pub type StepFn = fn(&mut StepContext<'_>) -> Result<(), MigrateError>;

/// State handed to a running step
pub struct StepContext<'a> {
    /// Family being migrated
    pub family: Family,
    /// Top-level document fields other than the primary dictionary
    pub header: &'a mut Record,
    /// Primary dictionary
    pub primary: &'a mut Record,
    /// Log for warnings raised by the step
    pub log: &'a mut MigrationLog,
    /// Operator resolver for steps that need a human answer
    pub resolver: &'a mut dyn Resolver,
}

/// A registered step
#[derive(Clone, Copy)]
pub struct Step {
    /// Short description used in traces
    pub name: &'static str,
    /// Transformation
    pub run: StepFn,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Ordered step table of one family
#[derive(Debug, Default, Clone)]
pub struct StepRegistry {
    steps: BTreeMap<u32, Step>,
}

impl StepRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: BTreeMap::new(),
        }
    }

    /// Register the step taking a document from `from` to `from + 1`
    ///
    /// Replaces any step already registered at `from`.
    pub fn register(&mut self, from: u32, name: &'static str, run: StepFn) {
        self.steps.insert(from, Step { name, run });
    }

    /// Builder form of [`register`](Self::register)
    #[inline]
    #[must_use]
    pub fn with_step(mut self, from: u32, name: &'static str, run: StepFn) -> Self {
        self.register(from, name, run);
        self
    }

    /// Remove the step starting at `from`
    pub fn remove(&mut self, from: u32) -> Option<Step> {
        self.steps.remove(&from)
    }

    /// Step starting at `from`
    #[inline]
    #[must_use]
    pub fn get(&self, from: u32) -> Option<&Step> {
        self.steps.get(&from)
    }

    /// Registered source versions, ascending
    #[must_use]
    pub fn versions(&self) -> Vec<u32> {
        self.steps.keys().copied().collect()
    }

    /// Number of registered steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check contiguous coverage of `0..target`
    ///
    /// # Errors
    /// - `RegistryError::Gap` for the first version below `target` without a step
    /// - `RegistryError::Beyond` for a step starting at or after `target`
    pub fn validate(&self, family: Family, target: u32) -> Result<(), RegistryError> {
        if let Some(version) = (0..target).find(|v| !self.steps.contains_key(v)) {
            return Err(RegistryError::Gap { family, version });
        }
        if let Some(&version) = self.steps.range(target..).next().map(|(v, _)| v) {
            return Err(RegistryError::Beyond {
                family,
                version,
                target,
            });
        }
        Ok(())
    }
}
