//! Built-in migration steps, one module per family
//!
//! Each module exposes a `registry()` returning the family's complete step
//! table. Sweep libraries only ever had the version number introduced.

pub mod channel;
pub mod instrument;
pub mod measurement;

use crate::error::MigrateError;
use crate::registry::{StepContext, StepRegistry};

/// `0 → 1`: the version number is introduced, nothing else changes
///
/// # Errors
/// Never fails
pub fn introduce_version(_ctx: &mut StepContext<'_>) -> Result<(), MigrateError> {
    Ok(())
}

/// Sweep library step table
#[must_use]
pub fn sweep_registry() -> StepRegistry {
    StepRegistry::new().with_step(0, "introduce version", introduce_version)
}
