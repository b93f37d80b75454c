//! Measurement filter library steps

use super::introduce_version;
use crate::error::MigrateError;
use crate::registry::{StepContext, StepRegistry};
use crate::snakeify::rec_snakeify;

/// Measurement filter library step table
#[must_use]
pub fn registry() -> StepRegistry {
    StepRegistry::new()
        .with_step(0, "introduce version", introduce_version)
        .with_step(1, "snake-case filter fields", snakeify_filter_fields)
}

/// `1 → 2`: filter fields are snake-cased; filter names are kept
///
/// # Errors
/// Never fails
pub fn snakeify_filter_fields(ctx: &mut StepContext<'_>) -> Result<(), MigrateError> {
    *ctx.primary = rec_snakeify(ctx.primary, 1);
    Ok(())
}
