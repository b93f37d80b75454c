//! Instrument library steps

use super::introduce_version;
use crate::document::{set_tag_class, Record};
use crate::error::MigrateError;
use crate::filter::matching;
use crate::registry::{StepContext, StepRegistry};
use crate::snakeify::rec_snakeify;
use serde_json::Value;

/// Instrument library step table
#[must_use]
pub fn registry() -> StepRegistry {
    StepRegistry::new()
        .with_step(0, "introduce version", introduce_version)
        .with_step(1, "retag Labbrick64", retag_labbrick64)
        .with_step(2, "split X6 result streams", split_x6_result_streams)
        .with_step(3, "snake-case record fields", snakeify_record_fields)
}

/// `1 → 2`: `Labbrick64` records become `Labbrick`
///
/// # Errors
/// Never fails
pub fn retag_labbrick64(ctx: &mut StepContext<'_>) -> Result<(), MigrateError> {
    for name in matching(ctx.primary, &["Labbrick64"]) {
        if let Some(Value::Object(record)) = ctx.primary.get_mut(&name) {
            set_tag_class(record, "Labbrick");
        }
    }
    Ok(())
}

/// `2 → 3`: X6 channels get separate demodulated and raw result streams
///
/// # Errors
/// Never fails
pub fn split_x6_result_streams(ctx: &mut StepContext<'_>) -> Result<(), MigrateError> {
    for name in matching(ctx.primary, &["X6"]) {
        let channels = ctx
            .primary
            .get_mut(&name)
            .and_then(Value::as_object_mut)
            .and_then(|record| record.get_mut("channels"))
            .and_then(Value::as_object_mut);

        let Some(channels) = channels else {
            ctx.log.notice(format!("X6 '{name}' has no channels mapping, skipped"));
            continue;
        };

        for channel in channels.values_mut().filter_map(Value::as_object_mut) {
            split_channel(channel);
        }
    }
    Ok(())
}

fn split_channel(channel: &mut Record) {
    if let Some(enabled) = channel.remove("enableResultStream") {
        channel.insert("enableDemodResultStream".to_string(), enabled.clone());
        channel.insert("enableRawResultStream".to_string(), enabled);
    }
    if let Some(kernel) = channel.remove("kernel") {
        channel.insert("demodKernel".to_string(), kernel);
    }
    channel.insert("rawKernel".to_string(), Value::from(""));
}

/// `3 → 4`: record fields are snake-cased
///
/// # Errors
/// Never fails
pub fn snakeify_record_fields(ctx: &mut StepContext<'_>) -> Result<(), MigrateError> {
    *ctx.primary = rec_snakeify(ctx.primary, 1);
    Ok(())
}
