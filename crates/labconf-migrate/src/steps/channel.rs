//! Channel library steps

use super::introduce_version;
use crate::document::set_tag_module;
use crate::error::MigrateError;
use crate::filter::matching;
use crate::registry::{StepContext, StepRegistry};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Default digitizer trigger channel
pub const DEFAULT_TRIG_CHAN: &str = "digitizerTrig";

/// Module tag of current channel libraries
pub const LIBRARY_MODULE: &str = "QGL.ChannelLibrary";

const PHYSICAL_CLASSES: [&str; 2] = ["PhysicalQuadratureChannel", "PhysicalMarkerChannel"];

/// Recognized operator codes and the translator each selects
const TRANSLATORS: [(&str, &str); 3] =
    [("1", "APSPattern"), ("2", "APS2Pattern"), ("3", "TekPattern")];

/// Channel library step table
#[must_use]
pub fn registry() -> StepRegistry {
    StepRegistry::new()
        .with_step(0, "introduce version", introduce_version)
        .with_step(1, "move SSBFreq to logical channels", move_ssb_freq)
        .with_step(2, "default trigChan", default_trig_chan)
        .with_step(3, "assign translators", assign_translators)
}

/// `1 → 2`: logical channels take `frequency` from their physical channel's `SSBFreq`
///
/// All copies happen before `SSBFreq` is removed, so several logical channels
/// may share one physical channel.
///
/// # Errors
/// Never fails
pub fn move_ssb_freq(ctx: &mut StepContext<'_>) -> Result<(), MigrateError> {
    for name in matching(ctx.primary, &["Qubit", "Measurement"]) {
        let Some(phys_chan) = ctx.primary[&name].get("physChan").and_then(Value::as_str) else {
            ctx.log.notice(format!("logical channel '{name}' has no physChan"));
            continue;
        };
        let Some(physical) = ctx.primary.get(phys_chan) else {
            ctx.log.dangling(format!("physical channel '{phys_chan}' of '{name}' not found"));
            continue;
        };
        let Some(frequency) = physical.get("SSBFreq").cloned() else {
            ctx.log.notice(format!("physical channel '{phys_chan}' has no SSBFreq"));
            continue;
        };
        if let Some(Value::Object(logical)) = ctx.primary.get_mut(&name) {
            logical.insert("frequency".to_string(), frequency);
        }
    }

    for name in matching(ctx.primary, &["PhysicalQuadratureChannel"]) {
        if let Some(Value::Object(physical)) = ctx.primary.get_mut(&name) {
            physical.remove("SSBFreq");
        }
    }
    Ok(())
}

/// `2 → 3`: measurements without a trigger channel use [`DEFAULT_TRIG_CHAN`]
///
/// # Errors
/// Never fails
pub fn default_trig_chan(ctx: &mut StepContext<'_>) -> Result<(), MigrateError> {
    for name in matching(ctx.primary, &["Measurement"]) {
        let Some(Value::Object(measurement)) = ctx.primary.get_mut(&name) else {
            continue;
        };
        let unset = match measurement.get("trigChan") {
            None => true,
            Some(trig) => trig.as_str() == Some(""),
        };
        if unset {
            measurement.insert("trigChan".to_string(), Value::from(DEFAULT_TRIG_CHAN));
        }
    }
    Ok(())
}

/// `3 → 4`: physical channels get a `translator` chosen by the operator
///
/// The operator is asked once per distinct AWG, in ascending order.
///
/// # Errors
/// - `MigrateError::Resolver` if no answer could be obtained
/// - `MigrateError::InvalidOperatorResponse` for an unrecognized code
pub fn assign_translators(ctx: &mut StepContext<'_>) -> Result<(), MigrateError> {
    set_tag_module(ctx.header, LIBRARY_MODULE);
    ctx.log.notice(
        "physical channels have a new 'translator' attribute; \
         choose the instrument type of each AWG",
    );

    let channels = matching(ctx.primary, &PHYSICAL_CLASSES);
    let awgs: BTreeSet<String> = channels
        .iter()
        .filter_map(|name| awg_of(&ctx.primary[name]))
        .map(str::to_string)
        .collect();

    let mut translators = BTreeMap::new();
    for awg in awgs {
        let answer = ctx
            .resolver
            .resolve(&format!("Type for \"{awg}\" (1: APS1, 2: APS2, or 3: Tek5014): "))
            .map_err(MigrateError::Resolver)?;
        let translator =
            translator_for(answer.trim()).ok_or_else(|| MigrateError::InvalidOperatorResponse {
                device: awg.clone(),
                answer: answer.clone(),
                expected: recognized_codes(),
            })?;
        tracing::debug!(%awg, translator, "translator chosen");
        translators.insert(awg, translator);
    }

    for name in channels {
        let Some(Value::Object(channel)) = ctx.primary.get_mut(&name) else {
            continue;
        };
        let translator = channel
            .get("AWG")
            .and_then(Value::as_str)
            .and_then(|awg| translators.get(awg))
            .copied();
        match translator {
            Some(translator) => {
                channel.insert("translator".to_string(), Value::from(translator));
            }
            None => ctx
                .log
                .notice(format!("physical channel '{name}' has no AWG; translator left unset")),
        }
    }
    Ok(())
}

fn awg_of(record: &Value) -> Option<&str> {
    record.get("AWG").and_then(Value::as_str).filter(|awg| !awg.is_empty())
}

fn translator_for(code: &str) -> Option<&'static str> {
    TRANSLATORS.iter().find(|(c, _)| *c == code).map(|(_, translator)| *translator)
}

fn recognized_codes() -> String {
    TRANSLATORS.iter().map(|(code, _)| *code).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Record;
    use crate::family::Family;
    use crate::log::{EntryKind, MigrationLog};
    use crate::resolver::{NoResolver, Resolver};
    use serde_json::json;
    use std::io;

    struct Outcome {
        header: Record,
        primary: Record,
        log: MigrationLog,
        result: Result<(), MigrateError>,
    }

    fn run(step: crate::registry::StepFn, primary: Value, resolver: &mut dyn Resolver) -> Outcome {
        let Value::Object(mut primary) = primary else {
            panic!("expected a mapping")
        };
        let mut header = Record::new();
        let mut log = MigrationLog::new();
        let result = step(&mut StepContext {
            family: Family::Channel,
            header: &mut header,
            primary: &mut primary,
            log: &mut log,
            resolver,
        });
        Outcome {
            header,
            primary,
            log,
            result,
        }
    }

    #[test]
    fn ssb_freq_copied_then_removed() {
        let out = run(
            move_ssb_freq,
            json!({
                "q1": {"x__class__": "Qubit", "physChan": "BBNAPS1-12"},
                "m1": {"x__class__": "Measurement", "physChan": "BBNAPS1-12"},
                "BBNAPS1-12": {"x__class__": "PhysicalQuadratureChannel", "SSBFreq": 1.5e6}
            }),
            &mut NoResolver,
        );
        out.result.unwrap();
        assert_eq!(out.primary["q1"]["frequency"], json!(1.5e6));
        assert_eq!(out.primary["m1"]["frequency"], json!(1.5e6));
        assert!(out.primary["BBNAPS1-12"].get("SSBFreq").is_none());
        assert!(out.log.is_empty());
    }

    #[test]
    fn dangling_physical_channel_logged() {
        let out = run(
            move_ssb_freq,
            json!({"q1": {"x__class__": "Qubit", "physChan": "missing"}}),
            &mut NoResolver,
        );
        out.result.unwrap();
        assert!(out.primary["q1"].get("frequency").is_none());
        assert!(out.log.contains_kind(EntryKind::DanglingReference));
    }

    #[test]
    fn trig_chan_defaults() {
        let out = run(
            default_trig_chan,
            json!({
                "empty": {"x__class__": "Measurement", "trigChan": ""},
                "absent": {"x__class__": "Measurement"},
                "custom": {"x__class__": "Measurement", "trigChan": "custom"},
                "qubit": {"x__class__": "Qubit"}
            }),
            &mut NoResolver,
        );
        out.result.unwrap();
        assert_eq!(out.primary["empty"]["trigChan"], json!(DEFAULT_TRIG_CHAN));
        assert_eq!(out.primary["absent"]["trigChan"], json!(DEFAULT_TRIG_CHAN));
        assert_eq!(out.primary["custom"]["trigChan"], json!("custom"));
        assert!(out.primary["qubit"].get("trigChan").is_none());
    }

    #[test]
    fn translators_assigned_per_awg() {
        let mut prompts = Vec::new();
        let mut resolver = |prompt: &str| -> io::Result<String> {
            prompts.push(prompt.to_string());
            Ok(if prompt.contains("\"APS2-1\"") { "2\n" } else { "3" }.to_string())
        };
        let out = run(
            assign_translators,
            json!({
                "a": {"x__class__": "PhysicalQuadratureChannel", "AWG": "APS2-1"},
                "b": {"x__class__": "PhysicalMarkerChannel", "AWG": "APS2-1"},
                "c": {"x__class__": "PhysicalMarkerChannel", "AWG": "Tek"},
                "d": {"x__class__": "PhysicalMarkerChannel", "AWG": ""}
            }),
            &mut resolver,
        );
        out.result.unwrap();
        assert_eq!(out.header["x__module__"], json!(LIBRARY_MODULE));
        assert_eq!(out.primary["a"]["translator"], json!("APS2Pattern"));
        assert_eq!(out.primary["b"]["translator"], json!("APS2Pattern"));
        assert_eq!(out.primary["c"]["translator"], json!("TekPattern"));
        assert!(out.primary["d"].get("translator").is_none());
        assert_eq!(
            prompts,
            vec![
                "Type for \"APS2-1\" (1: APS1, 2: APS2, or 3: Tek5014): ",
                "Type for \"Tek\" (1: APS1, 2: APS2, or 3: Tek5014): ",
            ]
        );
    }

    #[test]
    fn invalid_answer_is_fatal() {
        let mut resolver = |_: &str| -> io::Result<String> { Ok("4".to_string()) };
        let out = run(
            assign_translators,
            json!({"a": {"x__class__": "PhysicalQuadratureChannel", "AWG": "APS1"}}),
            &mut resolver,
        );
        match out.result {
            Err(MigrateError::InvalidOperatorResponse { device, answer, expected }) => {
                assert_eq!(device, "APS1");
                assert_eq!(answer, "4");
                assert_eq!(expected, "1, 2, 3");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn resolver_failure_is_fatal() {
        let out = run(
            assign_translators,
            json!({"a": {"x__class__": "PhysicalQuadratureChannel", "AWG": "APS1"}}),
            &mut NoResolver,
        );
        assert!(matches!(out.result, Err(MigrateError::Resolver(_))));
    }

    #[test]
    fn no_awgs_no_prompts() {
        let out = run(
            assign_translators,
            json!({"q1": {"x__class__": "Qubit"}}),
            &mut NoResolver,
        );
        out.result.unwrap();
        assert_eq!(out.header["x__module__"], json!(LIBRARY_MODULE));
    }
}
