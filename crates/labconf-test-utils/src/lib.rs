//! Testing utilities for labconf workspace
//!
//! Document builders, sample libraries, and a canned operator resolver.

#![allow(missing_docs)]

use labconf_migrate::{Family, Resolver};
use serde_json::{json, Map, Value};
use std::io;
use std::path::{Path, PathBuf};

/// Library document of `family` at `version` (`None` leaves the field out)
pub fn library(family: Family, version: Option<u32>, entries: Value) -> Value {
    let mut doc = Map::new();
    doc.insert("x__class__".to_string(), Value::from(family.library_class()));
    doc.insert(family.primary_key().to_string(), entries);
    if let Some(version) = version {
        doc.insert("version".to_string(), Value::from(version));
    }
    Value::Object(doc)
}

/// Unversioned instrument library touching every instrument step
pub fn legacy_instrument_library() -> Value {
    library(
        Family::Instrument,
        None,
        json!({
            "Holz1": {"x__class__": "Labbrick64", "deviceName": "1686", "power": -10},
            "X6-1": {"x__class__": "X6", "deviceName": "0", "channels": {
                "s1": {"enableResultStream": true, "kernel": "k1", "IFfreq": 10e6}
            }},
            "APS2-1": {"x__class__": "APS2", "masterClock": false}
        }),
    )
}

/// Unversioned channel library touching every channel step
pub fn legacy_channel_library() -> Value {
    library(
        Family::Channel,
        None,
        json!({
            "q1": {"x__class__": "Qubit", "physChan": "BBNAPS1-12"},
            "M-q1": {"x__class__": "Measurement", "physChan": "BBNAPS2-12", "trigChan": ""},
            "BBNAPS1-12": {
                "x__class__": "PhysicalQuadratureChannel",
                "AWG": "BBNAPS1",
                "SSBFreq": 1.0e6
            },
            "BBNAPS2-12": {
                "x__class__": "PhysicalQuadratureChannel",
                "AWG": "BBNAPS2",
                "SSBFreq": -2.0e6
            },
            "BBNAPS1-12m1": {"x__class__": "PhysicalMarkerChannel", "AWG": "BBNAPS1"}
        }),
    )
}

/// Unversioned sweep library
pub fn legacy_sweep_library() -> Value {
    library(
        Family::Sweep,
        None,
        json!({"SegmentNum": {"x__class__": "SegmentNum", "numPoints": 10}}),
    )
}

/// Measurement filter library at version 1
pub fn legacy_measurement_library() -> Value {
    library(
        Family::MeasurementFilter,
        Some(1),
        json!({"M1": {"x__class__": "DigitalDemod", "IFfreq": 10e6, "saveRecords": false}}),
    )
}

/// Serialize a document the way the engine does
pub fn to_bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec_pretty(value).unwrap()
}

/// Parse engine output
pub fn parse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

/// Write a document into `dir`, returning its path
pub fn write_document(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, to_bytes(value)).unwrap();
    path
}

/// Resolver answering from a fixed `device → answer` table
///
/// A prompt is matched when it contains the quoted device name. Unmatched
/// prompts fail as if operator input were closed.
#[derive(Debug, Default, Clone)]
pub struct CannedResolver {
    answers: Vec<(String, String)>,
    pub prompts: Vec<String>,
}

impl CannedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, device: &str, answer: &str) -> Self {
        self.answers.push((device.to_string(), answer.to_string()));
        self
    }
}

impl Resolver for CannedResolver {
    fn resolve(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers
            .iter()
            .find(|(device, _)| prompt.contains(&format!("\"{device}\"")))
            .map(|(_, answer)| answer.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no canned answer"))
    }
}
