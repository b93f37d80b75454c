//! Channel library document

use crate::codec::Decoder;
use crate::error::{CodecError, CodecResult};
use crate::model::ChannelEntity;
use crate::object::{Class, Decoded, Fields, UpdateFromFields};
use crate::registry::TypeRegistry;
use serde::Serialize;
use std::collections::BTreeMap;

/// Decoded channel library
///
/// Rehydrated through the update-from-mapping path: a default library is
/// created and then filled from the decoded `channelDict`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelLibrary {
    /// Schema version of the document
    pub version: u32,
    /// Entities by name
    #[serde(rename = "channelDict")]
    pub channels: BTreeMap<String, ChannelEntity>,
}

impl Class for ChannelLibrary {
    const NAME: &'static str = "ChannelLibrary";
    const MODULE: &'static str = "QGL.ChannelLibrary";
}

impl UpdateFromFields for ChannelLibrary {
    fn update_from_fields(&mut self, mut fields: Fields) -> CodecResult<()> {
        if let Some(version) = fields.remove("version") {
            self.version = version
                .as_value()
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    CodecError::invalid_field(
                        Self::NAME,
                        "version",
                        "expected a non-negative integer",
                    )
                })?;
        }

        match fields.remove("channelDict") {
            Some(Decoded::Map(entries)) => {
                for (name, entry) in entries {
                    let entity = match entry {
                        Decoded::Object(object) => ChannelEntity::from_object(object)?,
                        other => {
                            return Err(CodecError::invalid_field(
                                Self::NAME,
                                format!("channelDict.{name}"),
                                format!("expected a tagged channel, got {}", other.kind()),
                            ))
                        }
                    };
                    self.channels.insert(name, entity);
                }
            }
            Some(other) => {
                return Err(CodecError::invalid_field(
                    Self::NAME,
                    "channelDict",
                    format!("expected a mapping, got {}", other.kind()),
                ))
            }
            None => {}
        }

        for key in fields.keys() {
            tracing::debug!("ignoring channel library field '{}'", key);
        }
        Ok(())
    }
}

impl ChannelLibrary {
    /// Decode a channel library document
    ///
    /// # Errors
    /// Returns error if the bytes are not a tagged channel library
    pub fn from_slice(json: &[u8], registry: &TypeRegistry) -> CodecResult<Self> {
        Decoder::new(registry).decode_slice(json)?.into_object()
    }

    /// Look up an entity by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ChannelEntity> {
        self.channels.get(name)
    }

    /// Logical channels whose physical channel does not resolve
    ///
    /// Returns `(logical, physical)` name pairs in logical-name order.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        self.channels
            .iter()
            .filter_map(|(name, entity)| {
                let physical = entity.physical_channel()?;
                match self.channels.get(physical) {
                    Some(ChannelEntity::Quadrature(_) | ChannelEntity::Marker(_)) => None,
                    Some(ChannelEntity::Qubit(_) | ChannelEntity::Measurement(_)) | None => {
                        Some((name.as_str(), physical))
                    }
                }
            })
            .collect()
    }

    /// Physical channels without a translator, in name order
    #[must_use]
    pub fn untranslated(&self) -> Vec<&str> {
        self.channels
            .iter()
            .filter(|(_, entity)| !entity.is_logical() && entity.translator().is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Measurement, PhysicalQuadratureChannel, Qubit};
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "x__class__": "ChannelLibrary",
            "x__module__": "QGL.ChannelLibrary",
            "version": 4,
            "channelDict": {
                "q1": {
                    "x__class__": "Qubit",
                    "x__module__": "QGL.Channels",
                    "physChan": "BBNAPS1-12",
                    "frequency": 1e7
                },
                "M-q1": {
                    "x__class__": "Measurement",
                    "x__module__": "QGL.Channels",
                    "physChan": "missing-phys",
                    "trigChan": "digitizerTrig"
                },
                "BBNAPS1-12": {
                    "x__class__": "PhysicalQuadratureChannel",
                    "x__module__": "QGL.Channels",
                    "AWG": "BBNAPS1",
                    "translator": "APS2Pattern"
                }
            }
        })
    }

    #[test]
    fn decode_sample_library() {
        let bytes = serde_json::to_vec(&sample()).unwrap();
        let library = ChannelLibrary::from_slice(&bytes, &TypeRegistry::builtin()).unwrap();

        assert_eq!(library.version, 4);
        assert_eq!(library.channels.len(), 3);
        assert!(matches!(
            library.get("q1"),
            Some(ChannelEntity::Qubit(Qubit { frequency, .. })) if *frequency == 1e7
        ));
        assert!(matches!(
            library.get("M-q1"),
            Some(ChannelEntity::Measurement(Measurement { trig_chan, .. }))
                if trig_chan == "digitizerTrig"
        ));
        assert!(matches!(
            library.get("BBNAPS1-12"),
            Some(ChannelEntity::Quadrature(PhysicalQuadratureChannel { translator, .. }))
                if translator == "APS2Pattern"
        ));
    }

    #[test]
    fn dangling_references_reported() {
        let bytes = serde_json::to_vec(&sample()).unwrap();
        let library = ChannelLibrary::from_slice(&bytes, &TypeRegistry::builtin()).unwrap();
        assert_eq!(library.dangling_references(), vec![("M-q1", "missing-phys")]);
        assert!(library.untranslated().is_empty());
    }

    #[test]
    fn untagged_entry_is_rejected() {
        let mut doc = sample();
        doc["channelDict"]["plain"] = json!({"physChan": "x"});
        let bytes = serde_json::to_vec(&doc).unwrap();

        let err = ChannelLibrary::from_slice(&bytes, &TypeRegistry::builtin()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { .. }));
    }

    #[test]
    fn bad_version_is_rejected() {
        let mut doc = sample();
        doc["version"] = json!("four");
        let bytes = serde_json::to_vec(&doc).unwrap();

        let err = ChannelLibrary::from_slice(&bytes, &TypeRegistry::builtin()).unwrap_err();
        assert!(err.to_string().contains("version"));
    }
}
