//! Encode/decode round trips through the type registry

use labconf_codec::model::{
    ChannelEntity, ChannelLibrary, Measurement, PhysicalMarkerChannel, PhysicalQuadratureChannel,
    Qubit,
};
use labconf_codec::{
    encode, Class, CodecError, CodecResult, Decoder, Fields, TypeRegistry, UpdateFromFields,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Type with a bespoke export that renames a field on the way out
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Digitizer {
    #[serde(rename = "recordLength")]
    record_length: u32,
}

impl Class for Digitizer {
    const NAME: &'static str = "Digitizer";
    const MODULE: &'static str = "instruments.Digitizers";

    fn json_encode(&self) -> Option<CodecResult<Map<String, Value>>> {
        let mut fields = Map::new();
        fields.insert("recordLength".to_string(), Value::from(self.record_length));
        fields.insert("encodedBy".to_string(), Value::from("json_encode"));
        Some(Ok(fields))
    }
}

/// Type rehydrated through the update-from-mapping path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct Sweep {
    points: u32,
    enabled: bool,
}

impl Class for Sweep {
    const NAME: &'static str = "PointsSweep";
    const MODULE: &'static str = "sweeps.Sweeps";
}

impl UpdateFromFields for Sweep {
    fn update_from_fields(&mut self, fields: Fields) -> CodecResult<()> {
        for (key, value) in fields {
            let value = value.as_value().cloned().unwrap_or(Value::Null);
            match key.as_str() {
                "points" => {
                    self.points = value
                        .as_u64()
                        .and_then(|v| u32::try_from(v).ok())
                        .ok_or_else(|| {
                            CodecError::invalid_field(Self::NAME, "points", "expected integer")
                        })?;
                }
                "enabled" => self.enabled = value.as_bool().unwrap_or(false),
                _ => {}
            }
        }
        Ok(())
    }
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::builtin();
    registry.register::<Digitizer>().register_updatable::<Sweep>();
    registry
}

#[test]
fn bespoke_export_is_preferred() {
    let value = encode(&Digitizer { record_length: 1024 }).unwrap();
    assert_eq!(
        value,
        json!({
            "recordLength": 1024,
            "encodedBy": "json_encode",
            "x__class__": "Digitizer",
            "x__module__": "instruments.Digitizers"
        })
    );
}

#[test]
fn generic_export_round_trip() {
    let qubit = Qubit {
        phys_chan: "BBNAPS1-12".to_string(),
        frequency: 12.5e6,
        extra: Map::from_iter([("pulseParams".to_string(), json!({"piAmp": 0.5}))]),
    };

    let registry = registry();
    let back: Qubit = Decoder::new(&registry).decode_as(encode(&qubit).unwrap()).unwrap();
    assert_eq!(back, qubit);
}

#[test]
fn update_path_round_trip() {
    let sweep = Sweep {
        points: 101,
        enabled: true,
    };

    let registry = registry();
    let back: Sweep = Decoder::new(&registry).decode_as(encode(&sweep).unwrap()).unwrap();
    assert_eq!(back, sweep);
}

#[test]
fn library_round_trip_keeps_entity_types() {
    let mut library = ChannelLibrary {
        version: 4,
        ..ChannelLibrary::default()
    };
    library.channels.insert(
        "q1".to_string(),
        ChannelEntity::Qubit(Qubit {
            phys_chan: "BBNAPS1-12".to_string(),
            frequency: 1e6,
            extra: Map::new(),
        }),
    );
    library.channels.insert(
        "M-q1".to_string(),
        ChannelEntity::Measurement(Measurement {
            phys_chan: "BBNAPS1-34".to_string(),
            frequency: 2e6,
            trig_chan: "digitizerTrig".to_string(),
            extra: Map::new(),
        }),
    );
    library.channels.insert(
        "BBNAPS1-12".to_string(),
        ChannelEntity::Quadrature(PhysicalQuadratureChannel {
            awg: "BBNAPS1".to_string(),
            translator: "APS2Pattern".to_string(),
            extra: Map::new(),
        }),
    );
    library.channels.insert(
        "BBNAPS1-12m1".to_string(),
        ChannelEntity::Marker(PhysicalMarkerChannel {
            awg: "BBNAPS1".to_string(),
            translator: "APS2Pattern".to_string(),
            extra: Map::new(),
        }),
    );

    let value = encode(&library).unwrap();
    assert_eq!(value["channelDict"]["q1"]["x__class__"], "Qubit");

    let registry = registry();
    let back: ChannelLibrary = Decoder::new(&registry).decode_as(value).unwrap();
    assert_eq!(back, library);
}

#[test]
fn library_from_legacy_spelling() {
    let doc = json!({
        "__class__": "ChannelLibrary",
        "__module__": "QGL.ChannelLibrary",
        "channelDict": {
            "q1": {"__class__": "Qubit", "__module__": "QGL.Channels", "physChan": "p"}
        }
    });

    let registry = registry();
    let library: ChannelLibrary = Decoder::new(&registry).decode_as(doc).unwrap();
    assert_eq!(library.version, 0);
    assert_eq!(library.get("q1").and_then(ChannelEntity::physical_channel), Some("p"));
}

#[test]
fn unregistered_entity_fails_library_decode() {
    let doc = json!({
        "x__class__": "ChannelLibrary",
        "x__module__": "QGL.ChannelLibrary",
        "channelDict": {
            "q1": {"x__class__": "Transmon", "x__module__": "QGL.Channels"}
        }
    });

    let registry = registry();
    let err = Decoder::new(&registry).decode_as::<ChannelLibrary>(doc).unwrap_err();
    assert!(err.is_unknown_type());
}

#[test]
fn registered_foreign_entity_fails_library_decode() {
    let doc = json!({
        "x__class__": "ChannelLibrary",
        "x__module__": "QGL.ChannelLibrary",
        "channelDict": {
            "d1": {
                "x__class__": "Digitizer",
                "x__module__": "instruments.Digitizers",
                "recordLength": 8
            }
        }
    });

    let registry = registry();
    let err = Decoder::new(&registry).decode_as::<ChannelLibrary>(doc).unwrap_err();
    assert!(matches!(err, CodecError::UnexpectedClass { expected: "channel", .. }));
}

proptest! {
    #[test]
    fn prop_measurement_round_trip(
        phys_chan in "[A-Za-z0-9-]{0,16}",
        trig_chan in "[A-Za-z]{0,12}",
        frequency_hz in -1_000_000_000i32..1_000_000_000,
    ) {
        let measurement = Measurement {
            phys_chan,
            frequency: f64::from(frequency_hz),
            trig_chan,
            extra: Map::new(),
        };

        let registry = TypeRegistry::builtin();
        let back: Measurement = Decoder::new(&registry)
            .decode_as(encode(&measurement).unwrap())
            .unwrap();
        prop_assert_eq!(back, measurement);
    }
}
