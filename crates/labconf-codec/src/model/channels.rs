//! Channel entity types
//!
//! Current-schema records of a channel library. Unknown fields are kept in
//! `extra` so decoding and re-encoding loses nothing.

use crate::codec::encode;
use crate::error::{CodecError, CodecResult};
use crate::object::{downcast, Class, LibraryObject};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

const CHANNELS_MODULE: &str = "QGL.Channels";

/// Logical qubit channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Qubit {
    /// Name of the physical channel driving this qubit
    pub phys_chan: String,
    /// Sideband frequency (Hz)
    pub frequency: f64,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Class for Qubit {
    const NAME: &'static str = "Qubit";
    const MODULE: &'static str = CHANNELS_MODULE;
}

/// Logical measurement channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Measurement {
    /// Name of the physical channel driving this measurement
    pub phys_chan: String,
    /// Sideband frequency (Hz)
    pub frequency: f64,
    /// Digitizer trigger channel
    pub trig_chan: String,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Class for Measurement {
    const NAME: &'static str = "Measurement";
    const MODULE: &'static str = CHANNELS_MODULE;
}

/// Physical I/Q output pair of an AWG
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicalQuadratureChannel {
    /// Owning AWG
    #[serde(rename = "AWG")]
    pub awg: String,
    /// Sequence translator for the AWG type
    pub translator: String,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Class for PhysicalQuadratureChannel {
    const NAME: &'static str = "PhysicalQuadratureChannel";
    const MODULE: &'static str = CHANNELS_MODULE;
}

/// Physical marker output of an AWG
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicalMarkerChannel {
    /// Owning AWG
    #[serde(rename = "AWG")]
    pub awg: String,
    /// Sequence translator for the AWG type
    pub translator: String,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Class for PhysicalMarkerChannel {
    const NAME: &'static str = "PhysicalMarkerChannel";
    const MODULE: &'static str = CHANNELS_MODULE;
}

/// Any entity of a channel library
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEntity {
    /// Logical qubit channel
    Qubit(Qubit),
    /// Logical measurement channel
    Measurement(Measurement),
    /// Physical I/Q channel
    Quadrature(PhysicalQuadratureChannel),
    /// Physical marker channel
    Marker(PhysicalMarkerChannel),
}

impl ChannelEntity {
    /// Convert a decoded object into a channel entity
    ///
    /// # Errors
    /// Returns `UnexpectedClass` if the object is not a channel type
    pub fn from_object(object: Box<dyn LibraryObject>) -> CodecResult<Self> {
        match (object.module_name(), object.class_name()) {
            (CHANNELS_MODULE, Qubit::NAME) => downcast(object).map(Self::Qubit),
            (CHANNELS_MODULE, Measurement::NAME) => downcast(object).map(Self::Measurement),
            (CHANNELS_MODULE, PhysicalQuadratureChannel::NAME) => {
                downcast(object).map(Self::Quadrature)
            }
            (CHANNELS_MODULE, PhysicalMarkerChannel::NAME) => downcast(object).map(Self::Marker),
            (_, other) => Err(CodecError::UnexpectedClass {
                expected: "channel",
                found: other.to_string(),
            }),
        }
    }

    /// Borrow as a library object
    #[must_use]
    pub fn as_object(&self) -> &dyn LibraryObject {
        match self {
            Self::Qubit(qubit) => qubit,
            Self::Measurement(measurement) => measurement,
            Self::Quadrature(channel) => channel,
            Self::Marker(channel) => channel,
        }
    }

    /// Class name of the entity
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> &'static str {
        self.as_object().class_name()
    }

    /// Check if the entity is a logical channel
    #[inline]
    #[must_use]
    pub fn is_logical(&self) -> bool {
        matches!(self, Self::Qubit(_) | Self::Measurement(_))
    }

    /// Physical channel referenced by a logical channel
    #[must_use]
    pub fn physical_channel(&self) -> Option<&str> {
        match self {
            Self::Qubit(Qubit { phys_chan, .. })
            | Self::Measurement(Measurement { phys_chan, .. }) => {
                Some(phys_chan.as_str()).filter(|name| !name.is_empty())
            }
            Self::Quadrature(_) | Self::Marker(_) => None,
        }
    }

    /// AWG owning a physical channel
    #[must_use]
    pub fn awg(&self) -> Option<&str> {
        match self {
            Self::Quadrature(PhysicalQuadratureChannel { awg, .. })
            | Self::Marker(PhysicalMarkerChannel { awg, .. }) => {
                Some(awg.as_str()).filter(|name| !name.is_empty())
            }
            Self::Qubit(_) | Self::Measurement(_) => None,
        }
    }

    /// Translator of a physical channel
    #[must_use]
    pub fn translator(&self) -> Option<&str> {
        match self {
            Self::Quadrature(PhysicalQuadratureChannel { translator, .. })
            | Self::Marker(PhysicalMarkerChannel { translator, .. }) => {
                Some(translator.as_str()).filter(|name| !name.is_empty())
            }
            Self::Qubit(_) | Self::Measurement(_) => None,
        }
    }
}

impl Serialize for ChannelEntity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self.as_object())
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
