//! Class-tagged encoder and decoder
//!
//! Encoding injects [`CLASS_KEY`]/[`MODULE_KEY`] into the exported fields of
//! a library object. Decoding walks a JSON value bottom-up and rehydrates
//! every tagged mapping through the [`TypeRegistry`].

use crate::error::{CodecError, CodecResult};
use crate::object::{
    Class, Decoded, Fields, LibraryObject, CLASS_KEY, LEGACY_CLASS_KEY, LEGACY_MODULE_KEY,
    MODULE_KEY,
};
use crate::registry::TypeRegistry;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Encode a library object as a tagged JSON mapping
///
/// Uses the object's bespoke export when it has one, its serde state
/// otherwise.
///
/// # Errors
/// Returns error if the export fails
pub fn encode(object: &dyn LibraryObject) -> CodecResult<Value> {
    let mut fields = match object.json_encode() {
        Some(fields) => fields?,
        None => object.export_state()?,
    };
    fields.insert(CLASS_KEY.to_string(), Value::from(object.class_name()));
    fields.insert(MODULE_KEY.to_string(), Value::from(object.module_name()));
    Ok(Value::Object(fields))
}

/// Encode any serializable value
///
/// Plain values use structural serialization; library objects nested inside
/// them should be wrapped in [`Tagged`] or serialize through [`encode`].
///
/// # Errors
/// Returns error if serialization fails
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> CodecResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Encode to pretty JSON text (2-space indent, sorted keys)
///
/// # Errors
/// Returns error if serialization fails
pub fn to_string_pretty<T: Serialize + ?Sized>(value: &T) -> CodecResult<String> {
    // Round-trip through Value so mapping keys come out sorted
    Ok(serde_json::to_string_pretty(&to_value(value)?)?)
}

/// Serialize adapter writing a library object with its type tags
#[derive(Debug, Clone, Copy)]
pub struct Tagged<'a>(pub &'a dyn LibraryObject);

impl Serialize for Tagged<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self.0)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Decoder resolving type tags through a registry
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Decoder<'r> {
    /// Create decoder over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Decode JSON text
    ///
    /// # Errors
    /// Returns error if the text is not JSON or a tag cannot be resolved
    pub fn decode_str(&self, json: &str) -> CodecResult<Decoded> {
        self.decode(serde_json::from_str(json)?)
    }

    /// Decode JSON bytes
    ///
    /// # Errors
    /// Returns error if the bytes are not JSON or a tag cannot be resolved
    pub fn decode_slice(&self, json: &[u8]) -> CodecResult<Decoded> {
        self.decode(serde_json::from_slice(json)?)
    }

    /// Decode a value, expecting a top-level object of type `T`
    ///
    /// # Errors
    /// Returns error if decoding fails or the result is not a `T`
    pub fn decode_as<T: Class>(&self, value: Value) -> CodecResult<T> {
        self.decode(value)?.into_object()
    }

    /// Decode a JSON value
    ///
    /// Children are decoded before their parent, so a factory receives
    /// already-rehydrated nested objects.
    ///
    /// # Errors
    /// - `CodecError::UnknownType` if a tag is not registered
    /// - `CodecError::MissingModule` if a class tag has no namespace
    /// - `CodecError::InvalidTag` if a tag is not a string
    /// - factory errors for malformed fields
    pub fn decode(&self, value: Value) -> CodecResult<Decoded> {
        match value {
            Value::Object(map) => {
                let mut fields = Fields::new();
                for (key, value) in map {
                    fields.insert(key, self.decode(value)?);
                }
                self.rehydrate(fields)
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.decode(item))
                .collect::<CodecResult<Vec<_>>>()
                .map(Decoded::List),
            scalar => Ok(Decoded::Value(scalar)),
        }
    }

    fn rehydrate(&self, mut fields: Fields) -> CodecResult<Decoded> {
        let Some(class) = take_tag(&mut fields, CLASS_KEY, LEGACY_CLASS_KEY)? else {
            return Ok(Decoded::Map(fields));
        };
        let module = take_tag(&mut fields, MODULE_KEY, LEGACY_MODULE_KEY)?
            .ok_or_else(|| CodecError::MissingModule { class: class.clone() })?;

        let factory = self.registry.resolve(&module, &class)?;
        tracing::trace!("rehydrating {}.{}", module, class);
        factory(fields).map(Decoded::Object)
    }
}

/// Remove both spellings of a reserved field, preferring the current one
fn take_tag(
    fields: &mut Fields,
    key: &'static str,
    legacy: &'static str,
) -> CodecResult<Option<String>> {
    let current = fields.remove(key).map(|tag| tag_string(tag, key)).transpose()?;
    let historical = fields.remove(legacy).map(|tag| tag_string(tag, legacy)).transpose()?;
    Ok(current.filter(|tag| !tag.is_empty()).or(historical))
}

fn tag_string(tag: Decoded, key: &'static str) -> CodecResult<String> {
    match tag {
        Decoded::Value(Value::String(tag)) => Ok(tag),
        _ => Err(CodecError::InvalidTag { key }),
    }
}
