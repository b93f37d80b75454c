//! Library objects and their decoded form
//!
//! A library object is any value that carries a runtime type identity
//! (unqualified class name plus namespace) when written to JSON.
//!
//! - [`Class`]: typed trait implemented by every registrable type
//! - [`LibraryObject`]: object-safe view used by the encoder and the registry
//! - [`Decoded`]: result of decoding an arbitrary JSON value

use crate::error::{CodecError, CodecResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Reserved field holding the unqualified type name
pub const CLASS_KEY: &str = "x__class__";

/// Reserved field holding the defining namespace
pub const MODULE_KEY: &str = "x__module__";

/// Historical spelling of [`CLASS_KEY`], accepted on decode only
pub const LEGACY_CLASS_KEY: &str = "__class__";

/// Historical spelling of [`MODULE_KEY`], accepted on decode only
pub const LEGACY_MODULE_KEY: &str = "__module__";

/// Decoded fields of a tagged mapping, tags removed
pub type Fields = BTreeMap<String, Decoded>;

/// Typed trait for registrable library types
///
/// # Example
/// ```rust
/// use labconf_codec::Class;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Attenuator {
///     attenuation: f64,
/// }
///
/// impl Class for Attenuator {
///     const NAME: &'static str = "Attenuator";
///     const MODULE: &'static str = "instruments.Attenuators";
/// }
/// ```
pub trait Class: Serialize + Debug + 'static {
    /// Unqualified type name written to [`CLASS_KEY`]
    const NAME: &'static str;

    /// Namespace written to [`MODULE_KEY`]
    const MODULE: &'static str;

    /// Bespoke field export
    ///
    /// Return `Some` to bypass the generic serde state export.
    fn json_encode(&self) -> Option<CodecResult<Map<String, Value>>> {
        None
    }
}

/// Object-safe view of a [`Class`]
pub trait LibraryObject: Debug + Any {
    /// Unqualified type name
    fn class_name(&self) -> &'static str;

    /// Defining namespace
    fn module_name(&self) -> &'static str;

    /// Bespoke field export, if the type has one
    fn json_encode(&self) -> Option<CodecResult<Map<String, Value>>>;

    /// Generic field export through serde
    ///
    /// # Errors
    /// Returns error if the type does not serialize to a mapping
    fn export_state(&self) -> CodecResult<Map<String, Value>>;

    /// Borrow as [`Any`] for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Convert into [`Any`] for downcasting by value
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Class> LibraryObject for T {
    fn class_name(&self) -> &'static str {
        T::NAME
    }

    fn module_name(&self) -> &'static str {
        T::MODULE
    }

    fn json_encode(&self) -> Option<CodecResult<Map<String, Value>>> {
        Class::json_encode(self)
    }

    fn export_state(&self) -> CodecResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(CodecError::NotAMapping { class: T::NAME }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// "Update from mapping" capability
///
/// Types implementing this (together with `Default`) are rehydrated by
/// updating a default instance instead of being built from named fields.
/// Nested tagged mappings arrive already decoded.
pub trait UpdateFromFields {
    /// Apply decoded fields to `self`
    ///
    /// # Errors
    /// Returns error if a field has the wrong shape
    fn update_from_fields(&mut self, fields: Fields) -> CodecResult<()>;
}

/// Downcast a boxed object to a concrete [`Class`]
///
/// # Errors
/// Returns `UnexpectedClass` if the object is of another type
pub fn downcast<T: Class>(object: Box<dyn LibraryObject>) -> CodecResult<T> {
    let found = object.class_name();
    object
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| CodecError::UnexpectedClass {
            expected: T::NAME,
            found: found.to_string(),
        })
}

/// A decoded JSON value
///
/// Tagged mappings become objects; everything else keeps its structure.
#[derive(Debug)]
pub enum Decoded {
    /// Rehydrated library object
    Object(Box<dyn LibraryObject>),
    /// Untagged mapping
    Map(Fields),
    /// Sequence
    List(Vec<Decoded>),
    /// Scalar (string, number, bool, null)
    Value(Value),
}

impl Decoded {
    /// Take the object out, downcast to `T`
    ///
    /// # Errors
    /// Returns `UnexpectedClass` if this is not an object of type `T`
    pub fn into_object<T: Class>(self) -> CodecResult<T> {
        match self {
            Self::Object(object) => downcast(object),
            other => Err(CodecError::UnexpectedClass {
                expected: T::NAME,
                found: other.kind().to_string(),
            }),
        }
    }

    /// Borrow the object as `T`, if it is one
    #[must_use]
    pub fn as_object<T: Class>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => object.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Borrow the scalar value, if this is one
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Short description of the variant, for error messages
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Object(object) => object.class_name(),
            Self::Map(_) => "mapping",
            Self::List(_) => "sequence",
            Self::Value(_) => "scalar",
        }
    }

    /// Convert back into plain JSON
    ///
    /// Objects are re-encoded with their type tags.
    ///
    /// # Errors
    /// Returns error if an object fails to encode
    pub fn into_value(self) -> CodecResult<Value> {
        match self {
            Self::Object(object) => crate::codec::encode(object.as_ref()),
            Self::Map(fields) => Ok(Value::Object(fields_into_map(fields)?)),
            Self::List(items) => items
                .into_iter()
                .map(Self::into_value)
                .collect::<CodecResult<Vec<_>>>()
                .map(Value::Array),
            Self::Value(value) => Ok(value),
        }
    }
}

/// Convert decoded fields back into a plain JSON mapping
///
/// # Errors
/// Returns error if a nested object fails to encode
pub fn fields_into_map(fields: Fields) -> CodecResult<Map<String, Value>> {
    fields
        .into_iter()
        .map(|(key, value)| Ok((key, value.into_value()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Gauge {
        gain: f64,
    }

    impl Class for Gauge {
        const NAME: &'static str = "Gauge";
        const MODULE: &'static str = "tests.Gauges";
    }

    #[derive(Debug, Serialize)]
    struct Scalar(u32);

    impl Class for Scalar {
        const NAME: &'static str = "Scalar";
        const MODULE: &'static str = "tests.Gauges";
    }

    #[test]
    fn library_object_names() {
        let gauge = Gauge { gain: 1.5 };
        assert_eq!(gauge.class_name(), "Gauge");
        assert_eq!(gauge.module_name(), "tests.Gauges");
    }

    #[test]
    fn export_state_is_a_mapping() {
        let state = Gauge { gain: 1.5 }.export_state().unwrap();
        assert_eq!(state.get("gain"), Some(&Value::from(1.5)));
    }

    #[test]
    fn export_state_rejects_non_mapping() {
        let err = Scalar(3).export_state().unwrap_err();
        assert!(matches!(err, CodecError::NotAMapping { class: "Scalar" }));
    }

    #[test]
    fn downcast_to_wrong_type_fails() {
        let boxed: Box<dyn LibraryObject> = Box::new(Gauge { gain: 0.0 });
        let err = downcast::<Scalar>(boxed).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedClass { expected: "Scalar", .. }));
    }

    #[test]
    fn decoded_as_object() {
        let decoded = Decoded::Object(Box::new(Gauge { gain: 2.0 }));
        assert_eq!(decoded.as_object::<Gauge>(), Some(&Gauge { gain: 2.0 }));
        assert!(decoded.as_object::<Scalar>().is_none());
        assert_eq!(decoded.kind(), "Gauge");
    }

    #[test]
    fn decoded_into_value_retags_objects() {
        let mut fields = Fields::new();
        fields.insert("gauge".to_string(), Decoded::Object(Box::new(Gauge { gain: 2.0 })));
        fields.insert("count".to_string(), Decoded::Value(Value::from(3)));

        let value = Decoded::Map(fields).into_value().unwrap();
        assert_eq!(value["gauge"][CLASS_KEY], "Gauge");
        assert_eq!(value["gauge"][MODULE_KEY], "tests.Gauges");
        assert_eq!(value["count"], 3);
    }
}
