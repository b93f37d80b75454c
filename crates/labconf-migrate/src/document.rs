//! Library document model
//!
//! A document is a JSON mapping with a tag class, an optional tag module, an
//! optional `version`, and a family-specific primary dictionary. While a
//! migration runs, the primary dictionary is held apart from the rest of the
//! document and re-embedded on serialization.
//!
//! Floats are parsed exactly and written back in their shortest round-trip
//! form. Integers are kept exactly within the `i64`/`u64` range; integer
//! literals outside it are read as `f64` and written back as floats.

use crate::error::ValidationFailure;
use crate::family::FamilySpec;
use serde_json::{Map, Value};

/// Reserved field holding a mapping's tag class
pub const CLASS_KEY: &str = "x__class__";

/// Historical spelling of [`CLASS_KEY`]
pub const LEGACY_CLASS_KEY: &str = "__class__";

/// Reserved field holding a mapping's tag module
pub const MODULE_KEY: &str = "x__module__";

/// Historical spelling of [`MODULE_KEY`]
pub const LEGACY_MODULE_KEY: &str = "__module__";

/// Schema version field
pub const VERSION_KEY: &str = "version";

/// A JSON mapping (document, primary dictionary or entity record)
pub type Record = Map<String, Value>;

/// Tag class of a mapping, either spelling
#[must_use]
pub fn tag_class(record: &Record) -> Option<&str> {
    record
        .get(CLASS_KEY)
        .or_else(|| record.get(LEGACY_CLASS_KEY))
        .and_then(Value::as_str)
}

/// Set the tag class, keeping the spelling the mapping already uses
pub fn set_tag_class(record: &mut Record, class: &str) {
    set_tag(record, CLASS_KEY, LEGACY_CLASS_KEY, class);
}

/// Set the tag module, keeping the spelling the mapping already uses
pub fn set_tag_module(record: &mut Record, module: &str) {
    set_tag(record, MODULE_KEY, LEGACY_MODULE_KEY, module);
}

fn set_tag(record: &mut Record, key: &str, legacy: &str, tag: &str) {
    let key = if !record.contains_key(key) && record.contains_key(legacy) {
        legacy
    } else {
        key
    };
    record.insert(key.to_string(), Value::from(tag));
}

/// Validated document being migrated
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    header: Record,
    primary_key: &'static str,
    primary: Record,
    version: u32,
}

impl Document {
    /// Validate a parsed mapping against a family spec
    ///
    /// # Errors
    /// - `WrongClass` if the tag class is not the family's library class
    /// - `MissingPrimaryKey` / `PrimaryNotMapping` if the primary dictionary is absent or malformed
    /// - `BadVersion` if `version` is not a non-negative integer
    pub fn from_root(mut root: Record, spec: &FamilySpec) -> Result<Self, ValidationFailure> {
        let class = tag_class(&root);
        if class != Some(spec.library_class) {
            return Err(ValidationFailure::WrongClass {
                expected: spec.library_class,
                found: class.map(str::to_string),
            });
        }

        let primary = match root.remove(spec.primary_key) {
            Some(Value::Object(primary)) => primary,
            Some(_) => return Err(ValidationFailure::PrimaryNotMapping { key: spec.primary_key }),
            None => return Err(ValidationFailure::MissingPrimaryKey { key: spec.primary_key }),
        };

        let version = match root.get(VERSION_KEY) {
            None => 0,
            Some(value) => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| ValidationFailure::BadVersion(value.clone()))?,
        };

        Ok(Self {
            header: root,
            primary_key: spec.primary_key,
            primary,
            version,
        })
    }

    /// Current schema version (absent field reads as 0)
    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Record a new schema version
    pub fn set_version(&mut self, version: u32) {
        self.version = version;
        self.header.insert(VERSION_KEY.to_string(), Value::from(version));
    }

    /// Top-level fields other than the primary dictionary
    #[inline]
    #[must_use]
    pub fn header(&self) -> &Record {
        &self.header
    }

    /// Primary dictionary
    #[inline]
    #[must_use]
    pub fn primary(&self) -> &Record {
        &self.primary
    }

    /// Mutable header and primary dictionary, borrowed together
    pub fn parts_mut(&mut self) -> (&mut Record, &mut Record) {
        (&mut self.header, &mut self.primary)
    }

    /// Re-embed the primary dictionary and return the whole document
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut root = self.header;
        root.insert(self.primary_key.to_string(), Value::Object(self.primary));
        Value::Object(root)
    }

    /// Serialize with 2-space indentation and sorted keys
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_bytes(self) -> serde_json::Result<Vec<u8>> {
        // serde_json's default Map is ordered by key
        serde_json::to_vec_pretty(&self.into_value())
    }
}
