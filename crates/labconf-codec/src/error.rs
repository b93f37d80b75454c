//! Error types for the class-tagged codec

/// Errors raised while encoding or decoding library objects
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Tag names a namespace or class that is not in the registry
    #[error("unknown type: {module}.{class}")]
    UnknownType {
        /// Namespace carried by the tag
        module: String,
        /// Unqualified type name carried by the tag
        class: String,
    },

    /// Tagged mapping has a class but no namespace
    #[error("type tag {class} carries no module")]
    MissingModule {
        /// Unqualified type name carried by the tag
        class: String,
    },

    /// Reserved tag field holds something other than a string
    #[error("reserved field '{key}' must be a string")]
    InvalidTag {
        /// Reserved field name
        key: &'static str,
    },

    /// State export of an object did not produce a mapping
    #[error("{class} does not export a mapping")]
    NotAMapping {
        /// Type whose export failed
        class: &'static str,
    },

    /// Decoded object is not of the type the caller expected
    #[error("unexpected class: expected {expected}, got {found}")]
    UnexpectedClass {
        /// Expected type or type family
        expected: &'static str,
        /// Class that was found
        found: String,
    },

    /// A field of a decoded object has the wrong shape
    #[error("invalid field '{field}' for {class}: {message}")]
    InvalidField {
        /// Type being rehydrated
        class: &'static str,
        /// Offending field
        field: String,
        /// What was wrong with it
        message: String,
    },

    /// Constructing a type from its named fields failed
    #[error("cannot construct {class}: {source}")]
    Construct {
        /// Type being constructed
        class: &'static str,
        /// Underlying deserialization failure
        #[source]
        source: serde_json::Error,
    },

    /// Malformed JSON or a plain serialization failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Create unknown type error
    pub fn unknown_type(module: impl Into<String>, class: impl Into<String>) -> Self {
        Self::UnknownType {
            module: module.into(),
            class: class.into(),
        }
    }

    /// Create invalid field error
    pub fn invalid_field(
        class: &'static str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            class,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if the failure is an unresolvable type tag
    #[inline]
    #[must_use]
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType { .. } | Self::MissingModule { .. })
    }
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
