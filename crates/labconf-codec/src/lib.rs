//! labconf Class-Tagged Codec
//!
//! Round-trips heterogeneous library objects through JSON while keeping
//! their runtime type identity.
//!
//! # Core Concepts
//!
//! - [`Class`]: trait for types that carry a class name and namespace
//! - [`encode`]: export an object's fields and inject its type tags
//! - [`Decoder`]: rehydrate tagged mappings through a [`TypeRegistry`]
//! - [`model`]: the built-in channel library types
//!
//! # Wire Format
//!
//! ```text
//! { "x__class__": "Qubit", "x__module__": "QGL.Channels", "physChan": "...", ... }
//! ```
//!
//! The historical spellings `__class__` / `__module__` are accepted on decode.
//!
//! # Example
//!
//! ```rust
//! use labconf_codec::model::Qubit;
//! use labconf_codec::{encode, Decoder, TypeRegistry};
//!
//! let registry = TypeRegistry::builtin();
//! let qubit = Qubit { phys_chan: "BBNAPS1-12".into(), ..Qubit::default() };
//!
//! let json = encode(&qubit).unwrap();
//! let back: Qubit = Decoder::new(&registry).decode_as(json).unwrap();
//! assert_eq!(back, qubit);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod codec;
pub mod error;
pub mod model;
pub mod object;
pub mod registry;

pub use codec::{encode, to_string_pretty, to_value, Decoder, Tagged};
pub use error::{CodecError, CodecResult};
pub use object::{
    downcast, Class, Decoded, Fields, LibraryObject, UpdateFromFields, CLASS_KEY, LEGACY_CLASS_KEY,
    LEGACY_MODULE_KEY, MODULE_KEY,
};
pub use registry::{Factory, TypeRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
