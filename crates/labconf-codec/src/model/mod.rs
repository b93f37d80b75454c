//! Typed channel library model
//!
//! The types registered by [`TypeRegistry::builtin`](crate::TypeRegistry::builtin).

mod channels;
mod library;

pub use channels::{
    ChannelEntity, Measurement, PhysicalMarkerChannel, PhysicalQuadratureChannel, Qubit,
};
pub use library::ChannelLibrary;
