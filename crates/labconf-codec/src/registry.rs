//! Type registry for tagged decoding
//!
//! Maps `(namespace, class)` to a factory. The registry is populated
//! explicitly at startup; decoding never loads types by name.

use crate::error::{CodecError, CodecResult};
use crate::model::{
    ChannelLibrary, Measurement, PhysicalMarkerChannel, PhysicalQuadratureChannel, Qubit,
};
use crate::object::{fields_into_map, Class, Fields, LibraryObject, UpdateFromFields};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Factory rehydrating an object from its decoded fields
pub type Factory = fn(Fields) -> CodecResult<Box<dyn LibraryObject>>;

/// Registry of decodable types, grouped by namespace
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    modules: HashMap<&'static str, HashMap<&'static str, Factory>>,
}

impl TypeRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Create registry with the built-in channel library types
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register::<Qubit>()
            .register::<Measurement>()
            .register::<PhysicalQuadratureChannel>()
            .register::<PhysicalMarkerChannel>()
            .register_updatable::<ChannelLibrary>();
        registry
    }

    /// Register a type constructed directly from its named fields
    pub fn register<T: Class + DeserializeOwned>(&mut self) -> &mut Self {
        self.insert(T::MODULE, T::NAME, construct::<T>)
    }

    /// Register a type rehydrated by updating a default instance
    pub fn register_updatable<T: Class + Default + UpdateFromFields>(&mut self) -> &mut Self {
        self.insert(T::MODULE, T::NAME, update_default::<T>)
    }

    /// Register a custom factory
    pub fn insert(
        &mut self,
        module: &'static str,
        class: &'static str,
        factory: Factory,
    ) -> &mut Self {
        if self
            .modules
            .entry(module)
            .or_default()
            .insert(class, factory)
            .is_some()
        {
            tracing::debug!("replaced factory for {}.{}", module, class);
        }
        self
    }

    /// Resolve a namespace and class to a factory
    ///
    /// # Errors
    /// Returns `UnknownType` if either the namespace or the class is missing
    pub fn resolve(&self, module: &str, class: &str) -> CodecResult<Factory> {
        self.modules
            .get(module)
            .and_then(|classes| classes.get(class))
            .copied()
            .ok_or_else(|| CodecError::unknown_type(module, class))
    }

    /// Check if a type is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, module: &str, class: &str) -> bool {
        self.resolve(module, class).is_ok()
    }

    /// Registered namespaces, sorted
    #[must_use]
    pub fn modules(&self) -> Vec<&'static str> {
        let mut modules: Vec<_> = self.modules.keys().copied().collect();
        modules.sort_unstable();
        modules
    }

    /// Number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn construct<T: Class + DeserializeOwned>(fields: Fields) -> CodecResult<Box<dyn LibraryObject>> {
    let map = fields_into_map(fields)?;
    let object: T = serde_json::from_value(Value::Object(map))
        .map_err(|source| CodecError::Construct { class: T::NAME, source })?;
    Ok(Box::new(object))
}

fn update_default<T: Class + Default + UpdateFromFields>(
    fields: Fields,
) -> CodecResult<Box<dyn LibraryObject>> {
    let mut object = T::default();
    object.update_from_fields(fields)?;
    Ok(Box::new(object))
}
