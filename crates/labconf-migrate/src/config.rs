//! Batch configuration
//!
//! Names the library file of each family. Loaded from TOML:
//!
//! ```toml
//! instrument_lib_file = "Instruments.json"
//! channel_lib_file = "ChannelParams.json"
//! sweep_lib_file = "Sweeps.json"
//! measurement_lib_file = "Measurements.json"
//! ```
//!
//! Every entry is optional; unset families are not migrated.

use crate::error::ConfigError;
use crate::family::Family;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Library file paths per family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Instrument library
    pub instrument_lib_file: Option<PathBuf>,
    /// Channel library
    pub channel_lib_file: Option<PathBuf>,
    /// Sweep library
    pub sweep_lib_file: Option<PathBuf>,
    /// Measurement filter library
    pub measurement_lib_file: Option<PathBuf>,
}

impl BatchConfig {
    /// Create empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set instrument library path
    #[inline]
    #[must_use]
    pub fn with_instrument_lib(mut self, path: impl Into<PathBuf>) -> Self {
        self.instrument_lib_file = Some(path.into());
        self
    }

    /// Set channel library path
    #[inline]
    #[must_use]
    pub fn with_channel_lib(mut self, path: impl Into<PathBuf>) -> Self {
        self.channel_lib_file = Some(path.into());
        self
    }

    /// Set sweep library path
    #[inline]
    #[must_use]
    pub fn with_sweep_lib(mut self, path: impl Into<PathBuf>) -> Self {
        self.sweep_lib_file = Some(path.into());
        self
    }

    /// Set measurement filter library path
    #[inline]
    #[must_use]
    pub fn with_measurement_lib(mut self, path: impl Into<PathBuf>) -> Self {
        self.measurement_lib_file = Some(path.into());
        self
    }

    /// Parse TOML text; paths are kept as written
    ///
    /// # Errors
    /// Returns error for invalid TOML or unknown keys
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file, resolving relative paths against its directory
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Resolve relative paths against `base`
    #[must_use]
    pub fn relative_to(self, base: &Path) -> Self {
        let resolve =
            |p: Option<PathBuf>| p.map(|p| if p.is_relative() { base.join(p) } else { p });
        Self {
            instrument_lib_file: resolve(self.instrument_lib_file),
            channel_lib_file: resolve(self.channel_lib_file),
            sweep_lib_file: resolve(self.sweep_lib_file),
            measurement_lib_file: resolve(self.measurement_lib_file),
        }
    }

    /// Path configured for a family
    #[must_use]
    pub fn path(&self, family: Family) -> Option<&Path> {
        match family {
            Family::Instrument => self.instrument_lib_file.as_deref(),
            Family::Channel => self.channel_lib_file.as_deref(),
            Family::Sweep => self.sweep_lib_file.as_deref(),
            Family::MeasurementFilter => self.measurement_lib_file.as_deref(),
        }
    }

    /// Configured families with their paths, in batch order
    #[must_use]
    pub fn families(&self) -> Vec<(Family, &Path)> {
        Family::ALL
            .into_iter()
            .filter_map(|family| self.path(family).map(|path| (family, path)))
            .collect()
    }
}
