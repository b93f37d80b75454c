//! Document families and their migration specs

use crate::error::RegistryError;
use crate::registry::StepRegistry;
use crate::steps;
use std::fmt;

/// An independently versioned document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    /// Instrument library
    Instrument,
    /// Channel library
    Channel,
    /// Sweep library
    Sweep,
    /// Measurement filter library
    MeasurementFilter,
}

impl Family {
    /// All families, in batch order
    pub const ALL: [Family; 4] = [
        Family::Instrument,
        Family::Channel,
        Family::Sweep,
        Family::MeasurementFilter,
    ];

    /// Display name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Instrument => "Instrument",
            Self::Channel => "Channel",
            Self::Sweep => "Sweep",
            Self::MeasurementFilter => "MeasurementFilter",
        }
    }

    /// Tag class of the family's documents
    #[must_use]
    pub fn library_class(self) -> &'static str {
        match self {
            Self::Instrument => "InstrumentLibrary",
            Self::Channel => "ChannelLibrary",
            Self::Sweep => "SweepLibrary",
            Self::MeasurementFilter => "MeasFilterLibrary",
        }
    }

    /// Key of the primary dictionary
    #[must_use]
    pub fn primary_key(self) -> &'static str {
        match self {
            Self::Instrument => "instrDict",
            Self::Channel => "channelDict",
            Self::Sweep => "sweepDict",
            Self::MeasurementFilter => "filterDict",
        }
    }

    /// Current schema version
    #[must_use]
    pub fn target_version(self) -> u32 {
        match self {
            Self::Instrument | Self::Channel => 4,
            Self::Sweep => 1,
            Self::MeasurementFilter => 2,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the engine needs to migrate one family
#[derive(Debug, Clone)]
pub struct FamilySpec {
    /// Family
    pub family: Family,
    /// Expected tag class (exact match)
    pub library_class: &'static str,
    /// Key of the primary dictionary
    pub primary_key: &'static str,
    /// Version the chain ends at
    pub target_version: u32,
    /// Ordered steps
    pub steps: StepRegistry,
}

impl FamilySpec {
    /// Built-in spec for a family
    #[must_use]
    pub fn builtin(family: Family) -> Self {
        let steps = match family {
            Family::Instrument => steps::instrument::registry(),
            Family::Channel => steps::channel::registry(),
            Family::Sweep => steps::sweep_registry(),
            Family::MeasurementFilter => steps::measurement::registry(),
        };
        Self::new(family, steps)
    }

    /// Spec with the family's table values and custom steps
    #[must_use]
    pub fn new(family: Family, steps: StepRegistry) -> Self {
        Self {
            family,
            library_class: family.library_class(),
            primary_key: family.primary_key(),
            target_version: family.target_version(),
            steps,
        }
    }

    /// Override the target version
    #[inline]
    #[must_use]
    pub fn with_target_version(mut self, target_version: u32) -> Self {
        self.target_version = target_version;
        self
    }

    /// Check the step table covers `0..target_version` exactly
    ///
    /// # Errors
    /// Returns the first gap or stray step found
    pub fn validate(&self) -> Result<(), RegistryError> {
        self.steps.validate(self.family, self.target_version)
    }
}
