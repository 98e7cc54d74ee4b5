//! Configuration error definitions.
//!
//! This module defines the error type raised while resolving device and
//! controller configuration. All variants are fatal: they are reported before
//! any simulation state is constructed, and a running simulation never
//! produces them.

use std::fmt;

/// A fatal configuration error raised during device or controller setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An organization preset name that is not in the preset table.
    UnknownOrgPreset(String),

    /// A timing preset name that is not in the preset table.
    UnknownTimingPreset(String),

    /// A transfer rate was given together with a timing preset; the preset
    /// already fixes the clock.
    RateWithTimingPreset,

    /// An organization level count was left unspecified.
    MissingOrgLevel(&'static str),

    /// A timing parameter was left unspecified in both cycles and nanoseconds.
    MissingTiming(&'static str),

    /// The configured per-channel density disagrees with the density computed
    /// from the level counts and device width.
    DensityMismatch { provided: i64, computed: i64 },

    /// A controller plugin spec names a plugin that does not exist.
    UnknownPlugin(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownOrgPreset(name) => {
                write!(f, "unrecognized organization preset \"{}\"", name)
            }
            ConfigError::UnknownTimingPreset(name) => {
                write!(f, "unrecognized timing preset \"{}\"", name)
            }
            ConfigError::RateWithTimingPreset => {
                write!(f, "cannot change the transfer rate when using a timing preset")
            }
            ConfigError::MissingOrgLevel(level) => {
                write!(f, "organization level \"{}\" is not specified", level)
            }
            ConfigError::MissingTiming(name) => {
                write!(f, "timing parameter \"{}\" is not specified", name)
            }
            ConfigError::DensityMismatch { provided, computed } => write!(
                f,
                "calculated channel density {} Mb does not equal the provided density {} Mb",
                computed, provided
            ),
            ConfigError::UnknownPlugin(name) => {
                write!(f, "unrecognized controller plugin \"{}\"", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
