//! Process wide defaults for reaction bounds and numerical tolerances
use std::sync::{LazyLock, RwLock};

use thiserror::Error;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Default lower flux bound for reactions created without one
    pub lower_bound: f64,
    /// Default upper flux bound for reactions created without one
    pub upper_bound: f64,
    /// Default tolerance when comparing a flux against a bound
    pub eps: f64,
    /// Magnitude at which a bound is treated as effectively unbounded
    pub infinity_threshold: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            eps: 1e-6,
            infinity_threshold: 999.,
        }
    }
}

/// Errors raised while validating anchor or regime configuration
///
/// These are always detected before any solve is attempted and are fatal to
/// the whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The anchor list was empty
    #[error("Anchor configuration contains no anchors")]
    NoAnchors,
    /// An anchor had a blank name
    #[error("Anchor at position {0} has an empty name")]
    BlankAnchorName(usize),
    /// An anchor had no non-empty keywords left after trimming
    #[error("Anchor \"{0}\" has no usable keywords")]
    NoKeywords(String),
    /// The regime configuration listed no nutrients
    #[error("Regime configuration contains no nutrients")]
    NoNutrients,
    /// A nutrient was configured without candidate reaction ids
    #[error("Nutrient \"{0}\" has no candidate reaction ids")]
    NoCandidates(String),
}
