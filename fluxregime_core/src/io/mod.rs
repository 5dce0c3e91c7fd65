//! Module for reading configuration and writing result tables
use std::path::PathBuf;

use thiserror::Error;

use crate::conditions::ConditionError;
use crate::configuration::ConfigError;

pub mod json;
pub mod tables;

/// Errors raised while reading or writing files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {path} as JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Could not process {path} as CSV: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// A required column is absent from a CSV header
    #[error("{path} is missing required column \"{column}\"")]
    MissingColumn { path: PathBuf, column: String },
    /// A numeric CSV field failed to parse
    #[error("Column \"{column}\" in {path} holds non-numeric value \"{value}\"")]
    InvalidNumeric {
        path: PathBuf,
        column: String,
        value: String,
    },
    /// The file parsed but its contents failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Condition(#[from] ConditionError),
}
