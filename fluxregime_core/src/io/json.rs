//! Module providing JSON IO for anchor and regime configuration
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::io::IoError;
use crate::regime::config::{NutrientProbe, RegimeConfig, Tolerances};
use crate::regime::labeler::Nutrient;
use crate::selection::anchors::{Anchor, AnchorSet};
use crate::selection::targets::TargetList;

// region File formats
/// Anchor configuration file
#[derive(Serialize, Deserialize)]
struct JsonAnchorFile {
    anchors: Vec<Anchor>,
}

/// Regime configuration file
#[derive(Serialize, Deserialize)]
struct JsonRegimeFile {
    /// File level tolerances, process defaults when absent
    #[serde(default)]
    defaults: Option<Tolerances>,
    /// Candidate probe reactions per nutrient, in priority-relevant order
    nutrients: IndexMap<Nutrient, NutrientProbe>,
}
// endregion File formats

/// Read and validate an anchor configuration file
pub fn read_anchor_set<P: AsRef<Path>>(path: P) -> Result<AnchorSet, IoError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: JsonAnchorFile = serde_json::from_str(&data).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(AnchorSet::new(file.anchors)?)
}

/// Read and validate a regime configuration file
pub fn read_regime_config<P: AsRef<Path>>(path: P) -> Result<RegimeConfig, IoError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: JsonRegimeFile = serde_json::from_str(&data).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(RegimeConfig::new(
        file.nutrients,
        file.defaults.unwrap_or_default(),
    )?)
}

/// Write a target list as a JSON array of reaction ids
pub fn write_target_list<P: AsRef<Path>>(path: P, targets: &TargetList) -> Result<(), IoError> {
    let path = path.as_ref();
    let data = serde_json::to_string_pretty(targets).map_err(|source| IoError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, data).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
