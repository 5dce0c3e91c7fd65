//! Reshaping flux variability output into an ML-ready wide feature table
//!
//! The long form has one row per (condition, reaction); the wide form has
//! one row per condition with `width__<rid>`, `mid__<rid>` and
//! `signchange__<rid>` columns, optionally joined with condition metadata.
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conditions::ConditionTable;
use crate::metabolic_model::model::ModelError;
use crate::optimize::solution::FluxRange;
use crate::optimize::solver::FluxSolver;
use crate::regime::table::ModelProvider;
use crate::selection::targets::TargetList;

/// One flux variability observation for one condition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FvaRow {
    pub condition_id: String,
    pub reaction_id: String,
    pub minimum: f64,
    pub maximum: f64,
}

impl FvaRow {
    /// Attach a condition id to a solver-produced flux range
    pub fn from_range(condition_id: &str, range: FluxRange) -> FvaRow {
        FvaRow {
            condition_id: condition_id.to_string(),
            reaction_id: range.reaction_id,
            minimum: range.minimum,
            maximum: range.maximum,
        }
    }
}

/// One row of the long feature table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LongFeatureRow {
    pub condition_id: String,
    pub reaction_id: String,
    /// max - min of the flux range
    pub width: f64,
    /// Midpoint of the flux range
    pub mid: f64,
    /// Whether the range straddles zero
    pub sign_change: bool,
}

/// A typed cell of the wide feature table
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

/// One row of the wide feature table
#[derive(Clone, Debug, PartialEq)]
pub struct WideFeatureRow {
    pub condition_id: String,
    /// Cells keyed by column name, in column order
    pub columns: IndexMap<String, FeatureValue>,
}

/// Run flux variability for a batch of conditions over the target reactions
///
/// Each condition gets its own clean-bounds model instance with the
/// condition's uptakes applied, mirroring the isolation discipline of the
/// regime table. A condition whose variability solve fails is skipped with a
/// warning so the batch survives it; its absence from the long table is
/// visible downstream as missing rows.
pub fn collect_fva(
    provider: &impl ModelProvider,
    solver: &mut impl FluxSolver,
    conditions: &ConditionTable,
    targets: &TargetList,
) -> Result<Vec<FvaRow>, ModelError> {
    let mut rows = Vec::new();
    for condition in conditions.iter() {
        let mut model = provider.fresh()?;
        condition.apply_to(&mut model)?;
        match solver.flux_variability(&model, targets.ids()) {
            Ok(ranges) => {
                rows.extend(
                    ranges
                        .into_iter()
                        .map(|range| FvaRow::from_range(&condition.condition_id, range)),
                );
            }
            Err(err) => {
                tracing::warn!(
                    condition_id = %condition.condition_id,
                    error = %err,
                    "flux variability failed for condition, skipping its rows"
                );
            }
        }
    }
    Ok(rows)
}

/// Compute the long feature table from flux variability rows
pub fn build_long(fva_rows: &[FvaRow]) -> Vec<LongFeatureRow> {
    fva_rows
        .iter()
        .map(|row| LongFeatureRow {
            condition_id: row.condition_id.clone(),
            reaction_id: row.reaction_id.clone(),
            width: row.maximum - row.minimum,
            mid: (row.maximum + row.minimum) / 2.,
            sign_change: row.minimum < 0. && row.maximum > 0.,
        })
        .collect()
}

/// Pivot the long feature table into one row per condition
///
/// Columns are metric major (`width__*`, then `mid__*`, then
/// `signchange__*`), reactions in first-seen order. A duplicate
/// (condition_id, reaction_id) pair is a hard error raised before any output
/// is produced.
pub fn build_wide(long_rows: &[LongFeatureRow]) -> Result<Vec<WideFeatureRow>, FeatureError> {
    let mut seen: IndexSet<(&str, &str)> = IndexSet::new();
    for row in long_rows {
        if !seen.insert((row.condition_id.as_str(), row.reaction_id.as_str())) {
            return Err(FeatureError::DuplicatePair {
                condition_id: row.condition_id.clone(),
                reaction_id: row.reaction_id.clone(),
            });
        }
    }

    let mut reaction_order: IndexSet<&str> = IndexSet::new();
    let mut condition_order: IndexSet<&str> = IndexSet::new();
    for row in long_rows {
        reaction_order.insert(row.reaction_id.as_str());
        condition_order.insert(row.condition_id.as_str());
    }

    let cells: IndexMap<(&str, &str), &LongFeatureRow> = long_rows
        .iter()
        .map(|row| ((row.condition_id.as_str(), row.reaction_id.as_str()), row))
        .collect();

    let mut wide = Vec::with_capacity(condition_order.len());
    for condition_id in &condition_order {
        let mut columns: IndexMap<String, FeatureValue> = IndexMap::new();
        for reaction_id in &reaction_order {
            if let Some(row) = cells.get(&(*condition_id, *reaction_id)) {
                columns.insert(
                    format!("width__{}", reaction_id),
                    FeatureValue::Number(row.width),
                );
            }
        }
        for reaction_id in &reaction_order {
            if let Some(row) = cells.get(&(*condition_id, *reaction_id)) {
                columns.insert(format!("mid__{}", reaction_id), FeatureValue::Number(row.mid));
            }
        }
        for reaction_id in &reaction_order {
            if let Some(row) = cells.get(&(*condition_id, *reaction_id)) {
                columns.insert(
                    format!("signchange__{}", reaction_id),
                    FeatureValue::Flag(row.sign_change),
                );
            }
        }
        wide.push(WideFeatureRow {
            condition_id: condition_id.to_string(),
            columns,
        });
    }
    Ok(wide)
}

/// Join condition metadata onto the wide feature table
///
/// The join is inner and one-to-one on condition_id: every wide row must
/// match exactly one condition, and every matched condition must carry every
/// metadata column present on any other matched condition. Uptake settings
/// join as `uptake_<rid>` numeric columns, metadata as text.
pub fn join_metadata(
    wide: &[WideFeatureRow],
    conditions: &ConditionTable,
) -> Result<Vec<WideFeatureRow>, FeatureError> {
    let mut seen: IndexSet<&str> = IndexSet::new();
    for row in wide {
        if !seen.insert(row.condition_id.as_str()) {
            return Err(FeatureError::DuplicateCondition(row.condition_id.clone()));
        }
    }

    // The required metadata column set is the union over matched conditions
    let mut metadata_columns: IndexSet<&str> = IndexSet::new();
    for row in wide {
        let condition = conditions
            .get(&row.condition_id)
            .ok_or_else(|| FeatureError::MissingMetadata(row.condition_id.clone()))?;
        for column in condition.metadata.keys() {
            metadata_columns.insert(column.as_str());
        }
    }

    let mut joined = Vec::with_capacity(wide.len());
    for row in wide {
        let condition = conditions
            .get(&row.condition_id)
            .ok_or_else(|| FeatureError::MissingMetadata(row.condition_id.clone()))?;
        let mut columns = row.columns.clone();
        for (reaction_id, uptake) in &condition.uptakes {
            columns.insert(
                format!("uptake_{}", reaction_id),
                FeatureValue::Number(*uptake),
            );
        }
        for column in &metadata_columns {
            match condition.metadata.get(*column) {
                Some(value) => {
                    columns.insert(column.to_string(), FeatureValue::Text(value.clone()));
                }
                None => {
                    return Err(FeatureError::MissingMetadataColumn {
                        condition_id: row.condition_id.clone(),
                        column: column.to_string(),
                    })
                }
            }
        }
        joined.push(WideFeatureRow {
            condition_id: row.condition_id.clone(),
            columns,
        });
    }
    Ok(joined)
}

/// Recover the long feature table from wide columns by name prefix
///
/// Inverse of [`build_wide`]; columns without a feature prefix (joined
/// metadata) are ignored. Each reaction must contribute its full
/// width/mid/signchange triple.
pub fn explode_wide(wide: &[WideFeatureRow]) -> Result<Vec<LongFeatureRow>, FeatureError> {
    let mut long_rows = Vec::new();
    for row in wide {
        let mut widths: IndexMap<&str, f64> = IndexMap::new();
        let mut mids: IndexMap<&str, f64> = IndexMap::new();
        let mut signs: IndexMap<&str, bool> = IndexMap::new();
        for (column, value) in &row.columns {
            if let Some(reaction_id) = column.strip_prefix("width__") {
                match value {
                    FeatureValue::Number(width) => widths.insert(reaction_id, *width),
                    _ => {
                        return Err(FeatureError::WrongCellType {
                            condition_id: row.condition_id.clone(),
                            column: column.clone(),
                        })
                    }
                };
            } else if let Some(reaction_id) = column.strip_prefix("mid__") {
                match value {
                    FeatureValue::Number(mid) => mids.insert(reaction_id, *mid),
                    _ => {
                        return Err(FeatureError::WrongCellType {
                            condition_id: row.condition_id.clone(),
                            column: column.clone(),
                        })
                    }
                };
            } else if let Some(reaction_id) = column.strip_prefix("signchange__") {
                match value {
                    FeatureValue::Flag(sign_change) => signs.insert(reaction_id, *sign_change),
                    _ => {
                        return Err(FeatureError::WrongCellType {
                            condition_id: row.condition_id.clone(),
                            column: column.clone(),
                        })
                    }
                };
            }
        }
        for (reaction_id, width) in &widths {
            match (mids.get(reaction_id), signs.get(reaction_id)) {
                (Some(mid), Some(sign_change)) => long_rows.push(LongFeatureRow {
                    condition_id: row.condition_id.clone(),
                    reaction_id: reaction_id.to_string(),
                    width: *width,
                    mid: *mid,
                    sign_change: *sign_change,
                }),
                _ => {
                    return Err(FeatureError::IncompleteTriple {
                        condition_id: row.condition_id.clone(),
                        reaction_id: reaction_id.to_string(),
                    })
                }
            }
        }
        // A mid or signchange column without its width sibling is also a
        // malformed triple
        for reaction_id in mids.keys().chain(signs.keys()) {
            if !widths.contains_key(reaction_id) {
                return Err(FeatureError::IncompleteTriple {
                    condition_id: row.condition_id.clone(),
                    reaction_id: reaction_id.to_string(),
                });
            }
        }
    }
    Ok(long_rows)
}

/// Errors raised while reshaping feature tables
///
/// All of these indicate an unrecoverable input problem and abort
/// immediately, surfacing the offending key.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// The long table keyed the same (condition, reaction) pair twice
    #[error("Duplicate (condition_id, reaction_id) pair (\"{condition_id}\", \"{reaction_id}\") in long feature table")]
    DuplicatePair {
        condition_id: String,
        reaction_id: String,
    },
    /// The wide table keyed the same condition twice
    #[error("Duplicate condition_id \"{0}\" in wide feature table")]
    DuplicateCondition(String),
    /// A wide row has no matching condition metadata
    #[error("No metadata for condition_id \"{0}\"")]
    MissingMetadata(String),
    /// A matched condition is missing a metadata column others carry
    #[error("Condition \"{condition_id}\" is missing metadata column \"{column}\"")]
    MissingMetadataColumn {
        condition_id: String,
        column: String,
    },
    /// A reaction's width/mid/signchange columns were not all present
    #[error("Reaction \"{reaction_id}\" has an incomplete feature triple for condition \"{condition_id}\"")]
    IncompleteTriple {
        condition_id: String,
        reaction_id: String,
    },
    /// A feature column held a value of the wrong type
    #[error("Wide cell \"{column}\" for condition \"{condition_id}\" has the wrong type")]
    WrongCellType {
        condition_id: String,
        column: String,
    },
}
