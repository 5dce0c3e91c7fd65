//! Experimental condition table consumed by the regime and feature pipelines
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metabolic_model::model::{BoundMutator, Model, ModelError, ReactionQuery};

/// One experimental condition
///
/// Lifecycle is read-only input: rows are loaded once and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Unique identifier of the condition
    pub condition_id: String,
    /// Uptake settings applied to reaction bounds before solving,
    /// keyed by exchange reaction id
    pub uptakes: IndexMap<String, f64>,
    /// Arbitrary experiment metadata
    pub metadata: IndexMap<String, String>,
}

impl Condition {
    /// Apply this condition's uptake settings to the exchange lower bounds
    ///
    /// Uptake is negative flux by convention, so the value lands on the
    /// lower bound. Uptake columns naming reactions absent from the model
    /// are skipped with a warning; they surface later as missing probes if a
    /// nutrient depended on them.
    pub fn apply_to(&self, model: &mut Model) -> Result<(), ModelError> {
        for (reaction_id, uptake) in &self.uptakes {
            if !model.contains_reaction(reaction_id) {
                tracing::warn!(
                    condition_id = %self.condition_id,
                    reaction_id = %reaction_id,
                    "uptake column names a reaction absent from the model, skipping"
                );
                continue;
            }
            model.set_lower_bound(reaction_id, *uptake)?;
        }
        Ok(())
    }
}

/// Conditions keyed by a unique condition_id
#[derive(Clone, Debug, Default)]
pub struct ConditionTable {
    pub(crate) rows: Vec<Condition>,
}

impl ConditionTable {
    /// Build a table, rejecting duplicate condition ids
    pub fn new(rows: Vec<Condition>) -> Result<ConditionTable, ConditionError> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for row in &rows {
            if !seen.insert(row.condition_id.as_str()) {
                return Err(ConditionError::DuplicateConditionId(
                    row.condition_id.clone(),
                ));
            }
        }
        Ok(ConditionTable { rows })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.rows.iter()
    }

    pub fn get(&self, condition_id: &str) -> Option<&Condition> {
        self.rows
            .iter()
            .find(|row| row.condition_id == condition_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Errors associated with the condition table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    /// Two rows share a condition_id
    #[error("Duplicate condition_id \"{0}\" in condition table")]
    DuplicateConditionId(String),
}
