//! Combining anchors, the blocked set and the flux ranking into a fixed
//! length target list
use indexmap::IndexSet;

use crate::metabolic_model::model::Model;
use crate::optimize::solver::FluxSolver;
use crate::selection::anchors::AnchorSet;
use crate::selection::ranking::rank_by_magnitude;
use crate::selection::SelectionError;

/// An ordered, duplicate free list of reaction ids of exactly the requested
/// length, consumed by the downstream flux variability step
///
/// Created once per selection run and immutable afterwards.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TargetList(Vec<String>);

impl TargetList {
    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[cfg(test)]
    pub(crate) fn from_ids(ids: Vec<String>) -> TargetList {
        TargetList(ids)
    }
}

impl IntoIterator for TargetList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Set of reactions that can never carry flux under current bounds
///
/// Thin wrapper over the solver's blocked-reaction analysis; the result is
/// only used for membership tests. A failed analysis is fatal to selection.
pub fn blocked_set(
    solver: &mut impl FluxSolver,
    model: &Model,
) -> Result<IndexSet<String>, SelectionError> {
    Ok(solver.blocked_reactions(model)?)
}

/// Select the target reactions for in-depth analysis
///
/// # Parameters
/// - model: model to select from, with condition bounds already applied
/// - solver: flux balance backend used for the blocked-reaction analysis and,
///   if needed, the parsimonious ranking solve
/// - anchors: validated anchor configuration
/// - target_count: exact length of the returned list
///
/// Anchor matches (minus blocked reactions) are favored over auto-filled
/// ones: if there are at least `target_count` of them the list is a simple
/// truncation, otherwise the remainder is filled by walking the flux ranking
/// and skipping blocked or already-selected ids. Falling short of
/// `target_count` after exhausting the ranking is a hard failure, not a
/// partial result.
pub fn select_targets(
    model: &Model,
    solver: &mut impl FluxSolver,
    anchors: &AnchorSet,
    target_count: usize,
) -> Result<TargetList, SelectionError> {
    if target_count == 0 {
        return Err(SelectionError::InvalidTargetCount);
    }

    let matched = anchors.match_reactions(model);
    let blocked = blocked_set(solver, model)?;

    let mut targets: IndexSet<String> = matched
        .into_iter()
        .filter(|id| !blocked.contains(id))
        .collect();
    let anchored = targets.len();

    if targets.len() >= target_count {
        targets.truncate(target_count);
        tracing::debug!(
            anchored,
            blocked = blocked.len(),
            target_count,
            "target list filled from anchors alone"
        );
        return Ok(TargetList(targets.into_iter().collect()));
    }

    let representative = solver.parsimonious(model)?;
    for id in rank_by_magnitude(&representative)? {
        if targets.len() == target_count {
            break;
        }
        if blocked.contains(&id) {
            continue;
        }
        targets.insert(id);
    }

    if targets.len() != target_count {
        return Err(SelectionError::Shortfall {
            achieved: targets.len(),
            requested: target_count,
        });
    }

    tracing::debug!(
        anchored,
        auto_filled = target_count - anchored,
        blocked = blocked.len(),
        "target list filled from anchors plus flux ranking"
    );
    Ok(TargetList(targets.into_iter().collect()))
}
