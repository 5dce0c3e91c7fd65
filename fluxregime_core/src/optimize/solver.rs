//! Implements the solver interface consumed by the analysis
use indexmap::IndexSet;
use thiserror::Error;

use crate::metabolic_model::model::Model;
use crate::optimize::solution::{FluxRange, FluxSolution, OptimizationStatus};

/// Capability interface over a flux balance backend
///
/// Every call is blocking and synchronous. Implementations read the model's
/// current reaction bounds at call time, so callers are responsible for the
/// per-condition bound isolation described in
/// [`crate::regime::table::ModelProvider`].
pub trait FluxSolver {
    /// Solve the model to optimality
    fn optimize(&mut self, model: &Model) -> Result<FluxSolution, SolveError>;

    /// Minimal-total-flux solution consistent with the optimal objective
    ///
    /// Used as the single representative flux assignment when ranking
    /// reactions by activity.
    fn parsimonious(&mut self, model: &Model) -> Result<FluxSolution, SolveError>;

    /// Ids of reactions that cannot carry nonzero flux under current bounds
    fn blocked_reactions(&mut self, model: &Model) -> Result<IndexSet<String>, SolveError>;

    /// Per reaction flux ranges consistent with a near-optimal objective
    fn flux_variability(
        &mut self,
        model: &Model,
        reaction_ids: &[String],
    ) -> Result<Vec<FluxRange>, SolveError>;
}

/// Errors raised by a solver backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The backend itself failed (numerical trouble, missing license, ...)
    #[error("Solver backend failed: {0}")]
    Backend(String),
    /// The solve finished, but not at an optimum
    #[error("Solve finished with non-optimal status {0:?}")]
    NotOptimal(OptimizationStatus),
}
