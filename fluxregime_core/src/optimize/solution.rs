//! Solution types returned by a flux balance solve
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationStatus {
    /// Problem has not yet attempted to be optimized
    Unoptimized,
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
}

/// One feasible flux assignment with its solve status
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FluxSolution {
    /// Status the solver finished with
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Per reaction flux values, keyed by reaction id in model enumeration order
    pub fluxes: IndexMap<String, f64>,
}

impl FluxSolution {
    pub fn is_optimal(&self) -> bool {
        self.status == OptimizationStatus::Optimal
    }

    /// Flux carried by a reaction in this solution
    pub fn flux(&self, reaction_id: &str) -> Option<f64> {
        self.fluxes.get(reaction_id).copied()
    }
}

/// Flux range of one reaction from a flux variability analysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluxRange {
    pub reaction_id: String,
    /// Minimum flux consistent with a near-optimal objective
    pub minimum: f64,
    /// Maximum flux consistent with a near-optimal objective
    pub maximum: f64,
}
