//! Module for selecting the bounded, reproducible set of target reactions
//! handed to the downstream flux variability step
pub mod anchors;
pub mod ranking;
pub mod targets;

use thiserror::Error;

use crate::optimize::solution::OptimizationStatus;
use crate::optimize::solver::SolveError;

/// Errors raised while selecting target reactions
///
/// All of these are fatal: selection either returns a list of exactly the
/// requested length or nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    /// A non-positive target count was requested
    #[error("target_count must be positive")]
    InvalidTargetCount,
    /// A solver call made during selection failed
    #[error("Solver call failed during target selection: {0}")]
    Solve(#[from] SolveError),
    /// The representative flux solve used for ranking was not optimal
    #[error("Flux ranking requires an optimal solve, got status {0:?}")]
    RankingNotOptimal(OptimizationStatus),
    /// Fewer eligible reactions than requested remained after filtering
    #[error(
        "Only {achieved} of {requested} requested targets are eligible under current bounds"
    )]
    Shortfall { achieved: usize, requested: usize },
}
