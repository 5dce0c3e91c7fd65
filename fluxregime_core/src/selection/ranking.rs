//! Ranking reactions by flux magnitude in a representative solution
use itertools::Itertools;

use crate::optimize::solution::FluxSolution;
use crate::selection::SelectionError;

/// Order all reaction ids of a solution by descending absolute flux
///
/// The solution must come from an optimal solve (in practice the
/// parsimonious one, see [`crate::optimize::solver::FluxSolver::parsimonious`]);
/// anything else fails fast. Reactions with equal magnitude order
/// lexicographically by id, so the ranking never depends on incidental map
/// iteration order.
pub fn rank_by_magnitude(solution: &FluxSolution) -> Result<Vec<String>, SelectionError> {
    if !solution.is_optimal() {
        return Err(SelectionError::RankingNotOptimal(solution.status));
    }
    let ranked = solution
        .fluxes
        .iter()
        .map(|(id, flux)| (id.clone(), flux.abs()))
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(id, _)| id)
        .collect();
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solution::OptimizationStatus;
    use indexmap::IndexMap;

    fn solution(status: OptimizationStatus, fluxes: &[(&str, f64)]) -> FluxSolution {
        FluxSolution {
            status,
            objective_value: Some(1.0),
            fluxes: fluxes
                .iter()
                .map(|(id, flux)| (id.to_string(), *flux))
                .collect(),
        }
    }

    #[test]
    fn requires_optimal_status() {
        let sol = solution(OptimizationStatus::Infeasible, &[("A", 1.0)]);
        match rank_by_magnitude(&sol) {
            Err(SelectionError::RankingNotOptimal(OptimizationStatus::Infeasible)) => {}
            other => panic!("Non-optimal solve not caught: {:?}", other),
        }
    }

    #[test]
    fn descending_magnitude() {
        let sol = solution(
            OptimizationStatus::Optimal,
            &[("A", 1.0), ("B", -7.5), ("C", 3.0), ("D", 0.0)],
        );
        let ranked = rank_by_magnitude(&sol).unwrap();
        assert_eq!(ranked, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn ties_break_lexicographically() {
        // Insertion order is deliberately scrambled relative to the ids
        let sol = solution(
            OptimizationStatus::Optimal,
            &[("zwf", 2.0), ("ack", -2.0), ("pgk", 2.0)],
        );
        let ranked = rank_by_magnitude(&sol).unwrap();
        assert_eq!(ranked, vec!["ack", "pgk", "zwf"]);
    }

    #[test]
    fn empty_solution_ranks_empty() {
        let sol = FluxSolution {
            status: OptimizationStatus::Optimal,
            objective_value: Some(0.0),
            fluxes: IndexMap::new(),
        };
        assert!(rank_by_magnitude(&sol).unwrap().is_empty());
    }
}
