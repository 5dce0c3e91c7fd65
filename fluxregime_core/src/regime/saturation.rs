//! Classifying a solved flux against its reaction bounds
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Which part of the bound geometry a flux sits at
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaturationSide {
    /// Flux sits at the lower bound
    Lb,
    /// Flux sits at the upper bound
    Ub,
    /// Bounds are pinned together and the flux sits on them
    Fixed,
    /// Constrained, but the flux sits strictly inside the bounds
    None,
    /// Both bounds are effectively unbounded, saturation is meaningless
    Open,
    /// No candidate reaction was available for this nutrient
    Missing,
}

impl Display for SaturationSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let side = match self {
            SaturationSide::Lb => "lb",
            SaturationSide::Ub => "ub",
            SaturationSide::Fixed => "fixed",
            SaturationSide::None => "none",
            SaturationSide::Open => "open",
            SaturationSide::Missing => "missing",
        };
        write!(f, "{}", side)
    }
}

/// Saturation state of one (condition, nutrient) pair
///
/// Never mutated after creation. The value fields are None only for
/// [`SaturationSide::Missing`] results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaturationResult {
    pub reaction_id: Option<String>,
    pub flux: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    /// Whether the bounds constrain the reaction at all
    pub is_constrained: bool,
    /// Whether the flux sits at (within tolerance of) a bound
    pub saturated: bool,
    pub side: SaturationSide,
}

impl SaturationResult {
    /// Result for a nutrient whose candidate reactions are all absent from
    /// the model; the condition is kept, not failed
    pub fn missing() -> SaturationResult {
        SaturationResult {
            reaction_id: None,
            flux: None,
            lower_bound: None,
            upper_bound: None,
            is_constrained: false,
            saturated: false,
            side: SaturationSide::Missing,
        }
    }
}

/// Classify a solved flux against its reaction bounds
///
/// # Parameters
/// - reaction_id: id of the classified reaction
/// - lower_bound, upper_bound: bounds in force during the solve
/// - flux: solved flux of the reaction
/// - eps: tolerance when comparing the flux against a bound
/// - infinity_threshold: bound magnitude at which the reaction counts as
///   wide open
///
/// Decision order, first match wins: open, fixed, lower bound, upper bound,
/// none. A wide open exchange cannot signal a limitation regardless of its
/// flux, so the open check precedes everything else. Tolerances are explicit
/// parameters; nutrient classes with different numerics pass different
/// values.
pub fn classify(
    reaction_id: &str,
    lower_bound: f64,
    upper_bound: f64,
    flux: f64,
    eps: f64,
    infinity_threshold: f64,
) -> SaturationResult {
    let mut result = SaturationResult {
        reaction_id: Some(reaction_id.to_string()),
        flux: Some(flux),
        lower_bound: Some(lower_bound),
        upper_bound: Some(upper_bound),
        is_constrained: true,
        saturated: false,
        side: SaturationSide::None,
    };

    if lower_bound <= -infinity_threshold && upper_bound >= infinity_threshold {
        result.is_constrained = false;
        result.side = SaturationSide::Open;
        return result;
    }

    if (lower_bound - upper_bound).abs() <= eps && (flux - lower_bound).abs() <= eps {
        result.saturated = true;
        result.side = SaturationSide::Fixed;
        return result;
    }

    if (flux - lower_bound).abs() <= eps {
        result.saturated = true;
        result.side = SaturationSide::Lb;
        return result;
    }

    if (flux - upper_bound).abs() <= eps {
        result.saturated = true;
        result.side = SaturationSide::Ub;
        return result;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;
    const INF: f64 = 999.;

    #[test]
    fn wide_open_bounds_cannot_saturate() {
        // Regardless of where the flux sits
        for flux in [-1000., -10., 0., 999.9] {
            let result = classify("EX_glc__D_e", -1000., 1000., flux, EPS, INF);
            assert_eq!(result.side, SaturationSide::Open);
            assert!(!result.is_constrained);
            assert!(!result.saturated);
        }
    }

    #[test]
    fn pinned_bounds_classify_as_fixed() {
        let result = classify("ATPM", 5., 5., 5., EPS, INF);
        assert_eq!(result.side, SaturationSide::Fixed);
        assert!(result.is_constrained);
        assert!(result.saturated);
    }

    #[test]
    fn lower_bound_saturation() {
        let result = classify("EX_ac_e", -10., 1000., -10., EPS, INF);
        assert_eq!(result.side, SaturationSide::Lb);
        assert!(result.saturated);

        // Within eps of the bound still counts
        let result = classify("EX_ac_e", -10., 1000., -10. + 1e-8, EPS, INF);
        assert_eq!(result.side, SaturationSide::Lb);
    }

    #[test]
    fn upper_bound_saturation_requires_eps_proximity() {
        let result = classify("EX_ac_e", -10., 1000., 500., EPS, INF);
        assert_eq!(result.side, SaturationSide::None);
        assert!(result.is_constrained);
        assert!(!result.saturated);

        let result = classify("EX_ac_e", -10., 1000., 1000. - 1e-8, EPS, INF);
        assert_eq!(result.side, SaturationSide::Ub);
        assert!(result.saturated);
    }

    #[test]
    fn interior_flux_is_unsaturated() {
        let result = classify("EX_nh4_e", -8., 0., -3., EPS, INF);
        assert_eq!(result.side, SaturationSide::None);
        assert!(result.is_constrained);
        assert!(!result.saturated);
    }

    #[test]
    fn missing_result_shape() {
        let result = SaturationResult::missing();
        assert_eq!(result.side, SaturationSide::Missing);
        assert!(!result.is_constrained);
        assert!(!result.saturated);
        assert!(result.reaction_id.is_none());
        assert!(result.flux.is_none());
    }

    #[test]
    fn one_sided_infinite_bound_is_still_constrained() {
        // Only the upper bound is wide open; the lower bound can saturate
        let result = classify("EX_pi_e", -3., 1000., -3., EPS, INF);
        assert_eq!(result.side, SaturationSide::Lb);
        assert!(result.is_constrained);
    }
}
