//! Regime configuration: which reactions probe each nutrient, and with what
//! tolerances
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::configuration::{ConfigError, CONFIGURATION};
use crate::metabolic_model::model::ReactionQuery;
use crate::regime::labeler::Nutrient;

/// Tolerances used when classifying one nutrient's probe reaction
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Tolerance when comparing a flux against a bound
    pub eps: f64,
    /// Bound magnitude at which the reaction counts as wide open
    pub infinity_threshold: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        let configuration = CONFIGURATION.read().unwrap();
        Tolerances {
            eps: configuration.eps,
            infinity_threshold: configuration.infinity_threshold,
        }
    }
}

/// Candidate probe reactions for one nutrient
///
/// Candidates are ordered; the first id present in a given model is the one
/// classified for that model. Different model snapshots may resolve to
/// different candidates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NutrientProbe {
    pub candidates: Vec<String>,
    /// Overrides the file level tolerances for this nutrient
    #[serde(default)]
    pub tolerances: Option<Tolerances>,
}

/// Validated mapping from nutrient to candidate probe reactions
#[derive(Clone, Debug)]
pub struct RegimeConfig {
    probes: IndexMap<Nutrient, NutrientProbe>,
    default_tolerances: Tolerances,
}

impl RegimeConfig {
    /// Validate a nutrient -> probe mapping into a RegimeConfig
    ///
    /// Fails with a [`ConfigError`] if the mapping is empty or any nutrient
    /// has an empty candidate list; both indicate an unusable configuration
    /// file, caught before any solve.
    pub fn new(
        probes: IndexMap<Nutrient, NutrientProbe>,
        default_tolerances: Tolerances,
    ) -> Result<RegimeConfig, ConfigError> {
        if probes.is_empty() {
            return Err(ConfigError::NoNutrients);
        }
        for (nutrient, probe) in &probes {
            if probe.candidates.iter().all(|id| id.trim().is_empty()) {
                return Err(ConfigError::NoCandidates(nutrient.key().to_string()));
            }
        }
        Ok(RegimeConfig {
            probes,
            default_tolerances,
        })
    }

    /// Nutrients in configuration order
    pub fn nutrients(&self) -> impl Iterator<Item = Nutrient> + '_ {
        self.probes.keys().copied()
    }

    /// First candidate reaction of a nutrient present in the model
    pub fn resolve<'a>(&'a self, nutrient: Nutrient, query: &impl ReactionQuery) -> Option<&'a str> {
        self.probes.get(&nutrient)?.candidates.iter().find_map(|id| {
            if query.contains_reaction(id) {
                Some(id.as_str())
            } else {
                None
            }
        })
    }

    /// Tolerances for a nutrient, falling back to the file level defaults
    pub fn tolerances_for(&self, nutrient: Nutrient) -> Tolerances {
        self.probes
            .get(&nutrient)
            .and_then(|probe| probe.tolerances)
            .unwrap_or(self.default_tolerances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::model::Model;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use indexmap::indexmap;

    fn probe(candidates: &[&str]) -> NutrientProbe {
        NutrientProbe {
            candidates: candidates.iter().map(|id| id.to_string()).collect(),
            tolerances: None,
        }
    }

    fn setup_model() -> Model {
        let mut model = Model::new_empty();
        model.add_reaction(
            ReactionBuilder::default()
                .id("EX_ac_e".to_string())
                .build()
                .unwrap(),
        );
        model
    }

    #[test]
    fn rejects_empty_config() {
        let res = RegimeConfig::new(IndexMap::new(), Tolerances::default());
        assert_eq!(res.unwrap_err(), ConfigError::NoNutrients);
    }

    #[test]
    fn rejects_nutrient_without_candidates() {
        let res = RegimeConfig::new(
            indexmap! { Nutrient::Oxygen => probe(&[""]) },
            Tolerances::default(),
        );
        assert_eq!(res.unwrap_err(), ConfigError::NoCandidates("oxygen".to_string()));
    }

    #[test]
    fn first_candidate_present_wins() {
        let config = RegimeConfig::new(
            indexmap! {
                Nutrient::Acetate => probe(&["EX_ac_e_alt", "EX_ac_e"]),
            },
            Tolerances::default(),
        )
        .unwrap();
        let model = setup_model();
        assert_eq!(config.resolve(Nutrient::Acetate, &model), Some("EX_ac_e"));
    }

    #[test]
    fn all_candidates_absent_resolves_to_none() {
        let config = RegimeConfig::new(
            indexmap! { Nutrient::Oxygen => probe(&["EX_o2_e"]) },
            Tolerances::default(),
        )
        .unwrap();
        assert_eq!(config.resolve(Nutrient::Oxygen, &setup_model()), None);
    }

    #[test]
    fn tolerances_fall_back_to_defaults() {
        let defaults = Tolerances {
            eps: 1e-4,
            infinity_threshold: 500.,
        };
        let config = RegimeConfig::new(
            indexmap! {
                Nutrient::Acetate => NutrientProbe {
                    candidates: vec!["EX_ac_e".to_string()],
                    tolerances: Some(Tolerances { eps: 1e-2, infinity_threshold: 99. }),
                },
                Nutrient::Oxygen => probe(&["EX_o2_e"]),
            },
            defaults,
        )
        .unwrap();
        assert_eq!(config.tolerances_for(Nutrient::Acetate).eps, 1e-2);
        assert_eq!(config.tolerances_for(Nutrient::Oxygen).eps, 1e-4);
    }
}
