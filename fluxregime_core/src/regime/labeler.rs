//! Assigning one regime label per condition from per nutrient saturation
//! flags
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Nutrients whose exchange saturation can signal a limitation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Acetate,
    Ammonium,
    Phosphate,
    Oxygen,
}

impl Nutrient {
    /// Short key used in configuration files and table column names
    pub fn key(&self) -> &'static str {
        match self {
            Nutrient::Acetate => "acetate",
            Nutrient::Ammonium => "ammonium",
            Nutrient::Phosphate => "phosphate",
            Nutrient::Oxygen => "oxygen",
        }
    }
}

impl Display for Nutrient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The active limitation regime of one condition
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimeLabel {
    #[serde(rename = "Ac_limited")]
    AcLimited,
    #[serde(rename = "N_limited")]
    NLimited,
    #[serde(rename = "Pi_limited")]
    PiLimited,
    #[serde(rename = "O2_limited")]
    O2Limited,
    Unconstrained,
}

impl Display for RegimeLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RegimeLabel::AcLimited => "Ac_limited",
            RegimeLabel::NLimited => "N_limited",
            RegimeLabel::PiLimited => "Pi_limited",
            RegimeLabel::O2Limited => "O2_limited",
            RegimeLabel::Unconstrained => "Unconstrained",
        };
        write!(f, "{}", label)
    }
}

/// Dominance order over co-occurring limitations, walked first to last
///
/// This is a deliberate design choice, not a tie-break: when two nutrients
/// saturate simultaneously only the higher priority one is reported. Keeping
/// the order as data makes reordering a one-line change.
pub const PRIORITY_RULES: [(Nutrient, RegimeLabel); 4] = [
    (Nutrient::Acetate, RegimeLabel::AcLimited),
    (Nutrient::Ammonium, RegimeLabel::NLimited),
    (Nutrient::Phosphate, RegimeLabel::PiLimited),
    (Nutrient::Oxygen, RegimeLabel::O2Limited),
];

/// Assign the regime label for one condition
///
/// # Parameters
/// - saturated: per nutrient saturation flags; nutrients absent from the map
///   count as unsaturated
pub fn label_regime(saturated: &IndexMap<Nutrient, bool>) -> RegimeLabel {
    for (nutrient, label) in PRIORITY_RULES {
        if saturated.get(&nutrient).copied().unwrap_or(false) {
            return label;
        }
    }
    RegimeLabel::Unconstrained
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    #[test]
    fn priority_order_not_majority_vote() {
        let flags = indexmap! {
            Nutrient::Acetate => true,
            Nutrient::Ammonium => true,
            Nutrient::Oxygen => true,
        };
        assert_eq!(label_regime(&flags), RegimeLabel::AcLimited);
    }

    #[test]
    fn lower_priority_wins_only_when_higher_are_clear() {
        let flags = indexmap! {
            Nutrient::Acetate => false,
            Nutrient::Ammonium => false,
            Nutrient::Phosphate => true,
            Nutrient::Oxygen => true,
        };
        assert_eq!(label_regime(&flags), RegimeLabel::PiLimited);
    }

    #[test]
    fn no_saturation_is_unconstrained() {
        let flags = indexmap! {
            Nutrient::Acetate => false,
            Nutrient::Oxygen => false,
        };
        assert_eq!(label_regime(&flags), RegimeLabel::Unconstrained);
        assert_eq!(label_regime(&IndexMap::new()), RegimeLabel::Unconstrained);
    }

    #[test]
    fn label_display_names() {
        assert_eq!(format!("{}", RegimeLabel::AcLimited), "Ac_limited");
        assert_eq!(format!("{}", RegimeLabel::NLimited), "N_limited");
        assert_eq!(format!("{}", RegimeLabel::PiLimited), "Pi_limited");
        assert_eq!(format!("{}", RegimeLabel::O2Limited), "O2_limited");
        assert_eq!(format!("{}", RegimeLabel::Unconstrained), "Unconstrained");
    }

    #[test]
    fn label_serde_names() {
        let json = serde_json::to_string(&RegimeLabel::O2Limited).unwrap();
        assert_eq!(json, "\"O2_limited\"");
        let back: RegimeLabel = serde_json::from_str("\"Ac_limited\"").unwrap();
        assert_eq!(back, RegimeLabel::AcLimited);
    }
}
