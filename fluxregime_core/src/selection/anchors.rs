//! Keyword anchors used to seed the target selection
//!
//! An anchor is a named set of keywords; a reaction matches an anchor when
//! any keyword is a case-insensitive substring of the reaction id or of its
//! display name. Anchors pull curated reactions into the target set before
//! any ranking-based auto-fill.
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::configuration::ConfigError;
use crate::metabolic_model::model::ReactionQuery;

/// A named, keyword-defined seed for target selection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Used to identify the anchor in configuration and diagnostics
    pub name: String,
    /// Keywords matched against reaction ids and display names
    pub keywords: Vec<String>,
}

/// A validated, ordered collection of anchors
///
/// Construction trims keywords, drops empty ones, and rejects malformed
/// anchors, so matching never has to re-validate.
#[derive(Clone, Debug)]
pub struct AnchorSet {
    anchors: Vec<Anchor>,
}

impl AnchorSet {
    /// Validate a list of anchors into an AnchorSet
    ///
    /// # Parameters
    /// - anchors: ordered anchor list, usually deserialized from a
    ///   configuration file
    ///
    /// Fails with a [`ConfigError`] if the list is empty, an anchor name is
    /// blank, or an anchor has no non-empty keyword after trimming.
    pub fn new(anchors: Vec<Anchor>) -> Result<AnchorSet, ConfigError> {
        if anchors.is_empty() {
            return Err(ConfigError::NoAnchors);
        }
        let mut validated = Vec::with_capacity(anchors.len());
        for (position, anchor) in anchors.into_iter().enumerate() {
            let name = anchor.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::BlankAnchorName(position));
            }
            // Keywords are lowercased once here so matching is a plain
            // substring test.
            let keywords: Vec<String> = anchor
                .keywords
                .iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect();
            if keywords.is_empty() {
                return Err(ConfigError::NoKeywords(name));
            }
            validated.push(Anchor { name, keywords });
        }
        Ok(AnchorSet { anchors: validated })
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Ids of all reactions matching any anchor keyword
    ///
    /// Output is in model enumeration order and duplicate free; a reaction
    /// matching several anchors appears once.
    pub fn match_reactions(&self, query: &impl ReactionQuery) -> Vec<String> {
        let mut matched: IndexSet<String> = IndexSet::new();
        for id in query.reaction_ids() {
            let id_lower = id.to_lowercase();
            let name_lower = query.display_name(id).map(|name| name.to_lowercase());
            let hit = self.anchors.iter().any(|anchor| {
                anchor.keywords.iter().any(|keyword| {
                    id_lower.contains(keyword)
                        || name_lower
                            .as_deref()
                            .is_some_and(|name| name.contains(keyword))
                })
            });
            if hit {
                matched.insert(id.to_string());
            }
        }
        matched.into_iter().collect()
    }
}
