//! This module provides the Model struct for representing an entire metabolic
//! model, along with the narrow capability traits the analysis consumes
use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::reaction::Reaction;

/// Represents a Genome Scale Metabolic Model
///
/// Reaction bounds are mutable state on the model. A model whose bounds were
/// changed while setting up one experimental condition must never be reused
/// for another condition without [`Model::restore_bounds`] or a fresh load,
/// see [`crate::regime::table::ModelProvider`].
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Map of reaction ids to Reaction objects, in model enumeration order
    pub reactions: IndexMap<String, Reaction>,
    /// Id associated with the Model
    pub id: Option<String>,
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            id: None,
        }
    }

    /// Add a reaction to the model
    ///
    /// # Parameters
    /// - reaction: Reaction to add
    ///
    /// # Examples
    /// ```rust
    /// use fluxregime_core::metabolic_model::model::Model;
    /// use fluxregime_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction".to_string()).build().unwrap();
    /// model.add_reaction(new_reaction);
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Capture the current bounds of every reaction
    pub fn bounds_snapshot(&self) -> BoundsSnapshot {
        BoundsSnapshot {
            bounds: self
                .reactions
                .iter()
                .map(|(id, reaction)| (id.clone(), reaction.bounds()))
                .collect(),
        }
    }

    /// Restore every reaction bound captured in a snapshot
    ///
    /// Fails if the snapshot names a reaction no longer in the model.
    pub fn restore_bounds(&mut self, snapshot: &BoundsSnapshot) -> Result<(), ModelError> {
        for (id, (lower, upper)) in &snapshot.bounds {
            match self.reactions.get_mut(id) {
                Some(reaction) => {
                    reaction.lower_bound = *lower;
                    reaction.upper_bound = *upper;
                }
                None => return Err(ModelError::UnknownReaction(id.clone())),
            }
        }
        Ok(())
    }
}

/// Saved reaction bounds, used to undo per-condition mutations
#[derive(Clone, Debug)]
pub struct BoundsSnapshot {
    bounds: IndexMap<String, (f64, f64)>,
}

/// Read access to the reactions of a model
///
/// Enumeration order is the model's own order and is relied upon by the
/// anchor matcher and the target selector.
pub trait ReactionQuery {
    /// Reaction ids in model enumeration order
    fn reaction_ids(&self) -> Vec<&str>;
    /// Human readable name of a reaction, if it has one
    fn display_name(&self, id: &str) -> Option<&str>;
    /// Whether a reaction with this id is present
    fn contains_reaction(&self, id: &str) -> bool;
    /// Lower and upper bound of a reaction
    fn bounds(&self, id: &str) -> Option<(f64, f64)>;
}

/// Write access to reaction bounds
pub trait BoundMutator {
    /// Set both bounds of a reaction
    fn set_bounds(&mut self, id: &str, lower_bound: f64, upper_bound: f64)
        -> Result<(), ModelError>;
    /// Set only the lower bound of a reaction
    fn set_lower_bound(&mut self, id: &str, lower_bound: f64) -> Result<(), ModelError>;
    /// Set only the upper bound of a reaction
    fn set_upper_bound(&mut self, id: &str, upper_bound: f64) -> Result<(), ModelError>;
}

impl ReactionQuery for Model {
    fn reaction_ids(&self) -> Vec<&str> {
        self.reactions.keys().map(|id| id.as_str()).collect()
    }

    fn display_name(&self, id: &str) -> Option<&str> {
        self.reactions.get(id)?.name.as_deref()
    }

    fn contains_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }

    fn bounds(&self, id: &str) -> Option<(f64, f64)> {
        self.reactions.get(id).map(|reaction| reaction.bounds())
    }
}

impl BoundMutator for Model {
    fn set_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        if lower_bound > upper_bound {
            return Err(ModelError::InvalidBounds(id.to_string()));
        }
        match self.reactions.get_mut(id) {
            Some(reaction) => {
                reaction.lower_bound = lower_bound;
                reaction.upper_bound = upper_bound;
                Ok(())
            }
            None => Err(ModelError::UnknownReaction(id.to_string())),
        }
    }

    fn set_lower_bound(&mut self, id: &str, lower_bound: f64) -> Result<(), ModelError> {
        let (_, upper) = ReactionQuery::bounds(self, id)
            .ok_or_else(|| ModelError::UnknownReaction(id.to_string()))?;
        self.set_bounds(id, lower_bound, upper)
    }

    fn set_upper_bound(&mut self, id: &str, upper_bound: f64) -> Result<(), ModelError> {
        let (lower, _) = ReactionQuery::bounds(self, id)
            .ok_or_else(|| ModelError::UnknownReaction(id.to_string()))?;
        self.set_bounds(id, lower, upper_bound)
    }
}

/// Errors associated with the Model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Tried to access a reaction that is not in the model
    #[error("Reaction \"{0}\" is not present in the model")]
    UnknownReaction(String),
    /// Tried to set bounds with lower_bound > upper_bound
    #[error("Tried to set bounds with lower_bound > upper_bound on reaction \"{0}\"")]
    InvalidBounds(String),
    /// A fresh model instance could not be produced
    #[error("Failed to load model: {0}")]
    Load(String),
}
