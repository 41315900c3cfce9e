//! The reaction-network model.
//!
//! A [`Model`] owns its substrates and reactions plus the global level
//! count. It is immutable once built: the compiler and the reference
//! executor only read it.

mod builder;
mod reaction;
mod substrate;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{LevelnetError, StructuralError};

pub use builder::ModelBuilder;
pub use reaction::{Increment, Reaction, ReactionId, ReactionKind};
pub use substrate::{Substrate, SubstrateId};

pub(crate) use substrate::is_identifier;

/// A discrete-level reaction network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// `MAX_LEVELS`: every substrate ranges over `0..=levels`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    levels: Option<u32>,

    #[serde(default)]
    substrates: Vec<Substrate>,

    #[serde(default)]
    reactions: Vec<Reaction>,
}

impl Model {
    /// Starts a new model builder.
    #[must_use]
    pub fn builder() -> ModelBuilder {
        ModelBuilder::new()
    }

    /// The global level count, if set.
    #[must_use]
    pub const fn levels(&self) -> Option<u32> {
        self.levels
    }

    /// Substrates in insertion order.
    #[must_use]
    pub fn substrates(&self) -> &[Substrate] {
        &self.substrates
    }

    /// Reactions in insertion order.
    #[must_use]
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Looks up a substrate by id.
    #[must_use]
    pub fn substrate(&self, id: &str) -> Option<&Substrate> {
        self.substrates.iter().find(|s| s.id.as_str() == id)
    }

    /// Position of a substrate in [`Model::substrates`].
    #[must_use]
    pub fn substrate_index(&self, id: &str) -> Option<usize> {
        self.substrates.iter().position(|s| s.id.as_str() == id)
    }

    /// Checks every structural invariant and returns `MAX_LEVELS`.
    ///
    /// Derived-name collisions are checked by the compiler, which owns the
    /// naming scheme.
    ///
    /// # Errors
    ///
    /// Returns the first `StructuralError` found.
    pub fn validate(&self) -> Result<u32, StructuralError> {
        let levels = match self.levels {
            None => return Err(StructuralError::MissingLevels),
            Some(0) => return Err(StructuralError::NonPositiveLevels { levels: 0 }),
            Some(l) => l,
        };

        let mut seen = HashSet::with_capacity(self.substrates.len());
        for s in &self.substrates {
            if !s.id.is_identifier() {
                return Err(StructuralError::InvalidIdentifier {
                    name: s.id.to_string(),
                });
            }
            if !seen.insert(s.id.as_str()) {
                return Err(StructuralError::DuplicateSubstrate { id: s.id.to_string() });
            }
            if s.initial_level > levels {
                return Err(StructuralError::InitialLevelOutOfRange {
                    id: s.id.to_string(),
                    level: s.initial_level,
                    max: levels,
                });
            }
        }

        let side = levels as usize + 1;
        let mut reaction_ids = HashSet::with_capacity(self.reactions.len());
        for r in &self.reactions {
            if !reaction_ids.insert(r.id.as_str()) {
                return Err(StructuralError::DuplicateReaction { id: r.id.to_string() });
            }
            for operand in r.operands() {
                if !seen.contains(operand.as_str()) {
                    return Err(StructuralError::UnknownSubstrate {
                        reaction: r.id.to_string(),
                        substrate: operand.to_string(),
                    });
                }
            }
            // The table kind must match the reaction kind before sizes matter.
            if r.is_binary() != r.table().is_matrix() {
                return Err(StructuralError::TableDimensionMismatch {
                    reaction: r.id.to_string(),
                    expected: if r.is_binary() {
                        format!("{side}x{side}")
                    } else {
                        side.to_string()
                    },
                    found: r.table().shape(),
                });
            }
            r.table().check_side(r.id.as_str(), side)?;
        }

        Ok(levels)
    }

    /// Serialize the model to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, LevelnetError> {
        serde_json::to_string_pretty(self).map_err(|e| LevelnetError::internal(format!("serialize model: {e}")))
    }

    /// Deserialize and validate a model from JSON.
    pub fn from_json(s: &str) -> Result<Self, LevelnetError> {
        let model = serde_json::from_str::<Self>(s)
            .map_err(|e| LevelnetError::internal(format!("deserialize model: {e}")))?;
        model.validate()?;
        Ok(model)
    }
}
