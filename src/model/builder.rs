//! Model builder.
//!
//! The ModelBuilder provides a fluent API for constructing a [`Model`].
//! It validates the whole model before handing it out.

use crate::delay::{DelayTable, Level};
use crate::error::StructuralError;
use crate::model::{Increment, Model, Reaction, Substrate, SubstrateId};

/// Builder for [`Model`].
///
/// # Example
/// ```
/// use levelnet::{Delay, DelayTable, Increment, Model};
///
/// let model = Model::builder()
///     .levels(2)
///     .substrate("A", 1)
///     .degradation("r0", "A", Increment::Down, DelayTable::vector([
///         Delay::Finite(5),
///         Delay::Finite(3),
///         Delay::Finite(0),
///     ]))
///     .build()
///     .unwrap();
/// assert_eq!(model.reactions().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    levels: Option<u32>,
    substrates: Vec<Substrate>,
    reactions: Vec<Reaction>,
}

impl ModelBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `MAX_LEVELS` (required).
    #[must_use]
    pub fn levels(mut self, levels: u32) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Add a substrate with its initial level.
    #[must_use]
    pub fn substrate(mut self, id: impl Into<SubstrateId>, initial_level: Level) -> Self {
        self.substrates.push(Substrate::new(id, initial_level));
        self
    }

    /// Add a fully constructed substrate.
    #[must_use]
    pub fn with_substrate(mut self, substrate: Substrate) -> Self {
        self.substrates.push(substrate);
        self
    }

    /// Add a degradation reaction on `target`.
    #[must_use]
    pub fn degradation(
        mut self,
        id: &str,
        target: impl Into<SubstrateId>,
        increment: Increment,
        table: DelayTable,
    ) -> Self {
        self.reactions.push(Reaction::degradation(id, target, increment, table));
        self
    }

    /// Add a catalyzed transition of `target` driven by `catalyst`.
    #[must_use]
    pub fn catalyzed(
        mut self,
        id: &str,
        catalyst: impl Into<SubstrateId>,
        target: impl Into<SubstrateId>,
        increment: Increment,
        table: DelayTable,
    ) -> Self {
        self.reactions
            .push(Reaction::catalyzed(id, catalyst, target, increment, table));
        self
    }

    /// Add a fully constructed reaction.
    #[must_use]
    pub fn reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    /// Build and validate the model.
    ///
    /// # Errors
    ///
    /// Returns the first `StructuralError` found by [`Model::validate`].
    pub fn build(self) -> Result<Model, StructuralError> {
        let model = Model {
            levels: self.levels,
            substrates: self.substrates,
            reactions: self.reactions,
        };
        model.validate()?;
        Ok(model)
    }
}
