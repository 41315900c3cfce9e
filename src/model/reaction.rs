//! Reactions: level changes driven by level-dependent delays.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delay::DelayTable;
use crate::model::SubstrateId;

/// Identifier of a reaction in the authoring model.
///
/// This key is not used in generated output; instance names are derived
/// from the reaction's operands instead.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionId(String);

impl ReactionId {
    /// Wraps a reaction key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ReactionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Direction of the level change applied when a reaction fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Increment {
    /// +1, an activating interaction.
    Up,
    /// -1, an inhibiting interaction or a degradation.
    Down,
}

impl Increment {
    /// The signed level delta.
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Suffix used in derived reaction names.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Maps a signed increment from the authoring layer: non-negative is up.
    #[must_use]
    pub const fn from_sign(value: i64) -> Self {
        if value >= 0 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// The closed set of reaction kinds, each carrying its typed operands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReactionKind {
    /// A substrate changes its own level; table indexed by its level.
    Degradation {
        target: SubstrateId,
        increment: Increment,
        table: DelayTable,
    },

    /// A catalyst changes a target's level; table indexed by
    /// `[catalyst level][target level]`.
    CatalyzedTransition {
        catalyst: SubstrateId,
        target: SubstrateId,
        increment: Increment,
        table: DelayTable,
    },
}

/// A reaction in the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Key within the model.
    pub id: ReactionId,

    /// Kind, operands, increment and delay table.
    #[serde(flatten)]
    pub kind: ReactionKind,
}

impl Reaction {
    /// A degradation of `target`.
    #[must_use]
    pub fn degradation(
        id: impl Into<ReactionId>,
        target: impl Into<SubstrateId>,
        increment: Increment,
        table: DelayTable,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ReactionKind::Degradation {
                target: target.into(),
                increment,
                table,
            },
        }
    }

    /// A transition of `target` catalyzed by `catalyst`.
    #[must_use]
    pub fn catalyzed(
        id: impl Into<ReactionId>,
        catalyst: impl Into<SubstrateId>,
        target: impl Into<SubstrateId>,
        increment: Increment,
        table: DelayTable,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ReactionKind::CatalyzedTransition {
                catalyst: catalyst.into(),
                target: target.into(),
                increment,
                table,
            },
        }
    }

    /// The substrate whose level this reaction changes.
    #[must_use]
    pub const fn target(&self) -> &SubstrateId {
        match &self.kind {
            ReactionKind::Degradation { target, .. } | ReactionKind::CatalyzedTransition { target, .. } => target,
        }
    }

    /// The catalyst, for catalyzed transitions.
    #[must_use]
    pub const fn catalyst(&self) -> Option<&SubstrateId> {
        match &self.kind {
            ReactionKind::Degradation { .. } => None,
            ReactionKind::CatalyzedTransition { catalyst, .. } => Some(catalyst),
        }
    }

    /// Direction of the level change.
    #[must_use]
    pub const fn increment(&self) -> Increment {
        match &self.kind {
            ReactionKind::Degradation { increment, .. }
            | ReactionKind::CatalyzedTransition { increment, .. } => *increment,
        }
    }

    /// The delay table.
    #[must_use]
    pub const fn table(&self) -> &DelayTable {
        match &self.kind {
            ReactionKind::Degradation { table, .. } | ReactionKind::CatalyzedTransition { table, .. } => table,
        }
    }

    /// True for catalyzed transitions.
    pub const fn is_binary(&self) -> bool {
        matches!(self.kind, ReactionKind::CatalyzedTransition { .. })
    }

    /// All operand ids, catalyst first.
    pub fn operands(&self) -> impl Iterator<Item = &SubstrateId> {
        self.catalyst().into_iter().chain(std::iter::once(self.target()))
    }
}
