//! Substrates: the species whose activity levels the network tracks.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delay::Level;

/// Identifier of a substrate.
///
/// Identifiers become variable names in the generated network, so they
/// must be plain identifiers (see [`SubstrateId::is_identifier`]).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstrateId(String);

impl SubstrateId {
    /// Wraps an identifier without checking it.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is an ASCII identifier: a letter or `_`,
    /// followed by letters, digits or `_`.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        is_identifier(&self.0)
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

impl fmt::Display for SubstrateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubstrateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SubstrateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for SubstrateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SubstrateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A modeled species with a discrete activity level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substrate {
    /// Key within the model, also the level variable's name.
    pub id: SubstrateId,

    /// Level at time zero, in `0..=levels`.
    pub initial_level: Level,

    /// Display name from the authoring layer. Never used in generated output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Substrate {
    /// A substrate without a display name.
    #[must_use]
    pub fn new(id: impl Into<SubstrateId>, initial_level: Level) -> Self {
        Self {
            id: id.into(),
            initial_level,
            name: None,
        }
    }

    /// Attaches a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}
