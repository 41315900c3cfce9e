//! Official/shadow level pair of one substrate.

use crate::delay::Level;

/// Reactions write the shadow level; only [`SubstrateCell::commit`] writes
/// the official one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstrateCell {
    official: Level,
    shadow: i64,
    max: Level,
}

impl SubstrateCell {
    /// `initial` is expected in `0..=max`; larger values are clamped.
    #[must_use]
    pub fn new(initial: Level, max: Level) -> Self {
        let official = initial.min(max);
        Self {
            official,
            shadow: i64::from(official),
            max,
        }
    }

    /// Level visible to reactions.
    #[must_use]
    pub const fn official(&self) -> Level {
        self.official
    }

    /// Pending level, possibly out of range until commit.
    #[must_use]
    pub const fn shadow(&self) -> i64 {
        self.shadow
    }

    /// Accumulates a pending level change.
    pub fn apply(&mut self, delta: i64) {
        self.shadow = self.shadow.saturating_add(delta);
    }

    /// Commits the shadow level, saturating at `0` and `max`. Returns true if
    /// the official level changed.
    pub fn commit(&mut self) -> bool {
        let max = i64::from(self.max);
        let clamped = self.shadow.clamp(0, max);
        self.shadow = clamped;
        let next = Level::try_from(clamped).unwrap_or(self.max);
        let changed = next != self.official;
        self.official = next;
        changed
    }
}
