//! Reaction automaton, shared by the unary and binary templates.

use crate::delay::Delay;
use crate::model::Increment;
use crate::protocol::Report;

/// Where a reaction is within the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionState {
    /// Reported; waits for `update`.
    Idle,
    /// The looked-up delay is "never"; will report `not_reacting`.
    Never,
    /// Clock running toward `delay`.
    Racing { delay: u32 },
    /// Delay elapsed; will report `reacting` and apply its increment.
    Committed,
}

/// One reaction instance.
///
/// The local clock keeps running across rounds. A re-lookup whose delay is
/// already exceeded clamps the clock to the delay, so the reaction fires
/// without further waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionAutomaton {
    increment: Increment,
    state: ReactionState,
    elapsed: u64,
}

impl ReactionAutomaton {
    /// An idle reaction; call [`ReactionAutomaton::lookup`] to arm it.
    #[must_use]
    pub const fn new(increment: Increment) -> Self {
        Self {
            increment,
            state: ReactionState::Idle,
            elapsed: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ReactionState {
        self.state
    }

    /// Local clock value.
    #[must_use]
    pub const fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Level change applied to the target when firing.
    #[must_use]
    pub const fn delta(&self) -> i64 {
        self.increment.delta()
    }

    /// Re-arms with the delay for the current operand levels.
    pub fn lookup(&mut self, delay: Delay) {
        self.state = match delay {
            Delay::Never => ReactionState::Never,
            Delay::Finite(d) => {
                let d64 = u64::from(d);
                if self.elapsed >= d64 {
                    self.elapsed = d64;
                    ReactionState::Committed
                } else {
                    ReactionState::Racing { delay: d }
                }
            }
        };
    }

    /// Time left before this reaction fires, if it is armed.
    #[must_use]
    pub fn remaining(&self) -> Option<u64> {
        match self.state {
            ReactionState::Racing { delay } => Some(u64::from(delay).saturating_sub(self.elapsed)),
            ReactionState::Committed => Some(0),
            ReactionState::Idle | ReactionState::Never => None,
        }
    }

    /// Lets `dt` time units pass.
    pub fn advance(&mut self, dt: u64) {
        self.elapsed = self.elapsed.saturating_add(dt);
        if let ReactionState::Racing { delay } = self.state {
            if self.elapsed >= u64::from(delay) {
                self.state = ReactionState::Committed;
            }
        }
    }

    /// Reports the outcome for the open round. Returns `None` if the
    /// reaction already reported.
    pub fn report(&mut self) -> Option<Report> {
        let report = match self.state {
            ReactionState::Idle => return None,
            ReactionState::Committed => {
                self.elapsed = 0;
                Report::Reacting
            }
            ReactionState::Never => {
                self.elapsed = 0;
                Report::NotReacting
            }
            ReactionState::Racing { .. } => Report::NotReacting,
        };
        self.state = ReactionState::Idle;
        Some(report)
    }
}
