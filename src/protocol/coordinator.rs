//! Barrier coordinator.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Outcome a reaction reports for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Report {
    /// The reaction fired this round.
    Reacting,
    /// The reaction did not fire.
    NotReacting,
}

/// Coordinator location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    /// No round is open. Only a `reacting` report opens one.
    AwaitingFirstReport,
    /// Some but not all reactions have reported.
    Counting,
    /// Every reaction has reported; the `update` broadcast is due.
    ReadyToBroadcast,
}

impl CoordinatorState {
    /// Location name in the coordinator template.
    #[must_use]
    pub const fn location(self) -> &'static str {
        match self {
            Self::AwaitingFirstReport => "waiting",
            Self::Counting => "counting",
            Self::ReadyToBroadcast => "ready",
        }
    }
}

/// Counts one report per reaction and releases `update` exactly once per
/// round.
///
/// # Examples
///
/// ```
/// use levelnet::protocol::{Coordinator, CoordinatorState, Report};
///
/// let mut coord = Coordinator::new(2);
/// assert_eq!(coord.report(Report::Reacting).unwrap(), CoordinatorState::Counting);
/// assert_eq!(coord.report(Report::NotReacting).unwrap(), CoordinatorState::ReadyToBroadcast);
/// assert_eq!(coord.broadcast().unwrap(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinator {
    total: usize,
    counter: usize,
    state: CoordinatorState,
    rounds: u64,
}

impl Coordinator {
    /// A coordinator waiting for `total` reports per round.
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self {
            total,
            counter: 0,
            state: CoordinatorState::AwaitingFirstReport,
            rounds: 0,
        }
    }

    /// Accepts one report.
    ///
    /// # Errors
    ///
    /// `UnexpectedReport` for a `not_reacting` report while no round is open
    /// or for any report after the barrier is reached; `CounterOverflow` if
    /// the network has no reactions.
    pub fn report(&mut self, report: Report) -> Result<CoordinatorState, ProtocolError> {
        match (self.state, report) {
            (CoordinatorState::AwaitingFirstReport, Report::Reacting)
            | (CoordinatorState::Counting, _) => {
                if self.counter >= self.total {
                    return Err(ProtocolError::CounterOverflow { total: self.total });
                }
                self.counter += 1;
                self.state = if self.counter == self.total {
                    CoordinatorState::ReadyToBroadcast
                } else {
                    CoordinatorState::Counting
                };
                Ok(self.state)
            }
            (state, report) => Err(ProtocolError::UnexpectedReport { state, report }),
        }
    }

    /// Emits `update` and closes the round. Returns the number of completed
    /// rounds.
    ///
    /// # Errors
    ///
    /// `BroadcastBeforeBarrier` unless every reaction has reported.
    pub fn broadcast(&mut self) -> Result<u64, ProtocolError> {
        if self.state != CoordinatorState::ReadyToBroadcast {
            return Err(ProtocolError::BroadcastBeforeBarrier {
                counter: self.counter,
                total: self.total,
            });
        }
        self.counter = 0;
        self.state = CoordinatorState::AwaitingFirstReport;
        self.rounds += 1;
        Ok(self.rounds)
    }

    /// Reports expected per round.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Reports received in the open round.
    #[must_use]
    pub const fn counter(&self) -> usize {
        self.counter
    }

    /// Current location.
    #[must_use]
    pub const fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Completed rounds.
    #[must_use]
    pub const fn rounds(&self) -> u64 {
        self.rounds
    }
}
