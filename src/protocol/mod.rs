//! Executable reference of the round protocol.
//!
//! These state machines mirror the automaton templates one to one and are
//! used to check the barrier and clamp invariants without a model checker.

mod coordinator;
mod executor;
mod reaction;
mod substrate;

pub use coordinator::{Coordinator, CoordinatorState, Report};
pub use executor::{ExecutionReport, RoundExecutor, StopReason};
pub use reaction::{ReactionAutomaton, ReactionState};
pub use substrate::SubstrateCell;
