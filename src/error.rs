//! Error types for levelnet.
//!
//! All errors in levelnet are strongly typed using thiserror.
//! Compilation failures are terminal for a compilation attempt; trace
//! queries treat missing data as a local, recoverable condition.

use thiserror::Error;

use crate::protocol::{CoordinatorState, Report};

/// Structural errors found in a model (or compiler configuration) before
/// any output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("Model property 'levels' is missing")]
    MissingLevels,

    #[error("Model property 'levels' must be positive, got {levels}")]
    NonPositiveLevels {
        levels: u32,
    },

    #[error("Reaction '{reaction}' references unknown substrate '{substrate}'")]
    UnknownSubstrate {
        reaction: String,
        substrate: String,
    },

    #[error("Substrate '{id}' is defined more than once")]
    DuplicateSubstrate {
        id: String,
    },

    #[error("Reaction '{id}' is defined more than once")]
    DuplicateReaction {
        id: String,
    },

    #[error("Delay table of reaction '{reaction}' is {found}, expected {expected}")]
    TableDimensionMismatch {
        reaction: String,
        expected: String,
        found: String,
    },

    #[error("Initial level {level} of substrate '{id}' is outside [0, {max}]")]
    InitialLevelOutOfRange {
        id: String,
        level: u32,
        max: u32,
    },

    #[error("'{name}' is not a valid identifier")]
    InvalidIdentifier {
        name: String,
    },

    #[error("Name '{name}' derived for {owner} collides with {existing}")]
    DuplicateName {
        name: String,
        owner: String,
        existing: String,
    },

    #[error("Times list of reaction '{reaction}' is invalid: {reason}")]
    InvalidTimesList {
        reaction: String,
        reason: String,
    },

    #[error("Malformed delay table literal: {reason}")]
    MalformedTableLiteral {
        reason: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Query errors raised by the trace interpreter.
///
/// These never invalidate a query session: the caller decides whether a
/// missing value matters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Substrate '{id}' is not present in this result")]
    UnknownSubstrate {
        id: String,
    },

    #[error("No level available for '{id}' at time {time}")]
    NotAvailable {
        id: String,
        time: f64,
    },
}

impl QueryError {
    /// Returns true if the substrate exists but has no sample yet.
    #[must_use]
    pub const fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable { .. })
    }
}

/// Errors raised while building or parsing a trace.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    #[error("Sample {index} has a non-finite time")]
    NonFiniteTime {
        index: usize,
    },

    #[error("Sample {index} has negative time {time}")]
    NegativeTime {
        index: usize,
        time: f64,
    },

    #[error("Sample {index} at time {time} precedes the previous sample at {previous}")]
    NonMonotonicTime {
        index: usize,
        time: f64,
        previous: f64,
    },

    #[error("Trace line {line}: {reason}")]
    Parse {
        line: usize,
        reason: String,
    },
}

/// Violations of the round protocol detected by the reference executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Coordinator in state {state:?} cannot accept a {report:?} report")]
    UnexpectedReport {
        state: CoordinatorState,
        report: Report,
    },

    #[error("Report counter would exceed the reaction total {total}")]
    CounterOverflow {
        total: usize,
    },

    #[error("Update broadcast requested after {counter} of {total} reports")]
    BroadcastBeforeBarrier {
        counter: usize,
        total: usize,
    },
}

/// Top-level error type for levelnet.
#[derive(Debug, Error)]
pub enum LevelnetError {
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl LevelnetError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a structural (model) error.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }

    /// Returns true if this is a trace query error.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Returns true if this is a trace construction or parsing error.
    #[must_use]
    pub const fn is_trace(&self) -> bool {
        matches!(self, Self::Trace(_))
    }

    /// Returns true if this is a round protocol violation.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for levelnet operations.
pub type LevelnetResult<T> = Result<T, LevelnetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_unknown_substrate() {
        let err = StructuralError::UnknownSubstrate {
            reaction: "r0".to_string(),
            substrate: "B".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("r0"));
        assert!(msg.contains("'B'"));
    }

    #[test]
    fn test_structural_error_dimension_mismatch() {
        let err = StructuralError::TableDimensionMismatch {
            reaction: "A_deg".to_string(),
            expected: "3".to_string(),
            found: "2".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("A_deg"));
        assert!(msg.contains("expected 3"));
    }

    #[test]
    fn test_query_error_not_available() {
        let err = QueryError::NotAvailable {
            id: "A".to_string(),
            time: 1.5,
        };
        assert!(err.is_not_available());
        assert!(format!("{err}").contains("1.5"));

        let err = QueryError::UnknownSubstrate { id: "Z".to_string() };
        assert!(!err.is_not_available());
    }

    #[test]
    fn test_trace_error_non_monotonic() {
        let err = TraceError::NonMonotonicTime {
            index: 3,
            time: 1.0,
            previous: 2.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("Sample 3"));
        assert!(msg.contains("precedes"));
    }

    #[test]
    fn test_protocol_error_unexpected_report() {
        let err = ProtocolError::UnexpectedReport {
            state: CoordinatorState::AwaitingFirstReport,
            report: Report::NotReacting,
        };
        let msg = format!("{err}");
        assert!(msg.contains("AwaitingFirstReport"));
        assert!(msg.contains("NotReacting"));
    }

    #[test]
    fn test_levelnet_error_from_structural() {
        let err: LevelnetError = StructuralError::MissingLevels.into();
        assert!(err.is_structural());
        assert!(!err.is_query());
        assert!(format!("{err}").contains("'levels'"));
    }

    #[test]
    fn test_levelnet_error_from_protocol() {
        let err: LevelnetError = ProtocolError::CounterOverflow { total: 2 }.into();
        assert!(err.is_protocol());
        assert!(!err.is_trace());
    }

    #[test]
    fn test_levelnet_error_internal() {
        let err = LevelnetError::internal("serialize model: eof");
        assert!(err.is_internal());
        assert!(format!("{err}").contains("eof"));
    }
}
