//! Configuration for the compiler, the reference executor and the trace
//! parser.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::compiler::naming::is_keyword;
use crate::error::StructuralError;
use crate::model::is_identifier;

/// Compiler configuration.
///
/// The defaults produce a network that UPPAAL loads directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Name of the shared global clock.
    pub clock: String,
    /// Broadcast channel that commits a round.
    pub update_channel: String,
    /// Channel on which a reaction reports that it fired.
    pub reacting_channel: String,
    /// Channel on which a reaction reports that it did not fire.
    pub not_reacting_channel: String,
    /// Value of the `INFINITE_TIME` constant that encodes "never".
    pub infinite_time: i64,
    /// Emit the XML prologue and DOCTYPE line.
    pub xml_prologue: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            clock: "globalTime".to_string(),
            update_channel: "update".to_string(),
            reacting_channel: "reacting".to_string(),
            not_reacting_channel: "not_reacting".to_string(),
            infinite_time: -1,
            xml_prologue: true,
        }
    }
}

impl CompilerConfig {
    /// Checks that names are identifiers, pairwise distinct, and that the
    /// "never" constant cannot collide with a real delay.
    ///
    /// # Errors
    ///
    /// Returns `StructuralError::InvalidConfig` on the first violation.
    pub fn validate(&self) -> Result<(), StructuralError> {
        let names = [
            &self.clock,
            &self.update_channel,
            &self.reacting_channel,
            &self.not_reacting_channel,
        ];
        let mut seen = HashSet::new();
        for name in names {
            if !is_identifier(name) {
                return Err(StructuralError::InvalidConfig {
                    reason: format!("'{name}' is not a valid identifier"),
                });
            }
            if is_keyword(name) {
                return Err(StructuralError::InvalidConfig {
                    reason: format!("'{name}' is a reserved word"),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(StructuralError::InvalidConfig {
                    reason: format!("'{name}' is used for more than one global"),
                });
            }
        }
        if self.infinite_time >= 0 {
            return Err(StructuralError::InvalidConfig {
                reason: format!("infinite_time must be negative, got {}", self.infinite_time),
            });
        }
        Ok(())
    }

    /// Global names the configuration reserves.
    pub(crate) fn reserved_names(&self) -> [&str; 4] {
        [
            self.clock.as_str(),
            self.update_channel.as_str(),
            self.reacting_channel.as_str(),
            self.not_reacting_channel.as_str(),
        ]
    }
}

/// Bounds for the reference round executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// No round completes after this time.
    pub horizon: u64,
    /// Maximum number of completed rounds.
    pub max_rounds: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            horizon: 1_000,
            max_rounds: 10_000,
        }
    }
}

/// Trace parser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceParserConfig {
    /// Name of the global clock whose lower bound gives the sample time.
    pub clock: String,
}

impl Default for TraceParserConfig {
    fn default() -> Self {
        Self {
            clock: CompilerConfig::default().clock,
        }
    }
}

impl From<&CompilerConfig> for TraceParserConfig {
    fn from(config: &CompilerConfig) -> Self {
        Self {
            clock: config.clock.clone(),
        }
    }
}
