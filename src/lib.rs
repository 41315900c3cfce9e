//! # levelnet - Reaction networks as timed automata
//!
//! levelnet translates a discrete-level reaction-network model into a
//! network of communicating timed automata for a model checker, and reads
//! the checker's trace back as per-substrate level curves.
//!
//! ## Core Concepts
//!
//! - **Substrate**: a species with an activity level in `0..=MAX_LEVELS`
//! - **Reaction**: a degradation or catalyzed transition that moves its
//!   target one level up or down after a level-dependent delay
//! - **Delay table**: the delay for every level (pair), or "never"
//! - **Round**: every reaction reports to a coordinator, then one `update`
//!   broadcast commits all level changes at once
//!
//! ## Usage
//!
//! ```rust
//! use levelnet::{compile, Delay, DelayTable, Increment, LevelResult, Model, TraceParser, TraceParserConfig};
//!
//! let model = Model::builder()
//!     .levels(2)
//!     .substrate("A", 1)
//!     .degradation(
//!         "r0",
//!         "A",
//!         Increment::Down,
//!         DelayTable::vector([Delay::Finite(5), Delay::Finite(3), Delay::Finite(0)]),
//!     )
//!     .build()?;
//!
//! let network = compile(&model)?;
//! assert!(network.as_str().contains("A_deg = UnaryReaction("));
//!
//! // Feed `network` to the checker, then read its trace back.
//! let parser = TraceParser::for_model(&model, &TraceParserConfig::default())?;
//! let trace = parser.parse("State:\nglobalTime=0 A=1\nState:\nglobalTime>=3 A=0\n")?;
//! let result = LevelResult::new(trace);
//! assert_eq!(result.concentration_at("A", 4.0)?, 0);
//! # Ok::<(), levelnet::LevelnetError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod automata;
pub mod compiler;
pub mod config;
pub mod delay;
pub mod error;
pub mod model;
pub mod protocol;
pub mod trace;

// Re-export primary types at crate root for convenience
pub use compiler::{compile, AutomataNetworkDescription, Compiler, ProcessInstance, TableConstant};
pub use config::{CompilerConfig, ExecutorConfig, TraceParserConfig};
pub use delay::{Delay, DelayTable, Level};
pub use error::{LevelnetError, LevelnetResult, ProtocolError, QueryError, StructuralError, TraceError};
pub use model::{Increment, Model, ModelBuilder, Reaction, ReactionId, ReactionKind, Substrate, SubstrateId};
pub use protocol::{ExecutionReport, RoundExecutor, StopReason};
pub use trace::{LevelCurve, LevelResult, Sample, Trace, TraceParser};
