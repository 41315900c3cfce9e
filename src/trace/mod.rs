//! Trace interpretation.
//!
//! A [`Trace`] is the raw list of timed samples produced by the model
//! checker (read with [`TraceParser`]) or by the reference executor.
//! [`LevelResult`] answers step-hold level queries over it.

pub mod export;
mod parser;
mod result;
mod sample;

pub use export::write_csv;
pub use parser::TraceParser;
pub use result::{LevelCurve, LevelResult};
pub use sample::{Sample, Trace};
