//! Parser for the model checker's textual trace output.
//!
//! A trace is a sequence of `State:` blocks separated by transition and
//! `Delay:` sections. Inside a state block the parser reads integer
//! assignments `name=value` and the lower bound of the global clock
//! (`globalTime=3`, `globalTime>=3` or `3<=globalTime`). Everything else is
//! ignored.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use tracing::{debug, trace};

use crate::config::TraceParserConfig;
use crate::delay::Level;
use crate::error::{LevelnetError, LevelnetResult, TraceError};
use crate::model::{Model, SubstrateId};
use crate::trace::{Sample, Trace};

const NUMBER: &str = r"([0-9]+(?:\.[0-9]+)?)";

/// Parses checker traces, keeping only known substrate variables.
#[derive(Debug, Clone)]
pub struct TraceParser {
    substrates: BTreeSet<SubstrateId>,
    assignment: Regex,
    clock_lower: Regex,
    clock_upper_form: Regex,
    delay: Regex,
}

/// State block being read.
struct Block {
    line: usize,
    clock: Option<f64>,
    levels: BTreeMap<SubstrateId, Level>,
}

impl TraceParser {
    /// Creates a parser for the given substrate ids.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a pattern fails to compile.
    pub fn new<I, S>(config: &TraceParserConfig, substrates: I) -> LevelnetResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SubstrateId>,
    {
        let clock = regex::escape(&config.clock);
        Ok(Self {
            substrates: substrates.into_iter().map(Into::into).collect(),
            assignment: compile_regex(r"^([A-Za-z_][A-Za-z0-9_]*)=(-?[0-9]+)$")?,
            clock_lower: compile_regex(&format!(r"^{clock}(?:==?|>=?){NUMBER}$"))?,
            clock_upper_form: compile_regex(&format!(r"^{NUMBER}<=?{clock}$"))?,
            delay: compile_regex(&format!(r"^Delay:\s*{NUMBER}$"))?,
        })
    }

    /// Creates a parser for every substrate of `model`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a pattern fails to compile.
    pub fn for_model(model: &Model, config: &TraceParserConfig) -> LevelnetResult<Self> {
        Self::new(config, model.substrates().iter().map(|s| s.id.clone()))
    }

    /// Parses `text` into a trace.
    ///
    /// A state without a clock bound takes the previous state's time plus
    /// any `Delay:` sections in between. States carrying no known substrate
    /// are skipped.
    ///
    /// # Errors
    ///
    /// `TraceError::Parse` for an out-of-range substrate value or an
    /// unparsable number; other `TraceError`s if times go backwards.
    pub fn parse(&self, text: &str) -> Result<Trace, TraceError> {
        let mut trace = Trace::default();
        let mut now = 0.0_f64;
        let mut block: Option<Block> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.starts_with("State") {
                self.flush(block.take(), &mut now, &mut trace)?;
                block = Some(Block {
                    line: line_no,
                    clock: None,
                    levels: BTreeMap::new(),
                });
                continue;
            }
            if let Some(caps) = self.delay.captures(line) {
                self.flush(block.take(), &mut now, &mut trace)?;
                now += parse_number(&caps[1], line_no)?;
                continue;
            }
            if line.starts_with("Transition") {
                self.flush(block.take(), &mut now, &mut trace)?;
                continue;
            }

            let Some(current) = block.as_mut() else {
                continue;
            };
            for token in line.split_whitespace() {
                self.read_token(token, line_no, current)?;
            }
        }
        self.flush(block, &mut now, &mut trace)?;

        debug!(samples = trace.len(), "trace parsed");
        Ok(trace)
    }

    fn read_token(&self, token: &str, line: usize, block: &mut Block) -> Result<(), TraceError> {
        if let Some(caps) = self
            .clock_lower
            .captures(token)
            .or_else(|| self.clock_upper_form.captures(token))
        {
            let bound = parse_number(&caps[1], line)?;
            block.clock = Some(block.clock.map_or(bound, |c| c.max(bound)));
            return Ok(());
        }

        if let Some(caps) = self.assignment.captures(token) {
            let name = &caps[1];
            if !self.substrates.contains(name) {
                trace!(variable = name, "ignored");
                return Ok(());
            }
            let value = &caps[2];
            let level: Level = value.parse().map_err(|_| TraceError::Parse {
                line,
                reason: format!("'{value}' is not a level of '{name}'"),
            })?;
            block.levels.insert(SubstrateId::new(name), level);
        }
        Ok(())
    }

    fn flush(&self, block: Option<Block>, now: &mut f64, trace: &mut Trace) -> Result<(), TraceError> {
        let Some(block) = block else {
            return Ok(());
        };
        if let Some(clock) = block.clock {
            *now = clock;
        }
        if block.levels.is_empty() {
            trace!(line = block.line, "state without substrate levels");
            return Ok(());
        }
        trace.push(Sample {
            time: *now,
            levels: block.levels,
        })
    }

    /// Substrate ids this parser keeps.
    #[must_use]
    pub fn substrates(&self) -> &BTreeSet<SubstrateId> {
        &self.substrates
    }
}

fn compile_regex(pattern: &str) -> LevelnetResult<Regex> {
    Regex::new(pattern).map_err(|e| LevelnetError::internal(format!("invalid regex '{pattern}': {e}")))
}

fn parse_number(text: &str, line: usize) -> Result<f64, TraceError> {
    text.parse().map_err(|_| TraceError::Parse {
        line,
        reason: format!("'{text}' is not a number"),
    })
}
