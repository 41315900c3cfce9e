//! Deterministic round executor.
//!
//! Runs the compiled protocol directly on a [`Model`], without a model
//! checker: time jumps to the earliest pending firing, every reaction
//! reports to the coordinator (firing reactions first, since only a
//! `reacting` report opens a round), `update` commits all shadow levels,
//! and every reaction re-looks up its delay.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use crate::config::ExecutorConfig;
use crate::delay::{Delay, Level};
use crate::error::{LevelnetError, LevelnetResult, StructuralError};
use crate::model::{Model, ReactionKind};
use crate::protocol::{Coordinator, ReactionAutomaton, Report, SubstrateCell};
use crate::trace::{Sample, Trace};

/// Why the executor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No reaction can fire any more.
    Quiescent,
    /// The next round would complete after the horizon.
    Horizon,
    /// `max_rounds` rounds completed.
    RoundLimit,
    /// A round changed no level and left every reaction as it found it,
    /// so every later round would repeat it.
    Fixpoint,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// One sample per completed round, after the initial state.
    pub trace: Trace,
    /// Completed rounds, including a final fixpoint round.
    pub rounds: u64,
    /// Time of the last completed round.
    pub end_time: u64,
    /// Why the run ended.
    pub stop: StopReason,
}

/// Operand positions of one reaction in the substrate list.
#[derive(Debug, Clone, Copy)]
struct Binding {
    catalyst: Option<usize>,
    target: usize,
}

/// Runs the round protocol of a model.
///
/// # Examples
///
/// ```
/// use levelnet::{Delay, DelayTable, ExecutorConfig, Increment, Model, RoundExecutor};
///
/// let model = Model::builder()
///     .levels(2)
///     .substrate("A", 1)
///     .degradation(
///         "r0",
///         "A",
///         Increment::Down,
///         DelayTable::vector([Delay::Finite(5), Delay::Finite(3), Delay::Finite(0)]),
///     )
///     .build()
///     .unwrap();
///
/// let report = RoundExecutor::new(&model, ExecutorConfig::default()).unwrap().run().unwrap();
/// let times: Vec<f64> = report.trace.samples().iter().map(|s| s.time).collect();
/// assert_eq!(times, vec![0.0, 3.0]);
/// ```
#[derive(Debug)]
pub struct RoundExecutor<'m> {
    model: &'m Model,
    config: ExecutorConfig,
    cells: Vec<SubstrateCell>,
    reactions: Vec<ReactionAutomaton>,
    bindings: Vec<Binding>,
    coordinator: Coordinator,
    time: u64,
}

impl<'m> RoundExecutor<'m> {
    /// Prepares an executor at time zero.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralError` if the model is invalid.
    pub fn new(model: &'m Model, config: ExecutorConfig) -> Result<Self, StructuralError> {
        let levels = model.validate()?;
        let cells = model
            .substrates()
            .iter()
            .map(|s| SubstrateCell::new(s.initial_level, levels))
            .collect();

        let mut bindings = Vec::with_capacity(model.reactions().len());
        for r in model.reactions() {
            let index = |id: &str| {
                model.substrate_index(id).ok_or_else(|| StructuralError::UnknownSubstrate {
                    reaction: r.id.to_string(),
                    substrate: id.to_string(),
                })
            };
            bindings.push(Binding {
                catalyst: r.catalyst().map(|c| index(c.as_str())).transpose()?,
                target: index(r.target().as_str())?,
            });
        }

        Ok(Self {
            model,
            config,
            cells,
            reactions: model
                .reactions()
                .iter()
                .map(|r| ReactionAutomaton::new(r.increment()))
                .collect(),
            bindings,
            coordinator: Coordinator::new(model.reactions().len()),
            time: 0,
        })
    }

    /// Current official levels, in substrate order.
    #[must_use]
    pub fn levels(&self) -> Vec<Level> {
        self.cells.iter().map(SubstrateCell::official).collect()
    }

    fn level(&self, index: usize) -> Level {
        self.cells.get(index).map_or(0, SubstrateCell::official)
    }

    #[allow(clippy::cast_precision_loss)]
    fn sample(&self) -> Sample {
        let mut sample = Sample::new(self.time as f64);
        for (s, cell) in self.model.substrates().iter().zip(&self.cells) {
            sample.levels.insert(s.id.clone(), cell.official());
        }
        sample
    }

    fn lookup_all(&mut self) -> LevelnetResult<()> {
        let model = self.model;
        for (i, r) in model.reactions().iter().enumerate() {
            let binding = self.bindings[i];
            let target = self.level(binding.target);
            let delay: Option<Delay> = match &r.kind {
                ReactionKind::Degradation { table, .. } => table.unary(target),
                ReactionKind::CatalyzedTransition { table, .. } => binding
                    .catalyst
                    .and_then(|c| table.binary(self.level(c), target)),
            };
            let delay = delay.ok_or_else(|| {
                LevelnetError::internal(format!("no delay for reaction '{}' at level {target}", r.id))
            })?;
            self.reactions[i].lookup(delay);
        }
        Ok(())
    }

    /// Runs rounds until the model is quiescent, reaches a fixpoint, or hits
    /// a configured bound.
    ///
    /// # Errors
    ///
    /// Returns a `ProtocolError` (wrapped) if a round violates the barrier
    /// protocol; this indicates a bug, not a model problem.
    #[instrument(skip_all)]
    pub fn run(mut self) -> LevelnetResult<ExecutionReport> {
        let mut trace = Trace::default();
        trace.push(self.sample())?;
        self.lookup_all()?;
        let max_rounds = u64::try_from(self.config.max_rounds).unwrap_or(u64::MAX);

        let stop = loop {
            if self.coordinator.rounds() >= max_rounds {
                break StopReason::RoundLimit;
            }
            let Some(dt) = self.reactions.iter().filter_map(ReactionAutomaton::remaining).min() else {
                break StopReason::Quiescent;
            };
            if self.time.saturating_add(dt) > self.config.horizon {
                break StopReason::Horizon;
            }

            let before = (self.levels(), self.reactions.clone());
            for r in &mut self.reactions {
                r.advance(dt);
            }
            self.time += dt;

            let fired = self.round()?;
            let changed = self.commit();
            self.lookup_all()?;
            trace!(round = self.coordinator.rounds(), time = self.time, fired, changed, "round committed");

            if !changed && before.0 == self.levels() && before.1 == self.reactions {
                if dt == 0 {
                    warn!(time = self.time, "zero-delay rounds repeat without effect");
                }
                break StopReason::Fixpoint;
            }
            trace.push(self.sample())?;
        };

        info!(
            rounds = self.coordinator.rounds(),
            time = self.time,
            samples = trace.len(),
            ?stop,
            "execution stopped"
        );
        Ok(ExecutionReport {
            trace,
            rounds: self.coordinator.rounds(),
            end_time: self.time,
            stop,
        })
    }

    /// Collects every report and broadcasts `update`. Returns how many
    /// reactions fired.
    fn round(&mut self) -> LevelnetResult<usize> {
        let mut order: Vec<usize> = (0..self.reactions.len()).collect();
        order.sort_by_key(|&i| self.reactions[i].remaining() != Some(0));

        let mut fired = 0;
        for i in order {
            let Some(report) = self.reactions[i].report() else {
                continue;
            };
            self.coordinator.report(report)?;
            if report == Report::Reacting {
                fired += 1;
                let delta = self.reactions[i].delta();
                if let Some(cell) = self.cells.get_mut(self.bindings[i].target) {
                    cell.apply(delta);
                }
            }
        }
        let round = self.coordinator.broadcast()?;
        debug!(round, fired, "update broadcast");
        Ok(fired)
    }

    fn commit(&mut self) -> bool {
        let mut changed = false;
        for cell in &mut self.cells {
            changed |= cell.commit();
        }
        changed
    }
}
