//! Raw execution traces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::delay::Level;
use crate::error::{LevelnetError, TraceError};
use crate::model::SubstrateId;

/// Substrate levels observed at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Model time of the observation.
    pub time: f64,
    /// Levels of the substrates recorded in this sample.
    pub levels: BTreeMap<SubstrateId, Level>,
}

impl Sample {
    /// An empty sample at `time`.
    #[must_use]
    pub fn new(time: f64) -> Self {
        Self {
            time,
            levels: BTreeMap::new(),
        }
    }

    /// Adds one substrate level.
    #[must_use]
    pub fn with_level(mut self, id: impl Into<SubstrateId>, level: Level) -> Self {
        self.levels.insert(id.into(), level);
        self
    }
}

/// Samples ordered by non-decreasing time. Repeated times are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    samples: Vec<Sample>,
}

impl Trace {
    /// Builds a trace, checking that times are finite, non-negative and
    /// non-decreasing.
    ///
    /// # Errors
    ///
    /// Returns the first `TraceError` found.
    pub fn new(samples: Vec<Sample>) -> Result<Self, TraceError> {
        let mut trace = Self {
            samples: Vec::with_capacity(samples.len()),
        };
        for s in samples {
            trace.push(s)?;
        }
        Ok(trace)
    }

    /// Appends a sample.
    ///
    /// # Errors
    ///
    /// Returns a `TraceError` if the sample's time is invalid or earlier
    /// than the last sample.
    pub fn push(&mut self, sample: Sample) -> Result<(), TraceError> {
        let index = self.samples.len();
        if !sample.time.is_finite() {
            return Err(TraceError::NonFiniteTime { index });
        }
        if sample.time < 0.0 {
            return Err(TraceError::NegativeTime {
                index,
                time: sample.time,
            });
        }
        if let Some(last) = self.samples.last() {
            if sample.time < last.time {
                return Err(TraceError::NonMonotonicTime {
                    index,
                    time: sample.time,
                    previous: last.time,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Samples in time order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the trace holds no sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Serialize the trace to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, LevelnetError> {
        serde_json::to_string_pretty(self).map_err(|e| LevelnetError::internal(format!("serialize trace: {e}")))
    }

    /// Deserialize a trace from JSON, re-checking sample times.
    pub fn from_json(s: &str) -> Result<Self, LevelnetError> {
        #[derive(Deserialize)]
        struct Raw {
            samples: Vec<Sample>,
        }
        let raw: Raw =
            serde_json::from_str(s).map_err(|e| LevelnetError::internal(format!("deserialize trace: {e}")))?;
        Ok(Self::new(raw.samples)?)
    }
}
