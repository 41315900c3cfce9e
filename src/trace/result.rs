//! Step-hold queries over a trace.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use crate::delay::Level;
use crate::error::QueryError;
use crate::model::SubstrateId;
use crate::trace::Trace;

/// Level of one substrate at every time index where it is defined.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCurve {
    /// Substrate the curve belongs to.
    pub id: SubstrateId,
    /// `(time, level)` points, strictly increasing in time.
    pub points: Vec<(f64, Level)>,
}

impl LevelCurve {
    /// Level held at `time`: the last point at or before it.
    #[must_use]
    pub fn at(&self, time: f64) -> Option<Level> {
        let idx = self.points.partition_point(|&(t, _)| t <= time);
        idx.checked_sub(1).map(|i| self.points[i].1)
    }
}

#[derive(Debug)]
struct Inner {
    trace: Trace,
    curves: OnceLock<BTreeMap<SubstrateId, LevelCurve>>,
}

impl Inner {
    fn curves(&self) -> &BTreeMap<SubstrateId, LevelCurve> {
        self.curves.get_or_init(|| {
            let mut curves: BTreeMap<SubstrateId, LevelCurve> = BTreeMap::new();
            for sample in self.trace.samples() {
                for (id, &level) in &sample.levels {
                    let curve = curves.entry(id.clone()).or_insert_with(|| LevelCurve {
                        id: id.clone(),
                        points: Vec::new(),
                    });
                    // Within a repeated time, the later sample wins.
                    match curve.points.last_mut() {
                        Some(last) if last.0 == sample.time => last.1 = level,
                        _ => curve.points.push((sample.time, level)),
                    }
                }
            }
            curves
        })
    }
}

/// Read-only query view over a trace.
///
/// Views are cheap to clone; [`LevelResult::filter`] shares the trace and
/// its lazily built curves with the original view.
///
/// # Examples
///
/// ```
/// use levelnet::trace::{LevelResult, Sample, Trace};
///
/// let trace = Trace::new(vec![
///     Sample::new(0.0).with_level("A", 1),
///     Sample::new(3.0).with_level("A", 0),
/// ])
/// .unwrap();
/// let result = LevelResult::new(trace);
/// assert_eq!(result.concentration_at("A", 2.9).unwrap(), 1);
/// assert_eq!(result.concentration_at("A", 10.0).unwrap(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct LevelResult {
    inner: Arc<Inner>,
    accepted: Option<Arc<BTreeSet<SubstrateId>>>,
}

impl LevelResult {
    /// An unfiltered view over `trace`.
    #[must_use]
    pub fn new(trace: Trace) -> Self {
        Self {
            inner: Arc::new(Inner {
                trace,
                curves: OnceLock::new(),
            }),
            accepted: None,
        }
    }

    /// The underlying, unfiltered trace.
    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.inner.trace
    }

    fn accepts(&self, id: &str) -> bool {
        self.accepted.as_ref().map_or(true, |set| set.contains(id))
    }

    fn visible_curve(&self, id: &str) -> Option<&LevelCurve> {
        if !self.accepts(id) {
            return None;
        }
        self.inner.curves().get(id)
    }

    /// Level of `id` at `time`, holding the last sample at or before it.
    ///
    /// # Errors
    ///
    /// `UnknownSubstrate` if `id` never appears in this view;
    /// `NotAvailable` if it has no sample at or before `time`.
    pub fn concentration_at(&self, id: &str, time: f64) -> Result<Level, QueryError> {
        let curve = self
            .visible_curve(id)
            .ok_or_else(|| QueryError::UnknownSubstrate { id: id.to_string() })?;
        curve.at(time).ok_or_else(|| QueryError::NotAvailable {
            id: id.to_string(),
            time,
        })
    }

    /// Like [`LevelResult::concentration_at`], with both failures mapped to `None`.
    #[must_use]
    pub fn concentration_if_available(&self, id: &str, time: f64) -> Option<Level> {
        self.visible_curve(id).and_then(|c| c.at(time))
    }

    /// Substrates present anywhere in this view.
    #[must_use]
    pub fn reactant_ids(&self) -> BTreeSet<SubstrateId> {
        self.inner
            .curves()
            .keys()
            .filter(|id| self.accepts(id.as_str()))
            .cloned()
            .collect()
    }

    /// Sorted distinct times of samples that carry a visible substrate.
    #[must_use]
    pub fn time_indices(&self) -> Vec<f64> {
        let mut times: Vec<f64> = self
            .inner
            .trace
            .samples()
            .iter()
            .filter(|s| s.levels.keys().any(|id| self.accepts(id.as_str())))
            .map(|s| s.time)
            .collect();
        times.dedup();
        times
    }

    /// True if no visible substrate has a sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reactant_ids().is_empty()
    }

    /// A view restricted to `accepted`. Ids not in the trace are ignored.
    #[must_use]
    pub fn filter<I, S>(&self, accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubstrateId>,
    {
        let mut set: BTreeSet<SubstrateId> = accepted.into_iter().map(Into::into).collect();
        if let Some(current) = &self.accepted {
            set.retain(|id| current.contains(id));
        }
        Self {
            inner: Arc::clone(&self.inner),
            accepted: Some(Arc::new(set)),
        }
    }

    /// Step curve of `id`, for plotting.
    #[must_use]
    pub fn curve(&self, id: &str) -> Option<&LevelCurve> {
        self.visible_curve(id)
    }

    /// True if both views share the same trace allocation.
    #[must_use]
    pub fn shares_trace_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Trace> for LevelResult {
    fn from(trace: Trace) -> Self {
        Self::new(trace)
    }
}
