//! Single-owner collection of accumulators
//!
//! A [`Registry`] maps each (kind, context) pair to its accumulator, creating
//! it on first observation. Accumulators are grouped by kind first so that a
//! lookup borrows the context rather than building an owned key. All methods take `&mut self`: whoever owns the
//! registry serializes every `sample` and `flush`, which is exactly the
//! guarantee the accumulators require. Callers that feed samples from many
//! threads either wrap the registry in a lock or shard contexts over several
//! registries, one per worker.
//!
//! The registry never drops an accumulator on its own. [`Registry::expire`]
//! is there for callers that want to, on whatever schedule they choose.

use metrics::{counter, gauge};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{
    Accumulator,
    clock::{Clock, SystemClock},
    config::HistogramConfig,
    context::Context,
    format::Formatter,
    metric::{Kind, Metric},
    value::Value,
};

/// A collection of accumulators keyed by kind and context.
#[derive(Debug)]
pub struct Registry<F, C = SystemClock> {
    metrics: FxHashMap<Kind, FxHashMap<Context, Metric<F, C>>>,
    formatter: F,
    clock: C,
    histogram: HistogramConfig,
}

impl<F> Registry<F, SystemClock>
where
    F: Formatter + Clone,
{
    /// Create a new, empty [`Registry`].
    ///
    /// Every accumulator created shares a clone of `formatter` and histograms
    /// are built from `histogram`.
    #[must_use]
    pub fn new(formatter: F, histogram: HistogramConfig) -> Self {
        Self::with_clock(formatter, histogram, SystemClock)
    }
}

impl<F, C> Registry<F, C>
where
    F: Formatter + Clone,
    C: Clock + Clone,
{
    /// Create a new, empty [`Registry`] reading time from `clock`.
    #[must_use]
    pub fn with_clock(formatter: F, histogram: HistogramConfig, clock: C) -> Self {
        Self {
            metrics: FxHashMap::default(),
            formatter,
            clock,
            histogram,
        }
    }

    /// Record a data point for `context`, creating the accumulator of `kind`
    /// if this is the first time the pair is seen.
    pub fn sample<V>(
        &mut self,
        kind: Kind,
        context: Context,
        value: V,
        sample_rate: f64,
        timestamp: Option<f64>,
    ) where
        V: Into<Value>,
    {
        let metric = self
            .metrics
            .entry(kind)
            .or_default()
            .entry(context)
            .or_insert_with_key(|context| {
                trace!(metric = %context.name(), ?kind, "Creating accumulator");
                counter!("rollup_contexts_created").increment(1);
                Metric::new(
                    kind,
                    context.clone(),
                    self.formatter.clone(),
                    self.clock.clone(),
                    &self.histogram,
                )
            });
        metric.sample(value, sample_rate, timestamp);
    }

    /// Flush every accumulator, concatenating their records.
    pub fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<F::Record> {
        let mut records = Vec::new();
        for metric in self.metrics.values_mut().flat_map(FxHashMap::values_mut) {
            records.extend(metric.flush(timestamp, interval));
        }
        gauge!("rollup_contexts").set(self.len() as f64);
        counter!("rollup_records_emitted").increment(records.len() as u64);
        records
    }

    /// Drop every accumulator whose last sample is older than `before`, Unix
    /// seconds. Returns the number dropped.
    ///
    /// Carried state of a dropped [`crate::MonotonicCount`] or
    /// [`crate::Rate`] is lost: should the context return, its first window
    /// reports nothing.
    pub fn expire(&mut self, before: f64) -> usize {
        let len = self.len();
        self.metrics.retain(|_, by_context| {
            by_context.retain(|_, metric| metric.last_sample_time().is_some_and(|t| t >= before));
            !by_context.is_empty()
        });
        let dropped = len - self.len();
        if dropped > 0 {
            trace!(dropped, before, "Expired idle accumulators");
            counter!("rollup_contexts_expired").increment(dropped as u64);
        }
        dropped
    }

    /// The accumulator for `kind` and `context`, if one exists.
    #[must_use]
    pub fn get(&self, kind: Kind, context: &Context) -> Option<&Metric<F, C>> {
        self.metrics.get(&kind)?.get(context)
    }

    /// Number of accumulators held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.values().map(FxHashMap::len).sum()
    }

    /// Whether no accumulator is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{
        MetricType,
        clock::ManualClock,
        format::{Record, RecordFormatter},
    };

    fn registry(clock: &ManualClock) -> Registry<RecordFormatter, ManualClock> {
        Registry::with_clock(RecordFormatter, HistogramConfig::default(), clock.clone())
    }

    fn sorted(mut records: Vec<Record>) -> Vec<Record> {
        records.sort_by(|a, b| a.metric.cmp(&b.metric));
        records
    }

    #[test]
    fn creates_on_first_sample() {
        let clock = ManualClock::at(0.0);
        let mut reg = registry(&clock);
        assert!(reg.is_empty());
        reg.sample(Kind::Count, Context::named("a"), 1.0, 1.0, None);
        reg.sample(Kind::Count, Context::named("a"), 2.0, 1.0, None);
        reg.sample(Kind::Gauge, Context::named("a"), 2.0, 1.0, None);
        reg.sample(Kind::Count, Context::new("a", ["x:y"]), 2.0, 1.0, None);
        assert_eq!(reg.len(), 3);
        assert_eq!(
            reg.get(Kind::Count, &Context::named("a")).map(Metric::kind),
            Some(Kind::Count)
        );
        assert!(reg.get(Kind::Set, &Context::named("a")).is_none());
    }

    #[test]
    fn flush_covers_every_context() {
        let clock = ManualClock::at(0.0);
        let mut reg = registry(&clock);
        reg.sample(Kind::Count, Context::named("hits"), 3.0, 1.0, None);
        reg.sample(Kind::Count, Context::named("hits"), 4.0, 1.0, None);
        reg.sample(Kind::Set, Context::named("users"), "alice", 1.0, None);
        reg.sample(Kind::Set, Context::named("users"), "bob", 1.0, None);

        let records = sorted(reg.flush(10.0, 10.0));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].metric, "hits");
        assert_eq!(records[0].value, 7.0);
        assert_eq!(records[0].kind, MetricType::Count);
        assert_eq!(records[1].metric, "users");
        assert_eq!(records[1].value, 2.0);
        assert!(reg.flush(20.0, 10.0).is_empty());
        // Flushing does not evict.
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn expire_drops_idle_contexts() {
        let clock = ManualClock::at(100.0);
        let mut reg = registry(&clock);
        reg.sample(Kind::Gauge, Context::named("old"), 1.0, 1.0, None);
        clock.set(200.0);
        reg.sample(Kind::Gauge, Context::named("new"), 1.0, 1.0, None);

        assert_eq!(reg.expire(150.0), 1);
        assert_eq!(reg.len(), 1);
        assert!(reg.get(Kind::Gauge, &Context::named("new")).is_some());
        assert_eq!(reg.expire(150.0), 0);
    }

    #[test]
    fn one_context_under_many_kinds() {
        let clock = ManualClock::at(100.0);
        let mut reg = registry(&clock);
        let ctx = Context::new("io", ["disk:sda"]).with_hostname("web-01");
        reg.sample(Kind::Gauge, ctx.clone(), 1.0, 1.0, None);
        reg.sample(Kind::Histogram, ctx.clone(), 1.0, 1.0, None);
        clock.set(200.0);
        reg.sample(Kind::Set, ctx.clone(), "a", 1.0, None);
        assert_eq!(reg.len(), 3);
        for kind in [Kind::Gauge, Kind::Histogram, Kind::Set] {
            assert_eq!(reg.get(kind, &ctx).map(Metric::kind), Some(kind));
        }
        assert!(reg.get(Kind::Gauge, &Context::named("io")).is_none());

        assert_eq!(reg.expire(150.0), 2);
        assert_eq!(reg.len(), 1);
        assert!(reg.get(Kind::Gauge, &ctx).is_none());
        assert!(reg.get(Kind::Set, &ctx).is_some());
        assert_eq!(reg.expire(300.0), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn shared_formatter_sees_every_record() {
        let clock = ManualClock::at(0.0);
        let formatter = |p: crate::Point<'_>| format!("{}:{}", p.metric, p.value);
        let mut reg = Registry::with_clock(formatter, HistogramConfig::default(), clock.clone());
        reg.sample(Kind::Counter, Context::named("c"), 5.0, 1.0, None);
        assert_eq!(reg.flush(0.0, 5.0), ["c:1".to_string()]);
    }
}
