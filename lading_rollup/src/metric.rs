//! Accumulator dispatch
//!
//! [`Metric`] wraps every accumulator variant behind a single type so that
//! heterogeneous accumulators can live in one collection, see
//! [`crate::Registry`]. [`Kind`] names the variant to build.

use serde::{Deserialize, Serialize};

use crate::{
    Accumulator,
    clock::Clock,
    config::HistogramConfig,
    context::Context,
    count::{Count, MonotonicCount},
    counter::Counter,
    format::Formatter,
    gauge::{Attribution, Gauge},
    histogram::Histogram,
    rate::Rate,
    set::Set,
    value::Value,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// The accumulator variants.
pub enum Kind {
    /// [`Gauge`] attributed to the sample timestamp.
    Gauge,
    /// [`Gauge`] attributed to the flush timestamp.
    BucketGauge,
    /// [`Count`]
    Count,
    /// [`MonotonicCount`]
    MonotonicCount,
    /// [`Counter`]
    Counter,
    /// [`Histogram`]
    Histogram,
    /// [`Set`]
    Set,
    /// [`Rate`]
    Rate,
}

/// Any accumulator.
#[derive(Debug, Clone)]
pub enum Metric<F, C> {
    /// A gauge or bucket gauge
    Gauge(Gauge<F, C>),
    /// A count
    Count(Count<F, C>),
    /// A monotonic count
    MonotonicCount(MonotonicCount<F, C>),
    /// A counter
    Counter(Counter<F, C>),
    /// A histogram
    Histogram(Histogram<F, C>),
    /// A set
    Set(Set<F, C>),
    /// A rate
    Rate(Rate<F, C>),
}

impl<F, C> Metric<F, C>
where
    F: Formatter,
    C: Clock,
{
    /// Build an empty accumulator of `kind`.
    ///
    /// `histogram` is consulted only for [`Kind::Histogram`].
    #[must_use]
    pub fn new(
        kind: Kind,
        context: Context,
        formatter: F,
        clock: C,
        histogram: &HistogramConfig,
    ) -> Self {
        match kind {
            Kind::Gauge => Metric::Gauge(Gauge::with_clock(
                context,
                formatter,
                Attribution::Sample,
                clock,
            )),
            Kind::BucketGauge => Metric::Gauge(Gauge::with_clock(
                context,
                formatter,
                Attribution::Flush,
                clock,
            )),
            Kind::Count => Metric::Count(Count::with_clock(context, formatter, clock)),
            Kind::MonotonicCount => {
                Metric::MonotonicCount(MonotonicCount::with_clock(context, formatter, clock))
            }
            Kind::Counter => Metric::Counter(Counter::with_clock(context, formatter, clock)),
            Kind::Histogram => Metric::Histogram(Histogram::with_clock(
                context,
                formatter,
                histogram.clone(),
                clock,
            )),
            Kind::Set => Metric::Set(Set::with_clock(context, formatter, clock)),
            Kind::Rate => Metric::Rate(Rate::with_clock(context, formatter, clock)),
        }
    }

    /// The variant of this accumulator.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Metric::Gauge(g) => match g.attribution() {
                Attribution::Sample => Kind::Gauge,
                Attribution::Flush => Kind::BucketGauge,
            },
            Metric::Count(_) => Kind::Count,
            Metric::MonotonicCount(_) => Kind::MonotonicCount,
            Metric::Counter(_) => Kind::Counter,
            Metric::Histogram(_) => Kind::Histogram,
            Metric::Set(_) => Kind::Set,
            Metric::Rate(_) => Kind::Rate,
        }
    }
}

impl<F, C> Accumulator for Metric<F, C>
where
    F: Formatter,
    C: Clock,
{
    type Record = F::Record;

    fn sample<V>(&mut self, value: V, sample_rate: f64, timestamp: Option<f64>)
    where
        V: Into<Value>,
    {
        match self {
            Metric::Gauge(m) => m.sample(value, sample_rate, timestamp),
            Metric::Count(m) => m.sample(value, sample_rate, timestamp),
            Metric::MonotonicCount(m) => m.sample(value, sample_rate, timestamp),
            Metric::Counter(m) => m.sample(value, sample_rate, timestamp),
            Metric::Histogram(m) => m.sample(value, sample_rate, timestamp),
            Metric::Set(m) => m.sample(value, sample_rate, timestamp),
            Metric::Rate(m) => m.sample(value, sample_rate, timestamp),
        }
    }

    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record> {
        match self {
            Metric::Gauge(m) => m.flush(timestamp, interval),
            Metric::Count(m) => m.flush(timestamp, interval),
            Metric::MonotonicCount(m) => m.flush(timestamp, interval),
            Metric::Counter(m) => m.flush(timestamp, interval),
            Metric::Histogram(m) => m.flush(timestamp, interval),
            Metric::Set(m) => m.flush(timestamp, interval),
            Metric::Rate(m) => m.flush(timestamp, interval),
        }
    }

    fn last_sample_time(&self) -> Option<f64> {
        match self {
            Metric::Gauge(m) => m.last_sample_time(),
            Metric::Count(m) => m.last_sample_time(),
            Metric::MonotonicCount(m) => m.last_sample_time(),
            Metric::Counter(m) => m.last_sample_time(),
            Metric::Histogram(m) => m.last_sample_time(),
            Metric::Set(m) => m.last_sample_time(),
            Metric::Rate(m) => m.last_sample_time(),
        }
    }

    fn context(&self) -> &Context {
        match self {
            Metric::Gauge(m) => m.context(),
            Metric::Count(m) => m.context(),
            Metric::MonotonicCount(m) => m.context(),
            Metric::Counter(m) => m.context(),
            Metric::Histogram(m) => m.context(),
            Metric::Set(m) => m.context(),
            Metric::Rate(m) => m.context(),
        }
    }
}
