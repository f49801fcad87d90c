//! Distribution summaries
//!
//! A histogram keeps every raw sample in a window and at flush time emits the
//! configured [`Aggregate`]s and percentiles, each as its own record named
//! `<metric>.<suffix>`. Percentiles and the median are strict nearest-rank
//! picks from the sorted samples: no interpolation between ranks.
//!
//! Sample rate inflates the logical count, reported by the `count` aggregate,
//! but raw values are stored once. For samples `[5, 1, 9, 3]` at rate 1 over a
//! one second interval with the default configuration:
//!
//! ```text
//! sorted = [1, 3, 5, 9]
//!  -> <m>.max          = 9    gauge
//!  -> <m>.median       = 3    gauge  sorted[round(4/2 - 1)]
//!  -> <m>.avg          = 4.5  gauge
//!  -> <m>.count        = 4    rate
//!  -> <m>.95percentile = 9    gauge  sorted[round(0.95*4 - 1)]
//! ```

use crate::{
    Accumulator, MetricType,
    clock::{Clock, SystemClock},
    config::{Aggregate, HistogramConfig},
    context::{Base, Context},
    format::Formatter,
    multiplicity,
    value::Value,
};

/// Nearest-rank index into `len` sorted samples for the fractional rank
/// `rank`, rounded half to even.
///
/// A negative index counts back from the end of the array, so `-1` picks the
/// largest sample. Indices past either end are clamped to the array.
#[inline]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn nearest_rank(rank: f64, len: usize) -> usize {
    let len = len as i64;
    let idx = rank.round_ties_even() as i64;
    let idx = if idx < 0 { len + idx } else { idx };
    idx.clamp(0, len - 1) as usize
}

/// The integral percent naming a percentile, 0.95 is `95`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(p: f64) -> u32 {
    (p * 100.0) as u32
}

#[derive(Debug, Clone)]
/// A histogram accumulator.
pub struct Histogram<F, C = SystemClock> {
    base: Base<F, C>,
    config: HistogramConfig,
    samples: Vec<f64>,
    count: f64,
}

impl<F> Histogram<F, SystemClock>
where
    F: Formatter,
{
    /// Create a new [`Histogram`] with default aggregates and percentiles.
    #[must_use]
    pub fn new(context: Context, formatter: F) -> Self {
        Self::with_clock(context, formatter, HistogramConfig::default(), SystemClock)
    }

    /// Create a new [`Histogram`] with the given configuration.
    #[must_use]
    pub fn with_config(context: Context, formatter: F, config: HistogramConfig) -> Self {
        Self::with_clock(context, formatter, config, SystemClock)
    }
}

impl<F, C> Histogram<F, C>
where
    F: Formatter,
    C: Clock,
{
    /// Create a new [`Histogram`] reading time from `clock`.
    ///
    /// `config` is taken as is, see [`HistogramConfig::validate`].
    #[must_use]
    pub fn with_clock(context: Context, formatter: F, config: HistogramConfig, clock: C) -> Self {
        Self {
            base: Base::new(context, formatter, clock),
            config,
            samples: Vec::new(),
            count: 0.0,
        }
    }

    /// The configuration of this histogram.
    #[must_use]
    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }
}

impl<F, C> Accumulator for Histogram<F, C>
where
    F: Formatter,
    C: Clock,
{
    type Record = F::Record;

    fn sample<V>(&mut self, value: V, sample_rate: f64, _timestamp: Option<f64>)
    where
        V: Into<Value>,
    {
        let value = value.into();
        let Some(v) = self.base.numeric(&value) else {
            return;
        };
        self.count += multiplicity(sample_rate);
        self.samples.push(v);
        self.base.touch();
    }

    /// Emit aggregates then percentiles. `interval` must be positive when the
    /// `count` aggregate is configured.
    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record> {
        if self.count == 0.0 || self.samples.is_empty() {
            return Vec::new();
        }

        let mut samples = std::mem::take(&mut self.samples);
        let count = std::mem::take(&mut self.count);
        samples.sort_by(f64::total_cmp);

        let len = samples.len();
        let min = samples[0];
        let max = samples[len - 1];
        let median = samples[nearest_rank(len as f64 / 2.0 - 1.0, len)];
        let sum: f64 = samples.iter().sum();
        let avg = sum / len as f64;

        let name = self.base.context.name();
        let mut records = Vec::with_capacity(Aggregate::ALL.len() + self.config.percentiles.len());
        for aggregate in Aggregate::ALL {
            if !self.config.emits(aggregate) {
                continue;
            }
            let (value, kind) = match aggregate {
                Aggregate::Min => (min, MetricType::Gauge),
                Aggregate::Max => (max, MetricType::Gauge),
                Aggregate::Median => (median, MetricType::Gauge),
                Aggregate::Avg => (avg, MetricType::Gauge),
                Aggregate::Sum => (sum, MetricType::Gauge),
                Aggregate::Count => (count / interval, MetricType::Rate),
            };
            let metric = format!("{name}.{suffix}", suffix = aggregate.suffix());
            records.push(self.base.emit_as(&metric, value, timestamp, kind, interval));
        }

        for &p in &self.config.percentiles {
            let value = samples[nearest_rank(p * len as f64 - 1.0, len)];
            let metric = format!("{name}.{percent}percentile", percent = percent(p));
            records.push(
                self.base
                    .emit_as(&metric, value, timestamp, MetricType::Gauge, interval),
            );
        }

        // Keep the allocation for the next window.
        samples.clear();
        self.samples = samples;
        records
    }

    fn last_sample_time(&self) -> Option<f64> {
        self.base.last_sample_time
    }

    fn context(&self) -> &Context {
        &self.base.context
    }
}
