//! Sample-rate corrected event counter
//!
//! A statsd counter. Each sample is scaled by `round(1/sample_rate)` and the
//! window total is reported per second of the flush interval. A counter
//! reports every flush, a zero rate for a window with no samples.

use crate::{
    Accumulator, MetricType,
    clock::{Clock, SystemClock},
    context::{Base, Context},
    format::Formatter,
    multiplicity,
    value::Value,
};

#[derive(Debug, Clone)]
/// A counter accumulator, reported as a rate.
pub struct Counter<F, C = SystemClock> {
    base: Base<F, C>,
    value: f64,
}

impl<F> Counter<F, SystemClock>
where
    F: Formatter,
{
    /// Create a new [`Counter`].
    #[must_use]
    pub fn new(context: Context, formatter: F) -> Self {
        Self::with_clock(context, formatter, SystemClock)
    }
}

impl<F, C> Counter<F, C>
where
    F: Formatter,
    C: Clock,
{
    /// Create a new [`Counter`] reading time from `clock`.
    #[must_use]
    pub fn with_clock(context: Context, formatter: F, clock: C) -> Self {
        Self {
            base: Base::new(context, formatter, clock),
            value: 0.0,
        }
    }
}

impl<F, C> Accumulator for Counter<F, C>
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
        self.value += v * multiplicity(sample_rate);
        self.base.touch();
    }

    /// Report the window total divided by `interval`, which must be positive.
    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record> {
        let rate = self.value / interval;
        self.value = 0.0;
        vec![self.base.emit(rate, timestamp, MetricType::Rate, interval)]
    }

    fn last_sample_time(&self) -> Option<f64> {
        self.base.last_sample_time
    }

    fn context(&self) -> &Context {
        &self.base.context
    }
}
