//! Last-write-wins gauge
//!
//! A gauge reports the last value written in a window. It does _not_ repeat
//! its last known value into windows that saw no sample: once flushed the
//! gauge is silent until sampled again.

use crate::{
    Accumulator, MetricType,
    clock::{Clock, SystemClock},
    context::{Base, Context},
    format::Formatter,
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Which timestamp a flushed gauge value is attributed to.
pub enum Attribution {
    /// The timestamp passed to `sample`, falling back to the flush timestamp
    /// when the sample carried none.
    #[default]
    Sample,
    /// Always the flush timestamp. This is a 'bucket' gauge.
    Flush,
}

#[derive(Debug, Clone)]
/// A gauge accumulator.
pub struct Gauge<F, C = SystemClock> {
    base: Base<F, C>,
    attribution: Attribution,
    value: Option<f64>,
    sample_timestamp: Option<f64>,
}

impl<F> Gauge<F, SystemClock>
where
    F: Formatter,
{
    /// Create a new gauge attributing values to their sample timestamp.
    #[must_use]
    pub fn new(context: Context, formatter: F) -> Self {
        Self::with_clock(context, formatter, Attribution::Sample, SystemClock)
    }

    /// Create a new gauge attributing values to the flush timestamp.
    #[must_use]
    pub fn bucket(context: Context, formatter: F) -> Self {
        Self::with_clock(context, formatter, Attribution::Flush, SystemClock)
    }
}

impl<F, C> Gauge<F, C>
where
    F: Formatter,
    C: Clock,
{
    /// Create a new gauge with an explicit attribution policy and clock.
    #[must_use]
    pub fn with_clock(context: Context, formatter: F, attribution: Attribution, clock: C) -> Self {
        Self {
            base: Base::new(context, formatter, clock),
            attribution,
            value: None,
            sample_timestamp: None,
        }
    }

    /// The attribution policy of this gauge.
    #[must_use]
    pub fn attribution(&self) -> Attribution {
        self.attribution
    }
}

impl<F, C> Accumulator for Gauge<F, C>
where
    F: Formatter,
    C: Clock,
{
    type Record = F::Record;

    fn sample<V>(&mut self, value: V, _sample_rate: f64, timestamp: Option<f64>)
    where
        V: Into<Value>,
    {
        let value = value.into();
        let Some(v) = self.base.numeric(&value) else {
            return;
        };
        self.value = Some(v);
        self.sample_timestamp = timestamp;
        self.base.touch();
    }

    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record> {
        let Some(value) = self.value.take() else {
            return Vec::new();
        };
        let ts = match self.attribution {
            Attribution::Sample => self.sample_timestamp.unwrap_or(timestamp),
            Attribution::Flush => timestamp,
        };
        vec![self.base.emit(value, ts, MetricType::Gauge, interval)]
    }

    fn last_sample_time(&self) -> Option<f64> {
        self.base.last_sample_time
    }

    fn context(&self) -> &Context {
        &self.base.context
    }
}
