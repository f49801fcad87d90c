//! Two-point derivative
//!
//! A rate stamps each sample with its own wall-clock read, in whole seconds,
//! and at flush reports the derivative between the two most recent samples.
//! The caller's sample timestamp and the flush window play no part in the
//! measurement interval.
//!
//! After every flush only the latest sample is kept, so each window needs at
//! least one new sample to report anything:
//!
//! ```text
//! [sample(10)@0, sample(20)@5, FLUSH, FLUSH]
//!  -> [(0, 10)]
//!  -> [(0, 10), (5, 20)]
//!  -> [(5, 20)]            => [2.0]
//!  -> [(5, 20)]            => []
//! ```
//!
//! A zero-width interval or a decreasing value suppresses the window's record.
//! Both are logged and neither is an error.

use metrics::counter;
use tracing::{info, warn};

use crate::{
    Accumulator, MetricType,
    clock::{Clock, SystemClock},
    context::{Base, Context},
    format::Formatter,
    value::Value,
};

/// Outcome of differentiating two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Derivative {
    Value(f64),
    /// Both samples share a timestamp, the rate would be infinite.
    ZeroInterval,
    /// The value decreased, likely a counter reset.
    Negative,
}

fn derivative((t1, v1): (f64, f64), (t2, v2): (f64, f64)) -> Derivative {
    let interval = t2 - t1;
    if interval == 0.0 {
        return Derivative::ZeroInterval;
    }
    let delta = v2 - v1;
    if delta < 0.0 {
        return Derivative::Negative;
    }
    Derivative::Value(delta / interval)
}

#[derive(Debug, Clone)]
/// A rate accumulator, reported as a gauge.
pub struct Rate<F, C = SystemClock> {
    base: Base<F, C>,
    // At most the two latest (seconds, value) samples, oldest first.
    samples: Vec<(f64, f64)>,
}

impl<F> Rate<F, SystemClock>
where
    F: Formatter,
{
    /// Create a new [`Rate`].
    #[must_use]
    pub fn new(context: Context, formatter: F) -> Self {
        Self::with_clock(context, formatter, SystemClock)
    }
}

impl<F, C> Rate<F, C>
where
    F: Formatter,
    C: Clock,
{
    /// Create a new [`Rate`] reading time from `clock`.
    #[must_use]
    pub fn with_clock(context: Context, formatter: F, clock: C) -> Self {
        Self {
            base: Base::new(context, formatter, clock),
            samples: Vec::with_capacity(2),
        }
    }
}

impl<F, C> Accumulator for Rate<F, C>
where
    F: Formatter,
    C: Clock,
{
    type Record = F::Record;

    fn sample<V>(&mut self, value: V, _sample_rate: f64, _timestamp: Option<f64>)
    where
        V: Into<Value>,
    {
        let value = value.into();
        let Some(v) = self.base.numeric(&value) else {
            return;
        };
        let now = self.base.touch();
        // Only the latest two samples are ever differentiated.
        if self.samples.len() == 2 {
            self.samples.remove(0);
        }
        self.samples.push((now.trunc(), v));
    }

    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record> {
        let [first, second] = self.samples[..] else {
            return Vec::new();
        };
        self.samples.remove(0);

        match derivative(first, second) {
            Derivative::Value(rate) => {
                vec![self.base.emit(rate, timestamp, MetricType::Gauge, interval)]
            }
            Derivative::ZeroInterval => {
                warn!(metric = %self.base.context.name(), "Metric has an interval of 0. Not flushing.");
                counter!("rollup_rate_suppressed", "reason" => "zero_interval").increment(1);
                Vec::new()
            }
            Derivative::Negative => {
                info!(metric = %self.base.context.name(), "Metric has a rate < 0. Counter may have been reset.");
                counter!("rollup_rate_suppressed", "reason" => "negative").increment(1);
                Vec::new()
            }
        }
    }

    fn last_sample_time(&self) -> Option<f64> {
        self.base.last_sample_time
    }

    fn context(&self) -> &Context {
        &self.base.context
    }
}
