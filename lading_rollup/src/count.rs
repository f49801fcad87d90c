//! Additive counts
//!
//! [`Count`] sums raw values per window. [`MonotonicCount`] is fed successive
//! readings of a counter that should only ever go up and reports the sum of
//! the increases between readings. A decrease is taken to be a counter reset
//! and contributes nothing.
//!
//! Unlike every other accumulator, [`MonotonicCount`] keeps its latest reading
//! across a flush. A counter read once per window still yields a delta every
//! window after the first:
//!
//! ```text
//! [sample(10), FLUSH, sample(15), FLUSH]
//!  -> prev:∅  curr:10 count:∅  => []
//!  -> prev:10 curr:∅  count:∅
//!  -> prev:10 curr:15 count:5
//!  -> prev:15 curr:∅  count:∅  => [5]
//! ```
//!
//! The carry spans exactly one flush. A window with no readings at all leaves
//! nothing to carry and the next reading starts over.

use crate::{
    Accumulator, MetricType,
    clock::{Clock, SystemClock},
    context::{Base, Context},
    format::Formatter,
    value::Value,
};

#[derive(Debug, Clone)]
/// Sum of values per window, reported as a count.
pub struct Count<F, C = SystemClock> {
    base: Base<F, C>,
    value: Option<f64>,
}

impl<F> Count<F, SystemClock>
where
    F: Formatter,
{
    /// Create a new [`Count`].
    #[must_use]
    pub fn new(context: Context, formatter: F) -> Self {
        Self::with_clock(context, formatter, SystemClock)
    }
}

impl<F, C> Count<F, C>
where
    F: Formatter,
    C: Clock,
{
    /// Create a new [`Count`] reading time from `clock`.
    #[must_use]
    pub fn with_clock(context: Context, formatter: F, clock: C) -> Self {
        Self {
            base: Base::new(context, formatter, clock),
            value: None,
        }
    }
}

impl<F, C> Accumulator for Count<F, C>
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
        self.value = Some(self.value.unwrap_or(0.0) + v);
        self.base.touch();
    }

    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record> {
        match self.value.take() {
            Some(value) => vec![self.base.emit(value, timestamp, MetricType::Count, interval)],
            None => Vec::new(),
        }
    }

    fn last_sample_time(&self) -> Option<f64> {
        self.base.last_sample_time
    }

    fn context(&self) -> &Context {
        &self.base.context
    }
}

#[derive(Debug, Clone)]
/// Sum of non-negative deltas between successive counter readings.
pub struct MonotonicCount<F, C = SystemClock> {
    base: Base<F, C>,
    prev_counter: Option<f64>,
    curr_counter: Option<f64>,
    count: Option<f64>,
}

impl<F> MonotonicCount<F, SystemClock>
where
    F: Formatter,
{
    /// Create a new [`MonotonicCount`].
    #[must_use]
    pub fn new(context: Context, formatter: F) -> Self {
        Self::with_clock(context, formatter, SystemClock)
    }
}

impl<F, C> MonotonicCount<F, C>
where
    F: Formatter,
    C: Clock,
{
    /// Create a new [`MonotonicCount`] reading time from `clock`.
    #[must_use]
    pub fn with_clock(context: Context, formatter: F, clock: C) -> Self {
        Self {
            base: Base::new(context, formatter, clock),
            prev_counter: None,
            curr_counter: None,
            count: None,
        }
    }
}

impl<F, C> Accumulator for MonotonicCount<F, C>
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
        if self.curr_counter.is_some() {
            self.prev_counter = self.curr_counter;
        }
        self.curr_counter = Some(v);

        if let (Some(prev), Some(curr)) = (self.prev_counter, self.curr_counter) {
            // A decrease is a reset, never a negative contribution.
            let delta = (curr - prev).max(0.0);
            self.count = Some(self.count.unwrap_or(0.0) + delta);
        }
        self.base.touch();
    }

    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record> {
        let records = match self.count.take() {
            Some(count) => vec![self.base.emit(count, timestamp, MetricType::Count, interval)],
            None => Vec::new(),
        };
        // Carry the last reading forward even when nothing was emitted. A
        // window without readings carries nothing.
        self.prev_counter = self.curr_counter.take();
        records
    }

    fn last_sample_time(&self) -> Option<f64> {
        self.base.last_sample_time
    }

    fn context(&self) -> &Context {
        &self.base.context
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, format::RecordFormatter};
    use proptest::prelude::*;

    fn count() -> Count<RecordFormatter, ManualClock> {
        Count::with_clock(Context::named("requests"), RecordFormatter, ManualClock::at(0.0))
    }

    fn monotonic() -> MonotonicCount<RecordFormatter, ManualClock> {
        MonotonicCount::with_clock(
            Context::named("net.bytes_rcvd"),
            RecordFormatter,
            ManualClock::at(0.0),
        )
    }

    #[test]
    fn count_sums_raw_values() {
        let mut c = count();
        c.sample(3.0, 1.0, None);
        c.sample(4.0, 1.0, None);
        let records = c.flush(100.0, 10.0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 7.0);
        assert_eq!(records[0].kind, MetricType::Count);
        assert_eq!(records[0].timestamp, 100.0);
        assert_eq!(records[0].interval, 10.0);
        assert!(c.flush(110.0, 10.0).is_empty());
    }

    #[test]
    fn count_ignores_sample_rate() {
        let mut c = count();
        c.sample(3.0, 0.5, None);
        assert_eq!(c.flush(100.0, 10.0)[0].value, 3.0);
    }

    #[test]
    fn count_of_zero_is_still_reported() {
        let mut c = count();
        c.sample(0.0, 1.0, None);
        assert_eq!(c.flush(100.0, 10.0)[0].value, 0.0);
    }

    #[test]
    fn monotonic_delta_survives_flush() {
        let mut m = monotonic();
        m.sample(10.0, 1.0, None);
        assert!(m.flush(10.0, 10.0).is_empty());
        m.sample(15.0, 1.0, None);
        let records = m.flush(20.0, 10.0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 5.0);
        assert_eq!(records[0].kind, MetricType::Count);
    }

    #[test]
    fn monotonic_reset_clamps_to_zero() {
        let mut m = monotonic();
        m.sample(10.0, 1.0, None);
        m.sample(5.0, 1.0, None);
        let records = m.flush(10.0, 10.0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 0.0);
    }

    #[test]
    fn monotonic_sums_deltas_within_window() {
        let mut m = monotonic();
        for v in [1.0, 4.0, 2.0, 6.0] {
            m.sample(v, 1.0, None);
        }
        // 3 + 0 + 4
        assert_eq!(m.flush(10.0, 10.0)[0].value, 7.0);
    }

    #[test]
    fn monotonic_idle_flush_is_empty() {
        let mut m = monotonic();
        m.sample(1.0, 1.0, None);
        m.sample(2.0, 1.0, None);
        assert_eq!(m.flush(10.0, 10.0).len(), 1);
        assert!(m.flush(20.0, 10.0).is_empty());
    }

    #[test]
    fn monotonic_carry_lasts_one_window() {
        let mut m = monotonic();
        m.sample(1.0, 1.0, None);
        assert!(m.flush(10.0, 10.0).is_empty());
        // An idle window drops the carried reading.
        assert!(m.flush(20.0, 10.0).is_empty());
        m.sample(5.0, 1.0, None);
        assert!(m.flush(30.0, 10.0).is_empty());
        m.sample(8.0, 1.0, None);
        assert_eq!(m.flush(40.0, 10.0)[0].value, 3.0);
    }

    proptest! {
        #[test]
        fn monotonic_never_negative(windows in prop::collection::vec(prop::collection::vec(0.0f64..1e6, 0..10), 1..10)) {
            let mut m = monotonic();
            for (i, window) in windows.iter().enumerate() {
                for v in window {
                    m.sample(*v, 1.0, None);
                }
                for record in m.flush(i as f64, 1.0) {
                    prop_assert!(record.value >= 0.0);
                }
            }
        }

        #[test]
        fn monotonic_increasing_series_sums_to_span(mut readings in prop::collection::vec(0u32..1_000_000, 2..40)) {
            readings.sort_unstable();
            let mut m = monotonic();
            let mut total = 0.0;
            for (i, r) in readings.iter().enumerate() {
                m.sample(f64::from(*r), 1.0, None);
                if i % 3 == 2 {
                    total += m.flush(i as f64, 1.0).iter().map(|r| r.value).sum::<f64>();
                }
            }
            total += m.flush(1e6, 1.0).iter().map(|r| r.value).sum::<f64>();
            let span = f64::from(readings[readings.len() - 1] - readings[0]);
            prop_assert_eq!(total, span);
        }
    }
}
