//! Distinct-value cardinality
//!
//! A statsd set reports how many distinct values it saw in a window. Values
//! may be numbers or strings, see [`crate::Value`].

use rustc_hash::FxHashSet;

use crate::{
    Accumulator, MetricType,
    clock::{Clock, SystemClock},
    context::{Base, Context},
    format::Formatter,
    value::{Member, Value},
};

#[derive(Debug, Clone)]
/// A set accumulator, reported as a gauge of its cardinality.
pub struct Set<F, C = SystemClock> {
    base: Base<F, C>,
    values: FxHashSet<Member>,
}

impl<F> Set<F, SystemClock>
where
    F: Formatter,
{
    /// Create a new [`Set`].
    #[must_use]
    pub fn new(context: Context, formatter: F) -> Self {
        Self::with_clock(context, formatter, SystemClock)
    }
}

impl<F, C> Set<F, C>
where
    F: Formatter,
    C: Clock,
{
    /// Create a new [`Set`] reading time from `clock`.
    #[must_use]
    pub fn with_clock(context: Context, formatter: F, clock: C) -> Self {
        Self {
            base: Base::new(context, formatter, clock),
            values: FxHashSet::default(),
        }
    }

    /// Number of distinct values seen since the last flush.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value was seen since the last flush.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<F, C> Accumulator for Set<F, C>
where
    F: Formatter,
    C: Clock,
{
    type Record = F::Record;

    fn sample<V>(&mut self, value: V, _sample_rate: f64, _timestamp: Option<f64>)
    where
        V: Into<Value>,
    {
        self.values.insert(Member::from(value.into()));
        self.base.touch();
    }

    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record> {
        if self.values.is_empty() {
            return Vec::new();
        }
        let cardinality = self.values.len() as f64;
        self.values.clear();
        vec![
            self.base
                .emit(cardinality, timestamp, MetricType::Gauge, interval),
        ]
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

    fn set() -> Set<RecordFormatter, ManualClock> {
        Set::with_clock(Context::named("users.uniques"), RecordFormatter, ManualClock::at(0.0))
    }

    #[test]
    fn counts_distinct_values() {
        let mut s = set();
        s.sample("a", 1.0, None);
        s.sample("b", 1.0, None);
        s.sample("a", 1.0, None);
        let records = s.flush(10.0, 10.0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 2.0);
        assert_eq!(records[0].kind, MetricType::Gauge);
        assert!(s.flush(20.0, 10.0).is_empty());
    }

    #[test]
    fn numbers_and_text_are_distinct() {
        let mut s = set();
        s.sample(1.0, 1.0, None);
        s.sample(1_u64, 1.0, None);
        s.sample("1", 1.0, None);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn flush_clears() {
        let mut s = set();
        s.sample("a", 1.0, None);
        s.flush(10.0, 10.0);
        assert!(s.is_empty());
        s.sample("a", 1.0, None);
        assert_eq!(s.flush(20.0, 10.0)[0].value, 1.0);
    }

    proptest! {
        #[test]
        fn cardinality_matches_distinct_inputs(values in prop::collection::vec(0u8..32, 1..100)) {
            let mut s = set();
            let mut distinct = values.clone();
            distinct.sort_unstable();
            distinct.dedup();
            for v in values {
                s.sample(u64::from(v), 1.0, None);
            }
            prop_assert_eq!(s.flush(0.0, 1.0)[0].value, distinct.len() as f64);
        }
    }
}
