//! Histogram configuration
//!
//! [`crate::Histogram`] is the only accumulator with knobs: which summary
//! statistics to emit and at which percentiles. Both have defaults matching
//! the statsd convention.

use serde::{Deserialize, Serialize};

/// Errors produced by [`HistogramConfig::validate`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Percentile outside of `(0, 1]`
    #[error("Percentile must be in (0, 1]: {0}")]
    Percentile(f64),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
/// A summary statistic a histogram may emit.
///
/// Declaration order is emission order.
pub enum Aggregate {
    /// Smallest sample, emitted as a gauge.
    Min,
    /// Largest sample, emitted as a gauge.
    Max,
    /// Nearest-rank median, emitted as a gauge.
    Median,
    /// Arithmetic mean, emitted as a gauge.
    Avg,
    /// Sum of samples, emitted as a gauge.
    Sum,
    /// Sample-rate corrected count per second, emitted as a rate.
    Count,
}

impl Aggregate {
    /// All aggregates, in emission order.
    pub const ALL: [Aggregate; 6] = [
        Aggregate::Min,
        Aggregate::Max,
        Aggregate::Median,
        Aggregate::Avg,
        Aggregate::Sum,
        Aggregate::Count,
    ];

    /// The suffix appended to the metric name, `<metric>.<suffix>`.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Aggregate::Min => "min",
            Aggregate::Max => "max",
            Aggregate::Median => "median",
            Aggregate::Avg => "avg",
            Aggregate::Sum => "sum",
            Aggregate::Count => "count",
        }
    }
}

fn default_aggregates() -> Vec<Aggregate> {
    vec![
        Aggregate::Max,
        Aggregate::Median,
        Aggregate::Avg,
        Aggregate::Count,
    ]
}

fn default_percentiles() -> Vec<f64> {
    vec![0.95]
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
/// Configuration of a [`crate::Histogram`].
pub struct HistogramConfig {
    /// The aggregates to emit. Order and duplicates are irrelevant, emission
    /// follows [`Aggregate::ALL`]. Defaults to `[max, median, avg, count]`.
    #[serde(default = "default_aggregates")]
    pub aggregates: Vec<Aggregate>,
    /// The percentiles to emit, fractions in `(0, 1]`, emitted in the order
    /// given. Defaults to `[0.95]`.
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<f64>,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            aggregates: default_aggregates(),
            percentiles: default_percentiles(),
        }
    }
}

impl HistogramConfig {
    /// Check that every percentile lies in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Percentile`] naming the first offending value.
    pub fn validate(&self) -> Result<(), Error> {
        for &p in &self.percentiles {
            if !(p > 0.0 && p <= 1.0) {
                return Err(Error::Percentile(p));
            }
        }
        Ok(())
    }

    /// Whether `aggregate` is to be emitted.
    #[must_use]
    pub fn emits(&self, aggregate: Aggregate) -> bool {
        self.aggregates.contains(&aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HistogramConfig::default();
        assert_eq!(
            config.aggregates,
            [
                Aggregate::Max,
                Aggregate::Median,
                Aggregate::Avg,
                Aggregate::Count
            ]
        );
        assert_eq!(config.percentiles, [0.95]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: HistogramConfig = serde_yaml::from_str("percentiles: [0.5, 0.99]\n")
            .expect("parse histogram config");
        assert_eq!(config.aggregates, HistogramConfig::default().aggregates);
        assert_eq!(config.percentiles, [0.5, 0.99]);
    }

    #[test]
    fn aggregates_parse_snake_case() {
        let config: HistogramConfig =
            serde_yaml::from_str("aggregates: [min, sum]\n").expect("parse histogram config");
        assert_eq!(config.aggregates, [Aggregate::Min, Aggregate::Sum]);
        assert!(config.emits(Aggregate::Sum));
        assert!(!config.emits(Aggregate::Max));
    }

    #[test]
    fn unknown_aggregate_rejected() {
        let res: Result<HistogramConfig, _> = serde_yaml::from_str("aggregates: [p99]\n");
        assert!(res.is_err());
    }

    #[test]
    fn unknown_field_rejected() {
        let res: Result<HistogramConfig, _> = serde_yaml::from_str("buckets: [1, 2]\n");
        assert!(res.is_err());
    }

    #[test]
    fn percentile_bounds() {
        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            let config = HistogramConfig {
                percentiles: vec![0.5, bad],
                ..HistogramConfig::default()
            };
            assert!(matches!(config.validate(), Err(Error::Percentile(_))));
        }
        let config = HistogramConfig {
            percentiles: vec![1.0],
            ..HistogramConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
