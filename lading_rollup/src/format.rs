//! Record formatting
//!
//! Accumulators never build output records themselves. At flush time they
//! describe each record as a borrowed [`Point`] and hand it to the
//! [`Formatter`] supplied at construction. Formatting must be pure: no I/O, no
//! shared mutation. Any `Fn(Point<'_>) -> R` is a formatter.

use serde::{Deserialize, Serialize};

use crate::MetricType;

#[derive(Debug, Clone, Copy, PartialEq)]
/// A single summarized data point, borrowed from the accumulator.
pub struct Point<'a> {
    /// The metric name, possibly suffixed (`request.latency.max`).
    pub metric: &'a str,
    /// The summarized value.
    pub value: f64,
    /// The timestamp attributed to the value, Unix seconds.
    pub timestamp: f64,
    /// The tags of the originating context.
    pub tags: &'a [String],
    /// The reporting host, if any.
    pub hostname: Option<&'a str>,
    /// The reporting device, if any.
    pub device_name: Option<&'a str>,
    /// The kind of the value.
    pub kind: MetricType,
    /// The length of the flush window in seconds.
    pub interval: f64,
}

/// Turns a [`Point`] into an output record.
pub trait Formatter {
    /// The record type produced.
    type Record;

    /// Format a single point.
    fn format(&self, point: Point<'_>) -> Self::Record;
}

impl<T, R> Formatter for T
where
    T: Fn(Point<'_>) -> R,
{
    type Record = R;

    fn format(&self, point: Point<'_>) -> R {
        self(point)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// An owned record, the default output of [`RecordFormatter`].
pub struct Record {
    /// The metric name, possibly suffixed.
    pub metric: String,
    /// The summarized value.
    pub value: f64,
    /// The timestamp attributed to the value, Unix seconds.
    pub timestamp: f64,
    /// The tags of the originating context.
    pub tags: Vec<String>,
    /// The reporting host, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// The reporting device, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// The kind of the value.
    #[serde(rename = "type")]
    pub kind: MetricType,
    /// The length of the flush window in seconds.
    pub interval: f64,
}

impl From<Point<'_>> for Record {
    fn from(point: Point<'_>) -> Self {
        Self {
            metric: point.metric.to_owned(),
            value: point.value,
            timestamp: point.timestamp,
            tags: point.tags.to_vec(),
            hostname: point.hostname.map(str::to_owned),
            device_name: point.device_name.map(str::to_owned),
            kind: point.kind,
            interval: point.interval,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Formats every [`Point`] into an owned [`Record`].
pub struct RecordFormatter;

impl Formatter for RecordFormatter {
    type Record = Record;

    fn format(&self, point: Point<'_>) -> Record {
        Record::from(point)
    }
}
