//! Time-windowed metric rollup
//!
//! This crate holds the accumulators that sit behind a statsd-style
//! aggregator. Each accumulator owns the state for exactly one metric identity
//! -- name, tags, host and device, see [`Context`] -- and is driven by two
//! calls:
//!
//! * `sample` records a raw data point as it arrives, and
//! * `flush` summarizes everything recorded since the previous flush into zero
//!   or more records, then arms the accumulator for the next window.
//!
//! The records themselves are opaque to this crate. Calling code supplies a
//! [`Formatter`] at construction and every record `flush` returns is whatever
//! that formatter produced. [`RecordFormatter`] is provided for callers that
//! want a plain, serializable [`Record`].
//!
//! # Semantics
//!
//! Every accumulator is logically either _empty_ or _pending_. A `sample` moves
//! it to pending, a `flush` moves it back to empty. [`MonotonicCount`] and
//! [`Rate`] carry a little state across the flush -- the last counter reading
//! and the last timestamped sample respectively -- which never shows up in
//! output but is required to compute the next window's delta.
//!
//! | Variant          | Per window                                  | Kind   |
//! |------------------|---------------------------------------------|--------|
//! | [`Gauge`]        | last value written                          | gauge  |
//! | [`Count`]        | sum of values                               | count  |
//! | [`MonotonicCount`] | sum of non-negative deltas between readings | count  |
//! | [`Counter`]      | sample-rate corrected sum over the interval | rate   |
//! | [`Histogram`]    | configured aggregates and percentiles       | mixed  |
//! | [`Set`]          | number of distinct values                   | gauge  |
//! | [`Rate`]         | derivative of the two latest samples        | gauge  |
//!
//! # Concurrency
//!
//! Accumulators have no interior synchronization. All calls against one
//! accumulator must be serialized by the owner, which is why every mutating
//! operation takes `&mut self`. [`Registry`] composes many accumulators behind
//! a single owner; sharding identities across threads is left to callers.
//!
//! ## Metrics
//!
//! Self-telemetry is recorded through [`metrics`], a no-op unless the
//! embedding program installs a recorder.
//!
//! `rollup_samples_dropped`: Samples whose payload was not numeric
//! `rollup_rate_suppressed`: Rate flushes suppressed, labeled by `reason`
//! `rollup_contexts_created`: Accumulators created by a [`Registry`]
//! `rollup_contexts_expired`: Accumulators dropped by [`Registry::expire`]
//! `rollup_contexts`: Accumulators held by a [`Registry`] at last flush
//! `rollup_records_emitted`: Records returned by [`Registry::flush`]

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

use serde::{Deserialize, Serialize};

pub mod clock;
pub mod config;
pub mod context;
pub mod count;
pub mod counter;
pub mod format;
pub mod gauge;
pub mod histogram;
pub mod metric;
pub mod rate;
pub mod registry;
pub mod set;
pub mod value;

pub use clock::{Clock, SystemClock};
pub use config::{Aggregate, HistogramConfig};
pub use context::Context;
pub use count::{Count, MonotonicCount};
pub use counter::Counter;
pub use format::{Formatter, Point, Record, RecordFormatter};
pub use gauge::{Attribution, Gauge};
pub use histogram::Histogram;
pub use metric::{Kind, Metric};
pub use rate::Rate;
pub use registry::Registry;
pub use set::Set;
pub use value::Value;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// The kind attached to every emitted record.
pub enum MetricType {
    /// A point-in-time value.
    Gauge,
    /// A value normalized per second of the flush interval.
    Rate,
    /// A raw total over the flush interval.
    Count,
}

/// The contract shared by every accumulator.
///
/// # Preconditions
///
/// `sample_rate` must lie in `(0, 1]`. `interval` must be strictly positive
/// for any accumulator that normalizes by it ([`Counter`] and the `count`
/// aggregate of [`Histogram`]). Neither is checked: violating them yields
/// whatever the arithmetic yields.
pub trait Accumulator {
    /// The record type produced by this accumulator's formatter.
    type Record;

    /// Record a single data point.
    ///
    /// `sample_rate` states that this call stands for `1/sample_rate` logical
    /// events. `timestamp` is the caller's notion of when the point was
    /// observed, in Unix seconds, and is only consulted by [`Gauge`].
    fn sample<V>(&mut self, value: V, sample_rate: f64, timestamp: Option<f64>)
    where
        V: Into<Value>;

    /// Summarize the window ending at `timestamp`, `interval` seconds long.
    ///
    /// Returns the records for the completed window, possibly none, and resets
    /// state for the next one. Never fails.
    fn flush(&mut self, timestamp: f64, interval: f64) -> Vec<Self::Record>;

    /// Wall-clock time, in Unix seconds, of the most recent `sample` call.
    fn last_sample_time(&self) -> Option<f64>;

    /// The identity this accumulator reports under.
    fn context(&self) -> &Context;
}

/// Number of logical events a single sample taken at `sample_rate` stands
/// for, `round(1/sample_rate)` with ties to even.
#[inline]
pub(crate) fn multiplicity(sample_rate: f64) -> f64 {
    (1.0 / sample_rate).round_ties_even()
}
