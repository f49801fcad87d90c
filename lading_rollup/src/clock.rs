//! Wall-clock source for accumulators
//!
//! Accumulators read the wall clock in two places: every `sample` stamps
//! `last_sample_time`, and [`crate::Rate`] stamps each point it records. Both
//! reads go through [`Clock`] so tests can drive time by hand.

use std::time::{SystemTime, UNIX_EPOCH};

/// The `Clock` used by every accumulator
pub trait Clock {
    /// Current wall-clock time in Unix seconds.
    fn now(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
/// A clock that operates with respect to real-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    /// Return the seconds elapsed since the Unix epoch.
    ///
    /// A system clock set before the epoch reads as zero.
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;
