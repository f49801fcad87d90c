//! Metric identity
//!
//! A [`Context`] is the unique combination of a metric name, its tags and the
//! host and device it is reported for. Exactly one accumulator exists per
//! context and the context never changes once the accumulator is built.

use metrics::counter;
use tracing::debug;

use crate::{
    MetricType,
    clock::Clock,
    format::{Formatter, Point},
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// The identity an accumulator reports under.
pub struct Context {
    name: String,
    tags: Vec<String>,
    hostname: Option<String>,
    device_name: Option<String>,
}

impl Context {
    /// Create a new [`Context`] with no host or device.
    #[must_use]
    pub fn new<S, I, T>(name: S, tags: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            hostname: None,
            device_name: None,
        }
    }

    /// Create a new untagged [`Context`].
    #[must_use]
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self::new(name, std::iter::empty::<String>())
    }

    /// Attribute this context to `hostname`.
    #[must_use]
    pub fn with_hostname<S: Into<String>>(mut self, hostname: S) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Attribute this context to `device_name`.
    #[must_use]
    pub fn with_device_name<S: Into<String>>(mut self, device_name: S) -> Self {
        self.device_name = Some(device_name.into());
        self
    }

    /// The metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tags, in the order given at construction.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The reporting host, if any.
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// The reporting device, if any.
    #[must_use]
    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }
}

/// State common to every accumulator: identity, collaborators and the time of
/// the last sample.
#[derive(Debug, Clone)]
pub(crate) struct Base<F, C> {
    pub(crate) context: Context,
    formatter: F,
    clock: C,
    pub(crate) last_sample_time: Option<f64>,
}

impl<F, C> Base<F, C>
where
    F: Formatter,
    C: Clock,
{
    pub(crate) fn new(context: Context, formatter: F, clock: C) -> Self {
        Self {
            context,
            formatter,
            clock,
            last_sample_time: None,
        }
    }

    /// Stamp the current wall-clock time as the last sample time, returning it.
    pub(crate) fn touch(&mut self) -> f64 {
        let now = self.clock.now();
        self.last_sample_time = Some(now);
        now
    }

    /// Numeric reading of `value`, or `None` if the sample is to be dropped.
    pub(crate) fn numeric(&self, value: &Value) -> Option<f64> {
        let v = value.as_f64();
        if v.is_none() {
            debug!(metric = %self.context.name(), %value, "Dropping non-numeric sample");
            counter!("rollup_samples_dropped").increment(1);
        }
        v
    }

    /// Format a record under this context's own name.
    pub(crate) fn emit(
        &self,
        value: f64,
        timestamp: f64,
        kind: MetricType,
        interval: f64,
    ) -> F::Record {
        self.emit_as(&self.context.name, value, timestamp, kind, interval)
    }

    /// Format a record under `metric`, typically a suffixed form of the name.
    pub(crate) fn emit_as(
        &self,
        metric: &str,
        value: f64,
        timestamp: f64,
        kind: MetricType,
        interval: f64,
    ) -> F::Record {
        self.formatter.format(Point {
            metric,
            value,
            timestamp,
            tags: &self.context.tags,
            hostname: self.context.hostname(),
            device_name: self.context.device_name(),
            kind,
            interval,
        })
    }
}
