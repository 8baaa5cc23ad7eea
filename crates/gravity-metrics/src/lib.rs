//! Metrics for Gravity sync sessions.
//!
//! Each metric a session records is declared once in [`metric_defs`] and
//! recorded through its handle, which attaches the session's
//! [`SessionLabels`]. Without an installed recorder the `metrics` facade turns
//! every call into a no-op.
//!
//! ```rust
//! use gravity_metrics::{metric_defs, SessionLabels};
//!
//! let labels = SessionLabels::new("esp32", "tcp");
//! metric_defs::SYNC_ATTEMPTS.counter(&labels).increment(1);
//! ```

pub use metrics;

use metrics::{
    describe_counter, describe_gauge, describe_histogram, Counter, Gauge, Histogram, Unit,
};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// One session metric.
#[derive(Debug, Clone)]
pub struct Metric {
    /// Name under `gravity.sync.`.
    pub name: &'static str,
    pub kind: MetricKind,
    pub unit: Unit,
    pub help: &'static str,
}

impl Metric {
    /// Counter handle for a session.
    pub fn counter(&self, labels: &SessionLabels) -> Counter {
        debug_assert_eq!(self.kind, MetricKind::Counter, "{} is not a counter", self.name);
        metrics::counter!(self.name, &labels.to_labels())
    }

    /// Gauge handle for a session.
    pub fn gauge(&self, labels: &SessionLabels) -> Gauge {
        debug_assert_eq!(self.kind, MetricKind::Gauge, "{} is not a gauge", self.name);
        metrics::gauge!(self.name, &labels.to_labels())
    }

    /// Histogram handle for a session.
    pub fn histogram(&self, labels: &SessionLabels) -> Histogram {
        debug_assert_eq!(self.kind, MetricKind::Histogram, "{} is not a histogram", self.name);
        metrics::histogram!(self.name, &labels.to_labels())
    }

    /// Register the help text and unit with the installed recorder.
    pub fn describe(&self) {
        match self.kind {
            MetricKind::Counter => {
                describe_counter!(self.name, self.unit, self.help);
            }
            MetricKind::Gauge => {
                describe_gauge!(self.name, self.unit, self.help);
            }
            MetricKind::Histogram => {
                describe_histogram!(self.name, self.unit, self.help);
            }
        }
    }
}

const fn counter(name: &'static str, unit: Unit, help: &'static str) -> Metric {
    Metric {
        name,
        kind: MetricKind::Counter,
        unit,
        help,
    }
}

/// All metrics recorded by sync sessions.
pub mod metric_defs {
    use super::{counter, Metric, MetricKind, Unit};

    /// Label keys present on every session metric.
    pub const SESSION_LABELS: [&str; 2] = ["device", "transport"];

    pub const SYNC_ATTEMPTS: Metric = counter(
        "gravity.sync.attempts",
        Unit::Count,
        "Sync requests written to the UART, including retries",
    );

    pub const SYNC_RETRIES: Metric = counter(
        "gravity.sync.retries",
        Unit::Count,
        "Sync requests re-issued after an unrecognized command",
    );

    pub const SYNC_COMPLETED: Metric = counter(
        "gravity.sync.completed",
        Unit::Count,
        "Sync responses applied to the settings model",
    );

    pub const SYNC_FAILED: Metric = counter(
        "gravity.sync.failed",
        Unit::Count,
        "Sync sessions abandoned after the retry limit",
    );

    pub const BYTES_DROPPED: Metric = counter(
        "gravity.sync.bytes_dropped",
        Unit::Bytes,
        "Response bytes dropped because the buffer was full",
    );

    pub const TOKENS_APPLIED: Metric = counter(
        "gravity.sync.tokens_applied",
        Unit::Count,
        "Tokens applied to the settings model",
    );

    pub const UNKNOWN_TAGS: Metric = counter(
        "gravity.sync.unknown_tags",
        Unit::Count,
        "Tokens ignored because of an unknown tag",
    );

    pub const MALFORMED_TOKENS: Metric = counter(
        "gravity.sync.malformed_tokens",
        Unit::Count,
        "Groups skipped because they could not be scanned",
    );

    pub const REJECTED_VALUES: Metric = counter(
        "gravity.sync.rejected_values",
        Unit::Count,
        "Values rejected by a field handler",
    );

    /// Labels currently holding synced text instead of the placeholder.
    pub const LABELS_OVERRIDDEN: Metric = Metric {
        name: "gravity.sync.labels_overridden",
        kind: MetricKind::Gauge,
        unit: Unit::Count,
        help: "Menu labels currently showing synced values",
    };

    pub const RESPONSE_SIZE: Metric = Metric {
        name: "gravity.sync.response_size_bytes",
        kind: MetricKind::Histogram,
        unit: Unit::Bytes,
        help: "Size of each dispatched sync response",
    };

    /// Every declared metric.
    pub const ALL: &[&Metric] = &[
        &SYNC_ATTEMPTS,
        &SYNC_RETRIES,
        &SYNC_COMPLETED,
        &SYNC_FAILED,
        &BYTES_DROPPED,
        &TOKENS_APPLIED,
        &UNKNOWN_TAGS,
        &MALFORMED_TOKENS,
        &REJECTED_VALUES,
        &LABELS_OVERRIDDEN,
        &RESPONSE_SIZE,
    ];
}

/// Labels identifying the device a session talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLabels {
    /// Device name from configuration.
    pub device: String,
    /// Transport kind (`tcp`, `replay`, ...).
    pub transport: String,
}

impl SessionLabels {
    pub fn new(device: impl Into<String>, transport: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            transport: transport.into(),
        }
    }

    /// Label pairs keyed by [`metric_defs::SESSION_LABELS`].
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        let [device, transport] = metric_defs::SESSION_LABELS;
        vec![(device, self.device.clone()), (transport, self.transport.clone())]
    }
}

impl Default for SessionLabels {
    fn default() -> Self {
        Self::new("gravity", "uart")
    }
}

/// Describe every metric with the installed recorder. Call once at startup.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}
