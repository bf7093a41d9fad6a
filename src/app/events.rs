//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — log to serial, publish
//! over MQTT, cache for the web API, etc.

use crate::telemetry::aggregate::AggregateSample;
use crate::telemetry::sample::TelemetrySample;
use crate::telemetry::status::AlertStatus;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A new per-cycle sample was recorded (every tick, alert already
    /// written onto it).
    Sample(TelemetrySample),

    /// A window summary was produced (once per full sample window).
    Aggregate(AggregateSample),

    /// The active alert changed from `None` to the carried status.
    AlertRaised(AlertStatus),

    /// The previously active alert cleared.
    AlertCleared,

    /// The monitor service has started.
    Started,
}
