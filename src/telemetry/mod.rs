//! Telemetry core — pure domain logic, zero I/O.
//!
//! One read cycle produces a [`TelemetrySample`](sample::TelemetrySample);
//! samples accumulate in a fixed-capacity [`History`](history::History)
//! ring, get compressed into [`AggregateSample`](aggregate::AggregateSample)
//! summaries once per full window, and are scanned each cycle for sustained
//! fault conditions by [`alerts::scan`].
//!
//! Everything in this module is deterministic and host-testable: no clocks,
//! no hardware, no allocation beyond the fixed-size buffers.

pub mod aggregate;
pub mod alerts;
pub mod history;
pub mod sample;
pub mod status;

/// Per-cycle sample slots retained before the oldest is overwritten.
/// At the 5 s read cadence this is a 5-minute rolling window.
pub const SAMPLE_HISTORY_LEN: usize = 60;

/// Aggregate slots retained (one per full sample window).
pub const AGGREGATE_HISTORY_LEN: usize = 32;
