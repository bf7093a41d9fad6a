//! Monitor service — the hexagonal core.
//!
//! [`MonitorService`] owns the two telemetry histories and drives one read
//! cycle per external tick. It exposes a clean, hardware-agnostic API; all
//! I/O flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │       MonitorService       │
//!  ConfigPort ◀──▶│  retain · scan · aggregate │
//!                 └────────────────────────────┘
//! ```
//!
//! Everything here runs synchronously inside the tick: no operation
//! suspends or blocks, so a single logical thread of control needs no
//! locking around the histories. A future concurrent reader (e.g. a web
//! task on another core) would need a snapshot scheme; today the web
//! collaborator is served from the same loop.

use log::{info, warn};

use crate::config::MonitorConfig;
use crate::telemetry::aggregate::{self, AggregateSample};
use crate::telemetry::alerts;
use crate::telemetry::history::History;
use crate::telemetry::sample::TelemetrySample;
use crate::telemetry::status::AlertStatus;
use crate::telemetry::{AGGREGATE_HISTORY_LEN, SAMPLE_HISTORY_LEN};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ConfigError, ConfigPort, EventSink, SensorPort};

/// Seconds a dirty config sits before the debounced auto-save fires.
const AUTO_SAVE_DEBOUNCE_S: f32 = 5.0;

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    samples: History<TelemetrySample, SAMPLE_HISTORY_LEN>,
    aggregates: History<AggregateSample, AGGREGATE_HISTORY_LEN>,
    config: MonitorConfig,
    /// Monotonic total tick count since start.
    tick_count: u64,
    /// Ticks since the last aggregation ran.
    ticks_since_aggregate: usize,
    /// Alert currently in force, for raise/clear edge detection.
    active_alert: AlertStatus,
    config_dirty: bool,
    dirty_since_tick: u64,
}

impl MonitorService {
    /// Construct the service from configuration. Histories start empty.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            samples: History::new(),
            aggregates: History::new(),
            config,
            tick_count: 0,
            ticks_since_aggregate: 0,
            active_alert: AlertStatus::None,
            config_dirty: false,
            dirty_since_tick: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "MonitorService started ({} sample slots, {} aggregate slots, {} ms cadence)",
            self.samples.capacity(),
            self.aggregates.capacity(),
            self.config.sample_interval_ms
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full read cycle: sample → retain → alert scan → (maybe)
    /// aggregate. Called once per `sample_interval_ms` by the outer loop;
    /// completes synchronously before the next tick is dispatched.
    pub fn tick(&mut self, sensors: &mut impl SensorPort, sink: &mut impl EventSink) {
        self.tick_count += 1;

        // 1. Read raw values via SensorPort and derive the sample.
        let reading = sensors.read_reading();
        let mut sample = TelemetrySample::derive(&reading, self.config.amps_on_threshold);

        // 2. Retain it, then scan the window including this sample and
        //    write the verdict back onto it.
        self.samples.record(sample);
        let alert = alerts::scan(&self.samples, &self.config);
        if let Some(latest) = self.samples.latest_mut() {
            latest.alert_status = alert;
        }
        sample.alert_status = alert;

        // 3. Raise/clear edges.
        if alert != self.active_alert {
            if alert == AlertStatus::None {
                info!("alert cleared (was {})", self.active_alert.as_str());
                sink.emit(&AppEvent::AlertCleared);
            } else {
                warn!("ALERT: {}", alert.as_str());
                sink.emit(&AppEvent::AlertRaised(alert));
            }
            self.active_alert = alert;
        }

        sink.emit(&AppEvent::Sample(sample));

        // 4. Aggregate once per full window.
        self.ticks_since_aggregate += 1;
        if self.ticks_since_aggregate >= self.samples.capacity() {
            self.ticks_since_aggregate = 0;
            let mut agg = aggregate::summarize(&self.samples, &sample);
            agg.timestamp_ms = self.uptime_ms() as u32;
            self.aggregates.record(agg);
            sink.emit(&AppEvent::Aggregate(agg));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the web settings endpoint,
    /// serial console, etc.).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        storage: &impl ConfigPort,
    ) -> Result<(), ConfigError> {
        match cmd {
            AppCommand::ApplySettings(patch) => {
                self.config
                    .apply_patch(&patch)
                    .map_err(ConfigError::ValidationFailed)?;
                self.mark_config_dirty();
                info!("settings updated at runtime");
                Ok(())
            }
            AppCommand::SaveConfig => {
                storage.save(&self.config)?;
                self.config_dirty = false;
                info!("config saved");
                Ok(())
            }
            AppCommand::FactoryReset => {
                storage.reset()?;
                self.config = MonitorConfig::default();
                self.config_dirty = false;
                info!("config reset to defaults");
                Ok(())
            }
        }
    }

    // ── Queries (read-only history surface) ───────────────────

    /// Oldest-first view of the retained per-cycle samples.
    pub fn samples(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    /// Oldest-first view of the retained window summaries.
    pub fn aggregates(&self) -> impl Iterator<Item = &AggregateSample> {
        self.aggregates.iter()
    }

    /// The most recently recorded sample, alert verdict included.
    pub fn latest_sample(&self) -> Option<&TelemetrySample> {
        self.samples.latest()
    }

    pub fn latest_aggregate(&self) -> Option<&AggregateSample> {
        self.aggregates.latest()
    }

    /// Alert currently in force.
    pub fn active_alert(&self) -> AlertStatus {
        self.active_alert
    }

    /// Total read cycles executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Milliseconds of tick-derived uptime (wraps with u32 like the
    /// aggregate timestamps it feeds).
    fn uptime_ms(&self) -> u64 {
        self.tick_count
            .saturating_mul(u64::from(self.config.sample_interval_ms))
    }

    /// Clone of the live configuration (for the settings read-back).
    pub fn current_config(&self) -> MonitorConfig {
        self.config.clone()
    }

    // ── Config dirty-flag management ──────────────────────────

    fn mark_config_dirty(&mut self) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_tick = self.tick_count;
        }
    }

    /// Check if the debounced auto-save should trigger.
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        let ticks_since_dirty = self.tick_count.saturating_sub(self.dirty_since_tick);
        let secs_since_dirty =
            ticks_since_dirty as f32 * (self.config.sample_interval_ms as f32 / 1000.0);
        if secs_since_dirty < AUTO_SAVE_DEBOUNCE_S {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("config auto-saved");
                true
            }
            Err(e) => {
                warn!("config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;
    impl EventSink for NullSink {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    struct StaticSensors;
    impl SensorPort for StaticSensors {
        fn read_reading(&mut self) -> crate::telemetry::sample::SensorReading {
            crate::telemetry::sample::SensorReading {
                return_temp_c: 24.0,
                supply_temp_c: 19.0,
                fan_amps: 1.0,
                compressor_amps: 5.0,
                geo_pumps_amps: 0.7,
            }
        }
    }

    #[test]
    fn tick_records_and_counts() {
        let mut svc = MonitorService::new(MonitorConfig::default());
        let mut sensors = StaticSensors;
        let mut sink = NullSink;
        svc.tick(&mut sensors, &mut sink);
        assert_eq!(svc.tick_count(), 1);
        let latest = svc.latest_sample().unwrap();
        assert!((latest.delta_t - 5.0).abs() < 1e-4);
        assert_eq!(latest.alert_status, AlertStatus::None);
    }

    #[test]
    fn aggregation_waits_for_a_full_window() {
        let mut svc = MonitorService::new(MonitorConfig::default());
        let mut sensors = StaticSensors;
        let mut sink = NullSink;
        for _ in 0..SAMPLE_HISTORY_LEN - 1 {
            svc.tick(&mut sensors, &mut sink);
        }
        assert!(svc.latest_aggregate().is_none());
        svc.tick(&mut sensors, &mut sink);
        let agg = svc.latest_aggregate().unwrap();
        assert!((agg.avg_delta_t - 5.0).abs() < 1e-4);
    }
}
