//! Integration tests: MonitorService → telemetry core → sinks, via mock
//! ports only.

use std::cell::RefCell;

use hvacmon::app::commands::AppCommand;
use hvacmon::app::events::AppEvent;
use hvacmon::app::ports::{ConfigError, ConfigPort, EventSink, SensorPort};
use hvacmon::app::service::MonitorService;
use hvacmon::config::{MonitorConfig, SettingsPatch};
use hvacmon::telemetry::SAMPLE_HISTORY_LEN;
use hvacmon::telemetry::sample::{DISCONNECTED_TEMP_C, SensorReading};
use hvacmon::telemetry::status::{AlertStatus, ComponentStatus};

// ── Mock implementations ──────────────────────────────────────

/// Sensor port replaying a scripted sequence; repeats the last reading
/// once the script runs out.
struct ScriptedSensors {
    script: Vec<SensorReading>,
    cursor: usize,
}

impl ScriptedSensors {
    fn repeating(reading: SensorReading) -> Self {
        Self {
            script: vec![reading],
            cursor: 0,
        }
    }

    fn sequence(script: Vec<SensorReading>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl SensorPort for ScriptedSensors {
    fn read_reading(&mut self) -> SensorReading {
        let reading = self.script[self.cursor.min(self.script.len() - 1)];
        self.cursor += 1;
        reading
    }
}

/// Sink collecting every emitted event.
struct CollectingSink {
    events: Vec<AppEvent>,
}

impl CollectingSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn aggregates(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Aggregate(_)))
            .count()
    }

    fn raised(&self) -> Vec<AlertStatus> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::AlertRaised(a) => Some(*a),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

/// In-memory config port counting saves.
struct MockConfigStore {
    saved: RefCell<Option<MonitorConfig>>,
    save_calls: RefCell<u32>,
}

impl MockConfigStore {
    fn new() -> Self {
        Self {
            saved: RefCell::new(None),
            save_calls: RefCell::new(0),
        }
    }
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        Ok(self
            .saved
            .borrow()
            .clone()
            .unwrap_or_else(MonitorConfig::default))
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config
            .validate()
            .map_err(ConfigError::ValidationFailed)?;
        *self.saved.borrow_mut() = Some(config.clone());
        *self.save_calls.borrow_mut() += 1;
        Ok(())
    }

    fn reset(&self) -> Result<(), ConfigError> {
        *self.saved.borrow_mut() = None;
        Ok(())
    }
}

// ── Readings ──────────────────────────────────────────────────

fn normal_reading() -> SensorReading {
    SensorReading {
        return_temp_c: 24.0,
        supply_temp_c: 19.0,
        fan_amps: 1.2,
        compressor_amps: 6.0,
        geo_pumps_amps: 0.8,
    }
}

fn disconnected_reading() -> SensorReading {
    SensorReading {
        return_temp_c: DISCONNECTED_TEMP_C,
        ..normal_reading()
    }
}

// ── Orchestration ─────────────────────────────────────────────

#[test]
fn tick_emits_sample_with_alert_written_back() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sensors = ScriptedSensors::repeating(normal_reading());
    let mut sink = CollectingSink::new();

    svc.tick(&mut sensors, &mut sink);

    let sample = match &sink.events[..] {
        [AppEvent::Sample(s)] => *s,
        other => panic!("expected exactly one Sample event, got {} events", other.len()),
    };
    assert_eq!(sample.alert_status, AlertStatus::None);
    assert_eq!(sample.fan_status, ComponentStatus::On);
    // The retained copy carries the verdict too.
    assert_eq!(
        svc.latest_sample().unwrap().alert_status,
        AlertStatus::None
    );
}

#[test]
fn history_wraps_after_capacity_plus_one_ticks() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sink = CollectingSink::new();

    // First tick distinct, then uniform filler.
    let mut script = vec![SensorReading {
        return_temp_c: 99.0,
        ..normal_reading()
    }];
    script.resize(SAMPLE_HISTORY_LEN + 1, normal_reading());
    let mut sensors = ScriptedSensors::sequence(script);

    for _ in 0..SAMPLE_HISTORY_LEN + 1 {
        svc.tick(&mut sensors, &mut sink);
    }

    let temps: Vec<f32> = svc.samples().map(|s| s.return_temp_c).collect();
    assert_eq!(temps.len(), SAMPLE_HISTORY_LEN);
    // The marker sample was the oldest and got overwritten.
    assert!(temps.iter().all(|t| (*t - 24.0).abs() < 1e-6));
}

#[test]
fn aggregation_runs_once_per_full_window() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sensors = ScriptedSensors::repeating(normal_reading());
    let mut sink = CollectingSink::new();

    for _ in 0..SAMPLE_HISTORY_LEN * 2 {
        svc.tick(&mut sensors, &mut sink);
    }

    assert_eq!(sink.aggregates(), 2);
    let agg = svc.latest_aggregate().unwrap();
    assert!((agg.avg_delta_t - 5.0).abs() < 1e-4);
    assert_eq!(agg.last_fan_status, ComponentStatus::On);
    // Timestamp is tick-derived uptime: 120 ticks x 5000 ms.
    assert_eq!(agg.timestamp_ms, 120 * 5000);
}

#[test]
fn aggregate_history_keeps_oldest_first_order() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sensors = ScriptedSensors::repeating(normal_reading());
    let mut sink = CollectingSink::new();

    for _ in 0..SAMPLE_HISTORY_LEN * 3 {
        svc.tick(&mut sensors, &mut sink);
    }

    let stamps: Vec<u32> = svc.aggregates().map(|a| a.timestamp_ms).collect();
    assert_eq!(stamps, vec![300_000, 600_000, 900_000]);
}

// ── Alerts through the full cycle ─────────────────────────────

#[test]
fn sustained_disconnect_raises_then_clears() {
    // 30 s threshold at 5 s cadence: 6 disconnected samples trip it.
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sink = CollectingSink::new();
    let mut sensors = ScriptedSensors::repeating(disconnected_reading());

    for _ in 0..6 {
        svc.tick(&mut sensors, &mut sink);
    }
    assert_eq!(svc.active_alert(), AlertStatus::TempSensorDisconnected);
    assert_eq!(sink.raised(), vec![AlertStatus::TempSensorDisconnected]);
    assert_eq!(
        svc.latest_sample().unwrap().alert_status,
        AlertStatus::TempSensorDisconnected
    );

    // Probe comes back; the stale occurrences age out of the window as
    // it refills, and the alert clears once below the duration floor.
    let mut sensors = ScriptedSensors::repeating(normal_reading());
    for _ in 0..SAMPLE_HISTORY_LEN {
        svc.tick(&mut sensors, &mut sink);
    }
    assert_eq!(svc.active_alert(), AlertStatus::None);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::AlertCleared))
    );
}

#[test]
fn single_transient_fault_never_alerts() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sink = CollectingSink::new();

    let mut script = vec![normal_reading(); SAMPLE_HISTORY_LEN];
    script[10] = disconnected_reading();
    let mut sensors = ScriptedSensors::sequence(script);

    for _ in 0..SAMPLE_HISTORY_LEN {
        svc.tick(&mut sensors, &mut sink);
    }
    assert_eq!(svc.active_alert(), AlertStatus::None);
    assert!(sink.raised().is_empty());
}

#[test]
fn disconnect_outranks_simultaneous_low_delta_t() {
    // Compressor on, delta-T forced to zero by the dead probe, and the
    // probe itself disconnected: both conditions accumulate together.
    let mut config = MonitorConfig::default();
    config.low_delta_t_duration_s = 30;
    config.temp_sensor_disconnected_duration_s = 30;

    let mut svc = MonitorService::new(config);
    let mut sink = CollectingSink::new();
    let mut sensors = ScriptedSensors::repeating(disconnected_reading());

    for _ in 0..10 {
        svc.tick(&mut sensors, &mut sink);
    }
    assert_eq!(svc.active_alert(), AlertStatus::TempSensorDisconnected);
    assert_eq!(sink.raised(), vec![AlertStatus::TempSensorDisconnected]);
}

#[test]
fn raise_is_edge_triggered_not_repeated() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sink = CollectingSink::new();
    let mut sensors = ScriptedSensors::repeating(disconnected_reading());

    for _ in 0..20 {
        svc.tick(&mut sensors, &mut sink);
    }
    // One raise despite 14 further alerting ticks.
    assert_eq!(sink.raised().len(), 1);
}

// ── Commands and persistence ──────────────────────────────────

#[test]
fn settings_patch_applies_and_auto_saves() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let store = MockConfigStore::new();
    let mut sensors = ScriptedSensors::repeating(normal_reading());
    let mut sink = CollectingSink::new();

    let patch = SettingsPatch {
        no_airflow_duration_s: Some(120),
        ..SettingsPatch::default()
    };
    svc.handle_command(AppCommand::ApplySettings(patch), &store)
        .unwrap();
    assert!(svc.is_config_dirty());
    assert_eq!(svc.current_config().no_airflow_duration_s, 120);

    // Debounce: nothing saved immediately.
    assert!(!svc.auto_save_if_needed(&store));

    // One tick (5 s) later the debounce window has elapsed.
    svc.tick(&mut sensors, &mut sink);
    assert!(svc.auto_save_if_needed(&store));
    assert!(!svc.is_config_dirty());
    assert_eq!(store.load().unwrap().no_airflow_duration_s, 120);
    assert_eq!(*store.save_calls.borrow(), 1);
}

#[test]
fn invalid_patch_is_rejected_whole() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let store = MockConfigStore::new();

    let patch = SettingsPatch {
        low_delta_t_threshold_c: Some(5.0),
        temp_sensor_disconnected_duration_s: Some(9999),
        ..SettingsPatch::default()
    };
    let err = svc
        .handle_command(AppCommand::ApplySettings(patch), &store)
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed(_)));
    // The valid field must not have leaked through.
    assert!((svc.current_config().low_delta_t_threshold_c - 2.0).abs() < 1e-6);
    assert!(!svc.is_config_dirty());
}

#[test]
fn factory_reset_restores_defaults() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let store = MockConfigStore::new();

    let patch = SettingsPatch {
        low_delta_t_duration_s: Some(600),
        ..SettingsPatch::default()
    };
    svc.handle_command(AppCommand::ApplySettings(patch), &store)
        .unwrap();
    svc.handle_command(AppCommand::SaveConfig, &store).unwrap();
    assert_eq!(store.load().unwrap().low_delta_t_duration_s, 600);

    svc.handle_command(AppCommand::FactoryReset, &store).unwrap();
    assert_eq!(
        svc.current_config().low_delta_t_duration_s,
        MonitorConfig::default().low_delta_t_duration_s
    );
    assert_eq!(
        store.load().unwrap().low_delta_t_duration_s,
        MonitorConfig::default().low_delta_t_duration_s
    );
}

// ── History payloads over the query surface ───────────────────

#[test]
fn history_payload_reflects_service_state() {
    let mut svc = MonitorService::new(MonitorConfig::default());
    let mut sensors = ScriptedSensors::repeating(normal_reading());
    let mut sink = CollectingSink::new();

    for _ in 0..5 {
        svc.tick(&mut sensors, &mut sink);
    }

    let v = hvacmon::payload::history_payload(svc.samples());
    assert_eq!(v["history"].as_array().unwrap().len(), 5);

    let latest = svc.latest_sample().unwrap();
    let v = hvacmon::payload::sample_payload(latest, "test");
    assert_eq!(v["alertStatus"], "NONE");
}
