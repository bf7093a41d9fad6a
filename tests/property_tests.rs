//! Property tests for the telemetry core data structures.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32
//! targets. On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use hvacmon::config::{MonitorConfig, SettingsPatch};
use hvacmon::telemetry::aggregate::summarize;
use hvacmon::telemetry::alerts::scan;
use hvacmon::telemetry::history::History;
use hvacmon::telemetry::sample::{SensorReading, TelemetrySample};
use proptest::prelude::*;

// ── History invariants ────────────────────────────────────────

proptest! {
    /// After writing any sequence, the buffer holds the most recent
    /// `min(k, N)` values in insertion order.
    #[test]
    fn history_retains_most_recent_suffix(
        values in proptest::collection::vec(any::<u32>(), 0..=40),
    ) {
        const N: usize = 8;
        let mut h: History<u32, N> = History::new();
        for &v in &values {
            h.record(v);
        }

        let kept: Vec<u32> = h.iter().copied().collect();
        let expect_len = values.len().min(N);
        prop_assert_eq!(kept.len(), expect_len);
        prop_assert_eq!(h.len(), expect_len);
        prop_assert_eq!(&kept[..], &values[values.len() - expect_len..]);

        match values.last() {
            Some(last) => prop_assert_eq!(h.latest(), Some(last)),
            None => prop_assert!(h.latest().is_none()),
        }
    }
}

// ── Aggregation bounds ────────────────────────────────────────

fn arb_reading() -> impl Strategy<Value = SensorReading> {
    (
        -40.0f32..60.0,
        -40.0f32..60.0,
        0.0f64..30.0,
        0.0f64..30.0,
        0.0f64..30.0,
    )
        .prop_map(|(ret, sup, fan, comp, pumps)| SensorReading {
            return_temp_c: ret,
            supply_temp_c: sup,
            fan_amps: fan,
            compressor_amps: comp,
            geo_pumps_amps: pumps,
        })
}

proptest! {
    /// The aggregate mean of every numeric field stays within the
    /// min/max of the contributing samples (or is zero when empty).
    #[test]
    fn aggregate_means_stay_in_bounds(
        readings in proptest::collection::vec(arb_reading(), 1..=16),
    ) {
        let mut h: History<TelemetrySample, 16> = History::new();
        for r in &readings {
            h.record(TelemetrySample::derive(r, 0.5));
        }
        let latest = *h.latest().unwrap();
        let agg = summarize(&h, &latest);

        let rets: Vec<f32> = h.iter().map(|s| s.return_temp_c).collect();
        let lo = rets.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = rets.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        prop_assert!(agg.avg_return_temp_c >= lo - 1e-3);
        prop_assert!(agg.avg_return_temp_c <= hi + 1e-3);

        let fans: Vec<f64> = h.iter().map(|s| s.fan_amps).collect();
        let lo = fans.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = fans.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(agg.avg_fan_amps >= lo - 1e-9);
        prop_assert!(agg.avg_fan_amps <= hi + 1e-9);
    }

    /// Status passthrough holds for arbitrary windows.
    #[test]
    fn aggregate_statuses_track_most_recent(
        readings in proptest::collection::vec(arb_reading(), 1..=16),
        latest in arb_reading(),
    ) {
        let mut h: History<TelemetrySample, 16> = History::new();
        for r in &readings {
            h.record(TelemetrySample::derive(r, 0.5));
        }
        let latest = TelemetrySample::derive(&latest, 0.5);
        let agg = summarize(&h, &latest);
        prop_assert_eq!(agg.last_fan_status, latest.fan_status);
        prop_assert_eq!(agg.last_compressor_status, latest.compressor_status);
        prop_assert_eq!(agg.last_geo_pumps_status, latest.geo_pumps_status);
    }
}

// ── Alert scan determinism ────────────────────────────────────

proptest! {
    /// Scanning the same unmodified window twice gives the same verdict.
    #[test]
    fn scan_is_pure(
        readings in proptest::collection::vec(arb_reading(), 0..=60),
    ) {
        let mut h: History<TelemetrySample, 60> = History::new();
        for r in &readings {
            h.record(TelemetrySample::derive(r, 0.5));
        }
        let config = MonitorConfig::default();
        prop_assert_eq!(scan(&h, &config), scan(&h, &config));
    }
}

// ── Settings validation soundness ─────────────────────────────

fn arb_patch() -> impl Strategy<Value = SettingsPatch> {
    (
        proptest::option::of(-5.0f32..30.0),
        proptest::option::of(0u32..5000),
        proptest::option::of(0u32..5000),
        proptest::option::of(0u32..5000),
    )
        .prop_map(|(thresh, low_dt, airflow, disconnect)| SettingsPatch {
            low_delta_t_threshold_c: thresh,
            low_delta_t_duration_s: low_dt,
            no_airflow_duration_s: airflow,
            temp_sensor_disconnected_duration_s: disconnect,
        })
}

proptest! {
    /// A patch either fails atomically (config unchanged) or leaves the
    /// config fully valid.
    #[test]
    fn patch_application_is_atomic_and_sound(patch in arb_patch()) {
        let mut config = MonitorConfig::default();
        let before = config.clone();
        match config.apply_patch(&patch) {
            Ok(()) => prop_assert!(config.validate().is_ok()),
            Err(_) => {
                prop_assert_eq!(
                    serde_json::to_string(&config).unwrap(),
                    serde_json::to_string(&before).unwrap()
                );
            }
        }
    }
}
