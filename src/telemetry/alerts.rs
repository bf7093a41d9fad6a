//! Duration-based fault detection over the sample window.
//!
//! Each scan counts how many retained samples exhibit a fault condition
//! and treats `count x sample_interval` as the condition's accumulated
//! duration. Occurrences scattered through the window therefore count the
//! same as a contiguous run; this matches the deployed behaviour and is
//! kept deliberately (a contiguous-streak tracker would change alert
//! timing in the field).

use crate::config::MonitorConfig;

use super::history::History;
use super::sample::TelemetrySample;
use super::status::{AirflowStatus, AlertStatus, ComponentStatus};

/// Scan the window and return the highest-priority sustained fault.
///
/// Priority is fixed: a disconnected temperature sensor masks the
/// delta-T-derived alerts (its data would be meaningless), and a
/// no-airflow fan masks low delta-T. Infallible and idempotent; the scan
/// holds no state between calls.
pub fn scan<const N: usize>(
    history: &History<TelemetrySample, N>,
    config: &MonitorConfig,
) -> AlertStatus {
    let mut temp_disconnected_count = 0u32;
    let mut fan_no_airflow_count = 0u32;
    let mut low_delta_t_count = 0u32;

    for sample in history.iter() {
        if sample.temp_sensor_disconnected() {
            temp_disconnected_count += 1;
        }

        if sample.fan_status == ComponentStatus::On
            && sample.airflow_status == AirflowStatus::Na
        {
            fan_no_airflow_count += 1;
        }

        if sample.compressor_status == ComponentStatus::On
            && sample.delta_t < config.low_delta_t_threshold_c
        {
            low_delta_t_count += 1;
        }
    }

    let interval_s = config.sample_interval_ms as f32 / 1000.0;
    let duration_s = |count: u32| count as f32 * interval_s;

    if duration_s(temp_disconnected_count) >= config.temp_sensor_disconnected_duration_s as f32 {
        return AlertStatus::TempSensorDisconnected;
    }

    if duration_s(fan_no_airflow_count) >= config.no_airflow_duration_s as f32 {
        return AlertStatus::FanNoAirflow;
    }

    if duration_s(low_delta_t_count) >= config.low_delta_t_duration_s as f32 {
        return AlertStatus::LowDeltaT;
    }

    AlertStatus::None
}
