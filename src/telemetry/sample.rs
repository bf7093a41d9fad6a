//! Per-cycle telemetry snapshot and its derivation from raw sensor values.

use super::status::{AirflowStatus, AlertStatus, ComponentStatus};

/// Sentinel reported by the DS18B20 driver when a probe is disconnected
/// or the scratchpad CRC fails.
pub const DISCONNECTED_TEMP_C: f32 = -127.0;

/// Raw values as they come off the hardware, before any interpretation.
///
/// Always fully populated: a failed temperature read carries the
/// [`DISCONNECTED_TEMP_C`] sentinel and a failed current read carries NaN.
/// A degraded reading never aborts the cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorReading {
    pub return_temp_c: f32,
    pub supply_temp_c: f32,
    pub fan_amps: f64,
    pub compressor_amps: f64,
    pub geo_pumps_amps: f64,
}

/// One cycle's derived telemetry.
#[derive(Debug, Clone, Copy)]
pub struct TelemetrySample {
    pub return_temp_c: f32,
    pub supply_temp_c: f32,
    /// `return - supply` (cooling convention); `0.0` when either probe
    /// reads the disconnected sentinel.
    pub delta_t: f32,
    pub fan_amps: f64,
    pub compressor_amps: f64,
    pub geo_pumps_amps: f64,
    pub fan_status: ComponentStatus,
    pub compressor_status: ComponentStatus,
    pub geo_pumps_status: ComponentStatus,
    pub airflow_status: AirflowStatus,
    /// Written by the orchestrator after the alert scan, never here.
    pub alert_status: AlertStatus,
}

impl TelemetrySample {
    /// Derive a sample from a raw reading.
    ///
    /// `amps_on_threshold` is the RMS current above which a component is
    /// considered running.
    pub fn derive(reading: &SensorReading, amps_on_threshold: f32) -> Self {
        let return_temp_c = reading.return_temp_c;
        let supply_temp_c = reading.supply_temp_c;

        let delta_t = if is_disconnected(return_temp_c) || is_disconnected(supply_temp_c) {
            0.0
        } else {
            return_temp_c - supply_temp_c
        };

        let fan_status = component_status(reading.fan_amps, amps_on_threshold);
        let airflow_status = if fan_status == ComponentStatus::On {
            AirflowStatus::Ok
        } else {
            AirflowStatus::Na
        };

        Self {
            return_temp_c,
            supply_temp_c,
            delta_t,
            fan_amps: reading.fan_amps,
            compressor_amps: reading.compressor_amps,
            geo_pumps_amps: reading.geo_pumps_amps,
            fan_status,
            compressor_status: component_status(reading.compressor_amps, amps_on_threshold),
            geo_pumps_status: component_status(reading.geo_pumps_amps, amps_on_threshold),
            airflow_status,
            alert_status: AlertStatus::None,
        }
    }

    /// True when either air probe reads the disconnected sentinel.
    pub fn temp_sensor_disconnected(&self) -> bool {
        is_disconnected(self.return_temp_c) || is_disconnected(self.supply_temp_c)
    }
}

// Sentinel comparison is exact by contract: the driver emits the literal
// -127.0, never a computed value near it.
#[allow(clippy::float_cmp)]
fn is_disconnected(temp_c: f32) -> bool {
    temp_c == DISCONNECTED_TEMP_C
}

fn component_status(amps: f64, threshold: f32) -> ComponentStatus {
    if amps.is_nan() {
        ComponentStatus::Unknown
    } else if amps > f64::from(threshold) {
        ComponentStatus::On
    } else {
        ComponentStatus::Off
    }
}
