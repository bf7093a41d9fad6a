//! System configuration parameters
//!
//! All tunable parameters for the HVAC monitor. Values can be overridden
//! at runtime through the settings API and persisted via the config store.

use serde::{Deserialize, Serialize};

/// Core monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Sensing ---
    /// RMS current (A) above which a component counts as running
    pub amps_on_threshold: f32,
    /// CT clamp calibration ratio (turns ratio / burden)
    pub ct_calibration: f32,
    /// ADC conversions per RMS computation
    pub adc_samples: u32,
    /// Sampling cadence (milliseconds)
    pub sample_interval_ms: u32,

    // --- Alert thresholds ---
    /// Delta-T (degrees C) below which cooling counts as ineffective
    pub low_delta_t_threshold_c: f32,
    /// Seconds of accumulated low delta-T before alerting
    pub low_delta_t_duration_s: u32,
    /// Seconds of accumulated fan-on-without-airflow before alerting
    pub no_airflow_duration_s: u32,
    /// Seconds of accumulated probe disconnect before alerting
    pub temp_sensor_disconnected_duration_s: u32,

    // --- Publication ---
    /// Minimum spacing between MQTT reconnect attempts (milliseconds)
    pub mqtt_reconnect_interval_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // Sensing
            amps_on_threshold: 0.5,
            ct_calibration: 60.606,
            adc_samples: 1480,
            sample_interval_ms: 5000, // 0.2 Hz

            // Alert thresholds
            low_delta_t_threshold_c: 2.0,
            low_delta_t_duration_s: 300,
            no_airflow_duration_s: 60,
            temp_sensor_disconnected_duration_s: 30,

            // Publication
            mqtt_reconnect_interval_ms: 5000,
        }
    }
}

impl MonitorConfig {
    /// Full-config range check, run by the config store before persisting.
    /// Invalid values are rejected, never silently clamped.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(0.05..=10.0).contains(&self.amps_on_threshold) {
            return Err("amps_on_threshold must be 0.05-10.0");
        }
        if !(1.0..=200.0).contains(&self.ct_calibration) {
            return Err("ct_calibration must be 1.0-200.0");
        }
        if !(100..=10_000).contains(&self.adc_samples) {
            return Err("adc_samples must be 100-10000");
        }
        if !(1000..=60_000).contains(&self.sample_interval_ms) {
            return Err("sample_interval_ms must be 1000-60000");
        }
        validate_delta_t_threshold(self.low_delta_t_threshold_c)?;
        validate_duration(self.low_delta_t_duration_s)?;
        validate_duration(self.no_airflow_duration_s)?;
        validate_duration(self.temp_sensor_disconnected_duration_s)?;
        if !(1000..=60_000).contains(&self.mqtt_reconnect_interval_ms) {
            return Err("mqtt_reconnect_interval_ms must be 1000-60000");
        }
        Ok(())
    }

    /// Validate and apply a partial settings update.
    ///
    /// All present fields are checked before any of them is applied, so a
    /// rejected patch leaves the configuration untouched.
    pub fn apply_patch(&mut self, patch: &SettingsPatch) -> Result<(), &'static str> {
        if let Some(v) = patch.low_delta_t_threshold_c {
            validate_delta_t_threshold(v)?;
        }
        if let Some(v) = patch.low_delta_t_duration_s {
            validate_duration(v)?;
        }
        if let Some(v) = patch.no_airflow_duration_s {
            validate_duration(v)?;
        }
        if let Some(v) = patch.temp_sensor_disconnected_duration_s {
            validate_duration(v)?;
        }

        if let Some(v) = patch.low_delta_t_threshold_c {
            self.low_delta_t_threshold_c = v;
        }
        if let Some(v) = patch.low_delta_t_duration_s {
            self.low_delta_t_duration_s = v;
        }
        if let Some(v) = patch.no_airflow_duration_s {
            self.no_airflow_duration_s = v;
        }
        if let Some(v) = patch.temp_sensor_disconnected_duration_s {
            self.temp_sensor_disconnected_duration_s = v;
        }
        Ok(())
    }
}

fn validate_delta_t_threshold(v: f32) -> Result<(), &'static str> {
    if (0.0..=20.0).contains(&v) {
        Ok(())
    } else {
        Err("delta-T threshold must be 0.0-20.0 degrees C")
    }
}

fn validate_duration(v: u32) -> Result<(), &'static str> {
    if (10..=3600).contains(&v) {
        Ok(())
    } else {
        Err("duration thresholds must be 10-3600 seconds")
    }
}

/// Partial settings update as submitted by the web settings endpoint.
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub low_delta_t_threshold_c: Option<f32>,
    pub low_delta_t_duration_s: Option<u32>,
    pub no_airflow_duration_s: Option<u32>,
    pub temp_sensor_disconnected_duration_s: Option<u32>,
}
