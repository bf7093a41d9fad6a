//! Discrete status enumerations shared across the telemetry pipeline.
//!
//! The variant sets are closed, so external reporting uses exhaustive
//! `as_str()` matches rather than trait objects.

/// On/off state of a current-monitored component (fan, compressor, pumps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentStatus {
    #[default]
    Off,
    On,
    /// The current reading was not-a-number (CT clamp unreadable).
    Unknown,
}

impl ComponentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Airflow state. There is no physical airflow sensor; `Ok` is a proxy
/// for "the fan is running".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AirflowStatus {
    #[default]
    Na,
    Ok,
}

impl AirflowStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Na => "N/A",
            Self::Ok => "OK",
        }
    }
}

/// Active operational alert, at most one at a time.
///
/// Ordering reflects severity: a disconnected temperature sensor
/// invalidates delta-T inference, so it masks the lower alerts when
/// several conditions hold simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertStatus {
    #[default]
    None,
    FanNoAirflow,
    LowDeltaT,
    TempSensorDisconnected,
}

impl AlertStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::FanNoAirflow => "FAN_NO_AIRFLOW",
            Self::LowDeltaT => "LOW_DELTA_T",
            Self::TempSensorDisconnected => "TEMP_SENSOR_DISCONNECTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_strings_are_stable() {
        // These strings are part of the MQTT/web payload contract.
        assert_eq!(AlertStatus::None.as_str(), "NONE");
        assert_eq!(AlertStatus::FanNoAirflow.as_str(), "FAN_NO_AIRFLOW");
        assert_eq!(AlertStatus::LowDeltaT.as_str(), "LOW_DELTA_T");
        assert_eq!(
            AlertStatus::TempSensorDisconnected.as_str(),
            "TEMP_SENSOR_DISCONNECTED"
        );
    }

    #[test]
    fn component_defaults_to_off() {
        assert_eq!(ComponentStatus::default(), ComponentStatus::Off);
        assert_eq!(AirflowStatus::default(), AirflowStatus::Na);
    }
}
