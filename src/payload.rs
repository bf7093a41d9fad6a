//! JSON payload builders for the publication and history surfaces.
//!
//! Key names are the wire contract shared with the dashboard and the MQTT
//! consumers; change them only together with those. Float NaN serialises
//! as JSON `null`, which consumers treat as "no reading".

use serde_json::{Value, json};

use crate::config::MonitorConfig;
use crate::telemetry::aggregate::AggregateSample;
use crate::telemetry::sample::TelemetrySample;

/// Latest-sample payload (`/api/data`, per-tick MQTT publish).
pub fn sample_payload(sample: &TelemetrySample, version: &str) -> Value {
    json!({
        "firmwareVersion": version,
        "returnTempC": sample.return_temp_c,
        "supplyTempC": sample.supply_temp_c,
        "deltaT": sample.delta_t,
        "fanAmps": sample.fan_amps,
        "compressorAmps": sample.compressor_amps,
        "geoPumpsAmps": sample.geo_pumps_amps,
        "fanStatus": sample.fan_status.as_str(),
        "compressorStatus": sample.compressor_status.as_str(),
        "geoPumpsStatus": sample.geo_pumps_status.as_str(),
        "airflowStatus": sample.airflow_status.as_str(),
        "alertStatus": sample.alert_status.as_str(),
    })
}

/// Window-summary payload (periodic MQTT publish).
pub fn aggregate_payload(agg: &AggregateSample, version: &str) -> Value {
    json!({
        "firmwareVersion": version,
        "timestamp": agg.timestamp_ms,
        "avgReturnTempC": agg.avg_return_temp_c,
        "avgSupplyTempC": agg.avg_supply_temp_c,
        "avgDeltaT": agg.avg_delta_t,
        "avgFanAmps": agg.avg_fan_amps,
        "avgCompressorAmps": agg.avg_compressor_amps,
        "avgGeoPumpsAmps": agg.avg_geo_pumps_amps,
        "lastFanStatus": agg.last_fan_status.as_str(),
        "lastCompressorStatus": agg.last_compressor_status.as_str(),
        "lastGeoPumpsStatus": agg.last_geo_pumps_status.as_str(),
    })
}

/// Oldest-first sample history (`/api/history`).
pub fn history_payload<'a>(samples: impl Iterator<Item = &'a TelemetrySample>) -> Value {
    let entries: Vec<Value> = samples
        .map(|s| {
            json!({
                "returnTempC": s.return_temp_c,
                "supplyTempC": s.supply_temp_c,
                "deltaT": s.delta_t,
                "fanAmps": s.fan_amps,
                "compressorAmps": s.compressor_amps,
                "geoPumpsAmps": s.geo_pumps_amps,
                "alertStatus": s.alert_status.as_str(),
            })
        })
        .collect();
    json!({ "history": entries })
}

/// Oldest-first aggregate history (`/api/aggregated_history`).
pub fn aggregate_history_payload<'a>(
    aggregates: impl Iterator<Item = &'a AggregateSample>,
) -> Value {
    let entries: Vec<Value> = aggregates
        .map(|a| {
            json!({
                "timestamp": a.timestamp_ms,
                "avgReturnTempC": a.avg_return_temp_c,
                "avgSupplyTempC": a.avg_supply_temp_c,
                "avgDeltaT": a.avg_delta_t,
                "avgFanAmps": a.avg_fan_amps,
                "avgCompressorAmps": a.avg_compressor_amps,
                "avgGeoPumpsAmps": a.avg_geo_pumps_amps,
            })
        })
        .collect();
    json!({ "history": entries })
}

/// Runtime-adjustable settings read-back (`/api/settings`).
pub fn settings_payload(config: &MonitorConfig) -> Value {
    json!({
        "lowDeltaTThresholdC": config.low_delta_t_threshold_c,
        "lowDeltaTDurationS": config.low_delta_t_duration_s,
        "noAirflowDurationS": config.no_airflow_duration_s,
        "tempSensorDisconnectedDurationS": config.temp_sensor_disconnected_duration_s,
    })
}
