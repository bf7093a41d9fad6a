//! Window aggregation: compress a full sample window into one summary.

use super::history::History;
use super::sample::TelemetrySample;
use super::status::ComponentStatus;

/// Window-level summary: numeric means plus last-known component states.
#[derive(Debug, Clone, Copy)]
pub struct AggregateSample {
    /// Uptime milliseconds at aggregation, stamped by the orchestrator.
    pub timestamp_ms: u32,
    pub avg_return_temp_c: f32,
    pub avg_supply_temp_c: f32,
    pub avg_delta_t: f32,
    pub avg_fan_amps: f64,
    pub avg_compressor_amps: f64,
    pub avg_geo_pumps_amps: f64,
    pub last_fan_status: ComponentStatus,
    pub last_compressor_status: ComponentStatus,
    pub last_geo_pumps_status: ComponentStatus,
}

/// Reduce the current window to a single summary.
///
/// Numeric fields are the mean over written slots; an empty window yields
/// zeroes rather than dividing by zero. Component statuses come verbatim
/// from `most_recent`, regardless of buffer contents: statuses are
/// discrete and only the latest is meaningful.
///
/// `timestamp_ms` is left at zero; stamping it is the caller's concern,
/// since it reflects time at the moment of aggregation.
///
/// Pure function: deterministic, no side effects.
pub fn summarize<const N: usize>(
    history: &History<TelemetrySample, N>,
    most_recent: &TelemetrySample,
) -> AggregateSample {
    let mut sum_return_temp = 0.0f64;
    let mut sum_supply_temp = 0.0f64;
    let mut sum_delta_t = 0.0f64;
    let mut sum_fan_amps = 0.0f64;
    let mut sum_compressor_amps = 0.0f64;
    let mut sum_geo_pumps_amps = 0.0f64;
    let mut valid = 0usize;

    for sample in history.iter() {
        valid += 1;
        sum_return_temp += f64::from(sample.return_temp_c);
        sum_supply_temp += f64::from(sample.supply_temp_c);
        sum_delta_t += f64::from(sample.delta_t);
        sum_fan_amps += sample.fan_amps;
        sum_compressor_amps += sample.compressor_amps;
        sum_geo_pumps_amps += sample.geo_pumps_amps;
    }

    let mut result = AggregateSample {
        timestamp_ms: 0,
        avg_return_temp_c: 0.0,
        avg_supply_temp_c: 0.0,
        avg_delta_t: 0.0,
        avg_fan_amps: 0.0,
        avg_compressor_amps: 0.0,
        avg_geo_pumps_amps: 0.0,
        last_fan_status: most_recent.fan_status,
        last_compressor_status: most_recent.compressor_status,
        last_geo_pumps_status: most_recent.geo_pumps_status,
    };

    if valid > 0 {
        let n = valid as f64;
        result.avg_return_temp_c = (sum_return_temp / n) as f32;
        result.avg_supply_temp_c = (sum_supply_temp / n) as f32;
        result.avg_delta_t = (sum_delta_t / n) as f32;
        result.avg_fan_amps = sum_fan_amps / n;
        result.avg_compressor_amps = sum_compressor_amps / n;
        result.avg_geo_pumps_amps = sum_geo_pumps_amps / n;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::sample::SensorReading;

    fn sample(return_temp: f32, supply_temp: f32, fan_amps: f64) -> TelemetrySample {
        TelemetrySample::derive(
            &SensorReading {
                return_temp_c: return_temp,
                supply_temp_c: supply_temp,
                fan_amps,
                compressor_amps: 0.0,
                geo_pumps_amps: 0.0,
            },
            0.5,
        )
    }

    #[test]
    fn empty_window_yields_zeroes() {
        let h: History<TelemetrySample, 8> = History::new();
        let latest = sample(20.0, 15.0, 1.0);
        let agg = summarize(&h, &latest);
        assert_eq!(agg.avg_return_temp_c, 0.0);
        assert_eq!(agg.avg_supply_temp_c, 0.0);
        assert_eq!(agg.avg_delta_t, 0.0);
        assert_eq!(agg.avg_fan_amps, 0.0);
        assert!(!agg.avg_return_temp_c.is_nan());
    }

    #[test]
    fn means_over_written_slots_only() {
        let mut h: History<TelemetrySample, 8> = History::new();
        h.record(sample(20.0, 15.0, 1.0));
        h.record(sample(30.0, 25.0, 3.0));
        let latest = sample(30.0, 25.0, 3.0);
        let agg = summarize(&h, &latest);
        assert!((agg.avg_return_temp_c - 25.0).abs() < 1e-4);
        assert!((agg.avg_supply_temp_c - 20.0).abs() < 1e-4);
        assert!((agg.avg_delta_t - 5.0).abs() < 1e-4);
        assert!((agg.avg_fan_amps - 2.0).abs() < 1e-9);
    }

    #[test]
    fn statuses_come_from_most_recent_not_the_window() {
        let mut h: History<TelemetrySample, 4> = History::new();
        // Window full of fan-off samples.
        for _ in 0..4 {
            h.record(sample(20.0, 15.0, 0.0));
        }
        // But the latest reading has the fan on.
        let latest = sample(20.0, 15.0, 2.0);
        let agg = summarize(&h, &latest);
        assert_eq!(agg.last_fan_status, ComponentStatus::On);
    }

    #[test]
    fn timestamp_left_for_caller() {
        let h: History<TelemetrySample, 4> = History::new();
        let agg = summarize(&h, &sample(20.0, 15.0, 0.0));
        assert_eq!(agg.timestamp_ms, 0);
    }
}
