//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production). The MQTT adapter implements
//! the same trait; production runs both behind a `TeeSink`.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Sample(s) => {
                info!(
                    "SAMPLE | Ret={:.1}C Sup={:.1}C dT={:.1}C | Fan={:.2}A Comp={:.2}A Pumps={:.2}A | \
                     fan={} comp={} pumps={} airflow={} | alert={}",
                    s.return_temp_c,
                    s.supply_temp_c,
                    s.delta_t,
                    s.fan_amps,
                    s.compressor_amps,
                    s.geo_pumps_amps,
                    s.fan_status.as_str(),
                    s.compressor_status.as_str(),
                    s.geo_pumps_status.as_str(),
                    s.airflow_status.as_str(),
                    s.alert_status.as_str(),
                );
            }
            AppEvent::Aggregate(a) => {
                info!(
                    "AGG    | t={}ms | avgRet={:.1}C avgSup={:.1}C avgDT={:.2}C | \
                     avgFan={:.2}A avgComp={:.2}A avgPumps={:.2}A",
                    a.timestamp_ms,
                    a.avg_return_temp_c,
                    a.avg_supply_temp_c,
                    a.avg_delta_t,
                    a.avg_fan_amps,
                    a.avg_compressor_amps,
                    a.avg_geo_pumps_amps,
                );
            }
            AppEvent::AlertRaised(alert) => {
                warn!("ALERT  | raised: {}", alert.as_str());
            }
            AppEvent::AlertCleared => {
                info!("ALERT  | cleared");
            }
            AppEvent::Started => {
                info!("START  | monitor service running");
            }
        }
    }
}
