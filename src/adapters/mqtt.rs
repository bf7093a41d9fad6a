//! MQTT publication adapter.
//!
//! Implements [`EventSink`] by serialising samples and window summaries
//! to JSON and publishing them under a topic root. Connection handling is
//! deliberately forgiving: when the broker is unreachable, payloads are
//! dropped with a paced warning and the monitor keeps running; reconnect
//! attempts are rate-limited so a dead link cannot stall the read cycle.
//!
//! The transport itself sits behind [`MqttTransport`], so the publisher
//! logic is host-testable with a mock; the ESP-IDF client lives at the
//! bottom of this file.

use log::{debug, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::CommsError;

use super::time::MonotonicClock;

// ───────────────────────────────────────────────────────────────
// Transport trait
// ───────────────────────────────────────────────────────────────

/// Minimal broker-facing surface the publisher needs.
pub trait MqttTransport {
    fn connected(&self) -> bool;

    /// Kick off a (re)connection attempt. Non-blocking; success shows up
    /// through `connected()` on a later call.
    fn connect(&mut self) -> Result<(), CommsError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Publisher
// ───────────────────────────────────────────────────────────────

/// Event sink publishing telemetry and summaries over MQTT.
pub struct MqttPublisher<T: MqttTransport> {
    transport: T,
    topic_root: String,
    firmware_version: &'static str,
    clock: MonotonicClock,
    reconnect_interval_ms: u64,
    last_connect_attempt_ms: Option<u64>,
}

impl<T: MqttTransport> MqttPublisher<T> {
    pub fn new(
        transport: T,
        topic_root: &str,
        firmware_version: &'static str,
        reconnect_interval_ms: u32,
    ) -> Self {
        Self {
            transport,
            topic_root: topic_root.to_owned(),
            firmware_version,
            clock: MonotonicClock::new(),
            reconnect_interval_ms: u64::from(reconnect_interval_ms),
            last_connect_attempt_ms: None,
        }
    }

    /// True when the underlying transport reports a live session.
    pub fn connected(&self) -> bool {
        self.transport.connected()
    }

    fn ensure_connected(&mut self) -> bool {
        if self.transport.connected() {
            return true;
        }
        let now = self.clock.uptime_ms();
        let due = match self.last_connect_attempt_ms {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.reconnect_interval_ms,
        };
        if due {
            self.last_connect_attempt_ms = Some(now);
            debug!("[MQTT] attempting broker connection");
            if let Err(e) = self.transport.connect() {
                warn!("[MQTT] connect failed: {}", e);
            }
        }
        self.transport.connected()
    }

    fn publish_json(&mut self, subtopic: &str, value: &serde_json::Value) {
        if !self.ensure_connected() {
            debug!("[MQTT] not connected, dropping {} payload", subtopic);
            return;
        }

        let payload = match serde_json::to_vec(value) {
            Ok(p) => p,
            Err(e) => {
                warn!("[MQTT] JSON serialisation failed: {}", e);
                return;
            }
        };

        let topic = format!("{}/{}", self.topic_root, subtopic);
        if let Err(e) = self.transport.publish(&topic, &payload) {
            warn!("[MQTT] publish to {} failed: {}", topic, e);
        }
    }
}

impl<T: MqttTransport> EventSink for MqttPublisher<T> {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Sample(s) => {
                let value = crate::payload::sample_payload(s, self.firmware_version);
                self.publish_json("telemetry", &value);
            }
            AppEvent::Aggregate(a) => {
                let value = crate::payload::aggregate_payload(a, self.firmware_version);
                self.publish_json("aggregate", &value);
            }
            // Alert transitions are already carried inside every sample
            // payload; the log sink narrates the edges.
            AppEvent::AlertRaised(_) | AppEvent::AlertCleared | AppEvent::Started => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF transport
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp_transport::EspMqttTransport;

#[cfg(target_os = "espidf")]
mod esp_transport {
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

    use super::MqttTransport;
    use crate::error::CommsError;

    /// Transport backed by the ESP-IDF MQTT client. The client reconnects
    /// on its own; `connect()` is therefore a no-op and the session state
    /// is tracked from the event callback.
    pub struct EspMqttTransport {
        client: EspMqttClient<'static>,
        connected: Arc<AtomicBool>,
    }

    impl EspMqttTransport {
        pub fn new(broker_url: &str, client_id: &str) -> Result<Self, esp_idf_svc::sys::EspError> {
            let connected = Arc::new(AtomicBool::new(false));
            let flag = connected.clone();

            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                ..Default::default()
            };

            let client = EspMqttClient::new_cb(broker_url, &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => {
                        log::info!("[MQTT] connected");
                        flag.store(true, Ordering::Release);
                    }
                    EventPayload::Disconnected => {
                        log::warn!("[MQTT] disconnected");
                        flag.store(false, Ordering::Release);
                    }
                    _ => {}
                }
            })?;

            Ok(Self { client, connected })
        }
    }

    impl MqttTransport for EspMqttTransport {
        fn connected(&self) -> bool {
            self.connected.load(Ordering::Acquire)
        }

        fn connect(&mut self) -> Result<(), CommsError> {
            // The ESP-IDF client owns the reconnect loop.
            Ok(())
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
            self.client
                .publish(topic, QoS::AtLeastOnce, false, payload)
                .map(|_| ())
                .map_err(|_| CommsError::MqttPublishFailed)
        }
    }
}
