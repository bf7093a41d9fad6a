//! Site-specific credentials and endpoints.
//!
//! Placeholder values; replace before flashing. Do not commit real
//! credentials.

pub const WIFI_SSID: &str = "changeme-ssid";
pub const WIFI_PASSWORD: &str = "changeme-password";

pub const MQTT_BROKER_URL: &str = "mqtt://broker.local:1883";
pub const MQTT_CLIENT_ID: &str = "hvacmon";
pub const MQTT_TOPIC_ROOT: &str = "hvac/monitor";
