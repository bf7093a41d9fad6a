//! HVAC Monitor Firmware — Main Entry Point
//!
//! Hexagonal architecture with a fixed-cadence sampling loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter    LogEventSink     MqttPublisher           │
//! │  (SensorPort)       (EventSink)      (EventSink)             │
//! │  NvsStorage + ConfigStore (StoragePort / ConfigPort)         │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │           MonitorService (pure logic)              │      │
//! │  │  retain · alert scan · aggregate                   │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

mod secrets;

use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use hvacmon::adapters::TeeSink;
use hvacmon::adapters::hardware::HardwareAdapter;
use hvacmon::adapters::log_sink::LogEventSink;
use hvacmon::adapters::mqtt::{EspMqttTransport, MqttPublisher};
use hvacmon::adapters::nvs::{ConfigStore, NvsStorage};
use hvacmon::app::ports::ConfigPort;
use hvacmon::app::service::MonitorService;
use hvacmon::config::MonitorConfig;
use hvacmon::drivers::hw_init;
use hvacmon::pins;
use hvacmon::sensors::{SensorHub, current, temperature};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init().context("logger init failed")?;

    info!("Booting HVAC monitor v{}", FIRMWARE_VERSION);

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical: without the ADC and the
        // one-wire bus there is nothing to monitor. Log and halt; the
        // watchdog resets us after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Config from NVS (or defaults) ──────────────────────
    let storage = NvsStorage::new()
        .map_err(|e| anyhow::anyhow!("NVS init failed: {}", e))
        .context("persistent storage unavailable")?;
    let config_store = ConfigStore::new(storage);
    let config = match config_store.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config load failed ({}), using defaults", e);
            MonitorConfig::default()
        }
    };

    // ── 4. WiFi station ───────────────────────────────────────
    // A failed association is not fatal: the monitor keeps sampling and
    // logging locally, and MQTT stays paced-disconnected until the next
    // reboot brings the network back.
    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take().context("system event loop")?;
    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), None).context("wifi driver")?,
        sysloop,
    )
    .context("wifi wrapper")?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: secrets::WIFI_SSID
            .try_into()
            .map_err(|_| anyhow::anyhow!("SSID too long"))?,
        password: secrets::WIFI_PASSWORD
            .try_into()
            .map_err(|_| anyhow::anyhow!("WiFi password too long"))?,
        auth_method: AuthMethod::WPA2Personal,
        ..Default::default()
    }))
    .context("wifi configuration")?;

    wifi.start().context("wifi start")?;
    match wifi.connect() {
        Ok(()) => match wifi.wait_netif_up() {
            Ok(()) => info!("WiFi connected"),
            Err(e) => warn!("WiFi DHCP failed ({}), continuing offline", e),
        },
        Err(e) => warn!("WiFi connect failed ({}), continuing offline", e),
    }

    // ── 5. Event sinks: serial log + MQTT ─────────────────────
    let transport = EspMqttTransport::new(secrets::MQTT_BROKER_URL, secrets::MQTT_CLIENT_ID)
        .context("mqtt client")?;
    let publisher = MqttPublisher::new(
        transport,
        secrets::MQTT_TOPIC_ROOT,
        FIRMWARE_VERSION,
        config.mqtt_reconnect_interval_ms,
    );
    let mut sink = TeeSink::new(LogEventSink::new(), publisher);

    // ── 6. Sensor hub behind the port boundary ────────────────
    let hub = SensorHub::new(
        temperature::TemperatureSensor::new(pins::RETURN_AIR_PROBE_ROM, temperature::SIM_CH_RETURN),
        temperature::TemperatureSensor::new(pins::SUPPLY_AIR_PROBE_ROM, temperature::SIM_CH_SUPPLY),
        current::CurrentSensor::new(pins::FAN_CT_ADC_CH, current::SIM_CH_FAN, config.ct_calibration),
        current::CurrentSensor::new(
            pins::COMPRESSOR_CT_ADC_CH,
            current::SIM_CH_COMPRESSOR,
            config.ct_calibration,
        ),
        current::CurrentSensor::new(
            pins::GEO_PUMPS_CT_ADC_CH,
            current::SIM_CH_GEO_PUMPS,
            config.ct_calibration,
        ),
        config.adc_samples,
    );
    let mut hw = HardwareAdapter::new(hub);

    // ── 7. Monitor service + sampling loop ────────────────────
    let mut service = MonitorService::new(config.clone());
    service.start(&mut sink);

    info!(
        "System ready. Sampling every {} ms.",
        config.sample_interval_ms
    );

    loop {
        std::thread::sleep(Duration::from_millis(u64::from(config.sample_interval_ms)));
        service.tick(&mut hw, &mut sink);
        service.auto_save_if_needed(&config_store);
    }
}
