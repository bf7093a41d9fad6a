//! DS18B20 air-probe driver (one probe per instance, shared one-wire bus).
//!
//! The return- and supply-air probes sit on the same bus and are addressed
//! by their 64-bit ROM codes. A read that fails (missing presence pulse,
//! scratchpad CRC mismatch) yields the `-127.0` sentinel; interpretation
//! happens downstream in the telemetry core.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-banged one-wire transactions via the GPIO driver
//! (see `drivers::onewire`).
//! On host/test: reads from per-channel atomics for injection.

#[cfg(target_os = "espidf")]
use crate::telemetry::sample::DISCONNECTED_TEMP_C;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};

/// Simulation channel of the return-air probe.
pub const SIM_CH_RETURN: usize = 0;
/// Simulation channel of the supply-air probe.
pub const SIM_CH_SUPPLY: usize = 1;

// f32 bit patterns; both channels boot at a plausible room temperature.
#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: [AtomicU32; 2] = [
    AtomicU32::new(21.0f32.to_bits()),
    AtomicU32::new(21.0f32.to_bits()),
];

/// Inject a probe temperature for host-side tests. Pass
/// [`DISCONNECTED_TEMP_C`](crate::telemetry::sample::DISCONNECTED_TEMP_C)
/// to simulate an unplugged probe.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_c(channel: usize, temp_c: f32) {
    SIM_TEMP_BITS[channel].store(temp_c.to_bits(), Ordering::Relaxed);
}

/// Trigger a bus-wide temperature conversion.
///
/// Must be called once per cycle before reading the probes; the DS18B20
/// needs up to 750 ms at 12-bit resolution, which the driver waits out.
/// Negligible against the 5 s cadence. No-op on host.
pub fn request_conversion() {
    #[cfg(target_os = "espidf")]
    crate::drivers::onewire::convert_all();
}

/// One DS18B20 probe.
// Field usage is target-dependent: the ROM feeds the device read path,
// the channel feeds the host simulation path.
#[allow(dead_code)]
pub struct TemperatureSensor {
    rom: [u8; 8],
    sim_channel: usize,
}

impl TemperatureSensor {
    pub fn new(rom: [u8; 8], sim_channel: usize) -> Self {
        Self { rom, sim_channel }
    }

    /// Latest converted temperature, or the disconnected sentinel.
    #[cfg(target_os = "espidf")]
    pub fn read_c(&mut self) -> f32 {
        crate::drivers::onewire::read_temp_c(&self.rom).unwrap_or(DISCONNECTED_TEMP_C)
    }

    /// Latest converted temperature, or the disconnected sentinel.
    #[cfg(not(target_os = "espidf"))]
    pub fn read_c(&mut self) -> f32 {
        f32::from_bits(SIM_TEMP_BITS[self.sim_channel].load(Ordering::Relaxed))
    }
}

// Simulation-path behaviour is covered by the hub test in `sensors::tests`,
// which owns the shared sim statics for the whole test binary.
