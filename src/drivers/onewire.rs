//! Bit-banged one-wire bus for the DS18B20 air probes.
//!
//! Timing follows the DS18B20 datasheet standard-speed figures. Bit slots
//! are generated with busy-wait microsecond delays; the tolerances are
//! loose enough that scheduler jitter at worst costs a CRC miss, which
//! reads as a disconnect for that one cycle and is absorbed by the
//! duration-based alerting.
//!
//! Only the two operations the monitor needs are implemented: a bus-wide
//! temperature conversion and an addressed scratchpad read.

// ── ROM / function commands ───────────────────────────────────

#[cfg(target_os = "espidf")]
const CMD_SKIP_ROM: u8 = 0xCC;
#[cfg(target_os = "espidf")]
const CMD_MATCH_ROM: u8 = 0x55;
#[cfg(target_os = "espidf")]
const CMD_CONVERT_T: u8 = 0x44;
#[cfg(target_os = "espidf")]
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// Worst-case 12-bit conversion time per datasheet.
#[cfg(target_os = "espidf")]
const CONVERT_TIMEOUT_MS: u32 = 750;

/// Dallas CRC-8 (polynomial 0x8C, LSB-first) over `data`.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
pub(crate) fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

// ── Bus primitives ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod bus {
    use crate::pins::ONE_WIRE_GPIO;
    use esp_idf_svc::sys::{esp_rom_delay_us, gpio_get_level, gpio_set_level};

    fn drive_low() {
        unsafe {
            gpio_set_level(ONE_WIRE_GPIO, 0);
        }
    }

    fn release() {
        unsafe {
            gpio_set_level(ONE_WIRE_GPIO, 1);
        }
    }

    fn sample() -> bool {
        unsafe { gpio_get_level(ONE_WIRE_GPIO) != 0 }
    }

    fn delay_us(us: u32) {
        unsafe {
            esp_rom_delay_us(us);
        }
    }

    /// Reset pulse; returns true if at least one device answered with a
    /// presence pulse.
    pub fn reset() -> bool {
        drive_low();
        delay_us(480);
        release();
        delay_us(70);
        let present = !sample();
        delay_us(410);
        present
    }

    pub fn write_bit(bit: bool) {
        drive_low();
        if bit {
            delay_us(6);
            release();
            delay_us(64);
        } else {
            delay_us(60);
            release();
            delay_us(10);
        }
    }

    pub fn read_bit() -> bool {
        drive_low();
        delay_us(6);
        release();
        delay_us(9);
        let bit = sample();
        delay_us(55);
        bit
    }

    pub fn write_byte(byte: u8) {
        for i in 0..8 {
            write_bit((byte >> i) & 0x01 != 0);
        }
    }

    pub fn read_byte() -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if read_bit() {
                byte |= 1 << i;
            }
        }
        byte
    }
}

// ── Operations ────────────────────────────────────────────────

/// Trigger a temperature conversion on every probe and wait for
/// completion (the bus reads low while any device is converting).
#[cfg(target_os = "espidf")]
pub fn convert_all() {
    if !bus::reset() {
        // Nobody home; the addressed reads will report disconnect.
        return;
    }
    bus::write_byte(CMD_SKIP_ROM);
    bus::write_byte(CMD_CONVERT_T);

    for _ in 0..CONVERT_TIMEOUT_MS {
        unsafe {
            esp_idf_svc::sys::esp_rom_delay_us(1000);
        }
        if bus::read_bit() {
            return;
        }
    }
}

/// Read one probe's scratchpad and decode the temperature.
///
/// Returns `None` on a missing presence pulse or CRC mismatch; the caller
/// substitutes the disconnected sentinel.
#[cfg(target_os = "espidf")]
pub fn read_temp_c(rom: &[u8; 8]) -> Option<f32> {
    if !bus::reset() {
        return None;
    }
    bus::write_byte(CMD_MATCH_ROM);
    for &b in rom {
        bus::write_byte(b);
    }
    bus::write_byte(CMD_READ_SCRATCHPAD);

    let mut scratchpad = [0u8; 9];
    for slot in &mut scratchpad {
        *slot = bus::read_byte();
    }

    if crc8(&scratchpad[..8]) != scratchpad[8] {
        return None;
    }

    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
    Some(f32::from(raw) / 16.0)
}
