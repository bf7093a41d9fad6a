//! Pin and ADC channel assignments (ESP32, 38-pin devkit).

/// One-wire bus for the two DS18B20 air probes.
pub const ONE_WIRE_GPIO: i32 = 4;

/// Fan CT clamp, GPIO34 (input-only) = ADC1 channel 6.
pub const FAN_CT_ADC_CH: u32 = 6;
/// Compressor CT clamp, GPIO35 (input-only) = ADC1 channel 7.
pub const COMPRESSOR_CT_ADC_CH: u32 = 7;
/// Geo loop pumps CT clamp, GPIO32 = ADC1 channel 4.
pub const GEO_PUMPS_CT_ADC_CH: u32 = 4;

/// DS18B20 ROM address of the return-air probe.
pub const RETURN_AIR_PROBE_ROM: [u8; 8] = [0x28, 0xFF, 0x64, 0x1E, 0x54, 0x3F, 0x2A, 0x9A];
/// DS18B20 ROM address of the supply-air probe.
pub const SUPPLY_AIR_PROBE_ROM: [u8; 8] = [0x28, 0xFF, 0x64, 0x1E, 0x55, 0x0A, 0x3C, 0x5A];
