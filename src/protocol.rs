//! GATT UUIDs and fixed wire constants for Hue BLE lamps.
//!
//! The light-control characteristics live in the vendor namespace
//! `932cXXXX-…-a8d455b859dd`; the lamp name lives under the Bluetooth SIG
//! allocated settings service `0xfe0f`.

use uuid::Uuid;

// ── Services ─────────────────────────────────────────────────────────────────

/// Light control service (power, brightness, temperature, color).
pub const LIGHT_SERVICE: Uuid = Uuid::from_u128(0x932c32bd_0000_47a2_835a_a8d455b859dd);

/// Settings service, carries the user-visible lamp name.
pub const SETTINGS_SERVICE: Uuid = Uuid::from_u128(0x0000fe0f_0000_1000_8000_00805f9b34fb);

/// Services used both as the scan filter and for characteristic discovery.
pub const LAMP_SERVICES: [Uuid; 2] = [LIGHT_SERVICE, SETTINGS_SERVICE];

// ── Characteristics ───────────────────────────────────────────────────────────

/// On/off state: 1 byte, see [`POWER_OFF`] / [`POWER_ON`].
pub const POWER_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x932c32bd_0002_47a2_835a_a8d455b859dd);

/// Brightness: 1 byte in `[1, 0xfe]`.
/// See [`crate::codec::encode_brightness`].
pub const BRIGHTNESS_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x932c32bd_0003_47a2_835a_a8d455b859dd);

/// Color temperature: u16 little-endian in `[153, 500]`.
/// See [`crate::codec::encode_temperature`].
pub const TEMPERATURE_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x932c32bd_0004_47a2_835a_a8d455b859dd);

/// Color: 4 bytes `[mode, c0, c1, c2]`.
///
/// Only present on color-capable lamps; white-ambiance lamps do not expose
/// it, which is how [`crate::lamp_client::LampHandle::has_color`] is derived.
pub const COLOR_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x932c32bd_0005_47a2_835a_a8d455b859dd);

/// User-visible lamp name: raw UTF-8, variable length.
pub const LAMP_NAME_CHARACTERISTIC: Uuid =
    Uuid::from_u128(0x97fe6561_0003_4f62_86e9_b71ee2da3d22);

// ── Payload constants ─────────────────────────────────────────────────────────

pub const POWER_OFF: u8 = 0x00;
pub const POWER_ON: u8 = 0x01;

/// Leading byte of a color payload selecting "custom color" mode.
pub const COLOR_MODE_CUSTOM: u8 = 0x01;

/// Length of a color payload including the mode byte.
pub const COLOR_PAYLOAD_LEN: usize = 4;

/// Brightness byte written for 0 %.
pub const BRIGHTNESS_MIN: u8 = 0x01;
/// Brightness byte written for 100 %.
pub const BRIGHTNESS_MAX: u8 = 0xfe;

/// Mired value written for 0 % (coolest white).
pub const TEMPERATURE_MIN: u16 = 153;
/// Mired value written for 100 % (warmest white).
pub const TEMPERATURE_MAX: u16 = 500;

/// Human-readable label for a characteristic, used in log lines and errors.
pub fn characteristic_name(uuid: &Uuid) -> &'static str {
    match *uuid {
        POWER_CHARACTERISTIC => "power",
        BRIGHTNESS_CHARACTERISTIC => "brightness",
        TEMPERATURE_CHARACTERISTIC => "temperature",
        COLOR_CHARACTERISTIC => "color",
        LAMP_NAME_CHARACTERISTIC => "lamp name",
        _ => "unknown",
    }
}
