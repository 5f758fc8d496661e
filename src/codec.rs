//! Encoders and decoders for Hue BLE characteristic payloads.
//!
//! All functions are pure and safe to call from any async or sync context.
//!
//! | Function | Characteristic | Payload |
//! |---|---|---|
//! | [`encode_power`] / [`decode_power`] | power | 1 byte, `0x00` / `0x01` |
//! | [`encode_brightness`] / [`decode_brightness`] | brightness | 1 byte in `[1, 254]` |
//! | [`encode_temperature`] / [`decode_temperature`] | temperature | u16 LE in `[153, 500]` |
//! | [`encode_color`] | color | `[1, c0, c1, c2]`, each channel in `[1, 253]` |
//!
//! Encoders validate their input; decoders trust the lamp and do not.

use crate::error::{LampError, Result};
use crate::protocol::{POWER_OFF, POWER_ON};
use crate::types::{DeviceColor, Rgb};

// ── Power ─────────────────────────────────────────────────────────────────────

pub fn encode_power(on: bool) -> u8 {
    if on {
        POWER_ON
    } else {
        POWER_OFF
    }
}

/// Only `0x01` means on.
pub fn decode_power(byte: u8) -> bool {
    byte == POWER_ON
}

// ── Brightness ────────────────────────────────────────────────────────────────

/// Map a percentage in `[0, 100]` onto the brightness byte.
///
/// `round(pct × 253 / 100 + 1)`, so 0 % → `1` and 100 % → `254`.
pub fn encode_brightness(pct: f64) -> Result<u8> {
    check_percentage("brightness", pct)?;
    Ok((pct * 253.0 / 100.0 + 1.0).round() as u8)
}

/// Inverse of [`encode_brightness`]: `(byte − 1) / 253 × 100`.
///
/// A byte of `0` is never produced by the lamp and decodes to a small
/// negative percentage.
pub fn decode_brightness(byte: u8) -> f64 {
    (f64::from(byte) - 1.0) / 253.0 * 100.0
}

// ── Temperature ───────────────────────────────────────────────────────────────

/// Map a percentage in `[0, 100]` onto the mired range `[153, 500]`,
/// little-endian.
///
/// `floor(pct / 100 × 347 + 153)`.
pub fn encode_temperature(pct: f64) -> Result<[u8; 2]> {
    check_percentage("temperature", pct)?;
    let mired = (pct / 100.0 * 347.0 + 153.0).floor() as u16;
    Ok(mired.to_le_bytes())
}

/// Inverse of [`encode_temperature`]: `(value − 153) / 347 × 100`.
pub fn decode_temperature(bytes: [u8; 2]) -> f64 {
    (f64::from(u16::from_le_bytes(bytes)) - 153.0) / 347.0 * 100.0
}

// ── Color ─────────────────────────────────────────────────────────────────────

/// Convert an RGB triple into the lamp's weighted color payload.
///
/// Each channel is first lifted into `[1, 255]` so the sum can never be zero,
/// then weighted against that sum and scaled to `[1, 253]`:
///
/// ```text
/// adjusted[c] = floor(c / 255 × 254) + 1
/// data[c]     = floor(adjusted[c] / Σ adjusted × 253) + 1
/// payload     = [1, data[r], data[b], data[g]]
/// ```
///
/// The firmware expects blue before green; the order is not a typo.
///
/// ```
/// # use hue_ble::{codec::encode_color, types::Rgb};
/// assert_eq!(encode_color(Rgb::new(0, 0, 0)).to_bytes(), [1, 85, 85, 85]);
/// assert_eq!(encode_color(Rgb::new(255, 0, 0)).to_bytes(), [1, 252, 1, 1]);
/// ```
pub fn encode_color(rgb: Rgb) -> DeviceColor {
    let adjusted = rgb
        .channels()
        .map(|c| (f64::from(c) / 255.0 * 254.0).floor() + 1.0);
    let total: f64 = adjusted.iter().sum();
    let [r, g, b] = adjusted.map(|a| ((a / total * 253.0).floor() + 1.0) as u8);

    DeviceColor::custom([r, b, g])
}

fn check_percentage(what: &'static str, value: f64) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(LampError::OutOfRange { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BRIGHTNESS_MAX, BRIGHTNESS_MIN, TEMPERATURE_MAX, TEMPERATURE_MIN};

    fn out_of_range<T: std::fmt::Debug>(result: Result<T>) -> (&'static str, f64) {
        match result {
            Err(LampError::OutOfRange { what, value }) => (what, value),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn power_bytes() {
        assert_eq!(encode_power(true), 0x01);
        assert_eq!(encode_power(false), 0x00);
        assert!(decode_power(0x01));
        assert!(!decode_power(0x00));
        assert!(!decode_power(0x02));
    }

    #[test]
    fn brightness_boundaries() {
        assert_eq!(encode_brightness(0.0).unwrap(), BRIGHTNESS_MIN);
        assert_eq!(encode_brightness(100.0).unwrap(), 254);
        assert_eq!(encode_brightness(50.0).unwrap(), 128);
        assert_eq!(out_of_range(encode_brightness(-1.0)), ("brightness", -1.0));
        assert_eq!(out_of_range(encode_brightness(101.0)), ("brightness", 101.0));
        assert!(encode_brightness(f64::NAN).is_err());
    }

    #[test]
    fn brightness_round_trip_within_half_a_percent() {
        for pct in 0..=100 {
            let pct = f64::from(pct);
            let back = decode_brightness(encode_brightness(pct).unwrap());
            assert!((back - pct).abs() <= 0.5, "{pct} -> {back}");
        }
    }

    #[test]
    fn brightness_decode_is_lenient() {
        assert_eq!(decode_brightness(1), 0.0);
        assert_eq!(decode_brightness(BRIGHTNESS_MAX), 100.0);
        assert!(decode_brightness(0) < 0.0);
        assert!(decode_brightness(0xff) > 100.0);
    }

    #[test]
    fn temperature_boundaries() {
        assert_eq!(
            u16::from_le_bytes(encode_temperature(0.0).unwrap()),
            TEMPERATURE_MIN
        );
        assert_eq!(
            u16::from_le_bytes(encode_temperature(100.0).unwrap()),
            TEMPERATURE_MAX
        );
        assert_eq!(encode_temperature(100.0).unwrap(), [0xf4, 0x01]);
        assert_eq!(encode_temperature(50.0).unwrap(), [0x46, 0x01]);
        assert_eq!(out_of_range(encode_temperature(-0.5)), ("temperature", -0.5));
        assert_eq!(out_of_range(encode_temperature(1e6)), ("temperature", 1e6));
    }

    #[test]
    fn temperature_round_trip_within_half_a_percent() {
        for pct in 0..=100 {
            let pct = f64::from(pct);
            let back = decode_temperature(encode_temperature(pct).unwrap());
            assert!((back - pct).abs() <= 0.5, "{pct} -> {back}");
        }
    }

    #[test]
    fn black_and_white_encode_to_equal_weights() {
        assert_eq!(encode_color(Rgb::new(0, 0, 0)).to_bytes(), [1, 85, 85, 85]);
        assert_eq!(
            encode_color(Rgb::new(255, 255, 255)).to_bytes(),
            [1, 85, 85, 85]
        );
    }

    #[test]
    fn primaries_land_in_firmware_channel_order() {
        assert_eq!(encode_color(Rgb::new(255, 0, 0)).to_bytes(), [1, 252, 1, 1]);
        assert_eq!(encode_color(Rgb::new(0, 255, 0)).to_bytes(), [1, 1, 1, 252]);
        assert_eq!(encode_color(Rgb::new(0, 0, 255)).to_bytes(), [1, 1, 252, 1]);
    }

    #[test]
    fn color_channels_stay_in_range() {
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(17) {
                for b in [0u8, 1, 127, 128, 254, 255] {
                    let bytes = encode_color(Rgb::new(r, g, b)).to_bytes();
                    assert_eq!(bytes[0], 1);
                    for c in &bytes[1..] {
                        assert!((1..=0xfd).contains(c), "{r},{g},{b} -> {bytes:?}");
                    }
                }
            }
        }
    }
}
