//! Value types shared across the crate.
//!
//! [`Rgb`] is the color callers pass in; [`DeviceColor`] is the 4-byte
//! payload the lamp actually stores.

use std::fmt;
use std::str::FromStr;

use crate::color::ColorValue;
use crate::error::{InvalidInput, LampError};
use crate::protocol::{COLOR_MODE_CUSTOM, COLOR_PAYLOAD_LEN};

/// An RGB triple, one byte per channel.
///
/// This is the human-facing color; the lamp never sees it directly.
/// [`crate::codec::encode_color`] turns it into a [`DeviceColor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in `[r, g, b]` order.
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parses the hex forms accepted by [`ColorValue::Hex`]: `"f00"`, `"#ff0000"`, …
impl FromStr for Rgb {
    type Err = LampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorValue::from(s).to_rgb()
    }
}

/// The 4-byte payload of the color characteristic.
///
/// Layout:
/// ```text
/// byte 0     : mode (1 = custom color)
/// bytes 1..4 : weighted intensities, firmware channel order (red, blue, green)
/// ```
///
/// Values read back from the lamp are kept as-is; only the length is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceColor {
    pub mode: u8,
    pub channels: [u8; 3],
}

impl DeviceColor {
    pub const fn custom(channels: [u8; 3]) -> Self {
        Self {
            mode: COLOR_MODE_CUSTOM,
            channels,
        }
    }

    pub const fn to_bytes(self) -> [u8; COLOR_PAYLOAD_LEN] {
        let [c0, c1, c2] = self.channels;
        [self.mode, c0, c1, c2]
    }

    /// Interpret a raw color payload.  Fails unless `bytes` is exactly 4 long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidInput> {
        match *bytes {
            [mode, c0, c1, c2] => Ok(Self {
                mode,
                channels: [c0, c1, c2],
            }),
            _ => Err(InvalidInput::ColorPayload(bytes.len())),
        }
    }
}

impl fmt::Display for DeviceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [c0, c1, c2] = self.channels;
        write!(f, "{},{c0},{c1},{c2}", self.mode)
    }
}

/// Lamp variant, derived from which characteristics were discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampKind {
    /// Full color lamp: exposes the color characteristic.
    Color,
    /// White / white-ambiance lamp: brightness and temperature only.
    White,
}

impl fmt::Display for LampKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LampKind::Color => "Color",
            LampKind::White => "White",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_color_bytes_keep_mode_first() {
        let color = DeviceColor::custom([252, 1, 1]);
        assert_eq!(color.to_bytes(), [1, 252, 1, 1]);
        assert_eq!(DeviceColor::from_bytes(&[1, 252, 1, 1]).unwrap(), color);
        assert_eq!(color.to_string(), "1,252,1,1");
    }

    #[test]
    fn device_color_rejects_wrong_length() {
        assert_eq!(
            DeviceColor::from_bytes(&[1, 2, 3]),
            Err(InvalidInput::ColorPayload(3))
        );
        assert_eq!(
            DeviceColor::from_bytes(&[1, 2, 3, 4, 5]),
            Err(InvalidInput::ColorPayload(5))
        );
    }

    #[test]
    fn rgb_parses_and_prints_hex() {
        let rgb: Rgb = "#0a0B0c".parse().unwrap();
        assert_eq!(rgb, Rgb::new(10, 11, 12));
        assert_eq!(rgb.to_string(), "#0a0b0c");
        assert!("#12345".parse::<Rgb>().is_err());
    }
}
