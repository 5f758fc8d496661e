//! Normalisation of the color shapes a caller may hand to
//! [`crate::lamp_client::LampHandle::set_rgb_color`].
//!
//! | Shape | Example | Variant |
//! |---|---|---|
//! | raw buffer | `[0xff, 0, 0]` as bytes | [`ColorValue::Bytes`] |
//! | hex string | `"f00"`, `"#ff0000"` | [`ColorValue::Hex`] |
//! | packed integer | `0xff0000` | [`ColorValue::Packed`] |
//! | numeric array | `vec![255.0, 0.0, 0.0]` | [`ColorValue::Array`] |
//!
//! Every shape resolves to an [`Rgb`] or fails with an [`InvalidInput`]
//! variant naming the shape.  Nothing is clamped: an out-of-range value is a
//! caller error.

use serde_json::Value;

use crate::codec::encode_color;
use crate::error::{InvalidInput, LampError, Result};
use crate::types::{DeviceColor, Rgb};

/// A color in any of the accepted input shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    Bytes(Vec<u8>),
    Hex(String),
    Packed(i64),
    Array(Vec<f64>),
}

impl ColorValue {
    /// Resolve to an RGB triple.
    pub fn to_rgb(&self) -> Result<Rgb> {
        match self {
            ColorValue::Bytes(bytes) => rgb_from_bytes(bytes),
            ColorValue::Hex(s) => rgb_from_hex(s),
            ColorValue::Packed(n) => rgb_from_packed(*n),
            ColorValue::Array(values) => rgb_from_array(values),
        }
    }

    /// Resolve and encode in one step.
    pub fn encode(&self) -> Result<DeviceColor> {
        Ok(encode_color(self.to_rgb()?))
    }

    /// Build a [`ColorValue`] from dynamically typed input.
    ///
    /// Strings are hex, integers are packed, arrays are numeric arrays.
    /// Anything else (objects, `null`, fractional numbers) is an
    /// unrecognized shape.  Array elements that
    /// are not numbers are reported here so the index is preserved.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(ColorValue::Hex(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(ColorValue::Packed)
                .ok_or_else(|| LampError::from(InvalidInput::UnrecognizedShape(n.to_string()))),
            Value::Array(items) => {
                if items.len() != 3 {
                    return Err(InvalidInput::ArrayLength(items.len()).into());
                }
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        item.as_f64().ok_or_else(|| {
                            LampError::from(InvalidInput::ArrayElement {
                                index,
                                value: item.to_string(),
                            })
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
                    .map(ColorValue::Array)
            }
            other => Err(InvalidInput::UnrecognizedShape(other.to_string()).into()),
        }
    }
}

/// Shorthand for `ColorValue::from(input).to_rgb()`.
pub fn parse_color(input: impl Into<ColorValue>) -> Result<Rgb> {
    input.into().to_rgb()
}

fn rgb_from_bytes(bytes: &[u8]) -> Result<Rgb> {
    match *bytes {
        [r, g, b] => Ok(Rgb::new(r, g, b)),
        _ => Err(InvalidInput::Buffer(bytes.len()).into()),
    }
}

fn rgb_from_hex(input: &str) -> Result<Rgb> {
    let invalid = || LampError::from(InvalidInput::HexString(input.to_owned()));

    let digits = input.strip_prefix('#').unwrap_or(input);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let nibble = |b: u8| (b as char).to_digit(16).unwrap_or(0) as u8;
    match *digits.as_bytes() {
        [r, g, b] => Ok(Rgb::new(
            nibble(r) * 0x11,
            nibble(g) * 0x11,
            nibble(b) * 0x11,
        )),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgb::new(
            nibble(r1) << 4 | nibble(r0),
            nibble(g1) << 4 | nibble(g0),
            nibble(b1) << 4 | nibble(b0),
        )),
        _ => Err(invalid()),
    }
}

fn rgb_from_packed(n: i64) -> Result<Rgb> {
    if !(0..=0xff_ffff).contains(&n) {
        return Err(InvalidInput::Packed(n).into());
    }
    Ok(Rgb::new((n >> 16) as u8, (n >> 8) as u8, n as u8))
}

fn rgb_from_array(values: &[f64]) -> Result<Rgb> {
    let [r, g, b] = values else {
        return Err(InvalidInput::ArrayLength(values.len()).into());
    };
    Ok(Rgb::new(
        channel(0, *r)?,
        channel(1, *g)?,
        channel(2, *b)?,
    ))
}

fn channel(index: usize, value: f64) -> Result<u8> {
    if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
        return Err(InvalidInput::ArrayElement {
            index,
            value: value.to_string(),
        }
        .into());
    }
    Ok(value as u8)
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl From<&str> for ColorValue {
    fn from(s: &str) -> Self {
        ColorValue::Hex(s.to_owned())
    }
}

impl From<String> for ColorValue {
    fn from(s: String) -> Self {
        ColorValue::Hex(s)
    }
}

impl From<u32> for ColorValue {
    fn from(n: u32) -> Self {
        ColorValue::Packed(n.into())
    }
}

/// Unsuffixed literals such as `0xff0000` default to `i32`.
impl From<i32> for ColorValue {
    fn from(n: i32) -> Self {
        ColorValue::Packed(n.into())
    }
}

impl From<&[u8]> for ColorValue {
    fn from(bytes: &[u8]) -> Self {
        ColorValue::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for ColorValue {
    fn from(bytes: Vec<u8>) -> Self {
        ColorValue::Bytes(bytes)
    }
}

impl From<[u8; 3]> for ColorValue {
    fn from(bytes: [u8; 3]) -> Self {
        ColorValue::Bytes(bytes.to_vec())
    }
}

impl From<Vec<f64>> for ColorValue {
    fn from(values: Vec<f64>) -> Self {
        ColorValue::Array(values)
    }
}

impl From<&[f64]> for ColorValue {
    fn from(values: &[f64]) -> Self {
        ColorValue::Array(values.to_vec())
    }
}

impl From<[f64; 3]> for ColorValue {
    fn from(values: [f64; 3]) -> Self {
        ColorValue::Array(values.to_vec())
    }
}

impl From<Rgb> for ColorValue {
    fn from(rgb: Rgb) -> Self {
        ColorValue::Bytes(rgb.channels().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn invalid(result: Result<Rgb>) -> InvalidInput {
        match result {
            Err(LampError::InvalidInput(e)) => e,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn all_shapes_of_red_encode_identically() {
        let expected = encode_color(Rgb::new(255, 0, 0));
        let shapes: [ColorValue; 5] = [
            "#ff0000".into(),
            "f00".into(),
            [255.0, 0.0, 0.0].into(),
            0xff0000u32.into(),
            [0xffu8, 0, 0].into(),
        ];
        for shape in shapes {
            assert_eq!(shape.encode().unwrap(), expected, "{shape:?}");
        }
    }

    #[test]
    fn shorthand_hex_doubles_each_digit() {
        assert_eq!(parse_color("#1a9").unwrap(), Rgb::new(0x11, 0xaa, 0x99));
        assert_eq!(parse_color("FfF").unwrap(), Rgb::new(255, 255, 255));
        assert_eq!(parse_color("12ab3C").unwrap(), Rgb::new(0x12, 0xab, 0x3c));
    }

    #[test]
    fn packed_integer_splits_channels() {
        assert_eq!(parse_color(0x123456u32).unwrap(), Rgb::new(0x12, 0x34, 0x56));
        assert_eq!(parse_color(0xff0000).unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(
            invalid(ColorValue::Packed(0x1_000000).to_rgb()),
            InvalidInput::Packed(0x1_000000)
        );
        assert_eq!(invalid(parse_color(-1)), InvalidInput::Packed(-1));
    }

    #[test]
    fn malformed_hex_strings_are_rejected() {
        for s in ["zzzzzz", "", "#", "ff00", "#ff00000", "ff 000", "ééé"] {
            assert_eq!(
                invalid(parse_color(s)),
                InvalidInput::HexString(s.to_owned()),
                "{s:?}"
            );
        }
    }

    #[test]
    fn malformed_arrays_are_rejected() {
        assert_eq!(
            invalid(parse_color(vec![1.0, 2.0])),
            InvalidInput::ArrayLength(2)
        );
        assert!(matches!(
            invalid(parse_color([0.0, 256.0, 0.0])),
            InvalidInput::ArrayElement { index: 1, .. }
        ));
        assert!(matches!(
            invalid(parse_color([0.0, 0.0, -1.0])),
            InvalidInput::ArrayElement { index: 2, .. }
        ));
        assert!(matches!(
            invalid(parse_color([0.5, 0.0, 0.0])),
            InvalidInput::ArrayElement { index: 0, .. }
        ));
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert_eq!(
            invalid(parse_color(&[0xffu8, 0][..])),
            InvalidInput::Buffer(2)
        );
    }

    #[test]
    fn json_values_map_to_shapes() {
        assert_eq!(
            ColorValue::from_json(&json!("#00ff00")).unwrap(),
            ColorValue::Hex("#00ff00".into())
        );
        assert_eq!(
            ColorValue::from_json(&json!(65280)).unwrap(),
            ColorValue::Packed(0x00ff00)
        );
        assert_eq!(
            invalid(ColorValue::from_json(&json!(-5)).unwrap().to_rgb()),
            InvalidInput::Packed(-5)
        );
        assert_eq!(
            ColorValue::from_json(&json!([0, 255, 0])).unwrap(),
            ColorValue::Array(vec![0.0, 255.0, 0.0])
        );
    }

    #[test]
    fn json_rejects_non_colors() {
        let err = |v: Value| match ColorValue::from_json(&v) {
            Err(LampError::InvalidInput(e)) => e,
            other => panic!("expected InvalidInput, got {other:?}"),
        };
        assert!(matches!(err(json!({"r": 1})), InvalidInput::UnrecognizedShape(_)));
        assert!(matches!(err(json!(null)), InvalidInput::UnrecognizedShape(_)));
        assert!(matches!(err(json!(1.5)), InvalidInput::UnrecognizedShape(_)));
        assert_eq!(err(json!([1, 2])), InvalidInput::ArrayLength(2));
        assert!(matches!(
            err(json!([1, "2", 3])),
            InvalidInput::ArrayElement { index: 1, .. }
        ));
    }
}
