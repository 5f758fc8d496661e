//! Error types returned by the codec and the lamp session.

use thiserror::Error;
use uuid::Uuid;

use crate::protocol::characteristic_name;

/// Which color representation failed to parse, and why.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    /// Raw RGB buffer that is not exactly 3 bytes long.
    #[error("invalid RGB buffer: expected 3 bytes, got {0}")]
    Buffer(usize),

    /// Hex string of the wrong length or with non-hex digits.
    #[error("invalid RGB string {0:?}: expected 3 or 6 hex digits with optional '#'")]
    HexString(String),

    /// Packed integer outside `0..=0xffffff`.
    #[error("invalid packed RGB value {0}: must be within 0..=0xffffff")]
    Packed(i64),

    /// Dynamic value that is not a hex string, packed integer, or array.
    #[error("invalid RGB value {0}: expected a hex string, packed integer, or array")]
    UnrecognizedShape(String),

    /// Array with a length other than 3.
    #[error("invalid RGB array: expected 3 elements, got {0}")]
    ArrayLength(usize),

    /// Array element that is not an integer in `0..=255`.
    #[error("invalid RGB array element at index {index}: {value}")]
    ArrayElement { index: usize, value: String },

    /// Raw color payload that is not exactly 4 bytes long.
    #[error("invalid color payload: expected 4 bytes, got {0}")]
    ColorPayload(usize),
}

/// All errors produced by this crate.
#[derive(Debug, Error)]
pub enum LampError {
    /// Malformed color representation.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// Numeric parameter outside its documented domain.
    #[error("{what} {value} out of range (0..=100)")]
    OutOfRange { what: &'static str, value: f64 },

    /// Operation not available on the connected lamp variant.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// A characteristic the operation needs was not discovered.
    #[error("{name} characteristic {0} not found", name = characteristic_name(.0))]
    CharacteristicNotFound(Uuid),

    /// The lamp answered a read with a payload too short to decode.
    #[error("{} read returned {actual} byte(s), expected at least {expected}", characteristic_name(.uuid))]
    MalformedPayload {
        uuid: Uuid,
        expected: usize,
        actual: usize,
    },

    #[error("no Bluetooth adapter found")]
    NoAdapter,

    /// A bounded transport step did not finish in time.
    #[error("{what} timed out after {secs} s")]
    Timeout { what: &'static str, secs: u64 },

    #[error(transparent)]
    Ble(#[from] btleplug::Error),
}

pub type Result<T> = std::result::Result<T, LampError>;
