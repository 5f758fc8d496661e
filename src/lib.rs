//! # hue-ble
//!
//! Async Rust client for Philips Hue lamps over Bluetooth Low Energy.
//!
//! ## Supported hardware
//!
//! | Lamp | Power | Brightness | Temperature | Color |
//! |---|---|---|---|---|
//! | White | ✓ | ✓ | ✗ | ✗ |
//! | White ambiance | ✓ | ✓ | ✓ | ✗ |
//! | White and color ambiance | ✓ | ✓ | ✓ | ✓ |
//!
//! Color support is detected at connect time from the discovered
//! characteristics; see [`lamp_client::LampHandle::has_color`].
//!
//! Lamps only accept a new central while they are in pairing mode or when
//! nothing else is bonded.  If [`lamp_client::LampHandle::lamp_name`]
//! comes back empty, reset the lamp and connect from the computer before
//! the phone app.
//!
//! ## Quick start
//!
//! ```no_run
//! use hue_ble::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let lamp = LampClient::new(LampClientConfig::default()).connect().await?;
//!     lamp.on().await?;
//!     lamp.set_brightness(100.0).await?;
//!     lamp.set_rgb_color("f00").await?;
//!     lamp.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`prelude`] | One-line glob import of the most commonly needed types |
//! | [`lamp_client`] | Scanning, connecting, and the [`lamp_client::LampHandle`] session API |
//! | [`codec`] | Pure encoders/decoders for every characteristic payload |
//! | [`color`] | Accepted color input shapes and their normalisation to RGB |
//! | [`protocol`] | GATT UUIDs and fixed wire constants |
//! | [`transport`] | The [`transport::LampLink`] seam and its btleplug implementation |
//! | [`types`] | Value types shared by the modules above |
//! | [`error`] | [`LampError`] and friends |

pub mod codec;
pub mod color;
pub mod error;
pub mod lamp_client;
pub mod protocol;
pub mod transport;
pub mod types;

pub use error::{InvalidInput, LampError, Result};

// ── Prelude ───────────────────────────────────────────────────────────────────

/// Convenience re-exports for downstream crates.
pub mod prelude {
    // ── Client ────────────────────────────────────────────────────────────────
    pub use crate::lamp_client::{
        LampClient, LampClientConfig, LampDevice, LampHandle, LampScanner,
    };
    pub use crate::transport::LampLink;

    // ── Values ────────────────────────────────────────────────────────────────
    pub use crate::color::{parse_color, ColorValue};
    pub use crate::types::{DeviceColor, LampKind, Rgb};

    // ── Errors ────────────────────────────────────────────────────────────────
    pub use crate::error::{InvalidInput, LampError};
}
