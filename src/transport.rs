//! The seam between a lamp session and the radio.
//!
//! [`crate::lamp_client::LampHandle`] never touches btleplug directly; it
//! talks to a [`LampLink`], which resolves characteristics by UUID.
//! [`BtleLink`] is the real implementation.  Anything else that can read and
//! write characteristic payloads (a simulator, a test double) can be wrapped
//! in a handle with [`crate::lamp_client::LampHandle::new`].

use std::collections::BTreeSet;

use async_trait::async_trait;
use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use uuid::Uuid;

use crate::error::{LampError, Result};
use crate::protocol::LAMP_SERVICES;

/// Characteristic-level access to one connected lamp.
///
/// Calls are single request/response exchanges.  Implementations are not
/// required to order overlapping calls on the same characteristic.
#[async_trait]
pub trait LampLink: Send + Sync {
    /// Whether `uuid` was found during discovery.
    fn has_characteristic(&self, uuid: Uuid) -> bool;

    async fn read(&self, uuid: Uuid) -> Result<Vec<u8>>;

    async fn write(&self, uuid: Uuid, payload: &[u8]) -> Result<()>;

    async fn is_connected(&self) -> bool;

    async fn disconnect(&self) -> Result<()>;
}

/// [`LampLink`] over a connected btleplug peripheral.
pub struct BtleLink {
    peripheral: Peripheral,
    characteristics: BTreeSet<Characteristic>,
    write_type: WriteType,
}

impl BtleLink {
    /// Wrap a peripheral whose services have already been discovered.
    ///
    /// Only characteristics belonging to the lamp services are kept, so a
    /// vendor characteristic elsewhere that happens to reuse a UUID suffix
    /// cannot be picked up by mistake.
    pub fn new(peripheral: Peripheral, write_type: WriteType) -> Self {
        let characteristics = peripheral
            .characteristics()
            .into_iter()
            .filter(|c| LAMP_SERVICES.contains(&c.service_uuid))
            .collect();
        Self {
            peripheral,
            characteristics,
            write_type,
        }
    }

    fn find(&self, uuid: Uuid) -> Result<&Characteristic> {
        self.characteristics
            .iter()
            .find(|c| c.uuid == uuid)
            .ok_or(LampError::CharacteristicNotFound(uuid))
    }
}

#[async_trait]
impl LampLink for BtleLink {
    fn has_characteristic(&self, uuid: Uuid) -> bool {
        self.characteristics.iter().any(|c| c.uuid == uuid)
    }

    async fn read(&self, uuid: Uuid) -> Result<Vec<u8>> {
        let characteristic = self.find(uuid)?;
        Ok(self.peripheral.read(characteristic).await?)
    }

    async fn write(&self, uuid: Uuid, payload: &[u8]) -> Result<()> {
        let characteristic = self.find(uuid)?;
        self.peripheral
            .write(characteristic, payload, self.write_type)
            .await?;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<()> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}
