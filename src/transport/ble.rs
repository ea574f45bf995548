//! Bluetooth LE backend built on btleplug.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures_util::StreamExt;

use crate::errors::{RoverError, RoverResult};
use crate::executor::command::Command;
use crate::transport::discovery::{ScanAdapter, ScannedPeripheral};
use crate::transport::link::{ChannelAddress, CommandLink};

/// Every Bluetooth adapter the OS exposes.
pub async fn system_adapters() -> RoverResult<Vec<BleAdapter>> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    tracing::debug!(count = adapters.len(), "bluetooth adapters enumerated");
    Ok(adapters.into_iter().map(|inner| BleAdapter { inner }).collect())
}

pub struct BleAdapter {
    inner: Adapter,
}

#[async_trait]
impl ScanAdapter for BleAdapter {
    type Peripheral = BlePeripheral;

    async fn identifier(&self) -> String {
        self.inner
            .adapter_info()
            .await
            .unwrap_or_else(|e| format!("<unknown adapter: {e}>"))
    }

    async fn scan(&self, window: Duration) -> RoverResult<Vec<BlePeripheral>> {
        let mut events = self.inner.events().await?;
        self.inner.start_scan(ScanFilter::default()).await?;

        let deadline = tokio::time::sleep(window);
        tokio::pin!(deadline);
        let mut events_open = true;
        let mut seen = HashSet::new();
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                event = events.next(), if events_open => match event {
                    Some(CentralEvent::DeviceDiscovered(id)) => {
                        tracing::debug!(peripheral = ?id, "device discovered");
                        seen.insert(id);
                    }
                    Some(CentralEvent::DeviceUpdated(id)) => {
                        seen.insert(id);
                    }
                    Some(_) => {}
                    None => events_open = false,
                },
            }
        }
        self.inner.stop_scan().await?;

        // The adapter caches everything since start-up; keep this window's only.
        let cached = self.inner.peripherals().await?;
        let mut found = Vec::new();
        for peripheral in seen_this_window(cached, &seen, |p| p.id()) {
            let local_name = peripheral
                .properties()
                .await?
                .and_then(|props| props.local_name);
            let address = peripheral.address().to_string();
            tracing::debug!(name = ?local_name, address = %address, "found peripheral");
            found.push(BlePeripheral {
                inner: peripheral,
                local_name,
                address,
            });
        }
        Ok(found)
    }
}

fn seen_this_window<T, K, F>(items: Vec<T>, seen: &HashSet<K>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    items.into_iter().filter(|item| seen.contains(&key(item))).collect()
}

pub struct BlePeripheral {
    inner: Peripheral,
    local_name: Option<String>,
    address: String,
}

#[async_trait]
impl ScannedPeripheral for BlePeripheral {
    type Link = BleLink;

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn address(&self) -> String {
        self.address.clone()
    }

    async fn connect(&self, channel: ChannelAddress) -> RoverResult<BleLink> {
        self.inner.connect().await?;
        self.inner.discover_services().await?;

        let characteristic = self
            .inner
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == channel.characteristic && c.service_uuid == channel.service)
            .ok_or_else(|| {
                RoverError::Config(format!(
                    "peripheral {} has no characteristic {} in service {}",
                    self.address, channel.characteristic, channel.service
                ))
            })?;

        Ok(BleLink {
            peripheral: self.inner.clone(),
            characteristic,
        })
    }
}

/// The one open connection to the robot. Held for the life of the process.
pub struct BleLink {
    peripheral: Peripheral,
    characteristic: Characteristic,
}

#[async_trait]
impl CommandLink for BleLink {
    async fn send(&self, command: &Command) -> RoverResult<()> {
        let connected = self
            .peripheral
            .is_connected()
            .await
            .map_err(|e| RoverError::LinkWriteFailed(e.to_string()))?;
        if !connected {
            return Err(RoverError::LinkWriteFailed("peripheral disconnected".into()));
        }

        self.peripheral
            .write(&self.characteristic, &command.to_wire_bytes(), WriteType::WithResponse)
            .await
            .map_err(|e| RoverError::LinkWriteFailed(e.to_string()))?;
        tracing::debug!(command = %command, "command written");
        Ok(())
    }
}
