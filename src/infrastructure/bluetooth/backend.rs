//! btleplug Backend
//!
//! [`BlePlatform`] implementation over btleplug. Every trait call returns
//! immediately; the actual radio work runs on spawned tasks that report back
//! through the [`LinkEvent`] channel, tagged with the link they belong to so
//! the state machine can discard results of a link it no longer owns.

use crate::domain::models::{
    CharacteristicHandle, DeviceAddress, DiscoveredService, GattStatus, LinkEvent, LinkId,
};
use crate::infrastructure::bluetooth::platform::BlePlatform;
use anyhow::Result;
use btleplug::api::{
    BDAddr, Central, CentralEvent, CharPropFlags, Manager as _, Peripheral as _, ScanFilter,
    WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How long a connect attempt keeps scanning for the target address before
/// giving up and reporting the link as lost.
const CONNECT_SCAN_WINDOW: Duration = Duration::from_secs(10);

/// Poll interval while waiting for the target to show up in scan results.
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(250);

struct ActiveLink {
    id: LinkId,
    // Filled in once the connect task succeeds
    peripheral: Option<Peripheral>,
}

pub struct BtleplugPlatform {
    handle: Handle,
    adapter: Option<Adapter>,
    events: mpsc::UnboundedSender<LinkEvent>,
    next_link: u64,
    active: Arc<Mutex<Option<ActiveLink>>>,
}

impl BtleplugPlatform {
    pub async fn new(events: mpsc::UnboundedSender<LinkEvent>) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapter = manager.adapters().await?.into_iter().next();
        match &adapter {
            Some(adapter) => info!("Using adapter {:?}", adapter.adapter_info().await.ok()),
            None => warn!("No bluetooth adapter found"),
        }

        Ok(Self {
            handle: Handle::current(),
            adapter,
            events,
            next_link: 0,
            active: Arc::new(Mutex::new(None)),
        })
    }

    /// Adapter handle for the device-picker scan.
    pub fn adapter(&self) -> Option<Adapter> {
        self.adapter.clone()
    }

    fn peripheral_for(&self, link: LinkId) -> Option<Peripheral> {
        match self.active.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(current) if current.id == link => current.peripheral.clone(),
                _ => None,
            },
            Err(_) => None,
        }
    }
}

impl BlePlatform for BtleplugPlatform {
    fn adapter_available(&self) -> bool {
        self.adapter.is_some()
    }

    // btleplug exposes no synchronous power query; an adapter that is off
    // fails the connect attempt, which arrives as LinkLost.
    fn adapter_enabled(&self) -> bool {
        self.adapter.is_some()
    }

    fn connect(&mut self, address: &DeviceAddress) -> LinkId {
        self.next_link += 1;
        let link = LinkId(self.next_link);
        if let Ok(mut slot) = self.active.lock() {
            *slot = Some(ActiveLink {
                id: link,
                peripheral: None,
            });
        }

        let Some(adapter) = self.adapter.clone() else {
            let _ = self.events.send(LinkEvent::LinkLost(link));
            return link;
        };

        let events = self.events.clone();
        let active = Arc::clone(&self.active);
        let address = address.clone();
        self.handle.spawn(async move {
            let peripheral = match establish(&adapter, &address).await {
                Ok(peripheral) => peripheral,
                Err(e) => {
                    warn!("Connection to {} failed: {:#}", address, e);
                    let _ = events.send(LinkEvent::LinkLost(link));
                    return;
                }
            };

            let superseded = match active.lock() {
                Ok(mut slot) => match slot.as_mut() {
                    Some(current) if current.id == link => {
                        current.peripheral = Some(peripheral.clone());
                        false
                    }
                    _ => true,
                },
                Err(_) => true,
            };
            if superseded {
                debug!("Link {:?} was torn down while connecting", link);
                let _ = peripheral.disconnect().await;
                return;
            }

            let _ = events.send(LinkEvent::LinkEstablished(link));
            watch_for_disconnect(&adapter, peripheral.id(), link, &events).await;
        });
        link
    }

    fn disconnect(&mut self, link: LinkId) {
        let released = match self.active.lock() {
            Ok(mut slot) => match slot.as_ref() {
                Some(current) if current.id == link => slot.take(),
                _ => None,
            },
            Err(_) => None,
        };
        if let Some(ActiveLink {
            peripheral: Some(peripheral),
            ..
        }) = released
        {
            self.handle.spawn(async move {
                if let Err(e) = peripheral.disconnect().await {
                    debug!("Error while closing link: {}", e);
                }
            });
        }
    }

    fn discover_services(&mut self, link: LinkId) -> bool {
        let Some(peripheral) = self.peripheral_for(link) else {
            return false;
        };

        let events = self.events.clone();
        self.handle.spawn(async move {
            let event = match peripheral.discover_services().await {
                Ok(()) => LinkEvent::DiscoveryCompleted {
                    link,
                    status: GattStatus::Success,
                    services: collect_services(&peripheral),
                },
                Err(e) => {
                    warn!("Service discovery failed: {}", e);
                    LinkEvent::DiscoveryCompleted {
                        link,
                        status: GattStatus::Failure,
                        services: Vec::new(),
                    }
                }
            };
            let _ = events.send(event);
        });
        true
    }

    fn write_characteristic(
        &mut self,
        link: LinkId,
        characteristic: &CharacteristicHandle,
        payload: &[u8],
    ) -> bool {
        if characteristic.link != link {
            return false;
        }
        let Some(peripheral) = self.peripheral_for(link) else {
            return false;
        };
        let Some(target) = peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == characteristic.uuid)
        else {
            return false;
        };

        // Fire and forget; nothing in the protocol confirms delivery
        let write_type = if target.properties.contains(CharPropFlags::WRITE_WITHOUT_RESPONSE) {
            WriteType::WithoutResponse
        } else {
            WriteType::WithResponse
        };
        let payload = payload.to_vec();
        self.handle.spawn(async move {
            if let Err(e) = peripheral.write(&target, &payload, write_type).await {
                warn!("Characteristic write failed: {}", e);
            }
        });
        true
    }
}

/// Scan until the target address shows up, then connect to it.
async fn establish(adapter: &Adapter, address: &DeviceAddress) -> Result<Peripheral> {
    let target: BDAddr = address.as_str().parse()?;

    adapter.start_scan(ScanFilter::default()).await?;
    let found = find_peripheral(adapter, target).await;
    if let Err(e) = adapter.stop_scan().await {
        debug!("Failed to stop scan cleanly: {}", e);
    }
    let peripheral = found?;

    if !peripheral.is_connected().await? {
        peripheral.connect().await?;
    }
    Ok(peripheral)
}

async fn find_peripheral(adapter: &Adapter, target: BDAddr) -> Result<Peripheral> {
    let deadline = tokio::time::Instant::now() + CONNECT_SCAN_WINDOW;
    loop {
        for peripheral in adapter.peripherals().await? {
            if peripheral.address() == target {
                return Ok(peripheral);
            }
        }
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("device {} not seen during scan", target);
        }
        tokio::time::sleep(SCAN_POLL_INTERVAL).await;
    }
}

fn collect_services(peripheral: &Peripheral) -> Vec<DiscoveredService> {
    peripheral
        .services()
        .into_iter()
        .map(|service| DiscoveredService {
            uuid: service.uuid,
            characteristics: service
                .characteristics
                .into_iter()
                .map(|characteristic| characteristic.uuid)
                .collect(),
        })
        .collect()
}

/// Follow the central event stream until this peripheral disconnects, then
/// report the link as lost. A manager-initiated teardown also lands here;
/// the resulting event is stale by then and gets ignored upstream.
async fn watch_for_disconnect(
    adapter: &Adapter,
    peripheral_id: PeripheralId,
    link: LinkId,
    events: &mpsc::UnboundedSender<LinkEvent>,
) {
    let mut stream = match adapter.events().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Cannot watch central events: {}", e);
            return;
        }
    };
    while let Some(event) = stream.next().await {
        if let CentralEvent::DeviceDisconnected(id) = event {
            if id == peripheral_id {
                let _ = events.send(LinkEvent::LinkLost(link));
                break;
            }
        }
    }
}
