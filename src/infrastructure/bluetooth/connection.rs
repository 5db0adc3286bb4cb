//! Link Lifecycle
//!
//! Owns the platform handle, the active link and the service catalog, and
//! drives the connection state machine from platform events. At most one
//! link exists at a time; starting a new attempt tears down the old link
//! first, and events tagged with a link that is no longer owned are ignored.

use crate::domain::models::{
    AppEvent, CharacteristicHandle, DeviceAddress, GattStatus, LinkEvent, LinkId, LinkState,
};
use crate::infrastructure::bluetooth::catalog::ServiceCatalog;
use crate::infrastructure::bluetooth::platform::{BlePlatform, ConnectError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct ConnectionManager<P: BlePlatform> {
    platform: P,
    link: Option<LinkId>,
    state: LinkState,
    catalog: ServiceCatalog,
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl<P: BlePlatform> ConnectionManager<P> {
    pub fn new(platform: P, event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            platform,
            link: None,
            state: LinkState::Disconnected,
            catalog: ServiceCatalog::default(),
            event_sender,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn link(&self) -> Option<LinkId> {
        self.link
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    #[cfg(test)]
    pub(crate) fn platform(&self) -> &P {
        &self.platform
    }

    #[cfg(test)]
    pub(crate) fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Tear down any prior link and start a fresh attempt against the
    /// configured address. On a precondition failure the state stays
    /// `Disconnected` and no platform call is made.
    pub fn refresh(&mut self, address: Option<&str>) -> Result<(), ConnectError> {
        if !self.platform.adapter_available() {
            return Err(ConnectError::AdapterUnavailable);
        }
        if !self.platform.adapter_enabled() {
            return Err(ConnectError::AdapterDisabled);
        }

        info!("Device address from settings: {:?}", address);
        self.notify(AppEvent::DeviceAddress(address.map(str::to_string)));

        let address = address
            .filter(|a| !a.is_empty())
            .ok_or(ConnectError::NotConfigured)?;
        let address: DeviceAddress = address
            .parse()
            .map_err(|_| ConnectError::InvalidAddress(address.to_string()))?;

        self.teardown();

        info!("Connecting to {}", address);
        let link = self.platform.connect(&address);
        self.link = Some(link);
        self.state = LinkState::Connecting;
        Ok(())
    }

    /// Consume one platform notification.
    pub fn handle_event(&mut self, event: LinkEvent) {
        if self.link != Some(event.link()) {
            debug!(?event, "Ignoring event for a link that is no longer owned");
            return;
        }

        match event {
            LinkEvent::LinkEstablished(link) => {
                info!("Link established, discovering services");
                self.state = LinkState::Connected;
                if !self.platform.discover_services(link) {
                    warn!("Service discovery request was not accepted");
                }
                self.notify(AppEvent::ControlsEnabled(true));
            }
            LinkEvent::DiscoveryCompleted {
                link,
                status,
                services,
            } => {
                info!(?status, "Service discovery completed");
                if status == GattStatus::Success {
                    self.catalog.replace(link, &services);
                    self.state = LinkState::ServicesDiscovered;
                } else {
                    // Link stays usable, there is just nothing to write to.
                    warn!("Service discovery failed, catalog left empty");
                }
                self.notify(AppEvent::ControlsEnabled(self.state.is_link_up()));
            }
            LinkEvent::LinkLost(_) => {
                info!("Link lost");
                self.teardown();
            }
        }
    }

    /// Drop the catalog and release the link. Safe to call repeatedly; the
    /// catalog is cleared before the link handle goes away.
    pub fn teardown(&mut self) {
        if !self.catalog.is_empty() {
            debug!("Dropping service catalog");
        }
        self.catalog.clear();
        if let Some(link) = self.link.take() {
            info!("Closing link");
            self.platform.disconnect(link);
        }
        self.state = LinkState::Disconnected;
        self.notify(AppEvent::ControlsEnabled(false));
    }

    /// Submit a best-effort write on the active link. Returns whether the
    /// submission was accepted.
    pub fn submit_write(&mut self, characteristic: &CharacteristicHandle, payload: &[u8]) -> bool {
        match self.link() {
            Some(link) if link == characteristic.link => {
                self.platform.write_characteristic(link, characteristic, payload)
            }
            _ => false,
        }
    }

    fn notify(&self, event: AppEvent) {
        let _ = self.event_sender.send(event);
    }
}
