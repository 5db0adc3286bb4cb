//! Platform Abstraction
//!
//! The connection state machine talks to the radio through this trait so it
//! can be exercised without one. No method blocks its caller: connect,
//! discovery and write calls are requests whose outcomes arrive later as
//! [`LinkEvent`]s on the worker channel.
//!
//! [`LinkEvent`]: crate::domain::models::LinkEvent

use crate::domain::models::{CharacteristicHandle, DeviceAddress, LinkId};
use thiserror::Error;

/// Why a connection attempt was not started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("bluetooth adapter is not available")]
    AdapterUnavailable,
    #[error("bluetooth adapter is not enabled")]
    AdapterDisabled,
    #[error("no device address is configured")]
    NotConfigured,
    #[error("invalid device address: {0}")]
    InvalidAddress(String),
}

pub trait BlePlatform {
    fn adapter_available(&self) -> bool;

    fn adapter_enabled(&self) -> bool;

    /// Begin connecting to `address` and return the identity of the new
    /// link. Progress is reported through events tagged with that identity.
    fn connect(&mut self, address: &DeviceAddress) -> LinkId;

    /// Release `link`. Safe to call for a link that is already gone.
    fn disconnect(&mut self, link: LinkId);

    /// Request service discovery on `link`. Returns whether the request was
    /// accepted; the result arrives as a `DiscoveryCompleted` event.
    fn discover_services(&mut self, link: LinkId) -> bool;

    /// Submit a characteristic write. Returns whether the submission was
    /// accepted; delivery is never confirmed by the peripheral.
    fn write_characteristic(
        &mut self,
        link: LinkId,
        characteristic: &CharacteristicHandle,
        payload: &[u8],
    ) -> bool;
}

#[cfg(test)]
pub mod mock {
    //! Radio-less platform recording every call for assertions.

    use super::*;
    use uuid::Uuid;

    pub struct MockPlatform {
        pub available: bool,
        pub enabled: bool,
        pub accept_discovery: bool,
        pub accept_writes: bool,
        next_link: u64,
        pub connects: Vec<(LinkId, String)>,
        pub disconnects: Vec<LinkId>,
        pub discovery_requests: Vec<LinkId>,
        pub writes: Vec<(LinkId, Uuid, Vec<u8>)>,
    }

    impl MockPlatform {
        /// An adapter that is present, powered and accepts everything.
        pub fn ready() -> Self {
            Self {
                available: true,
                enabled: true,
                accept_discovery: true,
                accept_writes: true,
                next_link: 0,
                connects: Vec::new(),
                disconnects: Vec::new(),
                discovery_requests: Vec::new(),
                writes: Vec::new(),
            }
        }
    }

    impl BlePlatform for MockPlatform {
        fn adapter_available(&self) -> bool {
            self.available
        }

        fn adapter_enabled(&self) -> bool {
            self.enabled
        }

        fn connect(&mut self, address: &DeviceAddress) -> LinkId {
            self.next_link += 1;
            let link = LinkId(self.next_link);
            self.connects.push((link, address.as_str().to_string()));
            link
        }

        fn disconnect(&mut self, link: LinkId) {
            self.disconnects.push(link);
        }

        fn discover_services(&mut self, link: LinkId) -> bool {
            self.discovery_requests.push(link);
            self.accept_discovery
        }

        fn write_characteristic(
            &mut self,
            link: LinkId,
            characteristic: &CharacteristicHandle,
            payload: &[u8],
        ) -> bool {
            self.writes.push((link, characteristic.uuid, payload.to_vec()));
            self.accept_writes
        }
    }
}
