use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Lifecycle of the single BLE link owned by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    ServicesDiscovered,
}

impl LinkState {
    /// True once the platform reported the link up, whether or not service
    /// discovery has finished (or succeeded).
    pub fn is_link_up(self) -> bool {
        matches!(self, LinkState::Connected | LinkState::ServicesDiscovered)
    }
}

/// Identity of one link attempt.
///
/// Every platform callback carries the id of the link it belongs to, so
/// results from a link that was already torn down can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub u64);

/// Outcome reported with a discovery completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GattStatus {
    Success,
    Failure,
}

/// One GATT service as reported by the platform after discovery.
#[derive(Debug, Clone)]
pub struct DiscoveredService {
    pub uuid: Uuid,
    pub characteristics: Vec<Uuid>,
}

/// Reference to a writable characteristic on a specific link.
///
/// Invalid once that link is gone; the link tag lets the platform reject a
/// handle that outlived its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicHandle {
    pub link: LinkId,
    pub uuid: Uuid,
}

/// Asynchronous platform notifications for a link.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    LinkEstablished(LinkId),
    LinkLost(LinkId),
    DiscoveryCompleted {
        link: LinkId,
        status: GattStatus,
        services: Vec<DiscoveredService>,
    },
}

impl LinkEvent {
    /// The link this event belongs to.
    pub fn link(&self) -> LinkId {
        match self {
            LinkEvent::LinkEstablished(link) | LinkEvent::LinkLost(link) => *link,
            LinkEvent::DiscoveryCompleted { link, .. } => *link,
        }
    }
}

/// Validated `AA:BB:CC:DD:EE:FF` peripheral address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddress(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid device address: {0}")]
pub struct AddressParseError(pub String);

impl FromStr for DeviceAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets: Vec<&str> = s.split(':').collect();
        let well_formed = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if well_formed {
            Ok(DeviceAddress(s.to_ascii_uppercase()))
        } else {
            Err(AddressParseError(s.to_string()))
        }
    }
}

impl DeviceAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requests sent from the UI to the bluetooth worker.
#[derive(Debug, Clone)]
pub enum BleCommand {
    Refresh,
    SetLedBits { orange: u8, red: u8 },
    SetBlinkMode(u8),
    StartScan,
    StopScan,
    Teardown,
}

/// Notifications the worker posts back to the UI context.
///
/// The UI never receives error objects; failures inside the worker surface
/// only as the controls staying (or becoming) disabled.
#[derive(Debug, Clone)]
pub enum AppEvent {
    ControlsEnabled(bool),
    DeviceAddress(Option<String>),
    DeviceFound(ScannedDevice),
    ScanStopped,
}

/// A peripheral seen while picking a device.
#[derive(Debug, Clone)]
pub struct ScannedDevice {
    pub name: String,
    pub address: String,
    pub rssi: Option<i16>,
}

/// Top-level UI tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parses_and_normalizes() {
        let address: DeviceAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(address.as_str(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_address_rejects_malformed_input() {
        assert!("".parse::<DeviceAddress>().is_err());
        assert!("AA:BB:CC:DD:EE".parse::<DeviceAddress>().is_err());
        assert!("AA:BB:CC:DD:EE:GG".parse::<DeviceAddress>().is_err());
        assert!("AABBCCDDEEFF".parse::<DeviceAddress>().is_err());
    }

    #[test]
    fn test_event_link_tag() {
        let event = LinkEvent::DiscoveryCompleted {
            link: LinkId(7),
            status: GattStatus::Success,
            services: Vec::new(),
        };
        assert_eq!(event.link(), LinkId(7));
    }
}
