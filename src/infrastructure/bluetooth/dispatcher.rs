//! Command Dispatcher
//!
//! Turns switch and button actions into best-effort writes against the LED
//! service. Preconditions (link up, characteristic present) are checked
//! locally and a failed check is a logged no-op; the firmware offers no
//! delivery confirmation, so a submitted write is the end of the story.

use crate::domain::models::CharacteristicHandle;
use crate::infrastructure::bluetooth::connection::ConnectionManager;
use crate::infrastructure::bluetooth::platform::BlePlatform;
use crate::infrastructure::bluetooth::protocol::{self, LedBitMask};
use tracing::{info, warn};
use uuid::Uuid;

pub struct CommandDispatcher<'a, P: BlePlatform> {
    manager: &'a mut ConnectionManager<P>,
}

impl<'a, P: BlePlatform> CommandDispatcher<'a, P> {
    pub fn new(manager: &'a mut ConnectionManager<P>) -> Self {
        Self { manager }
    }

    /// Write the two LED group masks, byte 0 orange and byte 1 red.
    pub fn set_led_bits(&mut self, orange: u8, red: u8) {
        let mask = LedBitMask::new(orange, red);
        info!("set_led_bits: {:02X} {:02X}", mask.orange, mask.red);

        let Some(characteristic) = self.led_characteristic(protocol::LED_BITS_CHAR_UUID) else {
            return;
        };
        if !self.manager.submit_write(&characteristic, &mask.payload()) {
            warn!("set_led_bits: write submission was rejected");
        }
    }

    /// Select a blink pattern with a single mode byte.
    pub fn set_blink_mode(&mut self, mode: u8) {
        info!("set_blink_mode: {}", mode);

        let Some(characteristic) = self.led_characteristic(protocol::LED_MODE_CHAR_UUID) else {
            return;
        };
        if !self
            .manager
            .submit_write(&characteristic, &protocol::blink_mode_payload(mode))
        {
            warn!("set_blink_mode: write submission was rejected");
        }
    }

    fn led_characteristic(&self, uuid: Uuid) -> Option<CharacteristicHandle> {
        if !self.manager.state().is_link_up() {
            warn!("No active link, ignoring command");
            return None;
        }
        let Some(service) = self
            .manager
            .catalog()
            .find_service(protocol::LED_SERVICE_UUID)
        else {
            warn!(
                "LED service ({}) is not present on this peripheral",
                protocol::LED_SERVICE_UUID
            );
            return None;
        };
        let Some(characteristic) = service.find_characteristic(uuid) else {
            warn!(
                "Characteristic ({}) is not present in LED service ({})",
                uuid,
                service.uuid()
            );
            return None;
        };
        Some(*characteristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{DiscoveredService, GattStatus, LinkEvent};
    use crate::infrastructure::bluetooth::connection::tests::{
        connect_and_discover, manager, TEST_ADDRESS,
    };
    use crate::infrastructure::bluetooth::platform::mock::MockPlatform;

    #[test]
    fn test_no_write_without_link() {
        let (mut manager, _rx) = manager(MockPlatform::ready());

        CommandDispatcher::new(&mut manager).set_led_bits(0xFF, 0xFF);
        CommandDispatcher::new(&mut manager).set_blink_mode(1);
        assert!(manager.platform().writes.is_empty());
    }

    #[test]
    fn test_no_write_before_discovery() {
        let (mut manager, _rx) = manager(MockPlatform::ready());
        manager.refresh(Some(TEST_ADDRESS)).unwrap();
        let link = manager.link().unwrap();
        manager.handle_event(LinkEvent::LinkEstablished(link));

        // Controls are already enabled here, but the catalog is still empty
        CommandDispatcher::new(&mut manager).set_led_bits(0x01, 0x02);
        assert!(manager.platform().writes.is_empty());
    }

    #[test]
    fn test_no_write_when_characteristic_missing() {
        let (mut manager, _rx) = manager(MockPlatform::ready());
        manager.refresh(Some(TEST_ADDRESS)).unwrap();
        let link = manager.link().unwrap();
        manager.handle_event(LinkEvent::LinkEstablished(link));
        manager.handle_event(LinkEvent::DiscoveryCompleted {
            link,
            status: GattStatus::Success,
            services: vec![DiscoveredService {
                uuid: protocol::LED_SERVICE_UUID,
                characteristics: vec![protocol::LED_MODE_CHAR_UUID],
            }],
        });

        CommandDispatcher::new(&mut manager).set_led_bits(0x01, 0x02);
        assert!(manager.platform().writes.is_empty());

        // The mode characteristic is present and still writable
        CommandDispatcher::new(&mut manager).set_blink_mode(3);
        assert_eq!(manager.platform().writes.len(), 1);
    }

    #[test]
    fn test_led_bits_payload_layout() {
        let (mut manager, _rx) = manager(MockPlatform::ready());
        let link = connect_and_discover(&mut manager);

        CommandDispatcher::new(&mut manager).set_led_bits(0b1011_0000, 0b0000_0001);

        let writes = &manager.platform().writes;
        assert_eq!(writes.len(), 1);
        let (write_link, uuid, payload) = &writes[0];
        assert_eq!(*write_link, link);
        assert_eq!(*uuid, protocol::LED_BITS_CHAR_UUID);
        assert_eq!(payload.as_slice(), &[0xB0, 0x01]);
    }

    #[test]
    fn test_blink_mode_payload_layout() {
        let (mut manager, _rx) = manager(MockPlatform::ready());
        connect_and_discover(&mut manager);

        CommandDispatcher::new(&mut manager).set_blink_mode(12);

        let writes = &manager.platform().writes;
        assert_eq!(writes.len(), 1);
        let (_, uuid, payload) = &writes[0];
        assert_eq!(*uuid, protocol::LED_MODE_CHAR_UUID);
        assert_eq!(payload.as_slice(), &[0x0C]);
    }

    #[test]
    fn test_rejected_submission_is_absorbed() {
        let (mut manager, _rx) = manager(MockPlatform::ready());
        connect_and_discover(&mut manager);
        manager.platform_mut().accept_writes = false;

        // Logged as a warning, nothing surfaces to the caller
        CommandDispatcher::new(&mut manager).set_led_bits(0x0F, 0xF0);
        assert_eq!(manager.platform().writes.len(), 1);
    }

    #[test]
    fn test_no_write_after_disconnect() {
        let (mut manager, _rx) = manager(MockPlatform::ready());
        let link = connect_and_discover(&mut manager);
        manager.handle_event(LinkEvent::LinkLost(link));

        CommandDispatcher::new(&mut manager).set_led_bits(0xFF, 0xFF);
        assert!(manager.platform().writes.is_empty());
    }
}
