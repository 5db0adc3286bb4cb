//! Service Catalog
//!
//! Lookup over the most recent discovery result. The catalog is rebuilt
//! wholesale on every successful discovery and cleared on disconnect; a
//! missing service or characteristic is a normal outcome, not an error.

use crate::domain::models::{CharacteristicHandle, DiscoveredService, LinkId};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    uuid: Uuid,
    characteristics: HashMap<Uuid, CharacteristicHandle>,
}

impl ServiceDescriptor {
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn find_characteristic(&self, uuid: Uuid) -> Option<&CharacteristicHandle> {
        self.characteristics.get(&uuid)
    }
}

#[derive(Debug, Default)]
pub struct ServiceCatalog {
    services: Vec<ServiceDescriptor>,
}

impl ServiceCatalog {
    pub fn find_service(&self, uuid: Uuid) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.uuid == uuid)
    }

    /// Replace the whole catalog with the services discovered on `link`.
    pub fn replace(&mut self, link: LinkId, services: &[DiscoveredService]) {
        self.services = services
            .iter()
            .map(|service| ServiceDescriptor {
                uuid: service.uuid,
                characteristics: service
                    .characteristics
                    .iter()
                    .map(|&uuid| (uuid, CharacteristicHandle { link, uuid }))
                    .collect(),
            })
            .collect();
    }

    pub fn clear(&mut self) {
        self.services.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bluetooth::protocol;

    fn led_service() -> DiscoveredService {
        DiscoveredService {
            uuid: protocol::LED_SERVICE_UUID,
            characteristics: vec![protocol::LED_BITS_CHAR_UUID, protocol::LED_MODE_CHAR_UUID],
        }
    }

    #[test]
    fn test_replace_then_find() {
        let mut catalog = ServiceCatalog::default();
        catalog.replace(LinkId(1), &[led_service()]);

        let service = catalog.find_service(protocol::LED_SERVICE_UUID).unwrap();
        let handle = service
            .find_characteristic(protocol::LED_BITS_CHAR_UUID)
            .unwrap();
        assert_eq!(handle.link, LinkId(1));
        assert_eq!(handle.uuid, protocol::LED_BITS_CHAR_UUID);
    }

    #[test]
    fn test_absent_lookups_are_none() {
        let mut catalog = ServiceCatalog::default();
        assert!(catalog.find_service(protocol::LED_SERVICE_UUID).is_none());

        catalog.replace(
            LinkId(1),
            &[DiscoveredService {
                uuid: protocol::LED_SERVICE_UUID,
                characteristics: vec![protocol::LED_MODE_CHAR_UUID],
            }],
        );
        let service = catalog.find_service(protocol::LED_SERVICE_UUID).unwrap();
        assert!(service
            .find_characteristic(protocol::LED_BITS_CHAR_UUID)
            .is_none());
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut catalog = ServiceCatalog::default();
        catalog.replace(LinkId(1), &[led_service()]);
        catalog.replace(
            LinkId(2),
            &[DiscoveredService {
                uuid: protocol::LED_SERVICE_UUID,
                characteristics: vec![protocol::LED_MODE_CHAR_UUID],
            }],
        );

        let service = catalog.find_service(protocol::LED_SERVICE_UUID).unwrap();
        assert!(service
            .find_characteristic(protocol::LED_BITS_CHAR_UUID)
            .is_none());
        let handle = service
            .find_characteristic(protocol::LED_MODE_CHAR_UUID)
            .unwrap();
        assert_eq!(handle.link, LinkId(2));
    }

    #[test]
    fn test_clear_empties_catalog() {
        let mut catalog = ServiceCatalog::default();
        catalog.replace(LinkId(1), &[led_service()]);
        assert!(!catalog.is_empty());

        catalog.clear();
        assert!(catalog.is_empty());
        assert!(catalog.find_service(protocol::LED_SERVICE_UUID).is_none());
    }
}
