//! GATT topology mapping.

use bytes::Bytes;
use tracing::trace;
use uuid::Uuid;

use crate::platform::device::PlatformDevice;
use crate::platform::gatt::{GattCharacteristic, GattDescriptor, GattGraph, GattService, ServiceRef};
use crate::uuids::to_canonical;
use crate::wire::{CharacteristicNode, CharacteristicProperties, DescriptorNode, ServiceNode};

/// Map every top-level service of a device.
pub fn map_services(device: &PlatformDevice, graph: &GattGraph) -> Vec<ServiceNode> {
    graph
        .services
        .iter()
        .map(|service| map_service(device, service, graph))
        .collect()
}

/// Map a service, its characteristics and its included services.
pub fn map_service(device: &PlatformDevice, service: &GattService, graph: &GattGraph) -> ServiceNode {
    ServiceNode {
        remote_id: device.address.clone(),
        uuid: to_canonical(&service.uuid),
        is_primary: service.kind.is_primary(),
        characteristics: service
            .characteristics
            .iter()
            .map(|c| map_characteristic(device, c, graph))
            .collect(),
        included_services: service
            .included_services
            .iter()
            .map(|s| map_service(device, s, graph))
            .collect(),
    }
}

/// Map a characteristic and resolve the primary service that owns it.
///
/// Characteristics declared in an included service are traced back to the
/// first primary service in `graph` that includes it. If none does, both
/// service fields are left empty.
pub fn map_characteristic(
    device: &PlatformDevice,
    characteristic: &GattCharacteristic,
    graph: &GattGraph,
) -> CharacteristicNode {
    let (service_uuid, secondary_service_uuid) = match resolve_owner(&characteristic.service, graph)
    {
        Some((primary, secondary)) => (
            Some(to_canonical(&primary)),
            secondary.as_ref().map(to_canonical),
        ),
        None => {
            trace!(
                "No primary service includes {} (owner of characteristic {})",
                characteristic.service.uuid,
                characteristic.uuid
            );
            (None, None)
        }
    };

    CharacteristicNode {
        remote_id: device.address.clone(),
        uuid: to_canonical(&characteristic.uuid),
        properties: CharacteristicProperties::from_bits(characteristic.properties),
        value: characteristic.value.as_deref().map(Bytes::copy_from_slice),
        descriptors: characteristic
            .descriptors
            .iter()
            .map(|d| map_descriptor(device, d))
            .collect(),
        service_uuid,
        secondary_service_uuid,
    }
}

/// Map a descriptor.
pub fn map_descriptor(device: &PlatformDevice, descriptor: &GattDescriptor) -> DescriptorNode {
    DescriptorNode {
        remote_id: device.address.clone(),
        uuid: to_canonical(&descriptor.uuid),
        characteristic_uuid: to_canonical(&descriptor.characteristic_uuid),
        service_uuid: to_canonical(&descriptor.service_uuid),
        value: descriptor.value.as_deref().map(Bytes::copy_from_slice),
    }
}

/// Returns `(primary, Some(included))` for a secondary owner, `(owner, None)`
/// for a primary one. The first primary service that includes the owner wins.
fn resolve_owner(owner: &ServiceRef, graph: &GattGraph) -> Option<(Uuid, Option<Uuid>)> {
    if owner.kind.is_primary() {
        return Some((owner.uuid, None));
    }

    graph.primary_services().find_map(|primary| {
        primary
            .included_services
            .iter()
            .find(|included| included.uuid == owner.uuid)
            .map(|included| (primary.uuid, Some(included.uuid)))
    })
}
