//! GATT graph snapshot.
//!
//! The host tracks which service a characteristic belongs to but not which
//! service includes a secondary service. The snapshot is taken fresh for each
//! mapping call, so parentage is recovered by searching it rather than by
//! keeping back-pointers.

use uuid::Uuid;

/// Whether a service is primary or secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceKind {
    /// A top-level service.
    #[default]
    Primary,
    /// A service that is only reachable as an included service.
    Secondary,
}

impl ServiceKind {
    /// Check if primary.
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// Reference from a characteristic to the service that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceRef {
    pub uuid: Uuid,
    pub kind: ServiceKind,
}

/// A descriptor snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattDescriptor {
    pub uuid: Uuid,
    pub characteristic_uuid: Uuid,
    pub service_uuid: Uuid,
    pub value: Option<Vec<u8>>,
}

/// A characteristic snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattCharacteristic {
    pub uuid: Uuid,
    /// The service that declares this characteristic.
    pub service: ServiceRef,
    /// Raw properties bitmask.
    pub properties: u32,
    /// Cached value; `None` until read or notified.
    pub value: Option<Vec<u8>>,
    pub descriptors: Vec<GattDescriptor>,
}

/// A service snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattService {
    pub uuid: Uuid,
    pub kind: ServiceKind,
    pub characteristics: Vec<GattCharacteristic>,
    pub included_services: Vec<GattService>,
}

impl GattService {
    /// Create an empty service.
    pub fn new(uuid: Uuid, kind: ServiceKind) -> Self {
        Self {
            uuid,
            kind,
            characteristics: Vec::new(),
            included_services: Vec::new(),
        }
    }

    /// Reference to this service, for characteristics declared in it.
    pub fn service_ref(&self) -> ServiceRef {
        ServiceRef {
            uuid: self.uuid,
            kind: self.kind,
        }
    }
}

/// All top-level services discovered on one device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GattGraph {
    pub services: Vec<GattService>,
}

impl GattGraph {
    /// Create a graph from discovered services.
    pub fn new(services: Vec<GattService>) -> Self {
        Self { services }
    }

    /// Iterate the primary services in discovery order.
    pub fn primary_services(&self) -> impl Iterator<Item = &GattService> {
        self.services.iter().filter(|s| s.kind.is_primary())
    }
}
