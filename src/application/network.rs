use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::{
    DeviceClass, Interface, InterfaceRegistry, InterfaceType, MembershipIndex, RegistryError, RegistryResult, TopologyIndex,
    TopologyIndexer,
};
use crate::ports::{HardwareInventory, RawDeviceStore};

/// `BOOTPROTO` values that mean "no IP configuration"
const UNCONFIGURED_BOOTPROTO: [&str; 2] = ["", "none"];

/// Interface plus the composite devices it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceView {
    #[serde(flatten)]
    pub interface: Interface,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bond_master: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge_master: Option<String>,
}

/// Answers editor-level questions about the current network configuration.
///
/// Every call reads both ports again, so results never go stale.
pub struct NetworkService {
    store: Arc<dyn RawDeviceStore>,
    inventory: Arc<dyn HardwareInventory>,
}

impl NetworkService {
    pub fn new(store: Arc<dyn RawDeviceStore>, inventory: Arc<dyn HardwareInventory>) -> Self {
        Self { store, inventory }
    }

    pub fn indexer(&self) -> TopologyIndexer<'_> {
        TopologyIndexer::new(self.store.as_ref())
    }

    /// Build a registry from detected hardware and configured devices
    pub fn registry(&self) -> InterfaceRegistry {
        let mut registry = InterfaceRegistry::default();

        for hardware in self.inventory.descriptors() {
            let detected = hardware.detected_name().map(str::to_string);
            let configured = detected.as_deref().and_then(|name| self.store.find_record(name));

            let interface = match (detected, configured) {
                (Some(name), Some((class, _))) => {
                    Interface::named(name, class.interface_type()).with_hardware(hardware)
                }
                (Some(name), None) => {
                    let kind = InterfaceType::from_device_name(&name);
                    Interface::from_hardware(hardware, kind)
                }
                (None, _) => Interface::from_hardware(hardware, InterfaceType::Ethernet),
            };
            registry.push(interface);
        }

        for class in DeviceClass::ALL {
            for name in self.store.records_for(class).into_keys() {
                if registry.by_name(&name).is_none() {
                    registry.push(Interface::named(name, class.interface_type()));
                }
            }
        }

        debug!("Built registry with {} interfaces", registry.len());
        registry
    }

    pub fn interface(&self, name: &str) -> RegistryResult<Interface> {
        self.registry()
            .by_name(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Registry entries annotated with their bond and bridge masters
    pub fn interface_views(&self) -> Vec<InterfaceView> {
        let TopologyIndex { bonds, bridges, .. } = self.topology();

        self.registry()
            .into_iter()
            .map(|interface| {
                let lookup = |index: &MembershipIndex| {
                    interface.effective_name().and_then(|name| index.get(name).cloned())
                };
                InterfaceView {
                    bond_master: lookup(&bonds),
                    bridge_master: lookup(&bridges),
                    interface,
                }
            })
            .collect()
    }

    pub fn topology(&self) -> TopologyIndex {
        self.indexer().snapshot()
    }

    pub fn bond_slaves(&self, bond: &str) -> Vec<String> {
        self.indexer().bond_slaves(bond)
    }

    pub fn bridge_slaves(&self, bridge: &str) -> Vec<String> {
        self.indexer().bridge_slaves(bridge)
    }

    /// True if the device carries its own IP configuration
    pub fn has_ip_config(&self, name: &str) -> bool {
        self.store
            .find_record(name)
            .and_then(|(_, record)| record.get("BOOTPROTO").cloned())
            .is_some_and(|proto| !UNCONFIGURED_BOOTPROTO.contains(&proto.trim()))
    }

    pub fn already_configured(&self, names: &[String]) -> bool {
        names.iter().any(|name| self.has_ip_config(name))
    }

    /// Interfaces that may be enslaved into `bond`
    pub fn bond_candidates(&self, bond: &str) -> Vec<Interface> {
        let TopologyIndex { bonds, bridges, .. } = self.topology();

        self.registry()
            .into_iter()
            .filter(|iface| !matches!(iface.kind(), InterfaceType::Bond | InterfaceType::Bridge))
            .filter(|iface| match iface.effective_name() {
                Some(name) => {
                    name != bond
                        && bonds.get(name).map_or(true, |master| master == bond)
                        && !bridges.contains_key(name)
                        && !self.has_ip_config(name)
                }
                None => false,
            })
            .collect()
    }

    /// Interfaces that may become ports of `bridge`
    pub fn bridge_candidates(&self, bridge: &str) -> Vec<Interface> {
        let TopologyIndex { bonds, bridges, .. } = self.topology();

        self.registry()
            .into_iter()
            .filter(|iface| iface.kind() != InterfaceType::Bridge)
            .filter(|iface| match iface.effective_name() {
                Some(name) => {
                    name != bridge
                        && bridges.get(name).map_or(true, |master| master == bridge)
                        && !bonds.contains_key(name)
                }
                None => false,
            })
            .collect()
    }

    pub fn free_names(&self, prefix: &str, count: usize) -> RegistryResult<Vec<String>> {
        self.registry().free_names(prefix, count)
    }

    /// Default name for a new device of the given type
    pub fn propose_name(&self, kind: InterfaceType) -> RegistryResult<String> {
        self.registry().free_name(kind.name_prefix())
    }
}
