use std::collections::BTreeSet;

use serde::Serialize;

use super::naming::NameAllocator;
use super::topology::TopologyIndexer;
use super::{Interface, InterfaceType, RegistryResult};
use crate::ports::RawDeviceStore;

/// Ordered collection of known interfaces.
///
/// Methods taking `&self` never mutate and return independently owned
/// results. The only mutators are [`push`](Self::push) and
/// [`remove_if`](Self::remove_if).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct InterfaceRegistry {
    interfaces: Vec<Interface>,
}

impl InterfaceRegistry {
    pub fn new(interfaces: Vec<Interface>) -> Self {
        Self { interfaces }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interface> {
        self.interfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub fn push(&mut self, interface: Interface) {
        self.interfaces.push(interface);
    }

    /// First interface whose name, or detected name when unnamed, matches
    pub fn by_name(&self, name: &str) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|iface| iface.effective_name() == Some(name))
    }

    pub fn by_bus_id(&self, bus_id: &str) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|iface| iface.hardware().and_then(|hw| hw.bus_id()) == Some(bus_id))
    }

    pub fn by_type(&self, kind: InterfaceType) -> InterfaceRegistry {
        self.interfaces
            .iter()
            .filter(|iface| iface.kind() == kind)
            .cloned()
            .collect()
    }

    /// Hardware-backed interfaces of non-virtual types
    pub fn physical(&self) -> Vec<&Interface> {
        self.interfaces.iter().filter(|iface| iface.is_physical()).collect()
    }

    /// Current and previous names of every interface
    pub fn known_names(&self) -> BTreeSet<String> {
        self.interfaces
            .iter()
            .flat_map(|iface| [iface.old_name(), iface.name()])
            .flatten()
            .map(str::to_string)
            .collect()
    }

    /// Effective names in iteration order
    pub fn names(&self) -> Vec<&str> {
        self.interfaces.iter().filter_map(Interface::effective_name).collect()
    }

    /// Delete every matching interface in place
    pub fn remove_if<F>(&mut self, mut predicate: F) -> &mut Self
    where
        F: FnMut(&Interface) -> bool,
    {
        self.interfaces.retain(|iface| !predicate(iface));
        self
    }

    /// Both sequences concatenated, duplicates kept
    pub fn union(&self, other: &InterfaceRegistry) -> InterfaceRegistry {
        self.interfaces
            .iter()
            .chain(other.interfaces.iter())
            .cloned()
            .collect()
    }

    /// Interfaces with no value-equal counterpart in `other`
    pub fn difference(&self, other: &InterfaceRegistry) -> InterfaceRegistry {
        self.interfaces
            .iter()
            .filter(|iface| !other.interfaces.contains(iface))
            .cloned()
            .collect()
    }

    pub fn equals(&self, other: &InterfaceRegistry) -> bool {
        self.difference(other).is_empty() && other.difference(self).is_empty()
    }

    pub fn name_allocator(&self) -> NameAllocator<'_> {
        NameAllocator::new(self)
    }

    pub fn free_name(&self, prefix: &str) -> RegistryResult<String> {
        self.name_allocator().free_name(prefix)
    }

    pub fn free_names(&self, prefix: &str, count: usize) -> RegistryResult<Vec<String>> {
        self.name_allocator().free_names(prefix, count)
    }

    /// Bond and bridge membership read from `store` at call time
    pub fn topology<'a>(&self, store: &'a dyn RawDeviceStore) -> TopologyIndexer<'a> {
        TopologyIndexer::new(store)
    }
}

impl PartialEq for InterfaceRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for InterfaceRegistry {}

impl FromIterator<Interface> for InterfaceRegistry {
    fn from_iter<I: IntoIterator<Item = Interface>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<Interface> for InterfaceRegistry {
    fn extend<I: IntoIterator<Item = Interface>>(&mut self, iter: I) {
        self.interfaces.extend(iter);
    }
}

impl IntoIterator for InterfaceRegistry {
    type Item = Interface;
    type IntoIter = std::vec::IntoIter<Interface>;

    fn into_iter(self) -> Self::IntoIter {
        self.interfaces.into_iter()
    }
}

impl<'a> IntoIterator for &'a InterfaceRegistry {
    type Item = &'a Interface;
    type IntoIter = std::slice::Iter<'a, Interface>;

    fn into_iter(self) -> Self::IntoIter {
        self.interfaces.iter()
    }
}

impl From<Vec<Interface>> for InterfaceRegistry {
    fn from(interfaces: Vec<Interface>) -> Self {
        Self::new(interfaces)
    }
}
