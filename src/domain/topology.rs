use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{InterfaceType, RegistryError, RegistryResult};
use crate::ports::{RawDeviceStore, RawRecord};

/// Key prefix of bond slave slots (`BONDING_SLAVE0`, `BONDING_SLAVE1`, ...)
pub const BOND_SLAVE_PREFIX: &str = "BONDING_SLAVE";
pub const BOND_MASTER_KEY: &str = "BONDING_MASTER";
pub const BOND_MODULE_OPTS_KEY: &str = "BONDING_MODULE_OPTS";
/// Whitespace separated list of bridge ports
pub const BRIDGE_PORTS_KEY: &str = "BRIDGE_PORTS";

/// Member name -> master name
pub type MembershipIndex = BTreeMap<String, String>;

/// Raw configuration class a device record is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Eth,
    Wlan,
    Ib,
    Bond,
    Br,
    Vlan,
    Dummy,
    Tun,
    Tap,
    Lo,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 10] = [
        Self::Eth,
        Self::Wlan,
        Self::Ib,
        Self::Bond,
        Self::Br,
        Self::Vlan,
        Self::Dummy,
        Self::Tun,
        Self::Tap,
        Self::Lo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eth => "eth",
            Self::Wlan => "wlan",
            Self::Ib => "ib",
            Self::Bond => "bond",
            Self::Br => "br",
            Self::Vlan => "vlan",
            Self::Dummy => "dummy",
            Self::Tun => "tun",
            Self::Tap => "tap",
            Self::Lo => "lo",
        }
    }

    pub fn interface_type(&self) -> InterfaceType {
        match self {
            Self::Eth => InterfaceType::Ethernet,
            Self::Wlan => InterfaceType::Wireless,
            Self::Ib => InterfaceType::Infiniband,
            Self::Bond => InterfaceType::Bond,
            Self::Br => InterfaceType::Bridge,
            Self::Vlan => InterfaceType::Vlan,
            Self::Dummy => InterfaceType::Dummy,
            Self::Tun => InterfaceType::Tun,
            Self::Tap => InterfaceType::Tap,
            Self::Lo => InterfaceType::Loopback,
        }
    }

    pub fn for_type(kind: InterfaceType) -> Self {
        match kind {
            InterfaceType::Ethernet => Self::Eth,
            InterfaceType::Wireless => Self::Wlan,
            InterfaceType::Infiniband => Self::Ib,
            InterfaceType::Bond => Self::Bond,
            InterfaceType::Bridge => Self::Br,
            InterfaceType::Vlan => Self::Vlan,
            InterfaceType::Dummy => Self::Dummy,
            InterfaceType::Tun => Self::Tun,
            InterfaceType::Tap => Self::Tap,
            InterfaceType::Loopback => Self::Lo,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| format!("unknown device class: {}", s))
    }
}

/// Which kind of composite device a membership refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipKind {
    Bond,
    Bridge,
}

impl fmt::Display for MembershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bond => f.write_str("bond"),
            Self::Bridge => f.write_str("bridge"),
        }
    }
}

/// Bond device record with its slave slots parsed out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondRecord {
    pub name: String,
    /// (slot index, raw key suffix) -> slave name, empty slots dropped.
    ///
    /// The suffix keeps `SLAVE1` and `SLAVE01` apart.
    pub member_slots: BTreeMap<(u32, String), String>,
}

impl BondRecord {
    pub fn parse(name: &str, record: &RawRecord) -> Self {
        let mut member_slots = BTreeMap::new();

        for (key, value) in record {
            let Some(suffix) = key.strip_prefix(BOND_SLAVE_PREFIX) else {
                continue;
            };
            let slot = if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                suffix.parse::<u32>().ok()
            } else {
                None
            };
            let Some(slot) = slot else {
                debug!("Skipping malformed slave key {} in {}", key, name);
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            member_slots.insert((slot, suffix.to_string()), value.trim().to_string());
        }

        Self {
            name: name.to_string(),
            member_slots,
        }
    }

    /// Slave names in slot order
    pub fn slaves(&self) -> Vec<String> {
        self.member_slots.values().cloned().collect()
    }
}

/// Bridge device record with its port list split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRecord {
    pub name: String,
    pub ports: Vec<String>,
}

impl BridgeRecord {
    pub fn parse(name: &str, record: &RawRecord) -> Self {
        let ports = record
            .get(BRIDGE_PORTS_KEY)
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            ports,
        }
    }
}

/// A member found under two masters of the same kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipConflict {
    pub member: String,
    pub kind: MembershipKind,
    /// Master that lost the member
    pub first: String,
    /// Master that kept it
    pub second: String,
}

impl From<MembershipConflict> for RegistryError {
    fn from(conflict: MembershipConflict) -> Self {
        RegistryError::ConflictingMembership {
            member: conflict.member,
            kind: conflict.kind,
            first: conflict.first,
            second: conflict.second,
        }
    }
}

/// Both membership indices plus any conflicts found while building them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopologyIndex {
    pub bonds: MembershipIndex,
    pub bridges: MembershipIndex,
    pub conflicts: Vec<MembershipConflict>,
}

/// Computes bond and bridge membership from raw device records.
///
/// Nothing is cached; every call reads the store again.
#[derive(Clone, Copy)]
pub struct TopologyIndexer<'a> {
    store: &'a dyn RawDeviceStore,
}

impl<'a> TopologyIndexer<'a> {
    pub fn new(store: &'a dyn RawDeviceStore) -> Self {
        Self { store }
    }

    fn bond_records(&self) -> Vec<BondRecord> {
        self.store
            .records_for(DeviceClass::Bond)
            .iter()
            .map(|(name, record)| BondRecord::parse(name, record))
            .collect()
    }

    fn bridge_records(&self) -> Vec<BridgeRecord> {
        self.store
            .records_for(DeviceClass::Br)
            .iter()
            .map(|(name, record)| BridgeRecord::parse(name, record))
            .collect()
    }

    /// Slaves of `bond_name` in slot order; empty for unknown bonds
    pub fn bond_slaves(&self, bond_name: &str) -> Vec<String> {
        self.store
            .records_for(DeviceClass::Bond)
            .get(bond_name)
            .map(|record| BondRecord::parse(bond_name, record).slaves())
            .unwrap_or_default()
    }

    pub fn bond_index(&self) -> MembershipIndex {
        let (index, _) = self.build_bond_index();
        debug!("bond slaves index: {:?}", index);
        index
    }

    pub fn bridge_index(&self) -> MembershipIndex {
        let (index, _) = self.build_bridge_index();
        index
    }

    /// Ports of `bridge_name`, in the order its record lists them
    pub fn bridge_slaves(&self, bridge_name: &str) -> Vec<String> {
        let index = self.bridge_index();
        let mut slaves: Vec<String> = Vec::new();

        for record in self.bridge_records().into_iter().filter(|r| r.name == bridge_name) {
            for port in record.ports {
                if index.get(&port).map(String::as_str) == Some(bridge_name) && !slaves.contains(&port) {
                    slaves.push(port);
                }
            }
        }

        slaves
    }

    pub fn bond_master_of(&self, member: &str) -> Option<String> {
        self.bond_index().remove(member)
    }

    pub fn bridge_master_of(&self, member: &str) -> Option<String> {
        self.bridge_index().remove(member)
    }

    /// Both indices built from a single pass over the store
    pub fn snapshot(&self) -> TopologyIndex {
        let (bonds, mut conflicts) = self.build_bond_index();
        let (bridges, bridge_conflicts) = self.build_bridge_index();
        conflicts.extend(bridge_conflicts);

        TopologyIndex {
            bonds,
            bridges,
            conflicts,
        }
    }

    /// Members claimed by more than one master of the same kind
    pub fn conflicts(&self) -> Vec<MembershipConflict> {
        self.snapshot().conflicts
    }

    /// Fails on the first double-claimed member
    pub fn validate(&self) -> RegistryResult<()> {
        match self.conflicts().into_iter().next() {
            Some(conflict) => Err(conflict.into()),
            None => Ok(()),
        }
    }

    fn build_bond_index(&self) -> (MembershipIndex, Vec<MembershipConflict>) {
        let members = self
            .bond_records()
            .into_iter()
            .map(|record| (record.name.clone(), record.slaves()));
        build_index(MembershipKind::Bond, members)
    }

    fn build_bridge_index(&self) -> (MembershipIndex, Vec<MembershipConflict>) {
        let members = self
            .bridge_records()
            .into_iter()
            .map(|record| (record.name, record.ports));
        build_index(MembershipKind::Bridge, members)
    }
}

/// Last master wins; every overwrite is recorded as a conflict
fn build_index<I>(kind: MembershipKind, masters: I) -> (MembershipIndex, Vec<MembershipConflict>)
where
    I: IntoIterator<Item = (String, Vec<String>)>,
{
    let mut index = MembershipIndex::new();
    let mut conflicts = Vec::new();

    for (master, members) in masters {
        for member in members {
            if let Some(previous) = index.insert(member.clone(), master.clone()) {
                if previous != master {
                    warn!("{} is a {} member of both {} and {}", member, kind, previous, master);
                    conflicts.push(MembershipConflict {
                        member,
                        kind,
                        first: previous,
                        second: master.clone(),
                    });
                }
            }
        }
    }

    (index, conflicts)
}

/// Rewrite the bond keys of `record` to enslave `slaves`.
///
/// Stale slave slots are blanked rather than removed so a writer knows to
/// clear them.
pub fn apply_bond_slaves(record: &RawRecord, slaves: &[String], module_opts: Option<&str>) -> RawRecord {
    let mut updated = record.clone();

    updated.insert(BOND_MASTER_KEY.to_string(), "yes".to_string());
    if let Some(opts) = module_opts {
        updated.insert(BOND_MODULE_OPTS_KEY.to_string(), opts.to_string());
    }

    for value in updated
        .iter_mut()
        .filter(|(key, _)| key.starts_with(BOND_SLAVE_PREFIX))
        .map(|(_, value)| value)
    {
        value.clear();
    }

    for (slot, slave) in slaves.iter().enumerate() {
        updated.insert(format!("{}{}", BOND_SLAVE_PREFIX, slot), slave.clone());
    }

    updated
}

/// `BRIDGE_PORTS` value for the given ports
pub fn bridge_ports_value(ports: &[String]) -> String {
    ports.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use pretty_assertions::assert_eq;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn bond_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(
            DeviceClass::Bond,
            "bond0",
            record(&[
                ("BOOTPROTO", "static"),
                ("BONDING_MASTER", "yes"),
                ("BONDING_SLAVE0", "eth1"),
                ("BONDING_SLAVE1", "eth2"),
            ]),
        );
        store.insert(
            DeviceClass::Bond,
            "bond1",
            record(&[("BOOTPROTO", "static"), ("BONDING_MASTER", "yes")]),
        );
        store
    }

    #[test]
    fn test_bond_slaves() {
        let store = bond_store();
        let indexer = TopologyIndexer::new(&store);

        assert_eq!(indexer.bond_slaves("bond0"), strings(&["eth1", "eth2"]));
        assert!(indexer.bond_slaves("bond1").is_empty());
        assert!(indexer.bond_slaves("bond7").is_empty());
    }

    #[test]
    fn test_bond_index() {
        let store = bond_store();
        let indexer = TopologyIndexer::new(&store);

        let expected: MembershipIndex = [("eth1", "bond0"), ("eth2", "bond0")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(indexer.bond_index(), expected);
    }

    #[test]
    fn test_bond_slaves_numeric_slot_order() {
        let parsed = BondRecord::parse(
            "bond0",
            &record(&[
                ("BONDING_SLAVE10", "eth10"),
                ("BONDING_SLAVE2", "eth2"),
                ("BONDING_SLAVE0", "eth0"),
                ("BONDING_SLAVE1", ""),
                ("BONDING_SLAVEX", "bogus"),
                ("BONDING_SLAVE_3", "bogus"),
            ]),
        );
        assert_eq!(parsed.slaves(), strings(&["eth0", "eth2", "eth10"]));
    }

    #[test]
    fn test_bond_slaves_keep_zero_padded_slots() {
        let parsed = BondRecord::parse(
            "bond0",
            &record(&[
                ("BONDING_SLAVE1", "eth1"),
                ("BONDING_SLAVE01", "eth2"),
                ("BONDING_SLAVE+2", "eth3"),
                ("BONDING_SLAVE-3", "eth4"),
                ("BONDING_SLAVE", "eth5"),
                ("BONDING_SLAVE99999999999", "eth6"),
            ]),
        );
        assert_eq!(parsed.slaves(), strings(&["eth2", "eth1"]));
        assert_eq!(parsed.member_slots.len(), 2);
    }

    #[test]
    fn test_bridge_slaves() {
        let mut store = MemoryStore::new();
        store.insert(DeviceClass::Br, "br0", record(&[("BRIDGE_PORTS", "eth3 eth4")]));
        store.insert(DeviceClass::Br, "br1", record(&[("BRIDGE", "yes")]));
        let indexer = TopologyIndexer::new(&store);

        assert_eq!(indexer.bridge_slaves("br0"), strings(&["eth3", "eth4"]));
        assert!(indexer.bridge_slaves("br1").is_empty());
        assert_eq!(indexer.bridge_master_of("eth4"), Some("br0".to_string()));
        assert_eq!(indexer.bridge_master_of("eth5"), None);
    }

    #[test]
    fn test_indices_are_not_cached() {
        let mut store = bond_store();
        assert_eq!(TopologyIndexer::new(&store).bond_slaves("bond1"), Vec::<String>::new());

        store.insert(DeviceClass::Bond, "bond1", record(&[("BONDING_SLAVE0", "eth6")]));
        let indexer = TopologyIndexer::new(&store);
        assert_eq!(indexer.bond_slaves("bond1"), strings(&["eth6"]));
        assert_eq!(indexer.bond_master_of("eth6"), Some("bond1".to_string()));
    }

    #[test]
    fn test_conflicting_members_last_wins() {
        let mut store = MemoryStore::new();
        store.insert(DeviceClass::Br, "br0", record(&[("BRIDGE_PORTS", "eth1 eth2")]));
        store.insert(DeviceClass::Br, "br1", record(&[("BRIDGE_PORTS", "eth2")]));
        let indexer = TopologyIndexer::new(&store);

        assert_eq!(indexer.bridge_index().get("eth2").map(String::as_str), Some("br1"));
        assert_eq!(indexer.bridge_slaves("br0"), strings(&["eth1"]));
        assert_eq!(
            indexer.conflicts(),
            vec![MembershipConflict {
                member: "eth2".to_string(),
                kind: MembershipKind::Bridge,
                first: "br0".to_string(),
                second: "br1".to_string(),
            }]
        );
        assert!(matches!(
            indexer.validate(),
            Err(RegistryError::ConflictingMembership { kind: MembershipKind::Bridge, .. })
        ));
    }

    #[test]
    fn test_bond_and_bridge_indices_are_separate() {
        let mut store = bond_store();
        store.insert(DeviceClass::Br, "br0", record(&[("BRIDGE_PORTS", "bond0 eth9")]));
        let snapshot = TopologyIndexer::new(&store).snapshot();

        assert_eq!(snapshot.bonds.len(), 2);
        assert_eq!(snapshot.bridges.get("bond0").map(String::as_str), Some("br0"));
        assert!(snapshot.conflicts.is_empty());
        assert!(TopologyIndexer::new(&store).validate().is_ok());
    }

    #[test]
    fn test_apply_bond_slaves() {
        let existing = record(&[("BONDING_SLAVE0", "eth0"), ("BONDING_SLAVE1", "enp0s3"), ("BOOTPROTO", "static")]);
        let updated = apply_bond_slaves(&existing, &strings(&["enp0s3"]), Some("mode=active-backup miimon=100"));

        assert_eq!(
            updated,
            record(&[
                ("BONDING_MASTER", "yes"),
                ("BONDING_MODULE_OPTS", "mode=active-backup miimon=100"),
                ("BONDING_SLAVE0", "enp0s3"),
                ("BONDING_SLAVE1", ""),
                ("BOOTPROTO", "static"),
            ])
        );
        assert_eq!(BondRecord::parse("bond0", &updated).slaves(), strings(&["enp0s3"]));
    }

    #[test]
    fn test_apply_bond_slaves_without_options() {
        let updated = apply_bond_slaves(&RawRecord::new(), &strings(&["eth0", "enp0s3"]), None);
        assert_eq!(
            updated,
            record(&[("BONDING_MASTER", "yes"), ("BONDING_SLAVE0", "eth0"), ("BONDING_SLAVE1", "enp0s3")])
        );
    }

    #[test]
    fn test_bridge_ports_value() {
        assert_eq!(bridge_ports_value(&strings(&["eth0", "eth1"])), "eth0 eth1");
        assert_eq!(bridge_ports_value(&[]), "");
    }

    #[test]
    fn test_device_class_round_trip() {
        for class in DeviceClass::ALL {
            assert_eq!(class.as_str().parse::<DeviceClass>(), Ok(class));
            assert_eq!(DeviceClass::for_type(class.interface_type()), class);
        }
    }
}
