use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::domain::{DeviceClass, HardwareDescriptor};
use crate::ports::{DeviceRecords, HardwareInventory, RawDeviceStore, RawRecord};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown device class: {0}")]
    UnknownClass(String),
}

/// On-disk layout of a snapshot file
#[derive(Debug, Default, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    hardware: Vec<HardwareDescriptor>,
    /// class -> device -> key -> value
    #[serde(default)]
    devices: BTreeMap<String, DeviceRecords>,
}

/// In-memory raw device records and hardware list
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<DeviceClass, DeviceRecords>,
    hardware: Vec<HardwareDescriptor>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record of `name` within `class`
    pub fn insert(&mut self, class: DeviceClass, name: impl Into<String>, record: RawRecord) {
        self.records.entry(class).or_default().insert(name.into(), record);
    }

    pub fn remove(&mut self, class: DeviceClass, name: &str) -> Option<RawRecord> {
        self.records.get_mut(&class).and_then(|devices| devices.remove(name))
    }

    pub fn add_hardware(&mut self, descriptor: HardwareDescriptor) {
        self.hardware.push(descriptor);
    }

    pub fn with_hardware(mut self, descriptor: HardwareDescriptor) -> Self {
        self.add_hardware(descriptor);
        self
    }

    /// Parse a TOML snapshot:
    ///
    /// ```toml
    /// [[hardware]]
    /// bus_id = "0000:00:03.0"
    /// detected_name = "eth0"
    ///
    /// [devices.bond.bond0]
    /// BONDING_SLAVE0 = "eth0"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: SnapshotFile = toml::from_str(content)?;
        let mut store = Self::new();

        for (class, devices) in snapshot.devices {
            let class: DeviceClass = class.parse().map_err(|_| SnapshotError::UnknownClass(class))?;
            for (name, record) in devices {
                store.insert(class, name, record);
            }
        }
        store.hardware = snapshot.hardware;

        Ok(store)
    }

    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path)?;
        let store = Self::from_toml_str(&content)?;
        info!(
            "Loaded snapshot {} ({} devices, {} hardware entries)",
            path.display(),
            store.records.values().map(BTreeMap::len).sum::<usize>(),
            store.hardware.len()
        );
        Ok(store)
    }
}

impl RawDeviceStore for MemoryStore {
    fn records_for(&self, class: DeviceClass) -> DeviceRecords {
        self.records.get(&class).cloned().unwrap_or_default()
    }
}

impl HardwareInventory for MemoryStore {
    fn descriptors(&self) -> Vec<HardwareDescriptor> {
        self.hardware.clone()
    }
}
