use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::{Driver, HardwareDescriptor};
use crate::ports::HardwareInventory;

/// Hardware inventory read from `<sys>/class/net`.
///
/// Only devices with a `device` link are reported; purely virtual
/// interfaces have no hardware behind them.
#[derive(Debug, Clone)]
pub struct SysfsInventory {
    sys_path: PathBuf,
}

impl SysfsInventory {
    pub fn new(sys_path: impl Into<PathBuf>) -> Self {
        Self {
            sys_path: sys_path.into(),
        }
    }

    fn net_path(&self) -> PathBuf {
        self.sys_path.join("class").join("net")
    }

    fn link_target_name(path: &Path) -> Option<String> {
        fs::read_link(path)
            .ok()
            .and_then(|target| target.file_name().map(|n| n.to_string_lossy().into_owned()))
    }

    fn read_descriptor(&self, iface_path: &Path, name: &str) -> Option<HardwareDescriptor> {
        let device = iface_path.join("device");
        if !device.exists() {
            return None;
        }

        let bus_id = Self::link_target_name(&device);
        let descriptor = HardwareDescriptor::new(bus_id, Some(name.to_string()));

        match Self::link_target_name(&device.join("driver")) {
            Some(driver) => Some(descriptor.with_driver(Driver::new(driver))),
            None => Some(descriptor),
        }
    }

    pub fn scan(&self) -> io::Result<Vec<HardwareDescriptor>> {
        let mut descriptors = Vec::new();

        for entry in fs::read_dir(self.net_path())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();

            match self.read_descriptor(&entry.path(), &name) {
                Some(descriptor) => descriptors.push(descriptor),
                None => debug!("{} has no hardware device, skipping", name),
            }
        }

        descriptors.sort_by(|a, b| a.detected_name().cmp(&b.detected_name()));
        Ok(descriptors)
    }
}

impl HardwareInventory for SysfsInventory {
    fn descriptors(&self) -> Vec<HardwareDescriptor> {
        self.scan().unwrap_or_else(|e| {
            warn!("Failed to scan {}: {}", self.net_path().display(), e);
            Vec::new()
        })
    }
}
