mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::DeviceClass;
use crate::ports::{DeviceRecords, RawDeviceStore, RawRecord};

pub use parser::{classify, device_name, parse_ifcfg, SysconfigError, SysconfigResult};

/// Read-only store over a directory of `ifcfg-<device>` files.
///
/// The directory is re-read on every call.
#[derive(Debug, Clone)]
pub struct SysconfigStore {
    path: PathBuf,
}

impl SysconfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every parsable device with its class
    pub fn read_all(&self) -> SysconfigResult<Vec<(DeviceClass, String, RawRecord)>> {
        let mut devices = Vec::new();

        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            let Some(name) = device_name(&file_name) else {
                continue;
            };

            let content = match fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            let (record, errors) = parse_ifcfg(&content);
            for error in errors {
                debug!("{}: {}", file_name, error);
            }

            devices.push((classify(name, &record), name.to_string(), record));
        }

        Ok(devices)
    }
}

impl RawDeviceStore for SysconfigStore {
    fn records_for(&self, class: DeviceClass) -> DeviceRecords {
        match self.read_all() {
            Ok(devices) => devices
                .into_iter()
                .filter(|(device_class, _, _)| *device_class == class)
                .map(|(_, name, record)| (name, record))
                .collect(),
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                DeviceRecords::new()
            }
        }
    }

    /// One directory pass instead of one per class
    fn find_record(&self, name: &str) -> Option<(DeviceClass, RawRecord)> {
        match self.read_all() {
            Ok(devices) => devices
                .into_iter()
                .filter(|(_, device, _)| device == name)
                .min_by_key(|(class, _, _)| *class)
                .map(|(class, _, record)| (class, record)),
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }
}
