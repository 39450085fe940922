use std::collections::BTreeMap;

use crate::domain::DeviceClass;

/// Unparsed key/value configuration of one device
pub type RawRecord = BTreeMap<String, String>;

/// Device name -> raw record, for one device class
pub type DeviceRecords = BTreeMap<String, RawRecord>;

/// Port for reading raw per-device configuration.
///
/// Implementations must return the current state on every call; callers
/// rely on edits made between calls being visible.
pub trait RawDeviceStore: Send + Sync {
    /// All records filed under `class`
    fn records_for(&self, class: DeviceClass) -> DeviceRecords;

    /// Record of a single device within a class
    fn record(&self, class: DeviceClass, name: &str) -> Option<RawRecord> {
        self.records_for(class).remove(name)
    }

    /// First record with this device name across all classes
    fn find_record(&self, name: &str) -> Option<(DeviceClass, RawRecord)> {
        DeviceClass::ALL
            .into_iter()
            .find_map(|class| self.record(class, name).map(|record| (class, record)))
    }
}
