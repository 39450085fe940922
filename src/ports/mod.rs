pub mod hardware_inventory;
pub mod raw_device_store;

pub use hardware_inventory::HardwareInventory;
pub use raw_device_store::{DeviceRecords, RawDeviceStore, RawRecord};
