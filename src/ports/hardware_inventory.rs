use crate::domain::HardwareDescriptor;

/// Port for listing the network hardware present on the host
pub trait HardwareInventory: Send + Sync {
    fn descriptors(&self) -> Vec<HardwareDescriptor>;
}
