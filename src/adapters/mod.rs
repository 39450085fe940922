pub mod store;
pub mod sysconfig;
pub mod sysfs;

pub use store::{MemoryStore, SnapshotError};
pub use sysconfig::SysconfigStore;
pub use sysfs::SysfsInventory;
