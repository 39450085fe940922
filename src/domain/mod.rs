pub mod driver;
pub mod error;
pub mod interface;
pub mod naming;
pub mod registry;
pub mod topology;

pub use driver::Driver;
pub use error::{RegistryError, RegistryResult};
pub use interface::{HardwareDescriptor, Interface, InterfaceType};
pub use naming::{NameAllocator, MAX_NAME_SUFFIX};
pub use registry::InterfaceRegistry;
pub use topology::{
    apply_bond_slaves, bridge_ports_value, BondRecord, BridgeRecord, DeviceClass, MembershipConflict,
    MembershipIndex, MembershipKind, TopologyIndex, TopologyIndexer,
};
