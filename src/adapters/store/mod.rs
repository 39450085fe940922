mod memory;

pub use memory::{MemoryStore, SnapshotError};
