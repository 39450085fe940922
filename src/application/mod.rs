pub mod network;

pub use network::{InterfaceView, NetworkService};
