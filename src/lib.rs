//! Registry of Linux network interfaces with bond/bridge membership
//! indexing and free-name allocation, for configuration editors.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod interface;
pub mod ports;
