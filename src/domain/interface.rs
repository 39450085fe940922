use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Driver;

/// Kind of network device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    Ethernet,
    Wireless,
    Infiniband,
    Bond,
    Bridge,
    Vlan,
    Dummy,
    Tun,
    Tap,
    Loopback,
}

impl InterfaceType {
    /// Virtual devices have no hardware of their own
    pub fn is_virtual(&self) -> bool {
        matches!(
            self,
            Self::Bond | Self::Bridge | Self::Vlan | Self::Dummy | Self::Tun | Self::Tap | Self::Loopback
        )
    }

    /// Prefix used when proposing names for new devices of this type
    pub fn name_prefix(&self) -> &'static str {
        match self {
            Self::Ethernet => "eth",
            Self::Wireless => "wlan",
            Self::Infiniband => "ib",
            Self::Bond => "bond",
            Self::Bridge => "br",
            Self::Vlan => "vlan",
            Self::Dummy => "dummy",
            Self::Tun => "tun",
            Self::Tap => "tap",
            Self::Loopback => "lo",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::Wireless => "wireless",
            Self::Infiniband => "infiniband",
            Self::Bond => "bond",
            Self::Bridge => "bridge",
            Self::Vlan => "vlan",
            Self::Dummy => "dummy",
            Self::Tun => "tun",
            Self::Tap => "tap",
            Self::Loopback => "loopback",
        }
    }

    /// Guess the type from a kernel device name, defaulting to ethernet
    pub fn from_device_name(name: &str) -> Self {
        if name == "lo" {
            Self::Loopback
        } else if name.starts_with("wl") {
            Self::Wireless
        } else if name.starts_with("ib") {
            Self::Infiniband
        } else if name.starts_with("bond") {
            Self::Bond
        } else if name.starts_with("br") {
            Self::Bridge
        } else if name.starts_with("vlan") || name.contains('.') {
            Self::Vlan
        } else if name.starts_with("dummy") {
            Self::Dummy
        } else if name.starts_with("tun") {
            Self::Tun
        } else if name.starts_with("tap") {
            Self::Tap
        } else {
            Self::Ethernet
        }
    }
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterfaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ethernet" | "eth" => Ok(Self::Ethernet),
            "wireless" | "wlan" => Ok(Self::Wireless),
            "infiniband" | "ib" => Ok(Self::Infiniband),
            "bond" => Ok(Self::Bond),
            "bridge" | "br" => Ok(Self::Bridge),
            "vlan" => Ok(Self::Vlan),
            "dummy" => Ok(Self::Dummy),
            "tun" => Ok(Self::Tun),
            "tap" => Ok(Self::Tap),
            "loopback" | "lo" => Ok(Self::Loopback),
            other => Err(format!("unknown interface type: {}", other)),
        }
    }
}

/// Physical device identity, independent of the logical name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    bus_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detected_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    driver: Option<Driver>,
}

impl HardwareDescriptor {
    pub fn new(bus_id: Option<String>, detected_name: Option<String>) -> Self {
        Self {
            bus_id,
            detected_name,
            driver: None,
        }
    }

    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn bus_id(&self) -> Option<&str> {
        self.bus_id.as_deref()
    }

    pub fn detected_name(&self) -> Option<&str> {
        self.detected_name.as_deref()
    }

    pub fn driver(&self) -> Option<&Driver> {
        self.driver.as_ref()
    }
}

/// A logical network device.
///
/// Always addressable: constructors require either a name or hardware,
/// and no operation removes both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Interface {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hardware: Option<HardwareDescriptor>,
    #[serde(rename = "type")]
    kind: InterfaceType,
}

impl Interface {
    pub fn named(name: impl Into<String>, kind: InterfaceType) -> Self {
        Self {
            name: Some(name.into()),
            old_name: None,
            hardware: None,
            kind,
        }
    }

    /// Interface known only by its hardware; the name comes from detection
    pub fn from_hardware(hardware: HardwareDescriptor, kind: InterfaceType) -> Self {
        Self {
            name: None,
            old_name: None,
            hardware: Some(hardware),
            kind,
        }
    }

    pub fn with_hardware(mut self, hardware: HardwareDescriptor) -> Self {
        self.hardware = Some(hardware);
        self
    }

    pub fn with_old_name(mut self, old_name: impl Into<String>) -> Self {
        self.old_name = Some(old_name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn old_name(&self) -> Option<&str> {
        self.old_name.as_deref()
    }

    pub fn hardware(&self) -> Option<&HardwareDescriptor> {
        self.hardware.as_ref()
    }

    pub fn kind(&self) -> InterfaceType {
        self.kind
    }

    /// Name used for lookups: the logical name, or the detected one if unset
    pub fn effective_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.hardware.as_ref().and_then(|hw| hw.detected_name()))
    }

    pub fn is_physical(&self) -> bool {
        self.hardware.is_some() && !self.kind.is_virtual()
    }

    /// Give the interface a new name, remembering the current effective one
    pub fn rename(&mut self, new_name: impl Into<String>) {
        let new_name = new_name.into();
        if self.effective_name() == Some(new_name.as_str()) {
            return;
        }
        self.old_name = self.effective_name().map(str::to_string);
        self.name = Some(new_name);
    }

    pub fn set_kind(&mut self, kind: InterfaceType) {
        self.kind = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nic(bus_id: &str, name: &str) -> HardwareDescriptor {
        HardwareDescriptor::new(Some(bus_id.to_string()), Some(name.to_string()))
    }

    #[test]
    fn test_effective_name_falls_back_to_hardware() {
        let iface = Interface::from_hardware(nic("0000:00:19.0", "enp0s25"), InterfaceType::Ethernet);
        assert_eq!(iface.name(), None);
        assert_eq!(iface.effective_name(), Some("enp0s25"));

        let named = iface.clone().with_old_name("eth0");
        assert_eq!(named.effective_name(), Some("enp0s25"));
    }

    #[test]
    fn test_rename_records_old_name() {
        let mut iface = Interface::named("eth0", InterfaceType::Ethernet);
        iface.rename("eth1");
        assert_eq!(iface.name(), Some("eth1"));
        assert_eq!(iface.old_name(), Some("eth0"));

        iface.rename("eth1");
        assert_eq!(iface.old_name(), Some("eth0"));
    }

    #[test]
    fn test_physical() {
        let eth = Interface::named("eth0", InterfaceType::Ethernet).with_hardware(nic("0000:00:03.0", "eth0"));
        let bond = Interface::named("bond0", InterfaceType::Bond).with_hardware(nic("virtual", "bond0"));
        let unbacked = Interface::named("eth9", InterfaceType::Ethernet);

        assert!(eth.is_physical());
        assert!(!bond.is_physical());
        assert!(!unbacked.is_physical());
    }

    #[test]
    fn test_value_equality() {
        let a = Interface::named("eth0", InterfaceType::Ethernet);
        let b = Interface::named("eth0", InterfaceType::Ethernet);
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with_old_name("eth5"));
        assert_ne!(a, Interface::named("eth0", InterfaceType::Wireless));
    }

    #[test]
    fn test_type_from_device_name() {
        assert_eq!(InterfaceType::from_device_name("bond0"), InterfaceType::Bond);
        assert_eq!(InterfaceType::from_device_name("br1"), InterfaceType::Bridge);
        assert_eq!(InterfaceType::from_device_name("eth0.100"), InterfaceType::Vlan);
        assert_eq!(InterfaceType::from_device_name("wlp3s0"), InterfaceType::Wireless);
        assert_eq!(InterfaceType::from_device_name("lo"), InterfaceType::Loopback);
        assert_eq!(InterfaceType::from_device_name("enp0s3"), InterfaceType::Ethernet);
    }

    #[test]
    fn test_type_parse() {
        assert_eq!("br".parse::<InterfaceType>(), Ok(InterfaceType::Bridge));
        assert_eq!("bond".parse::<InterfaceType>(), Ok(InterfaceType::Bond));
        assert!("token-ring".parse::<InterfaceType>().is_err());
    }
}
