use thiserror::Error;

use crate::domain::{DeviceClass, InterfaceType};
use crate::ports::RawRecord;

#[derive(Debug, Error)]
pub enum SysconfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

pub type SysconfigResult<T> = Result<T, SysconfigError>;

/// Parse one `KEY=value` line, stripping matching quotes
pub fn parse_line(line: &str, number: usize) -> SysconfigResult<Option<(String, String)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (key, value) = line.split_once('=').ok_or_else(|| SysconfigError::Parse {
        line: number,
        reason: "missing '='".to_string(),
    })?;

    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SysconfigError::Parse {
            line: number,
            reason: format!("invalid key '{}'", key),
        });
    }

    Ok(Some((key.to_string(), unquote(value.trim()).to_string())))
}

fn unquote(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse a whole ifcfg file.
///
/// Malformed lines are returned separately so one bad line does not hide
/// the rest of the record.
pub fn parse_ifcfg(content: &str) -> (RawRecord, Vec<SysconfigError>) {
    let mut record = RawRecord::new();
    let mut errors = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        match parse_line(line, idx + 1) {
            Ok(Some((key, value))) => {
                record.insert(key, value);
            }
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    (record, errors)
}

/// Device name from an `ifcfg-<name>` file name; backups are ignored
pub fn device_name(file_name: &str) -> Option<&str> {
    let name = file_name.strip_prefix("ifcfg-")?;
    let is_backup = name.ends_with('~')
        || [".bak", ".orig", ".rpmnew", ".rpmorig", ".rpmsave", ".scpmbackup"]
            .iter()
            .any(|suffix| name.ends_with(suffix));

    if name.is_empty() || is_backup {
        None
    } else {
        Some(name)
    }
}

fn is_yes(record: &RawRecord, key: &str) -> bool {
    record
        .get(key)
        .is_some_and(|v| v.eq_ignore_ascii_case("yes"))
}

/// Device class from record content, falling back to the device name
pub fn classify(name: &str, record: &RawRecord) -> DeviceClass {
    if is_yes(record, "BONDING_MASTER") {
        return DeviceClass::Bond;
    }
    if is_yes(record, "BRIDGE") {
        return DeviceClass::Br;
    }
    if record.contains_key("ETHERDEVICE") || record.contains_key("VLAN_ID") {
        return DeviceClass::Vlan;
    }
    match record.get("TUNNEL").map(String::as_str) {
        Some("tap") => return DeviceClass::Tap,
        Some("tun") => return DeviceClass::Tun,
        _ => {}
    }
    if record.get("INTERFACETYPE").map(String::as_str) == Some("dummy") {
        return DeviceClass::Dummy;
    }

    DeviceClass::for_type(InterfaceType::from_device_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ifcfg() {
        let content = "# bond\nBOOTPROTO='static'\nBONDING_MASTER=\"yes\"\nBONDING_SLAVE0=eth1\n\nbad line\nSTARTMODE='auto'\n";
        let (record, errors) = parse_ifcfg(content);

        assert_eq!(record.get("BOOTPROTO").map(String::as_str), Some("static"));
        assert_eq!(record.get("BONDING_MASTER").map(String::as_str), Some("yes"));
        assert_eq!(record.get("BONDING_SLAVE0").map(String::as_str), Some("eth1"));
        assert_eq!(record.get("STARTMODE").map(String::as_str), Some("auto"));
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SysconfigError::Parse { line: 6, .. }));
    }

    #[test]
    fn test_parse_line_keeps_inner_equals() {
        let parsed = parse_line("BONDING_MODULE_OPTS='mode=active-backup miimon=100'", 1).unwrap();
        assert_eq!(
            parsed,
            Some(("BONDING_MODULE_OPTS".to_string(), "mode=active-backup miimon=100".to_string()))
        );
        assert!(parse_line("BAD KEY=1", 1).is_err());
        assert_eq!(parse_line("IPADDR=''", 1).unwrap(), Some(("IPADDR".to_string(), String::new())));
    }

    #[test]
    fn test_device_name() {
        assert_eq!(device_name("ifcfg-eth0"), Some("eth0"));
        assert_eq!(device_name("ifcfg-br0.rpmsave"), None);
        assert_eq!(device_name("ifcfg-eth0~"), None);
        assert_eq!(device_name("ifroute-eth0"), None);
        assert_eq!(device_name("ifcfg-"), None);
    }

    #[test]
    fn test_classify() {
        let record = |pairs: &[(&str, &str)]| -> RawRecord {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };

        assert_eq!(classify("mybond", &record(&[("BONDING_MASTER", "yes")])), DeviceClass::Bond);
        assert_eq!(classify("lan", &record(&[("BRIDGE", "yes")])), DeviceClass::Br);
        assert_eq!(classify("eth0.10", &record(&[("ETHERDEVICE", "eth0")])), DeviceClass::Vlan);
        assert_eq!(classify("tap0", &record(&[("TUNNEL", "tap")])), DeviceClass::Tap);
        assert_eq!(classify("wlan0", &RawRecord::new()), DeviceClass::Wlan);
        assert_eq!(classify("enp0s3", &RawRecord::new()), DeviceClass::Eth);
    }
}
