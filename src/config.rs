use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    /// Directory holding `ifcfg-*` files
    pub sysconfig_path: PathBuf,
    pub sys_path: PathBuf,
    /// TOML snapshot used instead of the live system when set
    pub snapshot: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("NETREG_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            log_level: env::var("NETREG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            sysconfig_path: env::var("NETREG_SYSCONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/etc/sysconfig/network")),
            sys_path: env::var("NETREG_SYS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/sys")),
            snapshot: env::var("NETREG_SNAPSHOT").ok().map(PathBuf::from),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
