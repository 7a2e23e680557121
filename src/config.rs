//! Configuration management for pfcut.
//!
//! Settings are optional: when `/etc/pfcut/config.yaml` is absent the
//! built-in defaults (macOS pf layout) are used.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PfError;

/// Default location of the settings file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/pfcut/config.yaml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// pf configuration file that receives the block rule
    pub pf_conf: PathBuf,

    /// TCP ports blocked outbound, in rule order
    pub block_ports: Vec<u16>,

    /// Local port the client listens on; used to check it is running
    pub probe_port: u16,

    /// Refuse to enable when the client is not running
    pub require_client: bool,

    /// Path to pfctl
    pub pfctl: String,

    /// Path to lsof
    pub lsof: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pf_conf: PathBuf::from("/etc/pf.conf"),
            block_ports: vec![1119, 3724],
            probe_port: 1226,
            require_client: true,
            pfctl: "/sbin/pfctl".to_string(),
            lsof: "/usr/sbin/lsof".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PfError::io(path.as_ref(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| PfError::Config(format!("{:?}: {}", path.as_ref(), e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), PfError> {
        if self.block_ports.is_empty() {
            return Err(PfError::Config("block_ports must not be empty".to_string()));
        }

        if self.block_ports.contains(&0) {
            return Err(PfError::Config(
                "block_ports must not contain port 0".to_string(),
            ));
        }

        if self.probe_port == 0 {
            return Err(PfError::Config("probe_port must not be 0".to_string()));
        }

        if self.pf_conf.as_os_str().is_empty() {
            return Err(PfError::Config("pf_conf must not be empty".to_string()));
        }

        if self.pfctl.is_empty() || self.lsof.is_empty() {
            return Err(PfError::Config(
                "pfctl and lsof paths must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
