//! pf rule toggling.
//!
//! [`ToggleEngine`] owns one pf config file and moves it between two states,
//! observed on disk rather than stored:
//!
//! - **Unblocked**: no line carries [`BLOCK_MARKER`]
//! - **Blocked**: a marker line is present
//!
//! Every transition ends with a reload, because the kernel ruleset does not
//! follow the file on its own.

mod reload;
mod rules;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use reload::{classify, reload, ReloadOutcome};
pub use rules::{
    append_block_rule, remove_block_rules, render_block_rule, rule_present, strip_block_rules,
    BLOCK_MARKER,
};

use crate::cmd_abstraction::{args_to_strings, CommandExecutor};
use crate::config::Config;
use crate::error::PfError;
use crate::fs_abstraction::FileSystem;

/// Ordered, non-empty list of TCP ports to block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSet(Vec<u16>);

impl PortSet {
    pub fn new(ports: Vec<u16>) -> Result<Self, PfError> {
        if ports.is_empty() {
            return Err(PfError::Config("no ports to block".to_string()));
        }
        if ports.contains(&0) {
            return Err(PfError::Config("port 0 cannot be blocked".to_string()));
        }
        Ok(Self(ports))
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, port) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", port)?;
        }
        Ok(())
    }
}

/// Treat [`PfError::AlreadyEnabled`] as a successful reload.
pub fn tolerate_already_enabled(
    result: Result<ReloadOutcome, PfError>,
) -> Result<ReloadOutcome, PfError> {
    match result {
        Err(PfError::AlreadyEnabled) => Ok(ReloadOutcome::AlreadyEnabled),
        other => other,
    }
}

pub struct ToggleEngine<'a> {
    conf_path: PathBuf,
    ports: PortSet,
    pfctl: String,
    exec: &'a dyn CommandExecutor,
    fs: &'a dyn FileSystem,
    last_output: String,
}

impl<'a> ToggleEngine<'a> {
    pub fn new(
        conf_path: impl Into<PathBuf>,
        ports: PortSet,
        exec: &'a dyn CommandExecutor,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self {
            conf_path: conf_path.into(),
            ports,
            pfctl: Config::default().pfctl,
            exec,
            fs,
            last_output: String::new(),
        }
    }

    /// Build an engine from loaded settings.
    pub fn from_config(
        config: &Config,
        exec: &'a dyn CommandExecutor,
        fs: &'a dyn FileSystem,
    ) -> Result<Self, PfError> {
        let ports = PortSet::new(config.block_ports.clone())?;
        Ok(Self::new(&config.pf_conf, ports, exec, fs).with_pfctl(&config.pfctl))
    }

    pub fn with_pfctl(mut self, pfctl: impl Into<String>) -> Self {
        self.pfctl = pfctl.into();
        self
    }

    pub fn conf_path(&self) -> &Path {
        &self.conf_path
    }

    pub fn ports(&self) -> &PortSet {
        &self.ports
    }

    /// Block the ports: add the rule if missing, then reload.
    ///
    /// Returns `Err(PfError::AlreadyEnabled)` when pfctl reports pf was
    /// already running; see [`tolerate_already_enabled`].
    pub fn enable(&mut self) -> Result<ReloadOutcome, PfError> {
        if self.is_blocked()? {
            debug!("Block rule already present in {}", self.conf_path.display());
        } else {
            append_block_rule(self.fs, &self.conf_path, &self.ports)?;
            info!("Added block rule for ports {}", self.ports);
        }

        self.reload()
    }

    /// Unblock the ports: strip marker lines if any, then reload.
    pub fn disable(&mut self) -> Result<ReloadOutcome, PfError> {
        if self.is_blocked()? {
            let removed = remove_block_rules(self.fs, &self.conf_path)?;
            info!("Removed {} block rule(s)", removed);
        } else {
            debug!("No block rule in {}", self.conf_path.display());
        }

        self.reload()
    }

    /// Whether the config file currently carries the block rule.
    pub fn is_blocked(&self) -> Result<bool, PfError> {
        rule_present(self.fs, &self.conf_path)
    }

    /// The live ruleset as printed by `pfctl -s rules`.
    pub fn current_rules(&self) -> Result<String, PfError> {
        let output = self
            .exec
            .execute(&self.pfctl, &args_to_strings(&["-s", "rules"]))
            .map_err(|e| PfError::Command {
                program: self.pfctl.clone(),
                reason: e.to_string(),
            })?;

        if output.success {
            return Ok(output.stdout);
        }

        match classify(&output) {
            ReloadOutcome::PermissionDenied => {
                Err(PfError::PermissionDenied(output.combined().trim().to_string()))
            }
            _ => Err(PfError::Command {
                program: self.pfctl.clone(),
                reason: output.stderr.trim().to_string(),
            }),
        }
    }

    /// Raw pfctl output from the most recent reload.
    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    fn reload(&mut self) -> Result<ReloadOutcome, PfError> {
        let (outcome, raw) = reload(self.exec, &self.pfctl, &self.conf_path)?;
        self.last_output = raw;
        outcome.into_result(&self.last_output)
    }
}
