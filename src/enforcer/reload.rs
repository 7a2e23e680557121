//! Loading the pf config into the kernel and classifying what pfctl said.

use std::path::Path;

use tracing::{debug, warn};

use crate::cmd_abstraction::{args_to_strings, CommandExecutor, CommandOutput};
use crate::error::PfError;

const PERMISSION_DENIED: &str = "permission denied";
const ALREADY_ENABLED: &str = "pf already enabled";

/// Result of one `pfctl -e -f` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    Success,
    AlreadyEnabled,
    PermissionDenied,
    /// pfctl failed with output we do not recognise; the raw text is kept.
    Unknown(String),
}

/// Classify pfctl output.
///
/// Matching is on the text, not the exit status: pfctl exits non-zero when pf
/// is already running even though the rules were loaded.
pub fn classify(output: &CommandOutput) -> ReloadOutcome {
    if output.success {
        return ReloadOutcome::Success;
    }

    let raw = output.combined();
    let lowered = raw.to_lowercase();
    if lowered.contains(PERMISSION_DENIED) {
        ReloadOutcome::PermissionDenied
    } else if lowered.contains(ALREADY_ENABLED) {
        ReloadOutcome::AlreadyEnabled
    } else {
        ReloadOutcome::Unknown(raw)
    }
}

impl ReloadOutcome {
    /// Map the outcome onto the engine's error convention.
    ///
    /// `AlreadyEnabled` becomes [`PfError::AlreadyEnabled`] so callers can
    /// tell it apart; `Unknown` is let through as `Ok`.
    pub fn into_result(self, raw: &str) -> Result<ReloadOutcome, PfError> {
        match self {
            ReloadOutcome::PermissionDenied => {
                Err(PfError::PermissionDenied(raw.trim().to_string()))
            }
            ReloadOutcome::AlreadyEnabled => Err(PfError::AlreadyEnabled),
            ReloadOutcome::Unknown(out) => {
                warn!("pfctl returned unrecognised output: {}", out.trim());
                Ok(ReloadOutcome::Unknown(out))
            }
            ReloadOutcome::Success => Ok(ReloadOutcome::Success),
        }
    }
}

/// Run `<pfctl> -e -f <conf>`. Returns the outcome and the combined output.
pub fn reload(
    exec: &dyn CommandExecutor,
    pfctl: &str,
    conf: &Path,
) -> Result<(ReloadOutcome, String), PfError> {
    let conf = conf.to_string_lossy();
    let args = args_to_strings(&["-e", "-f", &conf]);

    let output = exec.execute(pfctl, &args).map_err(|e| PfError::Command {
        program: pfctl.to_string(),
        reason: e.to_string(),
    })?;

    let raw = output.combined();
    debug!("{} -e -f {}: {}", pfctl, conf, raw.trim_end());

    Ok((classify(&output), raw))
}
