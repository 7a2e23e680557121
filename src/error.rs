//! Error types for pfcut.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::dispatch::Action;

#[derive(Error, Debug)]
pub enum PfError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run {program}: {reason}")]
    Command { program: String, reason: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("pf already enabled")]
    AlreadyEnabled,

    #[error("No handler registered for action '{0}'")]
    HandlerNotFound(Action),

    #[error("{0}")]
    PreconditionNotMet(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PfError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error (sysexits.h values).
    pub fn exit_code(&self) -> u8 {
        match self {
            PfError::Io { .. } | PfError::Command { .. } => 74,
            PfError::PermissionDenied(_) => 77,
            PfError::AlreadyEnabled => 0,
            PfError::HandlerNotFound(_) => 70,
            PfError::PreconditionNotMet(_) => 69,
            PfError::Config(_) => 78,
        }
    }
}

/// Exit code for an error coming out of the dispatcher.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<PfError>()
        .map(PfError::exit_code)
        .unwrap_or(1)
}
