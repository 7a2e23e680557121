//! # pfcut - pf port blocker
//!
//! Cuts outbound TCP traffic to a fixed set of ports by adding a tagged
//! `block out` rule to the pf config and reloading it with `pfctl`, and
//! restores it by taking the rule out again.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (clap)                                                 │
//! │    └── Commands: enable [-s N], disable, backup, status     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Dispatcher                                                 │
//! │    └── pre-run hooks → handler → post-run hooks             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ToggleEngine                                               │
//! │    ├── rules: detect / append / remove the marker line      │
//! │    └── reload: pfctl -e -f, output classification           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CommandExecutor / FileSystem (mockable seams)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use pfcut::cmd_abstraction::RealCommandExecutor;
//! use pfcut::enforcer::{tolerate_already_enabled, PortSet, ToggleEngine};
//! use pfcut::fs_abstraction::real_fs;
//!
//! fn main() -> anyhow::Result<()> {
//!     let exec = RealCommandExecutor::new();
//!     let ports = PortSet::new(vec![1119, 3724])?;
//!     let mut engine = ToggleEngine::new("/etc/pf.conf", ports, &exec, real_fs());
//!
//!     tolerate_already_enabled(engine.enable())?;
//!     tolerate_already_enabled(engine.disable())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`backup`] - Timestamped copies of the pf config
//! - [`cli`] - Command-line interface definitions
//! - [`cmd_abstraction`] - Subprocess seam (pfctl, lsof)
//! - [`commands`] - Action handlers and the debug hook
//! - [`config`] - Settings file parsing and validation
//! - [`dispatch`] - Action dispatcher with hooks
//! - [`enforcer`] - Rule toggling and pfctl reload
//! - [`error`] - Error kinds and exit codes
//! - [`fs_abstraction`] - Filesystem seam with atomic rewrite
//! - [`probe`] - Client process detection

pub mod backup;
pub mod cli;
pub mod cmd_abstraction;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod enforcer;
pub mod error;
pub mod fs_abstraction;
pub mod probe;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::PfError;
