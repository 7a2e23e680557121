//! Backup command implementation.

use anyhow::Result;
use chrono::Local;

use crate::backup::backup_config;
use crate::dispatch::Invocation;

/// Run the backup command
pub fn run(invocation: &Invocation<'_>) -> Result<()> {
    let target = backup_config(
        invocation.fs,
        &invocation.config.pf_conf,
        &invocation.work_dir,
        Local::now(),
    )?;

    println!("[OK] Config backed up to {}", target.display());
    Ok(())
}
