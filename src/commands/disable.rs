//! Disable command implementation.

use anyhow::Result;
use tracing::info;

use crate::dispatch::Invocation;
use crate::enforcer::tolerate_already_enabled;

/// Run the disable command
pub fn run(invocation: &Invocation<'_>) -> Result<()> {
    let mut engine = invocation.engine()?;

    info!("Restoring outbound TCP ports {}...", engine.ports());
    tolerate_already_enabled(engine.disable())?;

    println!("[OK] Network restored");
    Ok(())
}
