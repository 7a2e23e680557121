//! Status command implementation.

use anyhow::Result;

use crate::dispatch::Invocation;

/// Run the status command
pub fn run(invocation: &Invocation<'_>) -> Result<()> {
    let engine = invocation.engine()?;
    let state = if engine.is_blocked()? {
        "BLOCKED"
    } else {
        "UNBLOCKED"
    };

    println!();
    println!("pfcut: {}", state);
    println!("Config: {}", engine.conf_path().display());
    println!("Ports: {}", engine.ports());
    println!();

    Ok(())
}
