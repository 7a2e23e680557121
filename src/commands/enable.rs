//! Enable command implementation: cut the network, optionally restore it later.

use anyhow::Result;
use std::thread;
use tracing::info;

use crate::dispatch::Invocation;
use crate::enforcer::tolerate_already_enabled;
use crate::error::PfError;
use crate::probe::client_running;

/// Run the enable command
pub fn run(invocation: &Invocation<'_>) -> Result<()> {
    let config = &invocation.config;

    if config.require_client
        && !client_running(invocation.exec, &config.lsof, config.probe_port)
    {
        return Err(PfError::PreconditionNotMet(format!(
            "Client is not running (nothing listening on port {})",
            config.probe_port
        ))
        .into());
    }

    let mut engine = invocation.engine()?;

    info!("Blocking outbound TCP ports {}...", engine.ports());
    tolerate_already_enabled(engine.enable())?;
    println!("[OK] Network cut (ports {})", engine.ports());

    let delay = match invocation.restore_after {
        Some(delay) if !delay.is_zero() => delay,
        _ => return Ok(()),
    };

    println!("Waiting {}s before restoring the network...", delay.as_secs());
    thread::sleep(delay);

    tolerate_already_enabled(engine.disable())?;
    println!("[OK] Network restored");
    Ok(())
}
