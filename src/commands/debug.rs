//! Debug hook: dump the live pf ruleset around an action.

use anyhow::Result;
use tracing::debug;

use crate::dispatch::Invocation;

/// Log `pfctl -s rules` at debug level.
pub fn run(invocation: &Invocation<'_>) -> Result<()> {
    let rules = invocation.engine()?.current_rules()?;
    debug!("pf rules:\n{}", rules.trim_end());
    Ok(())
}
