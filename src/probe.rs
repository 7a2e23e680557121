//! Check whether the client is running by asking lsof who holds its port.

use tracing::debug;

use crate::cmd_abstraction::{args_to_strings, CommandExecutor};

/// True when `lsof -i:<port>` lists at least one process.
///
/// lsof prints a header line followed by one row per match and exits
/// non-zero when nothing matches, so any failure counts as "not running".
pub fn client_running(exec: &dyn CommandExecutor, lsof: &str, port: u16) -> bool {
    let spec = format!("-i:{}", port);
    let output = match exec.execute(lsof, &args_to_strings(&[&spec])) {
        Ok(output) => output,
        Err(e) => {
            debug!("Failed to run {}: {}", lsof, e);
            return false;
        }
    };

    if !output.success {
        return false;
    }

    output.stdout.lines().count() > 1
}
