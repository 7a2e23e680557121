//! Copy the pf config next to the caller before touching it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::PfError;
use crate::fs_abstraction::FileSystem;

/// Hour-resolution suffix; a second backup in the same hour overwrites the first.
const BACKUP_SUFFIX_FORMAT: &str = "%Y%m%d%H";

/// Name of the backup file for `conf` taken at `now`, e.g. `pf.conf_2024031509`.
pub fn backup_file_name(conf: &Path, now: DateTime<Local>) -> Result<String, PfError> {
    let name = conf.file_name().ok_or_else(|| {
        PfError::io(
            conf,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        )
    })?;

    Ok(format!(
        "{}_{}",
        name.to_string_lossy(),
        now.format(BACKUP_SUFFIX_FORMAT)
    ))
}

/// Copy `conf` into `dest_dir`. Returns the path of the copy.
pub fn backup_config(
    fs: &dyn FileSystem,
    conf: &Path,
    dest_dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf, PfError> {
    let target = dest_dir.join(backup_file_name(conf, now)?);

    let bytes = fs.copy(conf, &target).map_err(|e| PfError::io(conf, e))?;
    debug!("Copied {} bytes from {} to {}", bytes, conf.display(), target.display());

    Ok(target)
}
