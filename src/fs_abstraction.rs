//! Filesystem abstraction layer for testability
//!
//! The toggle engine and the backup command only touch disk through
//! [`FileSystem`]. Uses mockall for automatic mock generation in test builds.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

#[cfg(test)]
use mockall::automock;

/// Trait abstracting filesystem operations for dependency injection.
///
/// # Example (testing)
/// ```ignore
/// use pfcut::fs_abstraction::MockFileSystem;
///
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_read()
///     .returning(|_| Ok(b"pass all\n".to_vec()));
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    /// Read file contents as bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Append bytes to an existing file. Never creates the file.
    fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Replace the file contents so readers see either the old or the new
    /// content, never a truncated file.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Copy a file from one location to another.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;
}

/// Real filesystem implementation using std::fs.
#[derive(Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(contents)?;
        file.flush()
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        // Replace the link target, not the link itself
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let path = target.as_path();

        // Temp file must live on the same filesystem for rename to be atomic
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(parent)?;

        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;

        // NamedTempFile is created 0600; keep the target's mode
        if let Ok(metadata) = fs::metadata(path) {
            temp_file.as_file().set_permissions(metadata.permissions())?;
        }

        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        fs::copy(from, to)
    }
}

static REAL_FS: RealFileSystem = RealFileSystem;

/// Get a reference to the global real filesystem instance.
///
/// For testing, create a `MockFileSystem` instead.
pub fn real_fs() -> &'static RealFileSystem {
    &REAL_FS
}
