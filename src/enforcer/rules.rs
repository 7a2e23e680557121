//! Locating, appending and removing the managed block rule.
//!
//! Managed lines are recognised only by [`BLOCK_MARKER`]; every other line of
//! the pf config is passed through byte for byte.

use std::path::Path;

use tracing::debug;

use super::PortSet;
use crate::error::PfError;
use crate::fs_abstraction::FileSystem;

/// Literal tagging every line written by pfcut.
pub const BLOCK_MARKER: &str = "pfcut-block";

/// Render the block rule for `ports`, newline included.
pub fn render_block_rule(ports: &PortSet) -> String {
    format!(
        "block out quick proto tcp from any to any port {{{}}} #{}\n",
        ports, BLOCK_MARKER
    )
}

fn has_marker(line: &[u8]) -> bool {
    line.windows(BLOCK_MARKER.len())
        .any(|w| w == BLOCK_MARKER.as_bytes())
}

/// Whether any line of `path` carries the marker.
pub fn rule_present(fs: &dyn FileSystem, path: &Path) -> Result<bool, PfError> {
    let content = fs.read(path).map_err(|e| PfError::io(path, e))?;
    Ok(content.split(|b| *b == b'\n').any(has_marker))
}

/// Append the block rule to `path`.
///
/// Does not check for an existing rule; callers go through
/// [`rule_present`] first.
pub fn append_block_rule(fs: &dyn FileSystem, path: &Path, ports: &PortSet) -> Result<(), PfError> {
    let content = fs.read(path).map_err(|e| PfError::io(path, e))?;

    let rule = render_block_rule(ports);
    let mut line = Vec::new();
    // Keep the rule off the user's last line. The rule stays unterminated so
    // removing it also drops the separator and restores the file exactly.
    if content.last().is_some_and(|b| *b != b'\n') {
        line.push(b'\n');
        line.extend_from_slice(rule.trim_end_matches('\n').as_bytes());
    } else {
        line.extend_from_slice(rule.as_bytes());
    }

    fs.append(path, &line).map_err(|e| PfError::io(path, e))?;
    debug!("Appended block rule for ports {} to {}", ports, path.display());
    Ok(())
}

/// Drop every marker line from `content`, keeping all other lines and their
/// terminators untouched.
///
/// An unterminated marker line at the very end was appended after a newline
/// of our own, which goes with it.
pub fn strip_block_rules(content: &[u8]) -> Vec<u8> {
    let mut stripped: Vec<u8> = content
        .split_inclusive(|b| *b == b'\n')
        .filter(|line| !has_marker(line))
        .flatten()
        .copied()
        .collect();

    let trailing_marker = content
        .split_inclusive(|b| *b == b'\n')
        .last()
        .is_some_and(|line| has_marker(line) && !line.ends_with(b"\n"));
    if trailing_marker && stripped.ends_with(b"\n") {
        stripped.pop();
    }

    stripped
}

/// Rewrite `path` without any marker lines. Returns the number of lines removed.
pub fn remove_block_rules(fs: &dyn FileSystem, path: &Path) -> Result<usize, PfError> {
    let content = fs.read(path).map_err(|e| PfError::io(path, e))?;
    let removed = content
        .split_inclusive(|b| *b == b'\n')
        .filter(|line| has_marker(line))
        .count();

    let stripped = strip_block_rules(&content);
    fs.write_atomic(path, &stripped)
        .map_err(|e| PfError::io(path, e))?;

    debug!("Removed {} block rule(s) from {}", removed, path.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_abstraction::{real_fs, MockFileSystem};
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    const BASE_CONF: &str = "scrub-anchor \"com.apple/*\"\n\
                             anchor \"com.apple/*\"\n\
                             load anchor \"com.apple\" from \"/etc/pf.anchors/com.apple\"\n";

    fn ports() -> PortSet {
        PortSet::new(vec![1119, 3724]).unwrap()
    }

    fn conf_with(content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pf.conf");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_render_block_rule() {
        let rule = render_block_rule(&ports());
        assert_eq!(
            rule,
            "block out quick proto tcp from any to any port {1119,3724} #pfcut-block\n"
        );
    }

    #[test]
    fn test_render_keeps_port_order() {
        let rule = render_block_rule(&PortSet::new(vec![3724, 1119, 80]).unwrap());
        assert!(rule.contains("port {3724,1119,80}"));
    }

    #[test]
    fn test_rule_present() {
        let (_dir, path) = conf_with(BASE_CONF);
        assert!(!rule_present(real_fs(), &path).unwrap());

        let (_dir, path) = conf_with(&format!("{}{}", BASE_CONF, render_block_rule(&ports())));
        assert!(rule_present(real_fs(), &path).unwrap());
    }

    #[test]
    fn test_rule_present_marker_anywhere_in_line() {
        let (_dir, path) = conf_with("pass all\n# pfcut-block left by hand\npass out all\n");
        assert!(rule_present(real_fs(), &path).unwrap());
    }

    #[test]
    fn test_rule_present_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = rule_present(real_fs(), &dir.path().join("nope.conf")).unwrap_err();
        assert!(matches!(err, PfError::Io { .. }));
    }

    #[test]
    fn test_rule_present_read_error() {
        let mut mock = MockFileSystem::new();
        mock.expect_read()
            .returning(|_| Err(io::Error::new(io::ErrorKind::Other, "I/O error")));

        let err = rule_present(&mock, Path::new("/etc/pf.conf")).unwrap_err();
        assert!(matches!(err, PfError::Io { .. }));
    }

    #[test]
    fn test_append_block_rule() {
        let (_dir, path) = conf_with(BASE_CONF);

        append_block_rule(real_fs(), &path, &ports()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(BASE_CONF));
        assert!(content.ends_with("port {1119,3724} #pfcut-block\n"));
    }

    #[test]
    fn test_append_after_unterminated_last_line() {
        let (_dir, path) = conf_with("pass all");

        append_block_rule(real_fs(), &path, &ports()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "pass all");
        assert!(lines[1].ends_with("#pfcut-block"));
    }

    #[test]
    fn test_round_trip_on_unterminated_file() {
        let (_dir, path) = conf_with("pass all");

        append_block_rule(real_fs(), &path, &ports()).unwrap();
        assert!(rule_present(real_fs(), &path).unwrap());
        remove_block_rules(real_fs(), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "pass all");
    }

    #[test]
    fn test_append_to_empty_file() {
        let (_dir, path) = conf_with("");

        append_block_rule(real_fs(), &path, &ports()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), render_block_rule(&ports()));
    }

    #[test]
    fn test_append_write_error_is_io() {
        let mut mock = MockFileSystem::new();
        mock.expect_read().returning(|_| Ok(b"pass all\n".to_vec()));
        mock.expect_append()
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only")));

        let err = append_block_rule(&mock, Path::new("/etc/pf.conf"), &ports()).unwrap_err();
        assert!(matches!(err, PfError::Io { .. }));
    }

    #[test]
    fn test_strip_block_rules_preserves_other_lines() {
        let content = format!(
            "a\n{}b\n{}c",
            render_block_rule(&ports()),
            render_block_rule(&ports())
        );
        assert_eq!(strip_block_rules(content.as_bytes()), b"a\nb\nc");
    }

    #[test]
    fn test_strip_block_rules_without_marker_is_identity() {
        assert_eq!(strip_block_rules(BASE_CONF.as_bytes()), BASE_CONF.as_bytes());
        assert!(strip_block_rules(b"").is_empty());
    }

    #[test]
    fn test_strip_keeps_crlf_and_non_utf8_bytes() {
        let content = b"pass \xff all\r\nblock out #pfcut-block\r\npass out\r\n";
        assert_eq!(strip_block_rules(content), b"pass \xff all\r\npass out\r\n");
    }

    #[test]
    fn test_remove_block_rules() {
        let (_dir, path) = conf_with(&format!("{}{}", BASE_CONF, render_block_rule(&ports())));

        let removed = remove_block_rules(real_fs(), &path).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), BASE_CONF);
    }

    #[test]
    fn test_remove_keeps_unterminated_last_line() {
        let (_dir, path) = conf_with("block out #pfcut-block\npass all");

        remove_block_rules(real_fs(), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "pass all");
    }

    #[test]
    fn test_remove_failed_write_leaves_nothing_partial() {
        let mut mock = MockFileSystem::new();
        mock.expect_read()
            .returning(|_| Ok(b"pass all\nblock #pfcut-block\n".to_vec()));
        mock.expect_write_atomic()
            .withf(|_, c| c == b"pass all\n")
            .times(1)
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::Other, "disk full")));

        let err = remove_block_rules(&mock, Path::new("/etc/pf.conf")).unwrap_err();
        assert!(matches!(err, PfError::Io { .. }));
    }
}
