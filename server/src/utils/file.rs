//! File utility functions

use std::io;
use std::path::{Path, PathBuf};

/// Expand a path string to an absolute path.
///
/// - `~` and `~/path` expand to the home directory
/// - relative paths and bare names resolve against the current directory
/// - absolute paths pass through unchanged
///
/// ```text
/// expand_path("~/routes/redbus.db") // -> /home/user/routes/redbus.db
/// expand_path("redbus.db")          // -> /current/dir/redbus.db
/// expand_path("/srv/redbus.db")     // -> /srv/redbus.db
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Resolve `path` against `base` when it is relative.
///
/// Home-relative and absolute paths ignore `base`; an empty path stays empty
/// so that validation can reject it.
pub fn resolve_relative(path: &str, base: Option<&Path>) -> PathBuf {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return PathBuf::new();
    }
    match base {
        Some(base) if !trimmed.starts_with('~') && Path::new(trimmed).is_relative() => {
            expand_path(&base.join(trimmed).to_string_lossy())
        }
        _ => expand_path(trimmed),
    }
}

/// Write `contents` to `path` through a sibling temp file and a rename, so
/// readers never observe a partially written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, contents)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}
