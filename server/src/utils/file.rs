//! File utility functions

use std::path::{Path, PathBuf};

/// Expand `~`, `~/...` and relative paths to an absolute path. Absolute paths pass
/// through unchanged; nothing is canonicalized.
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

/// Write a file, creating missing parent directories
pub fn write_with_parents(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_expand_path_absolute() {
        assert_eq!(expand_path("/etc/weims.json"), PathBuf::from("/etc/weims.json"));
        assert_eq!(expand_path("  /path/to/dir  "), PathBuf::from("/path/to/dir"));
    }

    #[test]
    fn test_expand_path_relative_becomes_absolute() {
        for input in [".", "..", "./weims.json", "data/templates", ""] {
            assert!(expand_path(input).is_absolute(), "{input}");
        }
        assert!(expand_path("./.weims").ends_with(".weims"));
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/.weims"), home.join(".weims"));
        }
    }

    #[test]
    fn test_write_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/report_template.docx");
        write_with_parents(&path, b"x").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"x");
    }
}
