//! Content digesting and path helpers.
//!
//! # Submodules
//!
//! - [`hash`]: SHA-256 content digesting

/// SHA-256 content digesting.
pub mod hash;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home.join(&path[2..]));
    }
    Ok(PathBuf::from(path))
}

/// Converts a filesystem timestamp to UTC at full precision.
///
/// The same conversion is applied when a file is observed and when its
/// record is written, so exact equality between the two is stable across
/// runs and host timezones.
#[must_use]
pub fn system_time_to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// Determines if a given path should be ignored based on provided patterns.
///
/// Supported forms: exact path-component match, `*suffix`, `prefix*`, and
/// `*contains*`.
#[must_use]
pub fn should_ignore(path: &Path, patterns: &[String]) -> bool {
    let path_str = path.to_string_lossy();

    for pattern in patterns {
        if pattern.starts_with('*') && pattern.ends_with('*') && pattern.len() > 1 {
            let search = &pattern[1..pattern.len() - 1];
            if path_str.contains(search) {
                return true;
            }
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            if path_str.ends_with(suffix) {
                return true;
            }
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            if path_str.starts_with(prefix) {
                return true;
            }
        } else if path_str == pattern.as_str()
            || path.components().any(|c| c.as_os_str() == pattern.as_str())
        {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_plain_path() -> Result<()> {
        let path = expand_tilde("/etc/hosts")?;
        assert_eq!(path, PathBuf::from("/etc/hosts"));
        Ok(())
    }

    #[test]
    fn test_expand_tilde_home() -> Result<()> {
        let path = expand_tilde("~/notes.txt")?;
        assert!(path.ends_with("notes.txt"));
        assert!(!path.to_string_lossy().contains('~'));
        Ok(())
    }

    #[test]
    fn test_expand_tilde_empty() {
        assert!(expand_tilde("").is_err());
    }

    #[test]
    fn test_should_ignore_component() {
        let patterns = vec![".git".to_string()];
        assert!(should_ignore(Path::new("/home/u/.git/config"), &patterns));
        assert!(!should_ignore(Path::new("/home/u/src/main.rs"), &patterns));
    }

    #[test]
    fn test_should_ignore_suffix() {
        let patterns = vec!["*.tmp".to_string()];
        assert!(should_ignore(Path::new("/tmp/a.tmp"), &patterns));
        assert!(!should_ignore(Path::new("/tmp/a.txt"), &patterns));
    }

    #[test]
    fn test_should_ignore_contains() {
        let patterns = vec!["*cache*".to_string()];
        assert!(should_ignore(Path::new("/home/u/.cache/x"), &patterns));
        assert!(!should_ignore(Path::new("/home/u/docs/x"), &patterns));
    }

    #[test]
    fn test_system_time_to_utc_round_trip_equality() {
        let now = SystemTime::now();
        assert_eq!(system_time_to_utc(now), system_time_to_utc(now));
    }
}
