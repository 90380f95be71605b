//! Configuration parsing and management.
//!
//! The configuration lives in a TOML file (by default
//! `~/.config/driftscan/config`) and is created with defaults on first load.
//! Every field carries a serde default so partial files parse cleanly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Core settings: manifest location and store compression.
    #[serde(default)]
    pub core: CoreConfig,

    /// Performance tuning knobs.
    #[serde(default)]
    pub performance: PerformanceConfig,

    /// Traversal settings: ignore patterns and symlink handling.
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Core settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Default location of the manifest store. Overridden by `--db`.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// Zstandard compression level for the store file.
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

/// Performance tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Files at or above this size are digested through a memory mapping
    /// instead of a whole-file read.
    #[serde(default = "default_mmap_threshold")]
    pub mmap_threshold: u64,
}

/// Traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Paths matching any of these patterns are skipped, directories with
    /// their whole subtree.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Whether traversal follows symbolic links.
    #[serde(default)]
    pub follow_symlinks: bool,
}

/// Default manifest store location under the home directory.
fn default_manifest_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    home.join(".local/share/driftscan/manifest.db")
}

/// Default zstd level for the store file.
const fn default_compression_level() -> i32 {
    3
}

/// Default mmap threshold (1 MB).
const fn default_mmap_threshold() -> u64 {
    1_048_576
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            compression_level: default_compression_level(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            mmap_threshold: default_mmap_threshold(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            follow_symlinks: false,
        }
    }
}

impl Config {
    /// Loads the configuration from `path`, creating it with defaults if it
    /// does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or created.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Saves the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config");

        let config = Config::load(&path)?;

        assert!(path.exists());
        assert_eq!(config.core.compression_level, 3);
        assert_eq!(config.performance.mmap_threshold, 1_048_576);
        assert!(config.tracking.ignore_patterns.is_empty());
        assert!(!config.tracking.follow_symlinks);

        Ok(())
    }

    #[test]
    fn test_save_load_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config");

        let mut config = Config::default();
        config.core.manifest_path = PathBuf::from("/var/lib/driftscan/manifest.db");
        config.core.compression_level = 9;
        config.tracking.ignore_patterns = vec!["*.tmp".to_string(), ".git".to_string()];
        config.tracking.follow_symlinks = true;
        config.save(&path)?;

        let loaded = Config::load(&path)?;
        assert_eq!(
            loaded.core.manifest_path,
            PathBuf::from("/var/lib/driftscan/manifest.db")
        );
        assert_eq!(loaded.core.compression_level, 9);
        assert_eq!(loaded.tracking.ignore_patterns.len(), 2);
        assert!(loaded.tracking.follow_symlinks);

        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config");
        std::fs::write(&path, "[tracking]\nignore_patterns = [\"*.swp\"]\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.tracking.ignore_patterns, vec!["*.swp".to_string()]);
        assert_eq!(config.core.compression_level, 3);

        Ok(())
    }

    #[test]
    fn test_invalid_toml_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config");
        std::fs::write(&path, "not valid toml [[[")?;

        assert!(Config::load(&path).is_err());
        Ok(())
    }
}
