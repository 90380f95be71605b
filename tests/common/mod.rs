use anyhow::Result;
use driftscan::ScanContext;
use driftscan::config::Config;
use std::path::PathBuf;
use tempfile::TempDir;

/// Scan sandbox fixture: a temp tree to scan plus a manifest location.
pub struct ScanSandbox {
    pub temp_dir: TempDir,
    pub manifest_path: PathBuf,
}

impl ScanSandbox {
    /// Create a sandbox with an empty scan tree and no manifest yet.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        std::fs::create_dir(temp_dir.path().join("tree"))?;
        Ok(Self {
            manifest_path: temp_dir.path().join("manifest.db"),
            temp_dir,
        })
    }

    /// The root directory scans run against.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("tree")
    }

    /// A context scanning the sandbox tree against the sandbox manifest.
    pub fn context(&self, update: bool, verbose: bool) -> Result<ScanContext> {
        let roots = vec![self.root().to_string_lossy().to_string()];
        ScanContext::with_config(
            &roots,
            Config::default(),
            update,
            verbose,
            Some(self.manifest_path.clone()),
        )
    }

    /// Write a file under the scan tree, creating parent directories.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
