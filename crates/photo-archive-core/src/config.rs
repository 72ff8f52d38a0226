use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for an archival run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the archive volume where backups are placed
    pub archive_root: PathBuf,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Hostname recorded on storage records (auto-detected when unset)
    pub hostname: Option<String>,

    /// Whether to walk source directories recursively
    pub recursive: bool,

    /// Maximum directory depth for scanning
    pub max_depth: Option<usize>,

    /// Number of processed items between repository commits
    pub commit_interval: usize,

    /// Per-item error budget before a run aborts (None = unbounded)
    pub error_budget: Option<usize>,

    /// Directory for rotated log files
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_root: PathBuf::from("archive"),
            database_path: PathBuf::from("photo-archive.db"),
            hostname: None,
            recursive: false,
            max_depth: None,
            commit_interval: 1000,
            error_budget: None,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Validate the configuration before a run
    pub fn validate(&self) -> Result<()> {
        if self.commit_interval == 0 {
            return Err(Error::Configuration(
                "commit_interval must be at least 1".to_string(),
            ));
        }
        if self.archive_root.as_os_str().is_empty() {
            return Err(Error::Configuration(
                "archive_root must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Hostname to record on storage records, preferring the configured
    /// override over the detected machine name.
    pub fn effective_hostname(&self) -> String {
        self.hostname
            .clone()
            .or_else(sysinfo::System::host_name)
            .unwrap_or_else(|| "localhost".to_string())
    }
}
