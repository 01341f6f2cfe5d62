//! Platform-aware data storage directory management
//!
//! ## Platform Paths
//!
//! | Type | Windows | macOS | Linux |
//! |------|---------|-------|-------|
//! | Data | `%APPDATA%\WEIMS\` | `~/Library/Application Support/WEIMS/` | `$XDG_DATA_HOME/weims/` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::config::ReportsConfig;
use super::constants::{APP_DOT_FOLDER, APP_NAME, ENV_DATA_DIR, TEMPLATE_FILENAME};
use crate::utils::file::expand_path;

/// Data subdirectories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSubdir {
    Sqlite,
    Templates,
}

impl DataSubdir {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataSubdir::Sqlite => "sqlite",
            DataSubdir::Templates => "templates",
        }
    }

    /// Returns subdirectories that should always be created.
    pub const fn all() -> &'static [DataSubdir] {
        &[DataSubdir::Sqlite, DataSubdir::Templates]
    }
}

/// Application storage manager
#[derive(Debug, Clone)]
pub struct AppStorage {
    data_dir: PathBuf,
}

impl AppStorage {
    /// Initialize storage with platform-appropriate data directory
    pub async fn init() -> Result<Self> {
        Self::init_at(&Self::resolve_data_dir()).await
    }

    /// Initialize storage rooted at an explicit directory
    pub async fn init_at(data_dir: &Path) -> Result<Self> {
        Self::ensure_directories(data_dir).await?;

        // Canonicalize requires the path to exist
        let data_dir = data_dir
            .canonicalize()
            .unwrap_or_else(|_| data_dir.to_path_buf());

        tracing::debug!(data_dir = %data_dir.display(), "Storage initialized");
        Ok(Self { data_dir })
    }

    /// Resolve data directory from env var or platform default
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return expand_path(&dir);
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            return proj_dirs.data_dir().to_path_buf();
        }

        // Fallback to local .weims
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(APP_DOT_FOLDER)
    }

    async fn ensure_directories(data_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        for subdir in DataSubdir::all() {
            let path = data_dir.join(subdir.as_str());
            tokio::fs::create_dir_all(&path).await.with_context(|| {
                format!(
                    "Failed to create {} directory: {}",
                    subdir.as_str(),
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to a subdirectory (canonicalized)
    pub fn subdir(&self, subdir: DataSubdir) -> PathBuf {
        let path = self.data_dir.join(subdir.as_str());
        path.canonicalize().unwrap_or(path)
    }

    /// Word template location: the configured path, or the templates directory
    pub fn template_path(&self, reports: &ReportsConfig) -> PathBuf {
        reports
            .template_path
            .clone()
            .unwrap_or_else(|| self.subdir(DataSubdir::Templates).join(TEMPLATE_FILENAME))
    }
}
