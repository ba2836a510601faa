//! src/config.rs
//! ============================================================================
//! # Config: Navigator Configuration Loader and Saver
//!
//! Loads and saves settings as TOML from the platform config path using the
//! [`directories`](https://docs.rs/directories) crate. A missing file is
//! created with defaults on first start.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

/// Preview pane limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Children listed for a group before the `+N more` marker.
    pub max_children: usize,

    /// Upper bound on values pulled for a dataset sample.
    pub sample_size: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_children: 50,
            sample_size: 64,
        }
    }
}

/// Fuzzy search tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Penalty per character of offset before the first matched character.
    pub start_penalty: f64,

    /// Candidates scored between cancellation checks.
    pub chunk_size: usize,

    /// Matches kept after ranking.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start_penalty: 0.1,
            chunk_size: 256,
            max_results: 500,
        }
    }
}

/// Container read policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Time allowed for a single container read.
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,

    /// Automatic retries after a transient failure.
    pub retry_attempts: u32,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(10),
            retry_attempts: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,

    pub log_dir: PathBuf,

    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let log_dir = ProjectDirs::from("org", "h5nav", "h5nav")
            .map_or_else(|| PathBuf::from("logs"), |dirs| dirs.data_local_dir().join("logs"));

        Self {
            level: "info".to_string(),
            log_dir,
            file_prefix: "h5nav".to_string(),
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub io: IoConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads config from the platform config dir, or returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/h5nav/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path).await
    }

    /// Loads config from an explicit file, creating it with defaults if absent.
    pub async fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(path).await?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(path).await?;

            Ok(default_config)
        }
    }

    /// Saves config to the platform config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path).await
    }

    pub async fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "h5nav", "h5nav")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config::load_from(&path).await.unwrap();
        assert_eq!(cfg.preview.max_children, 50);
        assert!(path.exists());

        let reloaded = Config::load_from(&path).await.unwrap();
        assert_eq!(reloaded.io.read_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_partial_file_falls_back_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[preview]\nmax_children = 3\n\n[io]\nread_timeout = \"250ms\"\n")
            .await
            .unwrap();

        let cfg = Config::load_from(&path).await.unwrap();
        assert_eq!(cfg.preview.max_children, 3);
        assert_eq!(cfg.preview.sample_size, 64);
        assert_eq!(cfg.io.read_timeout, Duration::from_millis(250));
        assert_eq!(cfg.io.retry_attempts, 1);
        assert!((cfg.search.start_penalty - 0.1).abs() < f64::EPSILON);
    }
}
