//! Configuration module for pdfforge.
//!
//! A [`Config`] is assembled once at start-up, from defaults, an optional TOML
//! file and command-line overrides, and is then validated. It decides:
//! - Upload limits
//! - Thumbnail size and render concurrency
//! - The anonymous usage quota
//! - Which history store backs the session (in-memory or remote)
//! - Where produced documents are written

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::PdfForgeError;

/// Largest accepted upload: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Default thumbnail width in pixels.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 150;

/// Default number of anonymous operations.
pub const DEFAULT_GUEST_LIMIT: u32 = 3;

/// History store settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// In-memory store, for tests and offline use.
    #[default]
    Memory,
    /// Remote REST store.
    Remote {
        /// Base URL of the service, e.g. `https://xyz.example.co`.
        base_url: String,
        /// API key sent with every request.
        api_key: String,
        /// Table holding processed-document records.
        #[serde(default = "default_table")]
        table: String,
    },
}

fn default_table() -> String {
    "processed_files".to_string()
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: u64,

    /// Thumbnail width in pixels; height follows the page aspect ratio.
    pub thumbnail_width: u32,

    /// Concurrent thumbnail renders (None = auto-detect).
    pub thumbnail_jobs: Option<usize>,

    /// Anonymous operations allowed before sign-in is required.
    pub guest_limit: u32,

    /// File persisting the anonymous usage counter (None = in-memory).
    pub guest_usage_file: Option<PathBuf>,

    /// History store selection.
    pub store: StoreConfig,

    /// Directory receiving produced documents.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            thumbnail_jobs: None,
            guest_limit: DEFAULT_GUEST_LIMIT,
            guest_usage_file: None,
            store: StoreConfig::Memory,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| PdfForgeError::invalid_config(format!("Malformed config: {e}")))?;
        config
            .validate()
            .map_err(|e| PdfForgeError::invalid_config(e.to_string()))?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PdfForgeError::InvalidConfig`] if the file cannot be read,
    /// is not valid TOML, or fails [`Config::validate`].
    pub fn from_toml_file(path: &Path) -> crate::Result<Self> {
        let text = read_config_file(path).map_err(|e| PdfForgeError::invalid_config(format!("{e:#}")))?;
        Self::from_toml_str(&text)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The upload limit or thumbnail width is zero
    /// - Thumbnail jobs is zero
    /// - A remote store has an empty URL or key
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            bail!("Upload limit must be at least 1 byte");
        }

        if self.thumbnail_width == 0 {
            bail!("Thumbnail width must be at least 1 pixel");
        }

        if let Some(jobs) = self.thumbnail_jobs
            && jobs == 0
        {
            bail!("Number of thumbnail jobs must be at least 1");
        }

        if let StoreConfig::Remote {
            base_url,
            api_key,
            table,
        } = &self.store
        {
            if base_url.trim().is_empty() {
                bail!("Remote store needs a base URL");
            }
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                bail!("Remote store URL must start with http:// or https://: {base_url}");
            }
            if api_key.trim().is_empty() {
                bail!("Remote store needs an API key");
            }
            if table.trim().is_empty() {
                bail!("Remote store table name cannot be empty");
            }
        }

        Ok(())
    }

    /// Get the effective number of concurrent thumbnail renders.
    ///
    /// Returns the configured count, or the number of CPU cores if unset.
    pub fn effective_jobs(&self) -> usize {
        self.thumbnail_jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))
}
