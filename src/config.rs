//! Gallery configuration.
//!
//! Stored as JSON in `~/.asset-gallery/config.json`. Secrets are not part
//! of this file; see [`crate::services::storage::credentials`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::preview::ViewerSettings;
use crate::services::storage::{GatewaySettings, StorageConfig};

fn default_upload_root() -> String {
    "uploads".to_string()
}

fn default_model_suffix() -> String {
    ".glb".to_string()
}

fn default_url_expiry_secs() -> u64 {
    3600
}

fn default_upload_chunk_size() -> usize {
    256 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    pub storage: StorageConfig,
    /// Top-level prefix; each user's assets live under `{upload_root}/{user}/`.
    #[serde(default = "default_upload_root")]
    pub upload_root: String,
    /// File name suffix that marks a 3D model.
    #[serde(default = "default_model_suffix")]
    pub model_suffix: String,
    #[serde(default = "default_url_expiry_secs")]
    pub url_expiry_secs: u64,
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,
    /// Serve read URLs from a public bucket or CDN instead of presigning.
    #[serde(default)]
    pub public_base_url: Option<String>,
    #[serde(default)]
    pub viewer: ViewerSettings,
}

impl GalleryConfig {
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            storage,
            upload_root: default_upload_root(),
            model_suffix: default_model_suffix(),
            url_expiry_secs: default_url_expiry_secs(),
            upload_chunk_size: default_upload_chunk_size(),
            public_base_url: None,
            viewer: ViewerSettings::default(),
        }
    }

    /// `~/.asset-gallery/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".asset-gallery").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to in-memory storage when the file
    /// does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No gallery config found, using in-memory storage");
            return Ok(Self::new(StorageConfig::memory()));
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.storage.validate().map_err(|e| anyhow!(e))?;

        if self.upload_root.trim_matches('/').is_empty() {
            return Err(anyhow!("upload_root must not be empty"));
        }
        if !self.model_suffix.starts_with('.') || self.model_suffix.len() < 2 {
            return Err(anyhow!(
                "model_suffix must look like \".glb\", got {:?}",
                self.model_suffix
            ));
        }
        if self.upload_chunk_size == 0 {
            return Err(anyhow!("upload_chunk_size must be greater than zero"));
        }
        if self.url_expiry_secs == 0 {
            return Err(anyhow!("url_expiry_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Transfer settings for the storage gateway.
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            upload_chunk_size: self.upload_chunk_size,
            url_expiry: Duration::from_secs(self.url_expiry_secs),
            public_base_url: self.public_base_url.clone(),
        }
    }
}
