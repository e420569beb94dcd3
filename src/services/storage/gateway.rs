//! OpenDAL-backed storage gateway.
//!
//! One gateway type serves every backend; the backend modules only know how
//! to build their operator and how to spell URIs for their objects. Every
//! OpenDAL call goes through [`runtime::run`], so the gateway can be awaited
//! from any executor.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_lock::RwLock;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use opendal::{ErrorKind, Operator};
use url::Url;

use super::traits::{ProgressSender, StorageGateway};
use super::types::{ObjectInfo, StorageConfig, StorageParams, StorageType, TransferProgress};
use super::{credentials, gcs, local_fs, memory, runtime, s3};

/// Buffer handed to OpenDAL writers. Multipart backends need parts of at
/// least 5 MiB, so progress chunks are coalesced up to this size.
const WRITER_CHUNK: usize = 8 * 1024 * 1024;

/// Transfer and URL settings shared by every backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    /// Bytes handed to the writer between two progress reports.
    pub upload_chunk_size: usize,
    /// Lifetime of presigned read URLs.
    pub url_expiry: Duration,
    /// When set, read URLs are `{public_base_url}/{path}` instead of presigned.
    pub public_base_url: Option<String>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            upload_chunk_size: 256 * 1024,
            url_expiry: Duration::from_secs(3600),
            public_base_url: None,
        }
    }
}

/// Append an object path to `base`, percent-encoding each segment.
pub(super) fn append_path(mut base: Url, path: &str) -> Result<Url> {
    if base.cannot_be_a_base() {
        bail!("URL cannot take an object path: {}", base);
    }
    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop_if_empty().extend(path.split('/'));
    }
    Ok(base)
}

/// Storage gateway implementation over an OpenDAL operator.
pub struct OpendalGateway {
    config: StorageConfig,
    settings: GatewaySettings,
    operator: RwLock<Option<Operator>>,
    /// Secret access key for S3 (loaded from the keyring on connect)
    secret_key: RwLock<Option<String>>,
}

impl OpendalGateway {
    /// Create a new, not yet connected gateway.
    pub fn new(config: StorageConfig, settings: GatewaySettings) -> Self {
        Self {
            config,
            settings,
            operator: RwLock::new(None),
            secret_key: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Set the S3 secret access key for this session only.
    ///
    /// Use [`save_secret_key`](Self::save_secret_key) to keep it in the
    /// keyring for later connects.
    pub async fn set_secret_key(&self, secret_key: String) {
        let mut guard = self.secret_key.write().await;
        *guard = Some(secret_key);
    }

    /// Store the S3 secret in the keyring under this connection's id and use
    /// it for the next connect.
    pub async fn save_secret_key(&self, secret_key: String) -> Result<()> {
        credentials::store_secret(&self.config.id, &secret_key)?;
        self.set_secret_key(secret_key).await;
        Ok(())
    }

    /// Drop the S3 secret from memory and from the keyring.
    pub async fn forget_secret_key(&self) -> Result<()> {
        *self.secret_key.write().await = None;
        credentials::delete_secret(&self.config.id)
    }

    /// Build the OpenDAL operator for the configured backend.
    async fn build_operator(&self) -> Result<Operator> {
        match &self.config.params {
            StorageParams::S3 { access_key_id, .. } => {
                let mut secret = self.secret_key.read().await.clone();
                if secret.is_none() && access_key_id.is_some() {
                    secret = credentials::load_secret(&self.config.id)?;
                }
                s3::build_operator(&self.config.params, secret.as_deref())
            }
            StorageParams::Gcs { .. } => gcs::build_operator(&self.config.params),
            StorageParams::LocalFs { root_path } => local_fs::build_operator(root_path),
            StorageParams::Memory => memory::build_operator(),
        }
    }

    /// Get the operator, returning an error if not connected.
    async fn get_operator(&self) -> Result<Operator> {
        let guard = self.operator.read().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow!("Storage not connected"))
    }

    /// Normalize path (ensure no leading slash for OpenDAL).
    fn normalize_path(path: &str) -> &str {
        path.trim_start_matches('/')
    }

    /// Convert OpenDAL metadata to ObjectInfo.
    fn to_object_info(path: String, metadata: &opendal::Metadata) -> ObjectInfo {
        ObjectInfo::file(
            path,
            Some(metadata.content_length()),
            metadata.last_modified().map(|t| {
                DateTime::<Utc>::from_timestamp_millis(t.timestamp_millis()).unwrap_or_default()
            }),
            metadata.content_type().map(|s| s.to_string()),
        )
    }

    fn public_url(base: &str, path: &str) -> Result<String> {
        let base = Url::parse(base).with_context(|| format!("Invalid public base URL {}", base))?;
        Ok(append_path(base, path)?.into())
    }
}

#[async_trait]
impl StorageGateway for OpendalGateway {
    fn storage_type(&self) -> StorageType {
        self.config.storage_type
    }

    async fn connect(&self) -> Result<()> {
        let op = self.build_operator().await?;

        let checked = op.clone();
        runtime::run(async move { Ok(checked.check().await?) })
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to connect to {}: {}. Check your credentials and bucket or path.",
                    self.config.storage_type,
                    e
                )
            })?;

        let mut guard = self.operator.write().await;
        *guard = Some(op);
        tracing::info!(storage = %self.config.name, "Connected to asset storage");

        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let mut guard = self.operator.write().await;
        *guard = None;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        let guard = self.operator.read().await;
        guard.is_some()
    }

    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        progress: ProgressSender,
    ) -> Result<()> {
        let op = self.get_operator().await?;
        let path = Self::normalize_path(path).to_string();
        let content_type = content_type.to_string();
        let step = self.settings.upload_chunk_size.max(1);

        runtime::run(async move {
            let total = data.len() as u64;
            let mut builder = op.writer_with(&path).chunk(WRITER_CHUNK);
            if op.info().full_capability().write_with_content_type {
                builder = builder.content_type(&content_type);
            }
            let mut writer = builder
                .await
                .with_context(|| format!("Failed to open writer for {}", path))?;

            let mut sent = 0usize;
            while sent < data.len() {
                let end = (sent + step).min(data.len());
                if let Err(e) = writer.write(data.slice(sent..end)).await {
                    let _ = writer.abort().await;
                    return Err(anyhow!("Write to {} failed: {}", path, e));
                }
                sent = end;
                // The final report waits for close.
                if sent < data.len() {
                    let _ = progress
                        .send(TransferProgress::new(sent as u64, total))
                        .await;
                }
            }

            writer
                .close()
                .await
                .with_context(|| format!("Failed to finish upload of {}", path))?;
            let _ = progress.send(TransferProgress::new(total, total)).await;

            tracing::debug!(path = %path, bytes = total, "Object written");
            Ok(())
        })
        .await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let op = self.get_operator().await?;
        let prefix = Self::normalize_path(prefix).to_string();

        runtime::run(async move {
            let mut lister = op.lister_with(&prefix).recursive(true).await?;
            let mut objects = Vec::new();

            while let Some(entry) = lister.next().await {
                let entry = entry?;
                let metadata = entry.metadata();
                let entry_path = entry.path().to_string();

                if metadata.is_dir() || entry_path == prefix {
                    continue;
                }

                objects.push(Self::to_object_info(entry_path, metadata));
            }

            Ok(objects)
        })
        .await
    }

    async fn resolve_url(&self, path: &str) -> Result<String> {
        let path = Self::normalize_path(path);

        if let Some(base) = &self.settings.public_base_url {
            return Self::public_url(base, path);
        }

        match &self.config.params {
            StorageParams::S3 { .. } | StorageParams::Gcs { .. } => {
                let op = self.get_operator().await?;
                let path = path.to_string();
                let expiry = self.settings.url_expiry;
                runtime::run(async move {
                    let request = op
                        .presign_read(&path, expiry)
                        .await
                        .with_context(|| format!("Failed to presign {}", path))?;
                    Ok(request.uri().to_string())
                })
                .await
            }
            StorageParams::LocalFs { root_path } => Ok(local_fs::file_url(root_path, path)?.into()),
            StorageParams::Memory => Ok(memory::object_url(path)?.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let op = self.get_operator().await?;
        let path = Self::normalize_path(path).to_string();

        runtime::run(async move { Ok(op.delete(&path).await?) }).await
    }

    async fn stat(&self, path: &str) -> Result<ObjectInfo> {
        let op = self.get_operator().await?;
        let path = Self::normalize_path(path).to_string();

        runtime::run(async move {
            let metadata = op.stat(&path).await.map_err(|e| match e.kind() {
                ErrorKind::NotFound => anyhow!("Object not found: {}", path),
                _ => anyhow!(e),
            })?;
            Ok(Self::to_object_info(path, &metadata))
        })
        .await
    }

    fn object_uri(&self, path: &str) -> String {
        let path = Self::normalize_path(path);
        match &self.config.params {
            StorageParams::S3 { bucket, .. } => s3::object_uri(bucket, path),
            StorageParams::Gcs { bucket, .. } => gcs::object_uri(bucket, path),
            StorageParams::LocalFs { root_path } => local_fs::file_url(root_path, path)
                .map(String::from)
                .unwrap_or_else(|_| root_path.join(path).display().to_string()),
            StorageParams::Memory => memory::object_url(path)
                .map(String::from)
                .unwrap_or_else(|_| format!("memory:///{}", path)),
        }
    }
}
