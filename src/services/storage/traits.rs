//! Storage gateway trait.
//!
//! This module defines the seam between the asset controller and the
//! object store that holds the durable copy of every asset.

use std::sync::Arc;

use anyhow::Result;
use async_channel::Sender;
use async_trait::async_trait;
use bytes::Bytes;

use super::types::{ObjectInfo, StorageType, TransferProgress};

/// Sending half of a progress channel handed to [`StorageGateway::put`].
pub type ProgressSender = Sender<TransferProgress>;

/// Core trait for the remote object store.
///
/// Paths are plain keys without a leading slash, e.g.
/// `uploads/{user}/{timestamp}_{name}`.
///
/// # Example
///
/// ```ignore
/// use asset_gallery::services::storage::{StorageConfig, StorageFactory};
///
/// let gateway = StorageFactory::create(StorageConfig::memory())?;
/// gateway.connect().await?;
///
/// let (tx, rx) = async_channel::unbounded();
/// gateway.put("uploads/u1/1_cat.png", data, "image/png", tx).await?;
/// let url = gateway.resolve_url("uploads/u1/1_cat.png").await?;
/// ```
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Get the storage type for this gateway.
    fn storage_type(&self) -> StorageType;

    /// Connect to the storage backend and validate access.
    async fn connect(&self) -> Result<()>;

    /// Drop the backend handle.
    async fn disconnect(&self) -> Result<()>;

    /// Check if currently connected.
    async fn is_connected(&self) -> bool;

    /// Write an object, reporting progress on `progress`.
    ///
    /// Progress reports are non-decreasing, and the report with
    /// `bytes_sent == total_bytes` is only sent once the object is durable.
    /// The sender is dropped when the call returns.
    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        progress: ProgressSender,
    ) -> Result<()>;

    /// List every object under `prefix`, recursively. Directories are omitted.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Resolve a URL the viewer can fetch the object from.
    ///
    /// The URL may expire; callers treat it as re-fetchable, never as identity.
    async fn resolve_url(&self, path: &str) -> Result<String>;

    /// Delete an object. Deleting an absent object succeeds.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Get metadata for an object.
    async fn stat(&self, path: &str) -> Result<ObjectInfo>;

    /// Get the backend URI for an object (e.g. `s3://bucket/path`).
    fn object_uri(&self, path: &str) -> String;
}

/// A shared storage gateway for dynamic dispatch.
pub type SharedStorageGateway = Arc<dyn StorageGateway>;
