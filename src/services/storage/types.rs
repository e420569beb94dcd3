//! Storage types and configuration.
//!
//! This module defines types for the asset store connection including
//! storage types, configuration, transfer progress and object metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Supported storage backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Amazon S3 and S3-compatible services (MinIO, R2, DigitalOcean Spaces)
    S3,
    /// Google Cloud Storage (including Firebase Storage buckets)
    Gcs,
    /// Local filesystem
    LocalFs,
    /// Process-local memory, used for previews and tests
    Memory,
}

impl StorageType {
    /// Get the display name for this storage type.
    pub fn display_name(&self) -> &'static str {
        match self {
            StorageType::S3 => "Amazon S3",
            StorageType::Gcs => "Google Cloud Storage",
            StorageType::LocalFs => "Local Filesystem",
            StorageType::Memory => "In-Memory",
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuration for a storage connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Unique identifier for this connection (keys the keyring secret).
    pub id: Uuid,
    /// User-friendly name for the connection.
    pub name: String,
    /// The type of storage backend.
    pub storage_type: StorageType,
    /// Storage-specific parameters.
    pub params: StorageParams,
}

impl StorageConfig {
    /// Create a new storage configuration.
    pub fn new(name: String, storage_type: StorageType, params: StorageParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            storage_type,
            params,
        }
    }

    /// In-memory storage, handy for previews and tests.
    pub fn memory() -> Self {
        Self::new("memory".to_string(), StorageType::Memory, StorageParams::Memory)
    }

    /// Validate the configuration for the given storage type.
    pub fn validate(&self) -> Result<(), String> {
        match (&self.storage_type, &self.params) {
            (StorageType::S3, StorageParams::S3 { bucket, region, .. }) => {
                if bucket.is_empty() {
                    return Err("S3 bucket name is required".to_string());
                }
                if region.is_empty() {
                    return Err("S3 region is required".to_string());
                }
                Ok(())
            }
            (StorageType::Gcs, StorageParams::Gcs { bucket, .. }) => {
                if bucket.is_empty() {
                    return Err("GCS bucket name is required".to_string());
                }
                Ok(())
            }
            (StorageType::LocalFs, StorageParams::LocalFs { root_path }) => {
                if root_path.as_os_str().is_empty() {
                    return Err("Local filesystem root path is required".to_string());
                }
                Ok(())
            }
            (StorageType::Memory, StorageParams::Memory) => Ok(()),
            _ => Err(format!(
                "Parameter type mismatch: {:?} params for {:?} storage",
                self.params.param_type(),
                self.storage_type
            )),
        }
    }
}

/// Storage-specific connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageParams {
    /// S3 and S3-compatible storage parameters.
    S3 {
        /// S3 endpoint URL (leave empty for AWS, set for MinIO/R2/etc.)
        endpoint: Option<String>,
        /// AWS region (e.g., "us-east-1")
        region: String,
        /// Bucket name
        bucket: String,
        /// Access key ID (the secret lives in the keyring)
        access_key_id: Option<String>,
        /// Use path-style addressing (required for MinIO)
        path_style: bool,
        /// Allow unsigned/anonymous requests for public buckets
        #[serde(default)]
        allow_anonymous: bool,
        #[serde(default)]
        extra_options: HashMap<String, String>,
    },
    /// Google Cloud Storage parameters.
    Gcs {
        /// GCS bucket name (e.g. "my-app.appspot.com" for Firebase)
        bucket: String,
        /// Service account credentials JSON path
        credentials_path: Option<PathBuf>,
        #[serde(default)]
        extra_options: HashMap<String, String>,
    },
    /// Local filesystem parameters.
    LocalFs {
        /// Root directory path
        root_path: PathBuf,
    },
    Memory,
}

impl StorageParams {
    /// Create S3 parameters.
    pub fn s3(
        endpoint: Option<String>,
        region: String,
        bucket: String,
        access_key_id: Option<String>,
        path_style: bool,
    ) -> Self {
        StorageParams::S3 {
            endpoint,
            region,
            bucket,
            access_key_id,
            path_style,
            allow_anonymous: false,
            extra_options: HashMap::new(),
        }
    }

    /// Create GCS parameters.
    pub fn gcs(bucket: String, credentials_path: Option<PathBuf>) -> Self {
        StorageParams::Gcs {
            bucket,
            credentials_path,
            extra_options: HashMap::new(),
        }
    }

    /// Create local filesystem parameters.
    pub fn local_fs(root_path: PathBuf) -> Self {
        StorageParams::LocalFs { root_path }
    }

    /// Get the parameter type name.
    pub fn param_type(&self) -> &'static str {
        match self {
            StorageParams::S3 { .. } => "s3",
            StorageParams::Gcs { .. } => "gcs",
            StorageParams::LocalFs { .. } => "local_fs",
            StorageParams::Memory => "memory",
        }
    }
}

/// Information about a stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Full path to the object (relative to the bucket root, no leading slash).
    pub path: String,
    /// Final path segment.
    pub name: String,
    /// Size in bytes, when the backend reports it.
    pub size: Option<u64>,
    /// Last modified timestamp.
    pub last_modified: Option<DateTime<Utc>>,
    /// Content type / MIME type.
    pub content_type: Option<String>,
}

impl ObjectInfo {
    /// Create a new file object info.
    pub fn file(
        path: String,
        size: Option<u64>,
        last_modified: Option<DateTime<Utc>>,
        content_type: Option<String>,
    ) -> Self {
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            size,
            last_modified,
            content_type,
        }
    }

    /// Get the lowercased file extension if any.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

/// Bytes moved so far by a single `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn new(bytes_sent: u64, total_bytes: u64) -> Self {
        Self {
            bytes_sent,
            total_bytes,
        }
    }

    /// Fraction in `[0, 1]`; an empty transfer counts as complete.
    pub fn ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_sent as f64 / self.total_bytes as f64).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_sent >= self.total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_display() {
        assert_eq!(StorageType::S3.display_name(), "Amazon S3");
        assert_eq!(StorageType::Memory.to_string(), "In-Memory");
    }

    #[test]
    fn test_storage_config_validation() {
        let config = StorageConfig::new(
            "test".to_string(),
            StorageType::S3,
            StorageParams::s3(None, "us-east-1".to_string(), "my-bucket".to_string(), None, false),
        );
        assert!(config.validate().is_ok());

        let config = StorageConfig::new(
            "test".to_string(),
            StorageType::S3,
            StorageParams::s3(None, "us-east-1".to_string(), "".to_string(), None, false),
        );
        assert!(config.validate().is_err());

        let mismatched = StorageConfig::new(
            "test".to_string(),
            StorageType::Gcs,
            StorageParams::Memory,
        );
        assert!(mismatched.validate().is_err());
        assert!(StorageConfig::memory().validate().is_ok());
    }

    #[test]
    fn test_params_round_trip_through_json() {
        let params = StorageParams::gcs("demo.appspot.com".to_string(), None);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"type\":\"gcs\""));
        let back: StorageParams = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, StorageParams::Gcs { bucket, .. } if bucket == "demo.appspot.com"));
    }

    #[test]
    fn test_object_info_name_and_extension() {
        let obj = ObjectInfo::file("uploads/u1/17_Scene.GLB".to_string(), Some(3), None, None);
        assert_eq!(obj.name, "17_Scene.GLB");
        assert_eq!(obj.extension().as_deref(), Some("glb"));

        let bare = ObjectInfo::file("uploads/u1/README".to_string(), None, None, None);
        assert_eq!(bare.extension(), None);
    }

    #[test]
    fn test_transfer_progress_ratio() {
        assert_eq!(TransferProgress::new(0, 0).ratio(), 1.0);
        assert_eq!(TransferProgress::new(50, 200).ratio(), 0.25);
        assert!(TransferProgress::new(200, 200).is_complete());
        assert!(!TransferProgress::new(199, 200).is_complete());
    }
}
