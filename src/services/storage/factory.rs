//! Storage gateway factory.
//!
//! The factory builds the gateway for a storage configuration, validating
//! the configuration first.

use std::sync::Arc;

use anyhow::{Result, anyhow};

use super::gateway::{GatewaySettings, OpendalGateway};
use super::traits::SharedStorageGateway;
use super::types::StorageConfig;

/// Factory for creating storage gateways based on configuration.
///
/// # Example
///
/// ```ignore
/// use asset_gallery::services::storage::{StorageFactory, StorageConfig, StorageType, StorageParams};
///
/// let config = StorageConfig::new(
///     "Firebase".to_string(),
///     StorageType::Gcs,
///     StorageParams::gcs("my-app.appspot.com".to_string(), None),
/// );
///
/// let gateway = StorageFactory::create(config)?;
/// gateway.connect().await?;
/// ```
pub struct StorageFactory;

impl StorageFactory {
    /// Create a gateway with default transfer settings.
    pub fn create(config: StorageConfig) -> Result<SharedStorageGateway> {
        Self::create_with(config, GatewaySettings::default())
    }

    /// Create a gateway with explicit transfer settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid for its storage type.
    pub fn create_with(
        config: StorageConfig,
        settings: GatewaySettings,
    ) -> Result<SharedStorageGateway> {
        config.validate().map_err(|e| anyhow!(e))?;

        if let Some(base) = &settings.public_base_url {
            url::Url::parse(base).map_err(|e| anyhow!("Invalid public base URL {}: {}", base, e))?;
        }

        tracing::debug!(storage = %config.name, kind = %config.storage_type, "Creating storage gateway");
        Ok(Arc::new(OpendalGateway::new(config, settings)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::types::{StorageParams, StorageType};
    use std::path::PathBuf;

    #[test]
    fn test_factory_validates_config() {
        let config = StorageConfig::new(
            "test".to_string(),
            StorageType::S3,
            StorageParams::s3(None, "us-east-1".to_string(), "".to_string(), None, false),
        );

        assert!(StorageFactory::create(config).is_err());
    }

    #[test]
    fn test_factory_creates_local_fs() {
        let config = StorageConfig::new(
            "test".to_string(),
            StorageType::LocalFs,
            StorageParams::local_fs(PathBuf::from("/tmp/test")),
        );

        let gateway = StorageFactory::create(config).unwrap();
        assert_eq!(gateway.storage_type(), StorageType::LocalFs);
    }

    #[test]
    fn test_factory_rejects_bad_public_url() {
        let settings = GatewaySettings {
            public_base_url: Some("not a url".to_string()),
            ..GatewaySettings::default()
        };
        assert!(StorageFactory::create_with(StorageConfig::memory(), settings).is_err());
    }
}
