//! Asset storage backends.
//!
//! This module provides a unified gateway to the object store that holds
//! uploaded assets, using Apache OpenDAL.
//!
//! Supported storage backends:
//!
//! - **Amazon S3** and S3-compatible services (MinIO, Cloudflare R2, DigitalOcean Spaces)
//! - **Google Cloud Storage (GCS)**, which also covers Firebase Storage buckets
//! - **Local Filesystem** for development
//! - **Memory** for previews and tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    StorageFactory                           │
//! │  - Validates config, builds the gateway                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              OpendalGateway (StorageGateway)                │
//! │  - put with progress, list, resolve URL, delete, stat       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────┬───────┴───────┬─────────────┐
//!        ▼             ▼               ▼             ▼
//!   ┌─────────┐   ┌─────────┐    ┌──────────┐   ┌─────────┐
//!   │   S3    │   │   GCS   │    │ LocalFs  │   │ Memory  │
//!   └─────────┘   └─────────┘    └──────────┘   └─────────┘
//! ```

pub mod credentials;
mod factory;
mod gateway;
mod gcs;
mod local_fs;
mod memory;
mod runtime;
mod s3;
mod traits;
mod types;

pub use factory::StorageFactory;
pub use gateway::{GatewaySettings, OpendalGateway};
pub use traits::{ProgressSender, SharedStorageGateway, StorageGateway};
pub use types::{ObjectInfo, StorageConfig, StorageParams, StorageType, TransferProgress};
