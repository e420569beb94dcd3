//! Upload, list and preview image and 3D model assets kept in cloud object
//! storage.
//!
//! ```ignore
//! use std::sync::Arc;
//! use asset_gallery::{AssetSyncController, GalleryConfig, IncomingFile, LocalSession};
//! use asset_gallery::services::storage::StorageFactory;
//!
//! let config = GalleryConfig::load_or_default(&GalleryConfig::default_path()?)?;
//! let gateway = StorageFactory::create_with(config.storage.clone(), config.gateway_settings())?;
//!
//! let mut gallery = AssetSyncController::attach(&session, gateway, &config).await?;
//! gallery.accept_files([IncomingFile::from_path("scene.glb").await?]).await;
//! ```

pub mod auth;
pub mod config;
pub mod gallery;
pub mod logging;
pub mod preview;
pub mod services;
pub mod state;

pub use auth::{AuthContext, LocalSession, UserId, UserIdentity};
pub use config::GalleryConfig;
pub use gallery::{
    AcceptedFile, AssetKind, AssetRecord, AssetSyncController, BatchReport, GalleryError,
    GalleryEvent, IncomingFile,
};
pub use preview::{Preview, ViewerRequest, ViewerSettings};
pub use state::{GalleryState, Notice, NoticeLevel, UploadStatus, UploadTask};
