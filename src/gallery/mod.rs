//! Asset synchronization: classification, upload lifecycle, listing and
//! deletion reconciliation.

mod asset;
mod controller;
mod error;
mod events;
#[cfg(test)]
pub(crate) mod testing;

pub use asset::{
    AcceptedFile, AssetKind, AssetRecord, GLB_CONTENT_TYPE, IncomingFile, destination_path,
    guess_mime, split_stored_name,
};
pub use controller::{AssetSyncController, BatchReport};
pub use error::GalleryError;
pub use events::{EVENT_BUFFER, GalleryEvent};
