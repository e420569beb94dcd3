//! Gallery state.
//!
//! Everything the view layer renders: the asset list, the selection that
//! drives the preview overlay, drag feedback, the in-flight upload and the
//! last notice. Only the asset controller mutates it.

use serde::Serialize;
use uuid::Uuid;

use crate::gallery::{AcceptedFile, AssetRecord, GalleryError};

/// Lifecycle of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Succeeded | UploadStatus::Failed)
    }
}

/// The upload currently in flight.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: Uuid,
    pub file: AcceptedFile,
    pub destination_path: String,
    /// Fraction transferred, non-decreasing, in `[0, 1]`.
    pub progress_ratio: f64,
    pub status: UploadStatus,
}

impl UploadTask {
    pub fn new(file: AcceptedFile, destination_path: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            file,
            destination_path,
            progress_ratio: 0.0,
            status: UploadStatus::Pending,
        }
    }

    /// Record a progress report. Returns the ratio now in effect.
    ///
    /// Reports never move the ratio backwards.
    pub fn advance(&mut self, ratio: f64) -> f64 {
        let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        if self.status == UploadStatus::Pending {
            self.status = UploadStatus::InProgress;
        }
        if ratio > self.progress_ratio {
            self.progress_ratio = ratio;
        }
        self.progress_ratio
    }

    /// Progress as a whole percentage, for labels.
    pub fn percent(&self) -> u8 {
        (self.progress_ratio * 100.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

impl From<&GalleryError> for Notice {
    fn from(err: &GalleryError) -> Self {
        let level = if err.is_validation() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        Self {
            level,
            message: err.to_string(),
        }
    }
}

/// The controller's in-memory view of a user's assets.
#[derive(Debug, Clone, Default)]
pub struct GalleryState {
    /// Most recent first.
    pub assets: Vec<AssetRecord>,
    /// Drives the preview overlay.
    pub selected: Option<AssetRecord>,
    pub drag_active: bool,
    /// `None` while idle.
    pub upload: Option<UploadTask>,
    pub notice: Option<Notice>,
}

impl GalleryState {
    pub fn find(&self, path: &str) -> Option<&AssetRecord> {
        self.assets.iter().find(|a| a.path == path)
    }

    pub fn is_uploading(&self) -> bool {
        self.upload.is_some()
    }

    /// Ratio of the in-flight upload, if any.
    pub fn upload_progress(&self) -> Option<f64> {
        self.upload.as_ref().map(|t| t.progress_ratio)
    }
}
