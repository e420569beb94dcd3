//! Asset descriptors and file classification.
//!
//! Files arrive as [`IncomingFile`] (a name, a MIME hint and bytes) and are
//! validated into [`AcceptedFile`] before any network work starts.

use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::GalleryError;
use crate::services::storage::ObjectInfo;

/// Content type for binary glTF.
pub const GLB_CONTENT_TYPE: &str = "model/gltf-binary";

const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
    ("ico", "image/x-icon"),
    ("avif", "image/avif"),
];

/// What kind of preview an asset needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    /// A 3D model, previewed through the external viewer.
    Model,
}

impl AssetKind {
    /// Classify a file offered for upload.
    ///
    /// A name ending with `model_suffix` (case-insensitive) is a model; a
    /// MIME hint starting with `image/` is an image; anything else is
    /// rejected. The suffix check wins when both match.
    pub fn classify(name: &str, mime: Option<&str>, model_suffix: &str) -> Option<Self> {
        if has_suffix(name, model_suffix) {
            return Some(AssetKind::Model);
        }
        match mime {
            Some(mime) if mime.to_ascii_lowercase().starts_with("image/") => Some(AssetKind::Image),
            _ => None,
        }
    }

    /// Classify an object found in storage, where the only MIME hint is
    /// whatever the backend recorded.
    pub fn from_stored(object: &ObjectInfo, model_suffix: &str) -> Option<Self> {
        if let Some(kind) = Self::classify(&object.name, object.content_type.as_deref(), model_suffix)
        {
            return Some(kind);
        }
        let ext = object.extension()?;
        IMAGE_EXTENSIONS
            .iter()
            .any(|(known, _)| *known == ext)
            .then_some(AssetKind::Image)
    }
}

fn has_suffix(name: &str, suffix: &str) -> bool {
    !suffix.is_empty()
        && name.len() > suffix.len()
        && name
            .get(name.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

/// Guess a MIME hint from a file name's extension.
pub fn guess_mime(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if ext == "glb" {
        return Some(GLB_CONTENT_TYPE);
    }
    IMAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// A local descriptor of one stored asset.
///
/// `path` is the identity; `url` is a possibly stale projection of it and
/// is never compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub path: String,
    pub url: Url,
    /// Original file name, without the timestamp prefix.
    pub name: String,
    pub kind: AssetKind,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

impl PartialEq for AssetRecord {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for AssetRecord {}

impl AssetRecord {
    /// Recency used to order the gallery, most recent first.
    pub(crate) fn recency_key(&self) -> (Option<DateTime<Utc>>, &str) {
        (self.uploaded_at, self.path.as_str())
    }
}

/// A file handed to the gallery before validation.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub mime: Option<String>,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime: Option<&str>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            data: data.into(),
        }
    }

    /// Read a file from disk, guessing the MIME hint from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no usable file name", path.display()))?
            .to_string();
        let data = async_fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mime = guess_mime(&name);

        Ok(Self::new(name, mime, data))
    }

    /// Validate into an [`AcceptedFile`].
    pub fn accept(self, model_suffix: &str) -> Result<AcceptedFile, GalleryError> {
        let name = base_name(&self.name).to_string();
        if name.is_empty() {
            return Err(GalleryError::validation(self.name, "file has no name"));
        }

        let kind = AssetKind::classify(&name, self.mime.as_deref(), model_suffix).ok_or_else(
            || {
                GalleryError::validation(
                    name.clone(),
                    format!(
                        "unsupported file type {}; upload an image or a {} model",
                        self.mime.as_deref().unwrap_or("(unknown)"),
                        model_suffix
                    ),
                )
            },
        )?;

        let content_type = match (kind, self.mime) {
            (AssetKind::Image, Some(mime)) => mime,
            (AssetKind::Model, _) => GLB_CONTENT_TYPE.to_string(),
            (AssetKind::Image, None) => "application/octet-stream".to_string(),
        };

        Ok(AcceptedFile {
            name,
            kind,
            content_type,
            data: self.data,
        })
    }
}

/// Last path component, in case a client sent a full path.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

/// A validated upload candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedFile {
    pub name: String,
    pub kind: AssetKind,
    pub content_type: String,
    pub data: Bytes,
}

/// `{root}/{user}/{timestamp}_{name}`.
pub fn destination_path(root: &str, user: &str, timestamp_millis: i64, name: &str) -> String {
    format!(
        "{}/{}/{}_{}",
        root.trim_matches('/'),
        user,
        timestamp_millis,
        name
    )
}

/// Split a stored object name into its upload timestamp and original name.
///
/// Names without a numeric `{timestamp}_` prefix come back whole.
pub fn split_stored_name(stored: &str) -> (Option<DateTime<Utc>>, &str) {
    if let Some((prefix, rest)) = stored.split_once('_') {
        if !rest.is_empty() && !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
            if let Some(at) = prefix
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
            {
                return (Some(at), rest);
            }
        }
    }
    (None, stored)
}
