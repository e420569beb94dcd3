use thiserror::Error;

/// Failures surfaced by the asset controller.
///
/// None of these are fatal: the worst outcome is a stale gallery, which a
/// refresh repairs.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The file is neither an image nor a model. No network call was made.
    #[error("{name}: {reason}")]
    Validation { name: String, reason: String },

    /// The transfer failed; the file is not in the gallery.
    #[error("upload of {path} failed: {cause:#}")]
    Upload { path: String, cause: anyhow::Error },

    /// The remote listing could not be read; the gallery keeps its previous contents.
    #[error("could not list {prefix}: {cause:#}")]
    Listing { prefix: String, cause: anyhow::Error },

    /// The remote delete failed; the asset is still listed.
    #[error("could not delete {path}: {cause:#}")]
    Deletion { path: String, cause: anyhow::Error },

    #[error("no user is signed in")]
    NotSignedIn,

    #[error("invalid user: {0}")]
    InvalidUser(String),
}

impl GalleryError {
    pub fn validation(name: impl Into<String>, reason: impl Into<String>) -> Self {
        GalleryError::Validation {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the user can fix this by picking a different file.
    pub fn is_validation(&self) -> bool {
        matches!(self, GalleryError::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_messages_include_cause_chain() {
        let err = GalleryError::Upload {
            path: "uploads/u1/1_cat.png".to_string(),
            cause: anyhow!("connection reset").context("write failed"),
        };
        assert_eq!(
            err.to_string(),
            "upload of uploads/u1/1_cat.png failed: write failed: connection reset"
        );
    }

    #[test]
    fn test_validation_message() {
        let err = GalleryError::validation("doc.pdf", "unsupported file type");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "doc.pdf: unsupported file type");
    }
}
