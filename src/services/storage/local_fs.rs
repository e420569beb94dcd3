//! Local filesystem backend using OpenDAL.
//!
//! Useful for development: assets land in a plain directory and read URLs
//! are `file://` URLs.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use opendal::Operator;
use opendal::layers::LoggingLayer;
use opendal::services::Fs;
use url::Url;

/// Build the OpenDAL operator rooted at `root_path`.
pub(super) fn build_operator(root_path: &Path) -> Result<Operator> {
    let root = root_path
        .to_str()
        .ok_or_else(|| anyhow!("Invalid path encoding"))?;

    let op = Operator::new(Fs::default().root(root))?
        .layer(LoggingLayer::default())
        .finish();

    Ok(op)
}

/// `file://` URL for an object below `root_path`. A relative root is
/// resolved against the working directory.
pub(super) fn file_url(root_path: &Path, path: &str) -> Result<Url> {
    let root = std::path::absolute(root_path)
        .with_context(|| format!("Cannot resolve storage root {}", root_path.display()))?;
    let base = Url::from_directory_path(&root)
        .map_err(|_| anyhow!("Storage root is not a valid file URL: {}", root.display()))?;
    super::gateway::append_path(base, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_url() {
        let root = PathBuf::from("/home/user/assets");
        assert_eq!(
            file_url(&root, "uploads/u1/1_cat.png").unwrap().as_str(),
            "file:///home/user/assets/uploads/u1/1_cat.png"
        );
    }

    #[test]
    fn test_file_url_escapes_reserved_characters() {
        let root = PathBuf::from("/home/user/assets");
        let url = file_url(&root, "uploads/u1/1_cat#1?.png").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), None);
        assert_eq!(url.path(), "/home/user/assets/uploads/u1/1_cat%231%3F.png");
        assert_eq!(
            url.to_file_path().unwrap(),
            root.join("uploads/u1/1_cat#1?.png")
        );
    }

    #[test]
    fn test_build_operator() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_operator(dir.path()).is_ok());
    }
}
