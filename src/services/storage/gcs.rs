//! Google Cloud Storage backend using OpenDAL.
//!
//! Firebase Storage buckets are plain GCS buckets, so this backend also
//! serves Firebase projects (`<project>.appspot.com`).

use anyhow::{Result, anyhow};
use opendal::Operator;
use opendal::layers::LoggingLayer;
use opendal::services::Gcs;

use super::types::StorageParams;

/// Build the OpenDAL operator for GCS parameters.
pub(super) fn build_operator(params: &StorageParams) -> Result<Operator> {
    let StorageParams::Gcs {
        bucket,
        credentials_path,
        ..
    } = params
    else {
        return Err(anyhow!("Invalid storage params for GCS"));
    };

    let mut builder = Gcs::default().bucket(bucket);

    // Without a credentials file OpenDAL falls back to the ambient
    // application default credentials.
    if let Some(creds_path) = credentials_path {
        let creds_path_str = creds_path
            .to_str()
            .ok_or_else(|| anyhow!("Invalid credentials path"))?;
        builder = builder.credential_path(creds_path_str);
    }

    let op = Operator::new(builder)?
        .layer(LoggingLayer::default())
        .finish();

    Ok(op)
}

/// `gs://bucket/path` URI for an object.
pub(super) fn object_uri(bucket: &str, path: &str) -> String {
    format!("gs://{}/{}", bucket, path)
}
