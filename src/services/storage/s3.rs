//! S3 backend using OpenDAL.
//!
//! Covers Amazon S3 and S3-compatible services:
//! - MinIO
//! - Cloudflare R2
//! - DigitalOcean Spaces

use anyhow::{Result, anyhow};
use opendal::Operator;
use opendal::layers::LoggingLayer;
use opendal::services::S3;

use super::types::StorageParams;

/// Build the OpenDAL operator for S3 parameters.
pub(super) fn build_operator(params: &StorageParams, secret_key: Option<&str>) -> Result<Operator> {
    let StorageParams::S3 {
        endpoint,
        region,
        bucket,
        access_key_id,
        path_style,
        allow_anonymous,
        ..
    } = params
    else {
        return Err(anyhow!("Invalid storage params for S3"));
    };

    let mut builder = S3::default().bucket(bucket).region(region);

    // Custom endpoint for S3-compatible services
    if let Some(ep) = endpoint.as_deref().filter(|ep| !ep.is_empty()) {
        builder = builder.endpoint(ep);
    }

    if *allow_anonymous {
        builder = builder.allow_anonymous();
    } else if let Some(key_id) = access_key_id {
        builder = builder.access_key_id(key_id);
        if let Some(secret) = secret_key {
            builder = builder.secret_access_key(secret);
        }
    }

    // OpenDAL defaults to path-style addressing
    if !path_style {
        builder = builder.enable_virtual_host_style();
    }

    let op = Operator::new(builder)?
        .layer(LoggingLayer::default())
        .finish();

    Ok(op)
}

/// `s3://bucket/path` URI for an object.
pub(super) fn object_uri(bucket: &str, path: &str) -> String {
    format!("s3://{}/{}", bucket, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_uri() {
        assert_eq!(
            object_uri("my-bucket", "uploads/u1/1_cat.png"),
            "s3://my-bucket/uploads/u1/1_cat.png"
        );
    }

    #[test]
    fn test_rejects_foreign_params() {
        assert!(build_operator(&StorageParams::Memory, None).is_err());
    }

    #[test]
    fn test_builds_minio_operator() {
        let params = StorageParams::s3(
            Some("http://localhost:9000".to_string()),
            "us-east-1".to_string(),
            "assets".to_string(),
            Some("minio".to_string()),
            true,
        );
        assert!(build_operator(&params, Some("minio123")).is_ok());
    }
}
