//! In-process memory backend.

use anyhow::Result;
use url::Url;
use opendal::Operator;
use opendal::layers::LoggingLayer;
use opendal::services::Memory;

pub(super) fn build_operator() -> Result<Operator> {
    let op = Operator::new(Memory::default())?
        .layer(LoggingLayer::default())
        .finish();

    Ok(op)
}

/// `memory:///path` URL; only meaningful inside this process.
pub(super) fn object_url(path: &str) -> Result<Url> {
    super::gateway::append_path(Url::parse("memory:///")?, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_keeps_hash_in_path() {
        let url = object_url("uploads/u1/1_cat#1.png").unwrap();
        assert_eq!(url.as_str(), "memory:///uploads/u1/1_cat%231.png");
        assert_eq!(url.fragment(), None);
    }
}
