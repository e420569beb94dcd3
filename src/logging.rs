//! Tracing setup for applications embedding the gallery.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` applies (for
/// example `"asset_gallery=debug,opendal=info"`). Fails if a subscriber is
/// already installed.
pub fn init(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| anyhow!("Invalid log filter {:?}: {}", default_directive, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // The first call may lose to another test's subscriber; the second never wins.
        let _ = init("asset_gallery=debug");
        assert!(init("asset_gallery=debug").is_err());
    }
}
