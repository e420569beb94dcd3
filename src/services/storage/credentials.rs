//! Storage secrets kept in the system keyring.
//!
//! Only non-secret connection parameters are written to the JSON config;
//! the S3 secret access key is stored under the connection's id.

use anyhow::Result;
#[cfg(feature = "keyring")]
use anyhow::Context;
#[cfg(feature = "keyring")]
use keyring::Entry;
use uuid::Uuid;

#[cfg(feature = "keyring")]
const KEYRING_SERVICE: &str = "asset-gallery-storage";

#[cfg(feature = "keyring")]
fn keyring_entry(connection_id: &Uuid) -> Result<Entry> {
    Entry::new(KEYRING_SERVICE, &connection_id.to_string())
        .context("Failed to create keyring entry")
}

/// Store the secret for a storage connection.
#[cfg(feature = "keyring")]
pub fn store_secret(connection_id: &Uuid, secret: &str) -> Result<()> {
    keyring_entry(connection_id)?
        .set_password(secret)
        .context("Failed to store secret in keyring")
}

#[cfg(not(feature = "keyring"))]
pub fn store_secret(_connection_id: &Uuid, _secret: &str) -> Result<()> {
    tracing::warn!("Keyring feature disabled - secret will not be stored securely");
    Ok(())
}

/// Load the secret for a storage connection, `None` if nothing is stored.
#[cfg(feature = "keyring")]
pub fn load_secret(connection_id: &Uuid) -> Result<Option<String>> {
    match keyring_entry(connection_id)?.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e).context("Failed to retrieve secret from keyring"),
    }
}

#[cfg(not(feature = "keyring"))]
pub fn load_secret(_connection_id: &Uuid) -> Result<Option<String>> {
    tracing::warn!("Keyring feature disabled - cannot retrieve stored secret");
    Ok(None)
}

/// Forget the secret for a storage connection.
#[cfg(feature = "keyring")]
pub fn delete_secret(connection_id: &Uuid) -> Result<()> {
    let entry = keyring_entry(connection_id)?;
    let _ = entry.delete_credential();
    Ok(())
}

#[cfg(not(feature = "keyring"))]
pub fn delete_secret(_connection_id: &Uuid) -> Result<()> {
    Ok(())
}
