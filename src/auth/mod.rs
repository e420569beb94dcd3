//! Signed-in user identity.
//!
//! Session lifecycle belongs to an external identity provider. The gallery
//! only needs to know who the current user is, and it reads that once when
//! a controller attaches.

use std::fmt;

use anyhow::Result;
use async_lock::RwLock;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::gallery::GalleryError;

/// Opaque user id, used verbatim as a storage path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a user id.
    ///
    /// Ids must be non-empty and must not contain `/`, since they name a
    /// directory under the upload root.
    pub fn new(id: impl Into<String>) -> Result<Self, GalleryError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(GalleryError::InvalidUser("user id is empty".to_string()));
        }
        if id.contains('/') {
            return Err(GalleryError::InvalidUser(format!(
                "user id {:?} contains '/'",
                id
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = GalleryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            display_name: None,
        }
    }
}

/// Source of the current user identity.
#[async_trait]
pub trait AuthContext: Send + Sync {
    /// The signed-in user, if any.
    async fn current_user(&self) -> Option<UserIdentity>;

    /// End the session. Navigating back to the login view is up to the caller.
    async fn sign_out(&self) -> Result<()>;
}

/// In-process session, for embedding applications that handle login
/// themselves and for tests.
#[derive(Default)]
pub struct LocalSession {
    user: RwLock<Option<UserIdentity>>,
}

impl LocalSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserIdentity) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub async fn sign_in(&self, user: UserIdentity) {
        tracing::info!(user = %user.id, "Signed in");
        *self.user.write().await = Some(user);
    }
}

#[async_trait]
impl AuthContext for LocalSession {
    async fn current_user(&self) -> Option<UserIdentity> {
        self.user.read().await.clone()
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(user) = self.user.write().await.take() {
            tracing::info!(user = %user.id, "Signed out");
        }
        Ok(())
    }
}
