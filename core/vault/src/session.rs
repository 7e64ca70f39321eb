//! Authentication seam.
//!
//! The vault never authenticates callers itself. An `IdentityProvider`
//! turns an opaque session token into the caller's `Identity`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use uuid::Uuid;

use kinvault_common::{Error, Identity, Result};

/// Opaque session token issued by the authentication collaborator.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a new random token.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a token received from elsewhere.
    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// Authentication collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the identity behind a session.
    ///
    /// # Errors
    /// - `Unauthorized` if the session is unknown or expired
    async fn identity(&self, token: &SessionToken) -> Result<Identity>;
}

/// Identity provider backed by an in-process session table.
#[derive(Default)]
pub struct StaticIdentityProvider {
    sessions: RwLock<HashMap<SessionToken, Identity>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `identity`.
    pub async fn sign_in(&self, identity: Identity) -> SessionToken {
        let token = SessionToken::new();
        self.sessions.write().await.insert(token.clone(), identity);
        token
    }

    /// End a session. Returns whether it existed.
    pub async fn sign_out(&self, token: &SessionToken) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn identity(&self, token: &SessionToken) -> Result<Identity> {
        self.sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Unknown or expired session".to_string()))
    }
}
