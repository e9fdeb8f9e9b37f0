//! Authentication models

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// OAuth client credentials plus a long-lived refresh token.
///
/// Replaced wholesale when the user re-authenticates, never edited in place.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialSet {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl CredentialSet {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Short stable digest identifying this credential set.
    ///
    /// Used to namespace cache keys without putting secrets into them.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.client_id.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.client_secret.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.refresh_token.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("refresh_token", &"***")
            .finish()
    }
}

/// Short-lived access token returned by a refresh grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,

    /// Lifetime in seconds
    pub expires_in: u64,
}
