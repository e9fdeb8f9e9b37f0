//! Token API trait

use async_trait::async_trait;

use crate::client::models::{CredentialSet, TokenGrant};
use crate::error::Result;

/// Access-token acquisition
#[async_trait]
pub trait TokenApi: Send + Sync {
    /// Exchange the refresh token for a short-lived access token.
    ///
    /// A non-2xx response or a response without an access token is an error.
    async fn refresh_access_token(&self, credentials: &CredentialSet) -> Result<TokenGrant>;
}
