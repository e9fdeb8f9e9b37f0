//! Access session lifecycle
//!
//! [`AuthSessionManager`] turns a [`CredentialSet`] into a short-lived
//! [`AccessSession`], refreshing on demand. Concurrent callers asking for the
//! same credentials share one in-flight refresh.
//!
//! States: unauthenticated, acquiring, authenticated; an expired session goes
//! back through acquiring on the next call.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use tokio::sync::Mutex;

pub use crate::client::models::CredentialSet;
use crate::client::TokenApi;
use crate::client::models::TokenGrant;
use crate::error::{ApiError, Error, Result};

/// Sessions are treated as expired this long before the server says so,
/// to absorb clock skew and request latency.
pub const SAFETY_BUFFER_MINUTES: i64 = 5;

/// Upper bound on the lifetime accepted from a token response
const MAX_LIFETIME_SECS: u64 = 60 * 60 * 24 * 365;

/// An access token bound to the credentials that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct AccessSession {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub credentials: CredentialSet,
}

impl AccessSession {
    /// Build a session from a refresh grant received at `now`.
    pub fn from_grant(grant: TokenGrant, credentials: CredentialSet, now: DateTime<Utc>) -> Self {
        let lifetime = Duration::seconds(grant.expires_in.min(MAX_LIFETIME_SECS) as i64);
        let buffer = Duration::minutes(SAFETY_BUFFER_MINUTES);

        Self {
            access_token: grant.access_token,
            expires_at: now + lifetime - buffer,
            credentials,
        }
    }

    /// Check if the session can still be used at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

type PendingRefresh = Shared<BoxFuture<'static, std::result::Result<AccessSession, ApiError>>>;

#[derive(Default)]
struct SessionState {
    session: Option<AccessSession>,
    acquiring: Option<(CredentialSet, PendingRefresh)>,
}

/// Owns the active access session and the refresh in flight, if any.
pub struct AuthSessionManager<T: TokenApi + 'static> {
    api: Arc<T>,
    state: Mutex<SessionState>,
}

impl<T: TokenApi + 'static> AuthSessionManager<T> {
    pub fn new(api: Arc<T>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Return a valid session for `credentials`, refreshing if needed.
    ///
    /// A current session for the same credentials is returned as-is. A refresh
    /// already in flight for the same credentials is joined rather than
    /// duplicated. Refresh failures are returned to every joined caller and
    /// are not retried.
    pub async fn ensure_authed(&self, credentials: &CredentialSet) -> Result<AccessSession> {
        let pending = {
            let mut state = self.state.lock().await;

            if let Some(ref session) = state.session
                && session.credentials == *credentials
                && session.is_valid()
            {
                return Ok(session.clone());
            }

            let joinable = match state.acquiring {
                Some((ref acquiring, ref pending)) if acquiring == credentials => {
                    Some(pending.clone())
                }
                _ => None,
            };

            match joinable {
                Some(pending) => {
                    debug!("Joining in-flight token refresh");
                    pending
                }
                None => {
                    if state.acquiring.is_some() {
                        debug!("Credentials changed while a refresh was in flight");
                    }
                    let pending = self.start_refresh(credentials.clone());
                    state.acquiring = Some((credentials.clone(), pending.clone()));
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut state = self.state.lock().await;
        let still_current = state
            .acquiring
            .as_ref()
            .is_some_and(|(_, in_flight)| in_flight.ptr_eq(&pending));
        if still_current {
            state.acquiring = None;
        }

        match outcome {
            Ok(session) => {
                if still_current {
                    info!("Access token refreshed, valid until {}", session.expires_at);
                    state.session = Some(session.clone());
                }
                Ok(session)
            }
            Err(err) => {
                if still_current {
                    warn!("Token refresh failed: {}", err);
                }
                Err(err.into())
            }
        }
    }

    fn start_refresh(&self, credentials: CredentialSet) -> PendingRefresh {
        let api = Arc::clone(&self.api);
        async move {
            debug!("Refreshing access token for client {}", credentials.client_id);
            let grant = api
                .refresh_access_token(&credentials)
                .await
                .map_err(Error::into_api_error)?;
            Ok(AccessSession::from_grant(grant, credentials, Utc::now()))
        }
        .boxed()
        .shared()
    }

    /// Check whether `credentials` can obtain an access token.
    ///
    /// Always performs a refresh and never touches the active session.
    pub async fn is_auth_valid(&self, credentials: &CredentialSet) -> bool {
        match self.api.refresh_access_token(credentials).await {
            Ok(_) => true,
            Err(err) => {
                debug!("Credential check failed: {}", err);
                false
            }
        }
    }

    /// The active session, if any, whether or not it has expired.
    pub async fn current_session(&self) -> Option<AccessSession> {
        self.state.lock().await.session.clone()
    }

    /// Drop the active session and forget any refresh in flight.
    pub async fn purge(&self) {
        let mut state = self.state.lock().await;
        *state = SessionState::default();
        debug!("Access session purged");
    }
}
