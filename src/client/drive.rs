//! Google Drive API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::{debug, warn};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;

use super::api::{FilesApi, TokenApi};
use super::models::{CredentialSet, FileList, FileResource, TokenGrant};
use super::pagination::ListFilesParams;
use super::parallel::fetch_all;
use crate::error::{ApiError, Error, Result};

/// Drive API base URL
const API_BASE_URL: &str = "https://www.googleapis.com";

/// OAuth token endpoint
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Rate limit: 10 requests per second
const RATE_LIMIT_PER_SECOND: u32 = 10;

/// Concurrent single-file gets per batch
const MAX_CONCURRENT_GETS: usize = 8;

/// Access token lifetime assumed when the token response omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

const FILE_FIELDS: &str = "id,name,parents";

/// Drive v3 client.
///
/// Stateless apart from the rate limiter: access tokens are passed in per call.
pub struct DriveClient {
    http: HttpClient,
    base_url: String,
    token_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl DriveClient {
    /// Create a client against the production endpoints.
    pub fn new() -> Result<Self> {
        Self::with_host(None)
    }

    /// Create a client with an optional host override.
    ///
    /// With an override, both the files API and the token endpoint (`/token`)
    /// are served from that host. Used for development and tests.
    pub fn with_host(api_host: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let (base_url, token_url) = match api_host {
            Some(host) => {
                let host = host.trim_end_matches('/').to_string();
                let token_url = format!("{}/token", host);
                (host, token_url)
            }
            None => (API_BASE_URL.to_string(), TOKEN_URL.to_string()),
        };

        Ok(Self {
            http,
            base_url,
            token_url,
            rate_limiter,
        })
    }

    /// Issue an authenticated GET and map the status code.
    async fn get(
        &self,
        access_token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let sent_page_token = query.iter().any(|(k, _)| *k == "pageToken");
        check_status(response, sent_page_token).await
    }
}

/// Map non-success responses onto [`ApiError`].
async fn check_status(response: Response, sent_page_token: bool) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60);
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| status.to_string());

    let err = match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN if body.contains("RateLimitExceeded") || body.contains("rateLimitExceeded") => {
            ApiError::RateLimit(Duration::from_secs(retry_after))
        }
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound(body),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(Duration::from_secs(retry_after)),
        StatusCode::BAD_REQUEST if sent_page_token && body.contains("pageToken") => {
            ApiError::PageTokenInvalid
        }
        StatusCode::BAD_REQUEST => ApiError::BadRequest(body),
        status if status.is_server_error() => ApiError::ServerError(body),
        status => ApiError::InvalidResponse(format!("Unexpected status code: {}", status)),
    };

    Err(err.into())
}

#[async_trait]
impl TokenApi for DriveClient {
    async fn refresh_access_token(&self, credentials: &CredentialSet) -> Result<TokenGrant> {
        self.rate_limiter.until_ready().await;

        #[derive(Deserialize)]
        struct RefreshResponse {
            access_token: Option<String>,
            expires_in: Option<u64>,
        }

        let form = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::AuthRejected(format!("{}: {}", status, body)).into());
        }

        let parsed: RefreshResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;

        let access_token = parsed.access_token.ok_or_else(|| {
            ApiError::InvalidResponse("Token response did not include an access_token".to_string())
        })?;

        Ok(TokenGrant {
            access_token,
            expires_in: parsed.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        })
    }
}

#[async_trait]
impl FilesApi for DriveClient {
    async fn list_files(&self, access_token: &str, params: &ListFilesParams) -> Result<FileList> {
        let response = self
            .get(access_token, "/drive/v3/files", &params.to_query_params())
            .await?;

        let list = response.json::<FileList>().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse file listing: {}", e))
        })?;
        debug!(
            "Listed {} files (more: {})",
            list.files.len(),
            list.next_page_token.is_some()
        );
        Ok(list)
    }

    async fn get_file(&self, access_token: &str, id: &str) -> Result<FileResource> {
        let path = format!("/drive/v3/files/{}", id);
        let response = self
            .get(access_token, &path, &[("fields", FILE_FIELDS.to_string())])
            .await?;

        let file = response.json::<FileResource>().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse file {}: {}", id, e))
        })?;
        Ok(file)
    }

    async fn get_files(&self, access_token: &str, ids: &[String]) -> Result<Vec<FileResource>> {
        let found = fetch_all(
            ids.to_vec(),
            |id| async move {
                match self.get_file(access_token, &id).await {
                    Ok(file) => Ok(Some(file)),
                    Err(Error::Api(ApiError::NotFound(_))) => {
                        warn!("File {} not found while batching", id);
                        Ok(None)
                    }
                    Err(err) => Err(err),
                }
            },
            MAX_CONCURRENT_GETS,
        )
        .await?;

        Ok(found.into_iter().flatten().collect())
    }

    async fn get_file_contents(&self, access_token: &str, id: &str) -> Result<Vec<u8>> {
        let path = format!("/drive/v3/files/{}", id);
        let response = self
            .get(access_token, &path, &[("alt", "media".to_string())])
            .await?;

        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(bytes.to_vec())
    }
}
