//! Mock storage API client for testing
//!
//! Serves an in-memory file tree through both API traits, so the auth,
//! remote and listing layers can be exercised without making real API calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::api::{FilesApi, TokenApi};
use super::models::{CredentialSet, FileList, FileResource, TokenGrant};
use super::pagination::{ListFilesParams, SortOrder};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure the file tree via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockDriveClient::new()
///     .with_files(vec![FileBuilder::new("f1").name("20230101T080000.shot").build()])
///     .await;
///
/// let page = mock.list_files("token", &ListFilesParams::default()).await?;
/// assert_eq!(page.files.len(), 1);
/// ```
pub struct MockDriveClient {
    /// Files and folders served by the listing and get operations
    files: Arc<Mutex<Vec<FileResource>>>,
    /// Raw contents by file id
    contents: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    /// Grant returned from refresh_access_token
    grant: Arc<Mutex<TokenGrant>>,
    /// Artificial latency for refreshes, used to overlap concurrent callers
    refresh_delay: Arc<Mutex<Option<Duration>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Error returned by every refresh while set
    refresh_error: Arc<Mutex<Option<ApiError>>>,
    /// Reject the next request carrying a page token, simulating cursor expiry
    expire_next_page_token: Arc<Mutex<bool>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Captured requests for test assertions
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl Default for MockDriveClient {
    fn default() -> Self {
        Self {
            files: Arc::new(Mutex::new(Vec::new())),
            contents: Arc::new(Mutex::new(HashMap::new())),
            grant: Arc::new(Mutex::new(TokenGrant {
                access_token: "mock-access-token".to_string(),
                expires_in: 3600,
            })),
            refresh_delay: Arc::new(Mutex::new(None)),
            error: Arc::new(Mutex::new(None)),
            refresh_error: Arc::new(Mutex::new(None)),
            expire_next_page_token: Arc::new(Mutex::new(false)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub refresh: usize,
    pub list_files: usize,
    pub get_file: usize,
    pub get_files: usize,
    pub get_file_contents: usize,
}

impl CallCounts {
    /// Total number of file operations, excluding token refreshes.
    pub fn file_calls(&self) -> usize {
        self.list_files + self.get_file + self.get_files + self.get_file_contents
    }
}

/// A captured API request for test assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// The API method called (e.g., "list_files", "get_files")
    pub method: String,
    /// Rendered query for listings
    pub query: Option<String>,
    pub order: Option<SortOrder>,
    pub page_size: Option<usize>,
    pub page_token: Option<String>,
    /// Ids requested by get operations
    pub ids: Vec<String>,
}

impl CapturedRequest {
    fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            query: None,
            order: None,
            page_size: None,
            page_token: None,
            ids: Vec::new(),
        }
    }
}

impl MockDriveClient {
    /// Create a new mock client with an empty file tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the files and folders served.
    pub async fn with_files(self, files: Vec<FileResource>) -> Self {
        *self.files.lock().await = files;
        self
    }

    /// Configure contents for a file id.
    pub async fn with_contents(self, id: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.contents
            .lock()
            .await
            .insert(id.to_string(), contents.into());
        self
    }

    /// Configure the grant returned from refreshes.
    pub async fn with_grant(self, grant: TokenGrant) -> Self {
        *self.grant.lock().await = grant;
        self
    }

    /// Delay every refresh by `delay`.
    pub async fn with_refresh_delay(self, delay: Duration) -> Self {
        *self.refresh_delay.lock().await = Some(delay);
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Make every refresh fail with `error`.
    pub async fn with_refresh_error(self, error: ApiError) -> Self {
        *self.refresh_error.lock().await = Some(error);
        self
    }

    /// Make the next request that carries a page token fail as expired.
    pub async fn expire_next_page_token(&self) {
        *self.expire_next_page_token.lock().await = true;
    }

    /// Replace the served file tree.
    pub async fn set_files(&self, files: Vec<FileResource>) {
        *self.files.lock().await = files;
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Get all captured requests for test assertions.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().await.clone()
    }

    /// Check if there's a pending error and consume it.
    async fn check_error(&self) -> Result<()> {
        let mut error = self.error.lock().await;
        if let Some(e) = error.take() {
            return Err(e.into());
        }
        Ok(())
    }

    async fn capture_request(&self, request: CapturedRequest) {
        self.captured_requests.lock().await.push(request);
    }

    async fn find(&self, id: &str) -> Option<FileResource> {
        self.files
            .lock()
            .await
            .iter()
            .find(|f| f.id == id)
            .cloned()
    }
}

// ============================================================================
// TokenApi Implementation
// ============================================================================

#[async_trait]
impl TokenApi for MockDriveClient {
    async fn refresh_access_token(&self, _credentials: &CredentialSet) -> Result<TokenGrant> {
        self.call_count.lock().await.refresh += 1;
        self.check_error().await?;

        let delay = *self.refresh_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.refresh_error.lock().await.clone() {
            return Err(err.into());
        }

        Ok(self.grant.lock().await.clone())
    }
}

// ============================================================================
// FilesApi Implementation
// ============================================================================

#[async_trait]
impl FilesApi for MockDriveClient {
    async fn list_files(&self, _access_token: &str, params: &ListFilesParams) -> Result<FileList> {
        let mut request = CapturedRequest::new("list_files");
        request.query = Some(params.query.render());
        request.order = params.order;
        request.page_size = params.page_size;
        request.page_token = params.page_token.clone();
        self.capture_request(request).await;

        self.call_count.lock().await.list_files += 1;
        self.check_error().await?;

        let offset = match params.page_token {
            Some(ref token) => {
                let mut expire = self.expire_next_page_token.lock().await;
                if *expire {
                    *expire = false;
                    return Err(ApiError::PageTokenInvalid.into());
                }
                drop(expire);
                token
                    .strip_prefix("page-")
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or(ApiError::PageTokenInvalid)?
            }
            None => 0,
        };

        let query = &params.query;
        let mut matching: Vec<FileResource> = self
            .files
            .lock()
            .await
            .iter()
            .filter(|f| {
                query
                    .name_contains
                    .as_ref()
                    .is_none_or(|fragment| f.name.contains(fragment.as_str()))
            })
            .filter(|f| {
                query.parent_ids.is_empty() || f.parents.iter().any(|p| query.parent_ids.contains(p))
            })
            .cloned()
            .collect();

        match params.order {
            Some(SortOrder::Asc) => matching.sort_by(|a, b| a.name.cmp(&b.name)),
            Some(SortOrder::Desc) => matching.sort_by(|a, b| b.name.cmp(&a.name)),
            None => {}
        }

        let size = params.effective_page_size();
        let files: Vec<FileResource> = matching.iter().skip(offset).take(size).cloned().collect();
        let next_page_token = if offset + size < matching.len() {
            Some(format!("page-{}", offset + size))
        } else {
            None
        };

        Ok(FileList {
            files,
            next_page_token,
        })
    }

    async fn get_file(&self, _access_token: &str, id: &str) -> Result<FileResource> {
        let mut request = CapturedRequest::new("get_file");
        request.ids = vec![id.to_string()];
        self.capture_request(request).await;

        self.call_count.lock().await.get_file += 1;
        self.check_error().await?;

        self.find(id)
            .await
            .ok_or_else(|| ApiError::NotFound(id.to_string()).into())
    }

    async fn get_files(&self, _access_token: &str, ids: &[String]) -> Result<Vec<FileResource>> {
        let mut request = CapturedRequest::new("get_files");
        request.ids = ids.to_vec();
        self.capture_request(request).await;

        self.call_count.lock().await.get_files += 1;
        self.check_error().await?;

        let files = self.files.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| files.iter().find(|f| &f.id == id).cloned())
            .collect())
    }

    async fn get_file_contents(&self, _access_token: &str, id: &str) -> Result<Vec<u8>> {
        let mut request = CapturedRequest::new("get_file_contents");
        request.ids = vec![id.to_string()];
        self.capture_request(request).await;

        self.call_count.lock().await.get_file_contents += 1;
        self.check_error().await?;

        self.contents
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{FileBuilder, shot_series};
    use crate::client::pagination::FileQuery;

    #[tokio::test]
    async fn test_mock_client_default_empty() {
        let mock = MockDriveClient::new();

        let page = mock
            .list_files("t", &ListFilesParams::default())
            .await
            .unwrap();
        assert!(page.files.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_mock_pages_through_sorted_results() {
        let mock = MockDriveClient::new()
            .with_files(shot_series(5, "dir"))
            .await;

        let params = ListFilesParams::new(FileQuery::new().name_contains("shot"))
            .order(SortOrder::Desc)
            .page_size(3);
        let first = mock.list_files("t", &params).await.unwrap();
        assert_eq!(first.files.len(), 3);
        assert_eq!(first.files[0].id, "shot-04");
        assert_eq!(first.next_page_token.as_deref(), Some("page-3"));

        let params = params.page_token(first.next_page_token);
        let second = mock.list_files("t", &params).await.unwrap();
        assert_eq!(second.files.len(), 2);
        assert_eq!(second.files[1].id, "shot-00");
        assert!(second.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_mock_filters_by_parent() {
        let mut files = shot_series(2, "dir-a");
        files.push(
            FileBuilder::new("other")
                .name("20220101T000000.shot")
                .parent("dir-b")
                .build(),
        );
        let mock = MockDriveClient::new().with_files(files).await;

        let params = ListFilesParams::new(FileQuery::new().parent("dir-b"));
        let page = mock.list_files("t", &params).await.unwrap();

        assert_eq!(page.files.len(), 1);
        assert_eq!(page.files[0].id, "other");
    }

    #[tokio::test]
    async fn test_mock_expires_one_page_token() {
        let mock = MockDriveClient::new()
            .with_files(shot_series(5, "dir"))
            .await;
        mock.expire_next_page_token().await;

        // Requests without a token are unaffected.
        assert!(mock.list_files("t", &ListFilesParams::default()).await.is_ok());

        let params = ListFilesParams::default().page_token(Some("page-3".to_string()));
        let err = mock.list_files("t", &params).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Api(ApiError::PageTokenInvalid)
        ));

        let page = mock.list_files("t", &params).await.unwrap();
        assert_eq!(page.files.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_error_consumed_once() {
        let mock = MockDriveClient::new()
            .with_error(ApiError::ServerError("boom".to_string()))
            .await;

        assert!(mock.get_file("t", "x").await.is_err());
        let counts = mock.call_counts().await;
        assert_eq!(counts.get_file, 1);

        // Next failure is a plain not-found, not the injected error.
        let err = mock.get_file("t", "x").await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Api(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_get_files_skips_missing() {
        let mock = MockDriveClient::new()
            .with_files(vec![FileBuilder::new("d1").name("shots").build()])
            .await;

        let found = mock
            .get_files("t", &["d1".to_string(), "nope".to_string()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(mock.call_counts().await.get_files, 1);
    }
}
