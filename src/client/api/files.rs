//! Files API trait

use async_trait::async_trait;

use crate::client::models::{FileList, FileResource};
use crate::client::pagination::ListFilesParams;
use crate::error::Result;

/// File operations against the remote store.
///
/// Every call carries the access token obtained from the auth session.
#[async_trait]
pub trait FilesApi: Send + Sync {
    /// List one page of files.
    ///
    /// A rejected page token surfaces as
    /// [`ApiError::PageTokenInvalid`](crate::error::ApiError::PageTokenInvalid).
    async fn list_files(&self, access_token: &str, params: &ListFilesParams) -> Result<FileList>;

    /// Get metadata for a single file or folder.
    async fn get_file(&self, access_token: &str, id: &str) -> Result<FileResource>;

    /// Get metadata for several files in one round.
    ///
    /// Ids that do not exist are left out of the result rather than failing
    /// the batch.
    async fn get_files(&self, access_token: &str, ids: &[String]) -> Result<Vec<FileResource>>;

    /// Download the raw contents of a file.
    async fn get_file_contents(&self, access_token: &str, id: &str) -> Result<Vec<u8>>;
}
