//! Cached, authenticated access to the remote file store
//!
//! [`RemoteFileClient`] routes every request through the auth session and the
//! expiring cache, and resolves parent folders into display paths.

pub mod client;
pub mod directories;

use serde::{Deserialize, Serialize};

pub use client::RemoteFileClient;
pub use directories::DirectoryNode;

/// File metadata with its first parent resolved to a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    /// Slash-delimited path of the parent folder, `/` for the root
    pub parent_path: Option<String>,
}

/// One page of resolved files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListing {
    pub files: Vec<RemoteFile>,
    pub next_page_token: Option<String>,
}
