//! File resource models

use serde::{Deserialize, Serialize};

/// A file or folder as returned by the files API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: String,

    pub name: String,

    /// Parent folder ids. Root folders have none.
    #[serde(default)]
    pub parents: Vec<String>,
}

impl FileResource {
    /// The first parent, which is the one used for path display.
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// One page of a file listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<FileResource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}
