//! JSON output formatting

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    /// The actual data
    pub data: T,

    /// Metadata about the response
    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// Timestamp of the response
    pub timestamp: String,

    /// CLI version
    pub version: String,

    /// Token resuming a listing, when more results may exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation: Option<String>,
}

impl<T> JsonOutput<T> {
    /// Create a new JSON output with metadata
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                continuation: None,
            },
        }
    }

    pub fn with_continuation(mut self, continuation: Option<&str>) -> Self {
        self.meta.continuation = continuation.map(str::to_string);
        self
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

/// Format one listing page, carrying its continuation token in `meta`
pub fn format_json_page<T: Serialize + ?Sized>(
    data: &T,
    continuation: Option<&str>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data).with_continuation(continuation))
}
