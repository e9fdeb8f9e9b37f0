//! Test fixtures and builders for file resources
//!
//! Provides builder patterns for creating test data with sensible defaults.
//! Import via `use crate::client::fixtures::*` in test modules.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::models::FileResource;

// ============================================================================
// FileBuilder
// ============================================================================

/// Builder for creating test FileResource instances.
///
/// # Example
/// ```ignore
/// let file = FileBuilder::new("f1")
///     .name("20230101T080000.shot")
///     .parent("shots-dir")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct FileBuilder {
    id: String,
    name: String,
    parents: Vec<String>,
}

impl FileBuilder {
    /// Create a new builder with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: format!("File {}", &id),
            id,
            parents: Vec::new(),
        }
    }

    /// Set the file name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a parent folder id.
    pub fn parent(mut self, id: impl Into<String>) -> Self {
        self.parents.push(id.into());
        self
    }

    /// Build the FileResource.
    pub fn build(self) -> FileResource {
        FileResource {
            id: self.id,
            name: self.name,
            parents: self.parents,
        }
    }
}

// ============================================================================
// Shot datasets
// ============================================================================

/// Capture time of the first shot in [`shot_series`].
pub fn series_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid fixture date")
}

/// Filename for a shot captured at `at`.
pub fn shot_name(at: NaiveDateTime) -> String {
    format!("{}.shot", at.format("%Y%m%dT%H%M%S"))
}

/// `count` shots one hour apart in `parent`, oldest first.
///
/// Ids are `shot-00`, `shot-01`, ... in capture order.
pub fn shot_series(count: usize, parent: &str) -> Vec<FileResource> {
    (0..count)
        .map(|i| {
            let at = series_start() + Duration::hours(i as i64);
            FileBuilder::new(format!("shot-{:02}", i))
                .name(shot_name(at))
                .parent(parent)
                .build()
        })
        .collect()
}

/// A small folder tree: `root` (no parent) > `shots` > `2023`.
pub fn folder_tree() -> Vec<FileResource> {
    vec![
        FileBuilder::new("root").name("My Drive").build(),
        FileBuilder::new("shots-dir")
            .name("shots")
            .parent("root")
            .build(),
        FileBuilder::new("year-dir")
            .name("2023")
            .parent("shots-dir")
            .build(),
    ]
}
