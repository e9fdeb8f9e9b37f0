//! Shot display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_capture_time, truncate_string};
use crate::shots::ShotMetadata;

/// Longest folder path shown in tables
const MAX_FOLDER_WIDTH: usize = 40;

/// Shot display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ShotDisplay {
    /// Shot file ID
    #[tabled(rename = "SHOT ID")]
    pub id: String,

    /// Capture time from the filename
    #[tabled(rename = "CAPTURED")]
    pub captured: String,

    /// File name
    #[tabled(rename = "NAME")]
    pub name: String,

    /// Folder path of the first parent
    #[tabled(rename = "FOLDER")]
    pub folder: String,
}

impl From<&ShotMetadata> for ShotDisplay {
    fn from(shot: &ShotMetadata) -> Self {
        Self {
            id: shot.id.clone(),
            captured: format_capture_time(shot.datetime),
            name: shot.name.clone(),
            folder: shot
                .parent_path
                .as_deref()
                .map(|p| truncate_string(p, MAX_FOLDER_WIDTH))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}
