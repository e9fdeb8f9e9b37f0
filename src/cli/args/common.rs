//! Common CLI types shared across commands

use crate::client::SortOrder;

/// Sort direction for list commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortDir {
    /// Oldest first
    Asc,
    /// Newest first
    Desc,
}

impl From<SortDir> for SortOrder {
    fn from(dir: SortDir) -> Self {
        match dir {
            SortDir::Asc => SortOrder::Asc,
            SortDir::Desc => SortOrder::Desc,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting
    #[default]
    Pretty,
    /// Table format - one row per entry
    Table,
    /// JSON format - structured for scripts
    Json,
}
