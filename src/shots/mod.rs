//! Shot listing, navigation and retrieval

pub mod continuation;
pub mod decoder;
pub mod diagnostics;
pub mod filename;
pub mod listing;
pub mod navigation;

pub use continuation::{BoundField, ContinuationToken, DateBound};
pub use decoder::{RawShot, RawShotDecoder, ShotDecoder};
pub use diagnostics::DiagnosticsReport;
pub use listing::{LIST_MAX_RESULTS, ShotFilter, ShotListing, ShotMetadata, ShotPage, ViewParams};
pub use navigation::{Navigation, Redirect};
