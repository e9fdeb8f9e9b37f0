//! Display model implementations for table and JSON output
//!
//! Display models transform core types into CLI-friendly formats with
//! column names and serialization.

mod common;
mod diagnostics;
mod shot;

pub use common::{format_capture_time, truncate_string};
pub use diagnostics::DiagnosticDisplay;
pub use shot::ShotDisplay;
