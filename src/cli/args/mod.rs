//! Shared CLI argument types

mod common;
mod global;

pub use common::{OutputFormat, SortDir};
pub use global::GlobalOptions;
