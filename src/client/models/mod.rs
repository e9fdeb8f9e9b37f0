//! Remote storage API data models
//!
//! Wire types for the OAuth token endpoint and the Drive v3 files API.

mod auth;
mod file;

pub use auth::{CredentialSet, TokenGrant};
pub use file::{FileList, FileResource};
