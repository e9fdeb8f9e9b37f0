//! API trait definitions split by responsibility
//!
//! - [`TokenApi`] - OAuth refresh-token exchange
//! - [`FilesApi`] - file listing, metadata and content retrieval
//!
//! Both take explicit credentials or access tokens; session state lives in
//! [`crate::auth::AuthSessionManager`].

mod auth;
mod files;

pub use auth::TokenApi;
pub use files::FilesApi;
