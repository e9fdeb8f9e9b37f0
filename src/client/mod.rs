//! Remote file storage API client

pub mod api;
pub mod drive;
#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod parallel;

pub use api::{FilesApi, TokenApi};
pub use drive::DriveClient;
#[cfg(test)]
pub use mock::MockDriveClient;
pub use pagination::{FileQuery, ListFilesParams, MAX_PAGE_SIZE, SortOrder};

/// Combined API surface needed by the remote file client
pub trait StorageApi: FilesApi + TokenApi {}

impl<T: FilesApi + TokenApi> StorageApi for T {}
