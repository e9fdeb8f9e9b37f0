//! Decoding shot file contents
//!
//! Typed decoding of the time-series grammar lives outside this crate. The
//! [`ShotDecoder`] seam lets callers plug one in; [`RawShotDecoder`] hands the
//! contents back as text.

use serde::Serialize;

use super::listing::{ShotListing, ShotMetadata};
use crate::client::StorageApi;
use crate::error::{Result, ShotError};

/// Turns raw shot file contents into a record
pub trait ShotDecoder {
    type Record;

    fn decode(&self, raw: &[u8], metadata: &ShotMetadata) -> Result<Self::Record>;
}

/// A shot file with its contents as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawShot {
    #[serde(flatten)]
    pub metadata: ShotMetadata,
    pub contents: String,
}

/// Passthrough decoder. Fails only when the contents are not UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawShotDecoder;

impl ShotDecoder for RawShotDecoder {
    type Record = RawShot;

    fn decode(&self, raw: &[u8], metadata: &ShotMetadata) -> Result<RawShot> {
        let contents = std::str::from_utf8(raw)
            .map_err(|e| ShotError::Decode(metadata.name.clone(), e.to_string()))?;
        Ok(RawShot {
            metadata: metadata.clone(),
            contents: contents.to_string(),
        })
    }
}

impl<C: StorageApi + 'static> ShotListing<C> {
    /// Metadata for a single shot.
    pub async fn get_shot_metadata(&self, id: &str) -> Result<ShotMetadata> {
        Ok(self.remote().get_file(id).await?.into())
    }

    /// Fetch a shot's metadata and contents and decode them.
    pub async fn get_shot<D: ShotDecoder>(&self, id: &str, decoder: &D) -> Result<D::Record> {
        let metadata = self.get_shot_metadata(id).await?;
        let raw = self.remote().get_file_contents(id).await?;
        decoder.decode(&raw, &metadata)
    }
}
