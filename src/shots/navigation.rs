//! Relative, absolute and "yesterday" navigation
//!
//! Each helper resolves to a single shot. The `redirect_*` wrappers never
//! fail: any error or miss sends the caller to the default listing.

use chrono::{DateTime, Duration, Local};
use log::{debug, warn};

use super::listing::{ShotFilter, ShotListing, ShotMetadata, ViewParams};
use crate::client::{SortOrder, StorageApi};
use crate::error::Result;

/// Outcome of a navigation search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Shot(ShotMetadata),
    NotFound,
}

/// Where a navigation request sends the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Show the shot with this id
    Shot(String),
    /// Show the unfiltered default listing
    DefaultListing,
}

impl From<Result<Navigation>> for Redirect {
    fn from(outcome: Result<Navigation>) -> Self {
        match outcome {
            Ok(Navigation::Shot(shot)) => Redirect::Shot(shot.id),
            Ok(Navigation::NotFound) => {
                debug!("Navigation target not found");
                Redirect::DefaultListing
            }
            Err(err) => {
                warn!("Navigation failed: {}", err);
                Redirect::DefaultListing
            }
        }
    }
}

/// Shots captured at least this long ago count as "yesterday"
const YESTERDAY_HOURS: i64 = 24;

impl<C: StorageApi + 'static> ShotListing<C> {
    /// Find the shot `offset` steps away from `shot_id` in capture order.
    ///
    /// Positive offsets move forward in time (towards newer shots), negative
    /// ones backward. Offsets past either end clamp to the last shot
    /// reachable in that direction.
    pub async fn relative(&self, shot_id: &str, offset: i64) -> Result<Navigation> {
        let filter = ShotFilter::default();
        let view = ViewParams::default().num_results(self.navigation_batch());

        // Scan newest-first until the reference shot turns up, keeping every
        // earlier page for lookback.
        let mut lookback: Vec<ShotMetadata> = Vec::new();
        let mut continuation: Option<String> = None;
        let (shots, index, continuation) = loop {
            let page = self
                .list_shots(&filter, &view, continuation.as_deref())
                .await?;
            if let Some(index) = page.results.iter().position(|s| s.id == shot_id) {
                break (page.results, index, page.continuation);
            }
            lookback.extend(page.results);
            match page.continuation {
                Some(next) => continuation = Some(next),
                None => return Ok(Navigation::NotFound),
            }
        };

        let steps = offset.unsigned_abs() as usize;
        let target = if offset > 0 {
            if steps <= index {
                shots.get(index - steps).cloned()
            } else if !lookback.is_empty() {
                let beyond = steps - (index + 1);
                let at = (lookback.len() - 1).saturating_sub(beyond);
                lookback.get(at).cloned()
            } else {
                // Newest shot on record.
                shots.first().cloned()
            }
        } else if index + steps < shots.len() {
            shots.get(index + steps).cloned()
        } else {
            match continuation {
                Some(token) => {
                    let needed = steps - (shots.len() - index) + 1;
                    let view = ViewParams::default().num_results(needed);
                    let more = self.list_shots(&filter, &view, Some(&token)).await?;
                    let at = needed.min(more.results.len());
                    match at {
                        0 => shots.last().cloned(),
                        n => more.results.get(n - 1).cloned(),
                    }
                }
                None => shots.last().cloned(),
            }
        };

        Ok(target.map_or(Navigation::NotFound, Navigation::Shot))
    }

    /// Find the shot at `index` in capture order.
    ///
    /// Non-negative indexes count from the oldest shot (0 is the oldest),
    /// negative ones from the newest (-1 is the newest). Indexes past the end
    /// clamp to the last shot in that direction.
    pub async fn absolute(&self, index: i64) -> Result<Navigation> {
        let (order, needed) = if index < 0 {
            (SortOrder::Desc, index.unsigned_abs() as usize)
        } else {
            (SortOrder::Asc, index as usize + 1)
        };

        let view = ViewParams::default().order(order).num_results(needed);
        let page = self.list_shots(&ShotFilter::default(), &view, None).await?;

        Ok(page
            .results
            .into_iter()
            .last()
            .map_or(Navigation::NotFound, Navigation::Shot))
    }

    /// Newest shot taken on or before the calendar day 24 hours before `now`.
    pub async fn yesterday_at(&self, now: DateTime<Local>) -> Result<Navigation> {
        let day = (now - Duration::hours(YESTERDAY_HOURS)).format("%Y%m%d").to_string();
        debug!("Looking for the newest shot up to {}", day);

        let filter = ShotFilter {
            latest: Some(day),
            ..ShotFilter::default()
        };
        let view = ViewParams::default().num_results(1);
        let page = self.list_shots(&filter, &view, None).await?;

        Ok(page
            .results
            .into_iter()
            .next()
            .map_or(Navigation::NotFound, Navigation::Shot))
    }

    pub async fn yesterday(&self) -> Result<Navigation> {
        self.yesterday_at(Local::now()).await
    }

    pub async fn redirect_relative(&self, shot_id: &str, offset: i64) -> Redirect {
        self.relative(shot_id, offset).await.into()
    }

    pub async fn redirect_absolute(&self, index: i64) -> Redirect {
        self.absolute(index).await.into()
    }

    pub async fn redirect_yesterday(&self) -> Redirect {
        self.yesterday().await.into()
    }
}
