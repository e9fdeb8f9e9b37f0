//! Shot listing engine
//!
//! Produces ordered, filtered, paginated views over remote shot files.
//! Server-side the query narrows by name fragment and parent folder; the
//! `.shot` suffix and date bounds are applied here after each page arrives.
//!
//! Listings that stop early hand back a continuation token. The engine keeps
//! the leftover results and the server page token for that token in a short
//! lived cache. When a token is no longer held (another process, or the
//! holding period ran out) its date bound alone restarts the search.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::continuation::{BoundField, ContinuationToken, DateBound};
use super::filename::{is_shot_file, parse_datetime, timestamp_key, within_earliest, within_latest};
use crate::cache::{Category, ExpiringCache, ShelfLife};
use crate::client::{FileQuery, ListFilesParams, MAX_PAGE_SIZE, SortOrder, StorageApi};
use crate::error::{ApiError, Error, Result, ShotError};
use crate::remote::{RemoteFile, RemoteFileClient};

/// Results returned when a view does not ask for a count
pub const LIST_MAX_RESULTS: usize = 1000;

/// Name fragment every server-side shot query carries
const SHOT_QUERY_FRAGMENT: &str = "shot";

const CONTINUATIONS: &str = "continuations";
const CONTINUATION_SHELF_LIFE: Duration = Duration::from_secs(30 * 60);
const CONTINUATION_CAPACITY: usize = 128;

/// What to list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShotFilter {
    /// Only shots in one of these folders. Empty means any folder.
    pub parent_ids: Vec<String>,
    /// Inclusive lower bound, any prefix of `YYYYMMDDTHHMMSS`
    pub earliest: Option<String>,
    /// Inclusive upper bound, any prefix of `YYYYMMDDTHHMMSS`
    pub latest: Option<String>,
}

impl ShotFilter {
    pub fn has_bounds(&self) -> bool {
        self.earliest.is_some() || self.latest.is_some()
    }

    fn apply(&mut self, bound: &DateBound) {
        match bound.field {
            BoundField::Earliest => self.earliest = Some(bound.value.clone()),
            BoundField::Latest => self.latest = Some(bound.value.clone()),
        }
    }

    fn admits(&self, key: &str) -> bool {
        self.latest.as_deref().is_none_or(|l| within_latest(key, l))
            && self.earliest.as_deref().is_none_or(|e| within_earliest(key, e))
    }
}

/// How to present a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewParams {
    pub order: SortOrder,
    pub num_results: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            order: SortOrder::Desc,
            num_results: LIST_MAX_RESULTS,
        }
    }
}

impl ViewParams {
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the result count. Zero is raised to one.
    pub fn num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results.max(1);
        self
    }
}

/// One listed shot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotMetadata {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub parent_path: Option<String>,
    /// Capture time from the filename; `None` for misnamed files
    pub datetime: Option<NaiveDateTime>,
}

impl From<RemoteFile> for ShotMetadata {
    fn from(file: RemoteFile) -> Self {
        Self {
            datetime: parse_datetime(&file.name),
            id: file.id,
            name: file.name,
            parent_id: file.parent_id,
            parent_path: file.parent_path,
        }
    }
}

/// One page of a shot listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShotPage {
    pub results: Vec<ShotMetadata>,
    /// Present when more results may exist
    pub continuation: Option<String>,
}

/// State held for an issued continuation token
#[derive(Debug)]
struct HeldContinuation {
    /// Results fetched but not yet returned
    leftover: Vec<ShotMetadata>,
    page_token: Option<String>,
    /// Bound that resumes after `leftover` if the page token has expired
    fallback: Option<DateBound>,
}

/// Shot listing engine over a remote file client
pub struct ShotListing<C: StorageApi + 'static> {
    remote: Arc<RemoteFileClient<C>>,
    continuations: Mutex<ExpiringCache<HeldContinuation>>,
    page_size: usize,
    navigation_batch: usize,
}

impl<C: StorageApi + 'static> ShotListing<C> {
    pub fn new(remote: Arc<RemoteFileClient<C>>) -> Self {
        let categories = vec![
            Category::new(CONTINUATIONS)
                .shelf_life(ShelfLife::For(CONTINUATION_SHELF_LIFE))
                .quantity(CONTINUATION_CAPACITY),
        ];
        Self {
            remote,
            continuations: Mutex::new(ExpiringCache::new(categories, CONTINUATION_SHELF_LIFE)),
            page_size: MAX_PAGE_SIZE,
            navigation_batch: LIST_MAX_RESULTS,
        }
    }

    /// Set the number of files requested per server page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Set the listing size used while scanning for a navigation target.
    pub fn with_navigation_batch(mut self, batch: usize) -> Self {
        self.navigation_batch = batch.max(1);
        self
    }

    pub fn remote(&self) -> &RemoteFileClient<C> {
        &self.remote
    }

    pub(crate) fn navigation_batch(&self) -> usize {
        self.navigation_batch
    }

    fn take_continuation(&self, token: &str) -> Option<HeldContinuation> {
        self.continuations.lock().ok()?.take(token)
    }

    fn hold_continuation(&self, token: &str, held: HeldContinuation) -> Result<()> {
        if let Ok(mut guard) = self.continuations.lock() {
            guard.set(token, held, CONTINUATIONS)?;
        }
        Ok(())
    }

    /// List shots ordered by the timestamp embedded in their names.
    ///
    /// `continuation` must come from an earlier call with the same filter and
    /// view. Each token is consumed on use; replaying one falls back to its
    /// date bound.
    pub async fn list_shots(
        &self,
        filter: &ShotFilter,
        view: &ViewParams,
        continuation: Option<&str>,
    ) -> Result<ShotPage> {
        let num_results = view.num_results.max(1);
        let mut filter = filter.clone();
        let mut buffer: Vec<ShotMetadata> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut fallback: Option<DateBound> = None;
        let mut exhausted = false;

        if let Some(token) = continuation {
            match self.take_continuation(token) {
                Some(held) => {
                    debug!(
                        "Resuming held continuation: {} buffered, page token {}",
                        held.leftover.len(),
                        if held.page_token.is_some() { "present" } else { "absent" }
                    );
                    buffer = held.leftover;
                    exhausted = held.page_token.is_none();
                    page_token = held.page_token;
                    fallback = held.fallback;
                }
                None => {
                    let parsed = ContinuationToken::parse(token)?;
                    let bound = parsed
                        .bound
                        .ok_or_else(|| ShotError::MalformedContinuation(token.to_string()))?;
                    info!("Continuation not held, resuming from {}", bound);
                    filter.apply(&bound);
                }
            }
        }

        let mut first_fetch = true;
        loop {
            if buffer.len() >= num_results {
                return self.split_page(buffer, num_results, page_token, view.order);
            }
            if (exhausted || !first_fetch) && page_token.is_none() {
                return Ok(ShotPage {
                    results: buffer,
                    continuation: None,
                });
            }

            match self.fetch_page(&filter, view.order, page_token.take()).await {
                Ok((shots, next)) => {
                    buffer.extend(shots);
                    page_token = next;
                    first_fetch = false;
                }
                Err(Error::Api(ApiError::PageTokenInvalid)) if first_fetch && fallback.is_some() => {
                    if let Some(bound) = fallback.take() {
                        warn!("Page token expired, resuming from {}", bound);
                        filter.apply(&bound);
                    }
                    exhausted = false;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Return the first `num_results` items and hold the rest behind a new
    /// continuation token.
    fn split_page(
        &self,
        mut buffer: Vec<ShotMetadata>,
        num_results: usize,
        page_token: Option<String>,
        order: SortOrder,
    ) -> Result<ShotPage> {
        let leftover = buffer.split_off(num_results);
        let results = buffer;

        if leftover.is_empty() && page_token.is_none() {
            return Ok(ShotPage {
                results,
                continuation: None,
            });
        }

        // Misnamed files carry no timestamp, so bounds come from the nearest
        // dated shot. With none returned, resume at the first dated shot held.
        let last_dated = |shots: &[ShotMetadata]| shots.iter().rev().find_map(|s| s.datetime);
        let bound = last_dated(&results)
            .map(|dt| DateBound::after(dt, order))
            .or_else(|| {
                leftover
                    .iter()
                    .find_map(|s| s.datetime)
                    .map(|dt| DateBound::at(dt, order))
            });
        let fallback = last_dated(&leftover)
            .or_else(|| last_dated(&results))
            .map(|dt| DateBound::after(dt, order));
        if bound.is_none() {
            warn!("No dated shot to bound the continuation; it only resumes in this process");
        }
        let token = ContinuationToken::mint(bound).serialize();

        debug!("Holding {} results behind a new continuation", leftover.len());
        self.hold_continuation(
            &token,
            HeldContinuation {
                leftover,
                page_token,
                fallback,
            },
        )?;

        Ok(ShotPage {
            results,
            continuation: Some(token),
        })
    }

    /// Fetch one server page and apply the client-side filters.
    async fn fetch_page(
        &self,
        filter: &ShotFilter,
        order: SortOrder,
        page_token: Option<String>,
    ) -> Result<(Vec<ShotMetadata>, Option<String>)> {
        let query = FileQuery::new()
            .name_contains(SHOT_QUERY_FRAGMENT)
            .parents(filter.parent_ids.iter().cloned());
        let params = ListFilesParams::new(query)
            .order(order)
            .page_size(self.page_size)
            .page_token(page_token);

        let listing = self.remote.list_files(&params).await?;
        let fetched = listing.files.len();

        let mut shots = Vec::with_capacity(fetched);
        for file in listing.files {
            if !is_shot_file(&file.name) {
                continue;
            }
            match timestamp_key(&file.name) {
                Some(key) if !filter.admits(&key) => continue,
                None if filter.has_bounds() => {
                    warn!("Skipping shot file without a timestamp: {} ({})", file.name, file.id);
                    continue;
                }
                _ => {}
            }

            let shot = ShotMetadata::from(file);
            if shot.datetime.is_none() {
                warn!("Shot file has no usable timestamp: {} ({})", shot.name, shot.id);
            }
            shots.push(shot);
        }

        warn_out_of_order(&shots, order);
        debug!("Fetched {} files, {} shots kept", fetched, shots.len());
        Ok((shots, listing.next_page_token))
    }
}

/// Name order and capture order can disagree when a filename carries text
/// before the timestamp.
fn warn_out_of_order(shots: &[ShotMetadata], order: SortOrder) {
    let mut previous: Option<&ShotMetadata> = None;
    for shot in shots.iter().filter(|s| s.datetime.is_some()) {
        if let Some(prev) = previous {
            let in_order = match order {
                SortOrder::Asc => prev.datetime <= shot.datetime,
                SortOrder::Desc => prev.datetime >= shot.datetime,
            };
            if !in_order {
                warn!("Shot {} is out of capture order after {}", shot.name, prev.name);
            }
        }
        previous = Some(shot);
    }
}
