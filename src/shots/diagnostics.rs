//! Storage diagnostics
//!
//! Checks that the stored credentials work and counts what the store holds,
//! so misnamed shot files can be spotted.

use log::{debug, info};
use serde::Serialize;

use super::filename::is_shot_file;
use super::listing::{ShotFilter, ShotListing, ViewParams};
use crate::client::{FileQuery, ListFilesParams, MAX_PAGE_SIZE, SortOrder, StorageApi};
use crate::error::Result;

/// Well-known id of the store's root folder
const ROOT_FOLDER: &str = "root";

/// Diagnostics results. Checks after a failed prerequisite stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    pub auth_set: bool,
    pub auth_valid: Option<bool>,
    pub root_gettable: Option<bool>,
    pub all_files_count: Option<usize>,
    pub shot_files_count: Option<usize>,
    pub valid_shot_count: Option<usize>,
    pub invalid_shot_count: Option<usize>,
}

impl<C: StorageApi + 'static> ShotListing<C> {
    /// Run every diagnostic check in order.
    pub async fn diagnostics(&self) -> Result<DiagnosticsReport> {
        let mut report = DiagnosticsReport::default();

        let Ok(credentials) = self.remote().credentials() else {
            return Ok(report);
        };
        report.auth_set = true;

        let valid = self.remote().auth().is_auth_valid(&credentials).await;
        report.auth_valid = Some(valid);
        if !valid {
            info!("Credentials rejected, skipping storage checks");
            return Ok(report);
        }

        report.root_gettable = Some(match self.remote().get_file(ROOT_FOLDER).await {
            Ok(_) => true,
            Err(err) => {
                debug!("Root folder lookup failed: {}", err);
                false
            }
        });

        let names = self.all_file_names().await?;
        let shot_files = names.iter().filter(|n| is_shot_file(n)).count();
        report.all_files_count = Some(names.len());
        report.shot_files_count = Some(shot_files);

        let view = ViewParams::default().num_results(names.len());
        let page = self.list_shots(&ShotFilter::default(), &view, None).await?;
        let valid_shots = page.results.iter().filter(|s| s.datetime.is_some()).count();
        report.valid_shot_count = Some(valid_shots);
        report.invalid_shot_count = Some(shot_files.saturating_sub(valid_shots));

        Ok(report)
    }

    /// Names of every file in the store, across all pages.
    async fn all_file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut page_token = None;

        loop {
            let params = ListFilesParams::new(FileQuery::new())
                .order(SortOrder::Desc)
                .page_size(MAX_PAGE_SIZE)
                .page_token(page_token);
            let page = self.remote().list_file_page(&params).await?;
            names.extend(page.files.into_iter().map(|f| f.name));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("Counted {} files", names.len());
        Ok(names)
    }
}
