//! Cached remote file client
//!
//! Wraps a storage API implementation with the auth session manager and an
//! [`ExpiringCache`]. Cache keys are namespaced by the active credential set.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};

use super::directories::{DirectoryNode, build_path};
use super::{FileListing, RemoteFile};
use crate::auth::{AccessSession, AuthSessionManager, CredentialSet};
use crate::cache::{self, CategoryStats, ExpiringCache, cache_key};
use crate::client::StorageApi;
use crate::client::models::{FileList, FileResource};
use crate::client::pagination::ListFilesParams;
use crate::error::{ConfigError, Result};

/// Cached, authenticated client for the remote file store.
///
/// The credential set is held here and replaced wholesale. The cache is
/// wrapped in a Mutex and never locked across an await.
pub struct RemoteFileClient<C: StorageApi + 'static> {
    inner: Arc<C>,
    auth: AuthSessionManager<C>,
    credentials: RwLock<Option<CredentialSet>>,
    cache: Mutex<ExpiringCache<Vec<u8>>>,
}

impl<C: StorageApi + 'static> RemoteFileClient<C> {
    /// Create a client with the standard cache categories.
    pub fn new(inner: C) -> Self {
        Self::with_cache(inner, cache::remote_cache())
    }

    /// Create a client with a custom cache. The cache must declare the
    /// categories from [`cache::categories`].
    pub fn with_cache(inner: C, cache: ExpiringCache<Vec<u8>>) -> Self {
        let inner = Arc::new(inner);
        Self {
            auth: AuthSessionManager::new(Arc::clone(&inner)),
            inner,
            credentials: RwLock::new(None),
            cache: Mutex::new(cache),
        }
    }

    /// Get the inner API client
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn auth(&self) -> &AuthSessionManager<C> {
        &self.auth
    }

    /// Replace the active credential set.
    pub fn set_credentials(&self, credentials: CredentialSet) {
        if let Ok(mut guard) = self.credentials.write() {
            *guard = Some(credentials);
        }
    }

    /// Drop the credential set and the session derived from it.
    pub async fn purge_credentials(&self) {
        if let Ok(mut guard) = self.credentials.write() {
            *guard = None;
        }
        self.auth.purge().await;
    }

    /// The active credential set.
    pub fn credentials(&self) -> Result<CredentialSet> {
        self.credentials
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or_else(|| ConfigError::MissingCredentials.into())
    }

    /// Obtain a valid access session for the active credentials.
    pub async fn ensure_authed(&self) -> Result<AccessSession> {
        let credentials = self.credentials()?;
        self.auth.ensure_authed(&credentials).await
    }

    fn namespace(&self) -> Result<String> {
        Ok(self.credentials()?.fingerprint())
    }

    /// Try to get cached data
    fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut guard = self.cache.lock().ok()?;
        guard
            .get(key)
            .and_then(|data| serde_json::from_slice(data).ok())
    }

    /// Store data in cache
    fn set_cached<T: Serialize>(&self, key: &str, data: &T, category: &str) -> Result<()> {
        let json = serde_json::to_vec(data)?;
        if let Ok(mut guard) = self.cache.lock() {
            guard.set(key, json, category)?;
        }
        Ok(())
    }

    /// List one raw page of files, without resolving parent paths.
    pub async fn list_file_page(&self, params: &ListFilesParams) -> Result<FileList> {
        let namespace = self.namespace()?;
        let page_size = params.effective_page_size().to_string();
        let query = params.query.render();
        let order = params.order.map(|o| o.order_by()).unwrap_or("");
        let token = params.page_token.as_deref().unwrap_or("");
        let key = cache_key(
            "list_files",
            Some(&namespace),
            &[
                ("q", query.as_str()),
                ("orderBy", order),
                ("pageSize", page_size.as_str()),
                ("pageToken", token),
            ],
        );

        if let Some(cached) = self.get_cached(&key) {
            debug!("Cache hit: list_files");
            return Ok(cached);
        }

        let session = self.ensure_authed().await?;
        let result = self.inner.list_files(&session.access_token, params).await?;
        self.set_cached(&key, &result, cache::LISTING)?;
        Ok(result)
    }

    /// List one page of files with each file's first parent resolved to a path.
    pub async fn list_files(&self, params: &ListFilesParams) -> Result<FileListing> {
        let page = self.list_file_page(params).await?;

        let parent_ids: Vec<String> = page
            .files
            .iter()
            .filter_map(|f| f.first_parent().map(str::to_string))
            .collect();
        let paths = self.resolve_directory_paths(&parent_ids).await?;

        let files = page
            .files
            .into_iter()
            .map(|file| resolved(file, &paths))
            .collect();

        Ok(FileListing {
            files,
            next_page_token: page.next_page_token,
        })
    }

    /// Resolve folder ids to slash-delimited paths.
    ///
    /// Walks up the tree one level at a time: every id not already cached is
    /// fetched in one batched round per level, so the number of network
    /// rounds is bounded by the depth of the cold part of the tree. Folders,
    /// and the ids of folders that could not be fetched, are cached
    /// indefinitely.
    pub async fn resolve_directory_paths(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        let namespace = self.namespace()?;
        let mut nodes: HashMap<String, DirectoryNode> = HashMap::new();
        let mut missing: HashSet<String> = HashSet::new();

        let mut frontier: Vec<String> = ids.to_vec();
        frontier.sort();
        frontier.dedup();

        let mut rounds = 0;
        while !frontier.is_empty() {
            let mut level: Vec<DirectoryNode> = Vec::new();
            let mut cold: Vec<String> = Vec::new();

            for id in frontier.drain(..) {
                if nodes.contains_key(&id) || missing.contains(&id) {
                    continue;
                }
                // A cached `None` marks a folder the server could not return.
                match self.get_cached::<Option<DirectoryNode>>(&directory_key(&namespace, &id)) {
                    Some(Some(node)) => level.push(node),
                    Some(None) => {
                        missing.insert(id);
                    }
                    None => cold.push(id),
                }
            }

            if !cold.is_empty() {
                rounds += 1;
                debug!("Directory round {}: fetching {} folders", rounds, cold.len());

                let session = self.ensure_authed().await?;
                let fetched = self.inner.get_files(&session.access_token, &cold).await?;

                let found: HashSet<&str> = fetched.iter().map(|f| f.id.as_str()).collect();
                for id in cold.iter().filter(|id| !found.contains(id.as_str())) {
                    warn!("Folder {} could not be fetched; treating it as the root", id);
                    self.set_cached(
                        &directory_key(&namespace, id),
                        &None::<DirectoryNode>,
                        cache::DIRECTORIES,
                    )?;
                    missing.insert(id.clone());
                }

                for file in fetched {
                    let node = DirectoryNode::from(file);
                    self.set_cached(&directory_key(&namespace, &node.id), &node, cache::DIRECTORIES)?;
                    level.push(node);
                }
            }

            let mut next: Vec<String> = Vec::new();
            for node in level {
                if let Some(ref parent) = node.parent_id
                    && !nodes.contains_key(parent)
                    && !missing.contains(parent)
                {
                    next.push(parent.clone());
                }
                nodes.insert(node.id.clone(), node);
            }
            next.sort();
            next.dedup();
            frontier = next;
        }

        Ok(ids
            .iter()
            .map(|id| (id.clone(), build_path(id, &nodes)))
            .collect())
    }

    /// Get single-file metadata with its parent path.
    pub async fn get_file(&self, id: &str) -> Result<RemoteFile> {
        let namespace = self.namespace()?;
        let key = cache_key("get_file", Some(&namespace), &[("id", id)]);

        let file: FileResource = match self.get_cached(&key) {
            Some(cached) => {
                debug!("Cache hit: get_file");
                cached
            }
            None => {
                let session = self.ensure_authed().await?;
                let file = self.inner.get_file(&session.access_token, id).await?;
                self.set_cached(&key, &file, cache::FILES)?;
                file
            }
        };

        let parent_ids: Vec<String> = file.first_parent().map(str::to_string).into_iter().collect();
        let paths = self.resolve_directory_paths(&parent_ids).await?;
        Ok(resolved(file, &paths))
    }

    /// Get raw file contents.
    pub async fn get_file_contents(&self, id: &str) -> Result<Vec<u8>> {
        let namespace = self.namespace()?;
        let key = cache_key("get_file_contents", Some(&namespace), &[("id", id)]);

        if let Some(cached) = self.get_cached(&key) {
            debug!("Cache hit: get_file_contents");
            return Ok(cached);
        }

        let session = self.ensure_authed().await?;
        let contents = self.inner.get_file_contents(&session.access_token, id).await?;
        self.set_cached(&key, &contents, cache::CONTENTS)?;
        Ok(contents)
    }

    /// Per-category cache statistics.
    pub fn cache_stats(&self) -> Vec<CategoryStats> {
        self.cache
            .lock()
            .map(|guard| guard.stats())
            .unwrap_or_default()
    }

    /// Drop every cached response. Returns the number of entries removed.
    pub fn clear_cache(&self) -> usize {
        self.cache.lock().map(|mut guard| guard.clear()).unwrap_or(0)
    }
}

fn directory_key(namespace: &str, id: &str) -> String {
    cache_key("directory", Some(namespace), &[("id", id)])
}

fn resolved(file: FileResource, paths: &HashMap<String, String>) -> RemoteFile {
    let parent_id = file.first_parent().map(str::to_string);
    let parent_path = parent_id.as_ref().and_then(|p| paths.get(p).cloned());
    RemoteFile {
        id: file.id,
        name: file.name,
        parent_id,
        parent_path,
    }
}
