//! Local cache for remote storage responses
//!
//! An in-memory [`ExpiringCache`] holding JSON-serialised responses, split into
//! categories with their own shelf life and capacity.

pub mod key;
pub mod storage;

use std::time::Duration;

pub use key::cache_key;
pub use storage::{Category, CategoryStats, ExpiringCache, ShelfLife};

/// File listing pages
pub const LISTING: &str = "listing";
/// Single-file metadata
pub const FILES: &str = "files";
/// Directory nodes. Folder names are assumed stable.
pub const DIRECTORIES: &str = "directories";
/// Raw shot file contents
pub const CONTENTS: &str = "contents";

/// Cache shelf life and capacity per category
pub struct CacheTtl;

impl CacheTtl {
    pub const DEFAULT: Duration = Duration::from_secs(60); // 1 min

    pub const LISTING_ENTRIES: usize = 64;
    pub const FILES_ENTRIES: usize = 256;
    // Counted in entries, not bytes.
    pub const CONTENTS_ENTRIES: usize = 20;
}

/// Category table for the remote file cache.
pub fn categories() -> Vec<Category> {
    vec![
        Category::new(LISTING).quantity(CacheTtl::LISTING_ENTRIES),
        Category::new(FILES).quantity(CacheTtl::FILES_ENTRIES),
        Category::new(DIRECTORIES).shelf_life(ShelfLife::Never),
        Category::new(CONTENTS)
            .shelf_life(ShelfLife::Never)
            .quantity(CacheTtl::CONTENTS_ENTRIES),
    ]
}

/// A fresh cache configured with [`categories`].
pub fn remote_cache() -> ExpiringCache<Vec<u8>> {
    ExpiringCache::new(categories(), CacheTtl::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_cache_declares_all_categories() {
        let cache = remote_cache();
        let names: Vec<_> = cache.stats().into_iter().map(|s| s.name).collect();

        assert_eq!(names, vec![LISTING, FILES, DIRECTORIES, CONTENTS]);
    }

    #[test]
    fn test_directories_never_expire_and_are_unbounded() {
        let cache = remote_cache();
        let dirs = &cache.stats()[2];

        assert_eq!(dirs.shelf_life, None);
        assert_eq!(dirs.capacity, None);
    }

    #[test]
    fn test_contents_capped_by_entry_count() {
        let mut cache = remote_cache();
        for i in 0..25 {
            cache.set(&format!("c{i}"), vec![0u8; 4], CONTENTS).unwrap();
        }

        assert_eq!(cache.stats()[3].entries, CacheTtl::CONTENTS_ENTRIES);
        assert!(cache.get("c4").is_none());
        assert!(cache.get("c5").is_some());
    }
}
