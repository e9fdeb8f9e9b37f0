//! In-memory expiring cache with per-category shelf life and capacity
//!
//! Entries live in a dense arena. Each category threads its entries into a
//! doubly linked list (index based, oldest at the head) so that FIFO capacity
//! eviction and expiry sweeps both start from the head in O(1).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::CacheError;

/// How long entries of a category stay fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShelfLife {
    /// Use the cache-wide default shelf life
    #[default]
    Default,
    /// Entries never expire
    Never,
    /// Entries expire after the given duration
    For(Duration),
}

/// Declaration of a cache category.
///
/// # Example
/// ```ignore
/// let contents = Category::new("contents").shelf_life(ShelfLife::Never).quantity(20);
/// ```
#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    shelf_life: ShelfLife,
    quantity: Option<usize>,
}

impl Category {
    /// Create an unbounded category using the default shelf life.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shelf_life: ShelfLife::Default,
            quantity: None,
        }
    }

    /// Set the shelf life.
    pub fn shelf_life(mut self, shelf_life: ShelfLife) -> Self {
        self.shelf_life = shelf_life;
        self
    }

    /// Cap the number of entries; the oldest entries are evicted first.
    pub fn quantity(mut self, quantity: usize) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// Per-category statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub name: String,
    pub entries: usize,
    pub capacity: Option<usize>,
    pub shelf_life: Option<Duration>,
}

#[derive(Debug)]
struct Entry<V> {
    key: String,
    value: V,
    category: usize,
    expires_at: Option<Instant>,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
struct CategoryState {
    name: String,
    shelf_life: Option<Duration>,
    quantity: Option<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

/// Key/value cache with categories declared up front.
#[derive(Debug)]
pub struct ExpiringCache<V> {
    slots: Vec<Option<Entry<V>>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    categories: Vec<CategoryState>,
    by_name: HashMap<String, usize>,
}

impl<V> ExpiringCache<V> {
    /// Create a cache with the given categories.
    ///
    /// `default_shelf_life` applies to categories declared with [`ShelfLife::Default`].
    pub fn new(categories: Vec<Category>, default_shelf_life: Duration) -> Self {
        let mut states = Vec::with_capacity(categories.len());
        let mut by_name = HashMap::new();

        for category in categories {
            let shelf_life = match category.shelf_life {
                ShelfLife::Default => Some(default_shelf_life),
                ShelfLife::Never => None,
                ShelfLife::For(duration) => Some(duration),
            };
            by_name.insert(category.name.clone(), states.len());
            states.push(CategoryState {
                name: category.name,
                shelf_life,
                quantity: category.quantity,
                head: None,
                tail: None,
                len: 0,
            });
        }

        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            categories: states,
            by_name,
        }
    }

    /// Look up a key, treating expired entries as absent.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    /// Look up a key as of `now`.
    ///
    /// An expired hit evicts that entry together with every older entry of
    /// its category.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<&V> {
        let slot = *self.index.get(key)?;
        let (category, expired) = {
            let entry = self.slots[slot].as_ref()?;
            let expired = entry.expires_at.is_some_and(|at| now >= at);
            (entry.category, expired)
        };

        if expired {
            let mut evicted = 0;
            while let Some(head) = self.categories[category].head {
                self.unlink(head);
                evicted += 1;
                if head == slot {
                    break;
                }
            }
            debug!(
                "Cache expired: {} entries swept from '{}'",
                evicted, self.categories[category].name
            );
            return None;
        }

        self.slots[slot].as_ref().map(|entry| &entry.value)
    }

    /// Insert a value under `category`.
    pub fn set(&mut self, key: &str, value: V, category: &str) -> Result<(), CacheError> {
        self.set_at(key, value, category, Instant::now())
    }

    /// Insert a value as of `now`.
    ///
    /// Fails without touching any state when the category is unknown. A key
    /// that already exists is unlinked first and re-inserted at the tail.
    pub fn set_at(
        &mut self,
        key: &str,
        value: V,
        category: &str,
        now: Instant,
    ) -> Result<(), CacheError> {
        let category_idx = *self
            .by_name
            .get(category)
            .ok_or_else(|| CacheError::UnknownCategory(category.to_string()))?;

        if let Some(&existing) = self.index.get(key) {
            self.unlink(existing);
        }

        let expires_at = self.categories[category_idx]
            .shelf_life
            .and_then(|life| now.checked_add(life));
        let previous_tail = self.categories[category_idx].tail;
        let entry = Entry {
            key: key.to_string(),
            value,
            category: category_idx,
            expires_at,
            prev: previous_tail,
            next: None,
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };

        match previous_tail.and_then(|tail| self.slots[tail].as_mut()) {
            Some(tail) => tail.next = Some(slot),
            None => self.categories[category_idx].head = Some(slot),
        }

        let state = &mut self.categories[category_idx];
        state.tail = Some(slot);
        state.len += 1;
        self.index.insert(key.to_string(), slot);

        while let Some(quantity) = self.categories[category_idx].quantity {
            if self.categories[category_idx].len <= quantity {
                break;
            }
            match self.categories[category_idx].head {
                Some(head) => {
                    if let Some(evicted) = self.unlink(head) {
                        debug!("Cache evicted (capacity): {}", evicted.key);
                    }
                }
                None => break,
            }
        }

        Ok(())
    }

    /// Remove a key, returning its value even if it already expired.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let slot = *self.index.get(key)?;
        self.unlink(slot).map(|entry| entry.value)
    }

    /// Fetch and remove a fresh entry. Single-use consumption.
    pub fn take(&mut self, key: &str) -> Option<V> {
        self.take_at(key, Instant::now())
    }

    /// Fetch and remove a fresh entry as of `now`.
    pub fn take_at(&mut self, key: &str, now: Instant) -> Option<V> {
        self.get_at(key, now)?;
        self.remove(key)
    }

    /// Number of entries currently stored, including ones not yet swept.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drop every entry, keeping the category declarations.
    pub fn clear(&mut self) -> usize {
        let removed = self.index.len();
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        for state in &mut self.categories {
            state.head = None;
            state.tail = None;
            state.len = 0;
        }
        removed
    }

    /// Statistics for every declared category, in declaration order.
    pub fn stats(&self) -> Vec<CategoryStats> {
        self.categories
            .iter()
            .map(|state| CategoryStats {
                name: state.name.clone(),
                entries: state.len,
                capacity: state.quantity,
                shelf_life: state.shelf_life,
            })
            .collect()
    }

    fn unlink(&mut self, slot: usize) -> Option<Entry<V>> {
        let entry = self.slots.get_mut(slot)?.take()?;

        match entry.prev.and_then(|prev| self.slots[prev].as_mut()) {
            Some(prev) => prev.next = entry.next,
            None => self.categories[entry.category].head = entry.next,
        }
        match entry.next.and_then(|next| self.slots[next].as_mut()) {
            Some(next) => next.prev = entry.prev,
            None => self.categories[entry.category].tail = entry.prev,
        }

        self.categories[entry.category].len -= 1;
        self.index.remove(&entry.key);
        self.free.push(slot);
        Some(entry)
    }
}
