//! In-memory mirror of the wine collection.

use std::sync::Arc;
use std::time::Duration;

use cv_core::{Wine, WinePatch};
use parking_lot::Mutex;
use tokio::time::Instant;

/// An immutable snapshot of the cached collection.
pub type WineList = Arc<Vec<Wine>>;

#[derive(Debug)]
struct CacheState {
    wines: WineList,
    last_fetch: Option<Instant>,
}

/// What the UI currently believes exists, independent of network availability.
///
/// The list is swapped for a new snapshot on every mutation, so a [`WineList`] handed
/// out earlier never changes underneath its holder.
#[derive(Debug)]
pub struct WineCache {
    validity: Duration,
    state: Mutex<CacheState>,
}

impl WineCache {
    /// Create an empty cache whose full reloads stay fresh for `validity`.
    pub fn new(validity: Duration) -> Self {
        Self::with_wines(validity, Vec::new())
    }

    /// Create a cache pre-filled with wines; the content starts out stale.
    pub fn with_wines(validity: Duration, wines: Vec<Wine>) -> Self {
        Self {
            validity,
            state: Mutex::new(CacheState {
                wines: Arc::new(wines),
                last_fetch: None,
            }),
        }
    }

    /// Current snapshot. Never blocks on IO and never fails.
    pub fn get_all(&self) -> WineList {
        Arc::clone(&self.state.lock().wines)
    }

    pub fn len(&self) -> usize {
        self.state.lock().wines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().wines.is_empty()
    }

    /// Look up a cached wine by id.
    pub fn find(&self, id: &str) -> Option<Wine> {
        self.state
            .lock()
            .wines
            .iter()
            .find(|wine| wine.id == id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.lock().wines.iter().any(|wine| wine.id == id)
    }

    /// Replace the whole collection after a successful reload and mark it fresh.
    pub fn replace_all(&self, wines: Vec<Wine>) {
        let mut state = self.state.lock();
        state.wines = Arc::new(wines);
        state.last_fetch = Some(Instant::now());
    }

    /// Replace the collection with fallback content without marking it fresh.
    pub fn fill_fallback(&self, wines: Vec<Wine>) {
        self.state.lock().wines = Arc::new(wines);
    }

    /// True when the cache holds wines fetched less than the validity window ago.
    pub fn is_fresh(&self) -> bool {
        let state = self.state.lock();
        if state.wines.is_empty() {
            return false;
        }
        state
            .last_fetch
            .is_some_and(|fetched| fetched.elapsed() < self.validity)
    }

    /// Force the next load to go back to the store.
    pub fn invalidate(&self) {
        self.state.lock().last_fetch = None;
    }

    /// Merge a patch into the wine with the given id.
    ///
    /// Returns false, leaving the cache untouched, when no wine has that id.
    pub fn upsert_one(&self, id: &str, patch: &WinePatch) -> bool {
        let mut state = self.state.lock();
        let Some(position) = state.wines.iter().position(|wine| wine.id == id) else {
            return false;
        };
        let mut wines = Vec::clone(&state.wines);
        patch.apply(&mut wines[position]);
        state.wines = Arc::new(wines);
        true
    }

    /// Remove the wine with the given id; returns false when it was not cached.
    pub fn remove_one(&self, id: &str) -> bool {
        let mut state = self.state.lock();
        if !state.wines.iter().any(|wine| wine.id == id) {
            return false;
        }
        let wines = state
            .wines
            .iter()
            .filter(|wine| wine.id != id)
            .cloned()
            .collect();
        state.wines = Arc::new(wines);
        true
    }

    /// Append a wine.
    pub fn add_one(&self, wine: Wine) {
        let mut state = self.state.lock();
        let mut wines = Vec::clone(&state.wines);
        wines.push(wine);
        state.wines = Arc::new(wines);
    }
}
