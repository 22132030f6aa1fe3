//! Temporary records shown while a create is in flight.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use cv_core::Wine;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::cache::WineCache;

/// Prefix of ids assigned to records the store has not acknowledged.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Whether an id belongs to an optimistic record.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// An in-flight create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteHandle {
    temp_id: String,
    idempotency_key: String,
    wine: Wine,
}

impl WriteHandle {
    pub fn temp_id(&self) -> &str {
        &self.temp_id
    }

    /// Key sent with the create so the store can collapse duplicates.
    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    /// The optimistic record as currently shown in the cache.
    pub fn wine(&self) -> &Wine {
        &self.wine
    }
}

/// Arena of optimistic records: pending ones awaiting the store, and local-only ones
/// kept after the store could not be reached.
#[derive(Debug)]
pub struct OptimisticWrites {
    cache: Arc<WineCache>,
    pending: Mutex<BTreeMap<String, String>>,
    local_only: Mutex<BTreeSet<String>>,
    sequence: AtomicU64,
}

impl OptimisticWrites {
    pub fn new(cache: Arc<WineCache>) -> Self {
        Self {
            cache,
            pending: Mutex::new(BTreeMap::new()),
            local_only: Mutex::new(BTreeSet::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Give the wine a temporary id and show it in the cache right away.
    pub fn begin_optimistic_write(&self, mut wine: Wine) -> WriteHandle {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let temp_id = format!(
            "{TEMP_ID_PREFIX}{}_{sequence}",
            Utc::now().timestamp_millis()
        );
        let idempotency_key = Uuid::new_v4().to_string();
        wine.id.clone_from(&temp_id);
        self.cache.add_one(wine.clone());
        self.pending
            .lock()
            .insert(temp_id.clone(), idempotency_key.clone());
        debug!(wine_id = %temp_id, "optimistic write started");
        WriteHandle {
            temp_id,
            idempotency_key,
            wine,
        }
    }

    /// Swap the temporary record for the one the store issued.
    pub fn complete_write(&self, handle: WriteHandle, persisted: Wine) -> Wine {
        self.pending.lock().remove(&handle.temp_id);
        self.cache.remove_one(&handle.temp_id);
        if !self.cache.contains(&persisted.id) {
            self.cache.add_one(persisted.clone());
        }
        debug!(temp_id = %handle.temp_id, wine_id = %persisted.id, "optimistic write completed");
        persisted
    }

    /// Drop the temporary record after the store rejected the write.
    pub fn abandon_write(&self, handle: WriteHandle) {
        self.pending.lock().remove(&handle.temp_id);
        self.cache.remove_one(&handle.temp_id);
        debug!(wine_id = %handle.temp_id, "optimistic write abandoned");
    }

    /// Keep the temporary record as the local source of truth.
    ///
    /// Nothing reconciles it later; it lives until the cache is reloaded.
    pub fn retain_offline(&self, handle: WriteHandle) -> Wine {
        self.pending.lock().remove(&handle.temp_id);
        self.local_only.lock().insert(handle.temp_id.clone());
        debug!(wine_id = %handle.temp_id, "optimistic write kept offline");
        handle.wine
    }

    /// Ids of records still waiting for the store.
    pub fn pending(&self) -> Vec<String> {
        self.pending.lock().keys().cloned().collect()
    }

    /// Ids of records kept without store acknowledgement.
    pub fn local_only(&self) -> Vec<String> {
        self.local_only.lock().iter().cloned().collect()
    }

    pub fn is_local_only(&self, id: &str) -> bool {
        self.local_only.lock().contains(id)
    }

    pub(crate) fn forget_local(&self, id: &str) {
        self.local_only.lock().remove(id);
    }

    /// Drop local-only ids that a full reload removed from the cache.
    pub(crate) fn prune_local(&self) {
        self.local_only
            .lock()
            .retain(|id| self.cache.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::seed_wines;
    use std::time::Duration;

    fn arena() -> (OptimisticWrites, Arc<WineCache>) {
        let cache = Arc::new(WineCache::new(Duration::from_secs(600)));
        (OptimisticWrites::new(cache.clone()), cache)
    }

    #[test]
    fn begin_inserts_temporary_record() {
        let (writes, cache) = arena();
        let handle = writes.begin_optimistic_write(seed_wines().remove(0));

        assert!(is_temp_id(handle.temp_id()));
        assert!(cache.contains(handle.temp_id()));
        assert_eq!(writes.pending(), vec![handle.temp_id().to_string()]);
    }

    #[test]
    fn temp_ids_are_unique() {
        let (writes, _cache) = arena();
        let first = writes.begin_optimistic_write(seed_wines().remove(0));
        let second = writes.begin_optimistic_write(seed_wines().remove(1));
        assert_ne!(first.temp_id(), second.temp_id());
        assert_ne!(first.idempotency_key(), second.idempotency_key());
    }

    #[test]
    fn complete_replaces_temporary_record() {
        let (writes, cache) = arena();
        let handle = writes.begin_optimistic_write(seed_wines().remove(0));
        let temp_id = handle.temp_id().to_string();
        let mut persisted = handle.wine().clone();
        persisted.id = "real-1".into();

        writes.complete_write(handle, persisted);

        assert!(!cache.contains(&temp_id));
        assert!(cache.contains("real-1"));
        assert_eq!(cache.len(), 1);
        assert!(writes.pending().is_empty());
    }

    #[test]
    fn abandon_removes_temporary_record() {
        let (writes, cache) = arena();
        let handle = writes.begin_optimistic_write(seed_wines().remove(0));
        writes.abandon_write(handle);
        assert!(cache.is_empty());
        assert!(writes.pending().is_empty());
    }

    #[test]
    fn retain_keeps_record_as_local_only() {
        let (writes, cache) = arena();
        let handle = writes.begin_optimistic_write(seed_wines().remove(0));
        let temp_id = handle.temp_id().to_string();

        let wine = writes.retain_offline(handle);

        assert_eq!(wine.id, temp_id);
        assert!(cache.contains(&temp_id));
        assert!(writes.is_local_only(&temp_id));
        assert!(writes.pending().is_empty());

        cache.replace_all(Vec::new());
        writes.prune_local();
        assert!(writes.local_only().is_empty());
    }
}
