//! The data-access surface the rest of the application depends on.

use std::sync::Arc;

use chrono::{Datelike, Local};
use cv_core::{
    seed_wines, CoreResult, DocumentStore, OrderBy, StoreError, StoreErrorKind, Wine, WineDraft,
    WinePatch,
};
use cv_utils::unique_in_order;
use tracing::{debug, info, warn};

use crate::cache::{WineCache, WineList};
use crate::connection::ConnectionMonitor;
use crate::optimistic::OptimisticWrites;
use crate::retry::RetryExecutor;
use crate::SyncSettings;

/// Wine repository composing the cache, the connection monitor, and the retry executor.
pub struct WineRepository<S> {
    store: Arc<S>,
    cache: Arc<WineCache>,
    monitor: Arc<ConnectionMonitor>,
    retry: RetryExecutor,
    writes: OptimisticWrites,
    settings: SyncSettings,
}

impl<S> WineRepository<S>
where
    S: DocumentStore + 'static,
{
    /// Build a repository with a fresh cache and a monitor bound to the store.
    pub fn new(store: Arc<S>, settings: SyncSettings) -> Self {
        let cache = Arc::new(WineCache::new(settings.cache_validity));
        let monitor = Arc::new(ConnectionMonitor::new(store.clone()));
        Self::from_parts(store, cache, monitor, settings)
    }

    /// Build a repository around an existing cache and monitor.
    pub fn from_parts(
        store: Arc<S>,
        cache: Arc<WineCache>,
        monitor: Arc<ConnectionMonitor>,
        settings: SyncSettings,
    ) -> Self {
        let retry = RetryExecutor::new(settings.retry, monitor.clone());
        let writes = OptimisticWrites::new(cache.clone());
        Self {
            store,
            cache,
            monitor,
            retry,
            writes,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<WineCache> {
        &self.cache
    }

    pub fn connection(&self) -> &Arc<ConnectionMonitor> {
        &self.monitor
    }

    pub fn writes(&self) -> &OptimisticWrites {
        &self.writes
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Return the collection, going to the store only when the cache cannot answer.
    ///
    /// Never fails: store failures fall back to cached wines, then to the built-in seed.
    pub async fn load(&self, force_refresh: bool) -> WineList {
        if !force_refresh && self.cache.is_fresh() {
            debug!("load: serving fresh cache");
            return self.cache.get_all();
        }
        if self.monitor.is_offline() {
            if !self.cache.is_empty() {
                debug!("load: offline, serving cached wines");
                return self.cache.get_all();
            }
            self.monitor.go_online().await;
        }

        let listing = self.store.list(OrderBy::Name);
        let outcome = match tokio::time::timeout(self.settings.load_timeout, listing).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::new(
                StoreErrorKind::DeadlineExceeded,
                "listing timed out",
            )),
        };

        match outcome {
            Ok(wines) => {
                self.monitor.record_success();
                let wines = if wines.is_empty() {
                    info!("load: store is empty, showing built-in wines");
                    seed_wines()
                } else {
                    wines
                };
                self.cache.replace_all(wines);
                self.writes.prune_local();
                self.cache.get_all()
            }
            Err(err) => {
                warn!(error = %err, "load: store unreachable, using local data");
                self.monitor.record_failure();
                self.monitor.go_offline().await;
                if self.cache.is_empty() {
                    self.cache.fill_fallback(seed_wines());
                }
                self.cache.get_all()
            }
        }
    }

    /// Look up one wine, asking the store when it is not cached.
    pub async fn get(&self, id: &str) -> CoreResult<Option<Wine>> {
        if let Some(wine) = self.cache.find(id) {
            return Ok(Some(wine));
        }
        if self.monitor.is_offline() {
            return Ok(None);
        }
        let store = self.store.as_ref();
        Ok(self.retry.run(move || store.get(id)).await?)
    }

    /// Create a wine from a draft.
    ///
    /// The record shows up in the cache under a temporary id before the store answers.
    /// When the store cannot be reached within the write timeout, the temporary record
    /// is returned and kept as if the create had succeeded.
    pub async fn add(&self, draft: WineDraft) -> CoreResult<Wine> {
        let wine = draft.into_wine(Local::now().year())?;
        let handle = self.writes.begin_optimistic_write(wine);

        let create = self.store.create(handle.wine(), handle.idempotency_key());
        let outcome = tokio::time::timeout(self.settings.write_timeout, create).await;

        match outcome {
            Ok(Ok(persisted)) => {
                self.monitor.record_success();
                info!(wine_id = %persisted.id, "add: wine stored");
                Ok(self.writes.complete_write(handle, persisted))
            }
            Ok(Err(err)) if err.is_connectivity() => {
                warn!(error = %err, wine_id = %handle.temp_id(), "add: store unreachable, keeping wine locally");
                self.monitor.record_failure();
                self.monitor.go_offline().await;
                Ok(self.writes.retain_offline(handle))
            }
            Ok(Err(err)) => {
                self.writes.abandon_write(handle);
                Err(err.into())
            }
            Err(_) => {
                warn!(wine_id = %handle.temp_id(), "add: store write timed out, keeping wine locally");
                self.monitor.record_failure();
                self.monitor.go_offline().await;
                Ok(self.writes.retain_offline(handle))
            }
        }
    }

    /// Apply a partial update to a wine.
    pub async fn update(&self, id: &str, patch: WinePatch) -> CoreResult<()> {
        patch.validate()?;
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(mut merged) = self.cache.find(id) {
            patch.apply(&mut merged);
            merged.validate()?;
        }

        if self.writes.is_local_only(id) {
            debug!(wine_id = %id, "update: applying to local-only wine");
            self.cache.upsert_one(id, &patch);
            return Ok(());
        }

        let store = self.store.as_ref();
        let remote_patch = &patch;
        self.retry
            .run(move || store.update(id, remote_patch))
            .await?;
        if !self.cache.upsert_one(id, &patch) {
            debug!(wine_id = %id, "update: wine not cached, cache left unchanged");
        }
        Ok(())
    }

    /// Delete a wine.
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        if self.writes.is_local_only(id) {
            debug!(wine_id = %id, "delete: removing local-only wine");
            self.cache.remove_one(id);
            self.writes.forget_local(id);
            return Ok(());
        }

        let store = self.store.as_ref();
        self.retry.run(move || store.delete(id)).await?;
        self.cache.remove_one(id);
        Ok(())
    }

    /// Force the next [`load`](Self::load) to go back to the store.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }

    /// Distinct vintages in the cache, newest first.
    pub fn get_years(&self) -> Vec<i32> {
        let mut years = unique_in_order(self.cache.get_all().iter().map(|wine| wine.year));
        years.sort_unstable_by(|a, b| b.cmp(a));
        years
    }

    /// Distinct regions in the cache, in the order they first appear.
    pub fn get_regions(&self) -> Vec<String> {
        unique_in_order(
            self.cache
                .get_all()
                .iter()
                .filter(|wine| !wine.region.trim().is_empty())
                .map(|wine| wine.region.clone()),
        )
    }
}
