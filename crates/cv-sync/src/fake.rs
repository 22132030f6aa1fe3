//! Scripted store doubles for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cv_core::{
    DocumentStore, NetworkControl, OrderBy, StoreError, StoreResult, Wine, WinePatch,
};
use parking_lot::Mutex;

/// Network switch that counts its calls.
#[derive(Debug, Default)]
pub struct FakeNetwork {
    enable_calls: AtomicU32,
    disable_calls: AtomicU32,
    disabled: AtomicBool,
    fail: bool,
}

impl FakeNetwork {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn enable_calls(&self) -> u32 {
        self.enable_calls.load(Ordering::SeqCst)
    }

    pub fn disable_calls(&self) -> u32 {
        self.disable_calls.load(Ordering::SeqCst)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkControl for FakeNetwork {
    async fn enable_network(&self) -> StoreResult<()> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        self.disabled.store(false, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::internal("switch stuck"));
        }
        Ok(())
    }

    async fn disable_network(&self) -> StoreResult<()> {
        self.disable_calls.fetch_add(1, Ordering::SeqCst);
        self.disabled.store(true, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::internal("switch stuck"));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct ScriptedFailure {
    error: StoreError,
    remaining: Option<u32>,
}

/// In-memory store whose failures and latency are scripted per test.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    pub network: FakeNetwork,
    wines: Mutex<Vec<Wine>>,
    keys: Mutex<HashMap<String, String>>,
    failure: Mutex<Option<ScriptedFailure>>,
    latency: Mutex<Option<Duration>>,
    next_id: AtomicU32,
    list_calls: AtomicU32,
    create_calls: AtomicU32,
    update_calls: AtomicU32,
    delete_calls: AtomicU32,
}

impl ScriptedStore {
    pub fn with_wines(wines: Vec<Wine>) -> Self {
        let store = Self::default();
        *store.wines.lock() = wines;
        store
    }

    /// Make every document call fail with `error` until cleared.
    pub fn fail_with(&self, error: StoreError) {
        *self.failure.lock() = Some(ScriptedFailure {
            error,
            remaining: None,
        });
    }

    /// Make the next `times` document calls fail with `error`.
    pub fn fail_times(&self, error: StoreError, times: u32) {
        *self.failure.lock() = (times > 0).then_some(ScriptedFailure {
            error,
            remaining: Some(times),
        });
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    /// Delay every document call by `latency`.
    pub fn slow_down(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn wines(&self) -> Vec<Wine> {
        self.wines.lock().clone()
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> u32 {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> u32 {
        self.delete_calls.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> StoreResult<()> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.network.is_disabled() {
            return Err(StoreError::unavailable("network is disabled"));
        }
        let mut failure = self.failure.lock();
        let Some(scripted) = failure.as_mut() else {
            return Ok(());
        };
        let error = scripted.error.clone();
        if let Some(left) = scripted.remaining.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                *failure = None;
            }
        }
        Err(error)
    }
}

#[async_trait]
impl NetworkControl for ScriptedStore {
    async fn enable_network(&self) -> StoreResult<()> {
        self.network.enable_network().await
    }

    async fn disable_network(&self) -> StoreResult<()> {
        self.network.disable_network().await
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn list(&self, order: OrderBy) -> StoreResult<Vec<Wine>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        let mut wines = self.wines();
        match order {
            OrderBy::Name => wines.sort_by(|a, b| a.name.cmp(&b.name)),
            OrderBy::Year => wines.sort_by_key(|wine| wine.year),
            OrderBy::Rating => wines.sort_by_key(|wine| wine.rating),
        }
        Ok(wines)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Wine>> {
        self.gate().await?;
        Ok(self.wines.lock().iter().find(|wine| wine.id == id).cloned())
    }

    async fn create(&self, wine: &Wine, idempotency_key: &str) -> StoreResult<Wine> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        if let Some(id) = self.keys.lock().get(idempotency_key).cloned() {
            if let Some(existing) = self.wines.lock().iter().find(|wine| wine.id == id) {
                return Ok(existing.clone());
            }
        }
        let mut stored = wine.clone();
        stored.id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.keys
            .lock()
            .insert(idempotency_key.to_string(), stored.id.clone());
        self.wines.lock().push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &str, patch: &WinePatch) -> StoreResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        let mut wines = self.wines.lock();
        let wine = wines
            .iter_mut()
            .find(|wine| wine.id == id)
            .ok_or_else(|| StoreError::not_found(format!("no wine {id}")))?;
        patch.apply(wine);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        self.wines.lock().retain(|wine| wine.id != id);
        Ok(())
    }
}
