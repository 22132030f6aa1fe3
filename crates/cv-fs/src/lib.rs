//! Filesystem-backed document store for CellarVault.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use cv_core::{
    CoreError, CoreResult, DocumentStore, NetworkControl, OrderBy, StoreError, StoreErrorKind,
    StoreResult, Wine, WinePatch,
};

mod config;
mod markdown;

pub use config::{
    load_config, read_config, resolve_store_path, save_config, set_config_path, write_config,
    CellarConfig, SearchConfig, PATH_ENV,
};
pub use markdown::{render_wine_markdown, wine_file_name};

/// Default directory name for the store.
pub const STORE_DIR_NAME: &str = "cellarvault";

const DOC_EXTENSION: &str = "yaml";

/// Filesystem-backed wine store.
///
/// Each wine lives in `wines/<id>.yaml`; the id itself is the file name.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    online: Arc<AtomicBool>,
    write_lock: Arc<Mutex<()>>,
}

impl FsStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            online: Arc::new(AtomicBool::new(true)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve the default store path (~/.cellarvault).
    pub fn default_path() -> CoreResult<PathBuf> {
        if let Some(dir) = dirs::home_dir() {
            return Ok(dir.join(format!(".{STORE_DIR_NAME}")));
        }
        Err(CoreError::Storage(
            "unable to determine a default store path".into(),
        ))
    }

    pub fn exists(&self) -> bool {
        self.root.exists() && self.wines_root().exists()
    }

    /// Create the store layout.
    pub fn init(&self) -> CoreResult<()> {
        if self.exists() {
            return Ok(());
        }
        fs::create_dir_all(self.wines_root())
            .map_err(|err| CoreError::Storage(err.to_string()))?;
        fs::create_dir_all(self.state_root())
            .map_err(|err| CoreError::Storage(err.to_string()))?;
        Ok(())
    }

    pub fn is_network_enabled(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn wines_root(&self) -> PathBuf {
        self.root.join("wines")
    }

    fn state_root(&self) -> PathBuf {
        self.root.join(".state")
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.is_network_enabled() {
            Ok(())
        } else {
            Err(StoreError::unavailable("network is disabled"))
        }
    }

    /// Run blocking file IO off the async runtime.
    async fn blocking<T, F>(&self, job: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Docs) -> StoreResult<T> + Send + 'static,
    {
        self.ensure_online()?;
        let docs = Docs {
            wines: self.wines_root(),
            idempotency: self.state_root().join("idempotency.yaml"),
            write_lock: self.write_lock.clone(),
        };
        tokio::task::spawn_blocking(move || job(docs))
            .await
            .map_err(|err| StoreError::internal(err.to_string()))?
    }
}

/// Paths the blocking jobs work on.
struct Docs {
    wines: PathBuf,
    idempotency: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl Docs {
    fn doc_path(&self, id: &str) -> StoreResult<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(StoreError::new(
                StoreErrorKind::InvalidArgument,
                format!("invalid document id '{id}'"),
            ));
        }
        Ok(self.wines.join(format!("{id}.{DOC_EXTENSION}")))
    }

    fn read_doc(&self, path: &Path, id: &str) -> StoreResult<Wine> {
        let contents = fs::read_to_string(path).map_err(io_error)?;
        let mut wine: Wine = serde_yaml::from_str(&contents).map_err(yaml_error)?;
        wine.id = id.to_string();
        Ok(wine)
    }

    fn write_doc(&self, path: &Path, doc: &Value) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let contents = serde_yaml::to_string(doc).map_err(yaml_error)?;
        fs::write(path, contents).map_err(io_error)
    }

    fn list(&self) -> StoreResult<Vec<Wine>> {
        if !self.wines.exists() {
            return Ok(Vec::new());
        }
        let mut wines = Vec::new();
        for entry in WalkDir::new(&self.wines)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOC_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match self.read_doc(path, id) {
                Ok(wine) => wines.push(wine),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable wine"),
            }
        }
        Ok(wines)
    }

    fn load_keys(&self) -> StoreResult<BTreeMap<String, String>> {
        if !self.idempotency.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.idempotency).map_err(io_error)?;
        serde_yaml::from_str(&contents).map_err(yaml_error)
    }

    fn save_keys(&self, keys: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.idempotency.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let contents = serde_yaml::to_string(keys).map_err(yaml_error)?;
        fs::write(&self.idempotency, contents).map_err(io_error)
    }
}

fn io_error(err: std::io::Error) -> StoreError {
    StoreError::internal(err.to_string())
}

fn yaml_error(err: serde_yaml::Error) -> StoreError {
    StoreError::internal(err.to_string())
}

/// The stored document: the wine without its id.
fn to_document<T: serde::Serialize>(value: &T) -> StoreResult<Value> {
    let mut doc = serde_yaml::to_value(value).map_err(yaml_error)?;
    if let Value::Mapping(map) = &mut doc {
        map.remove("id");
    }
    Ok(doc)
}

fn merge(target: &mut Mapping, patch: Mapping) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}

fn sort_wines(wines: &mut [Wine], order: OrderBy) {
    match order {
        OrderBy::Name => wines.sort_by_key(|wine| wine.name.to_lowercase()),
        OrderBy::Year => wines.sort_by_key(|wine| wine.year),
        OrderBy::Rating => wines.sort_by_key(|wine| wine.rating),
    }
}

#[async_trait]
impl NetworkControl for FsStore {
    async fn enable_network(&self) -> StoreResult<()> {
        if !self.online.swap(true, Ordering::SeqCst) {
            debug!(root = %self.root.display(), "store network enabled");
        }
        Ok(())
    }

    async fn disable_network(&self) -> StoreResult<()> {
        if self.online.swap(false, Ordering::SeqCst) {
            debug!(root = %self.root.display(), "store network disabled");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn list(&self, order: OrderBy) -> StoreResult<Vec<Wine>> {
        let mut wines = self.blocking(|docs| docs.list()).await?;
        sort_wines(&mut wines, order);
        Ok(wines)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Wine>> {
        let id = id.to_string();
        self.blocking(move |docs| {
            let path = docs.doc_path(&id)?;
            if !path.exists() {
                return Ok(None);
            }
            docs.read_doc(&path, &id).map(Some)
        })
        .await
    }

    async fn create(&self, wine: &Wine, idempotency_key: &str) -> StoreResult<Wine> {
        let doc = to_document(wine)?;
        let mut created = wine.clone();
        let key = idempotency_key.to_string();
        self.blocking(move |docs| {
            let _guard = docs.write_lock.lock();
            let mut keys = docs.load_keys()?;
            if let Some(existing) = keys.get(&key) {
                let path = docs.doc_path(existing)?;
                if path.exists() {
                    debug!(wine_id = %existing, "create replayed by idempotency key");
                    return docs.read_doc(&path, existing);
                }
            }

            let id = Uuid::new_v4().simple().to_string();
            docs.write_doc(&docs.doc_path(&id)?, &doc)?;
            keys.insert(key, id.clone());
            docs.save_keys(&keys)?;
            created.id = id;
            Ok(created)
        })
        .await
    }

    async fn update(&self, id: &str, patch: &WinePatch) -> StoreResult<()> {
        let Value::Mapping(changes) = to_document(patch)? else {
            return Err(StoreError::internal("patch did not serialise to a map"));
        };
        let id = id.to_string();
        self.blocking(move |docs| {
            let _guard = docs.write_lock.lock();
            let path = docs.doc_path(&id)?;
            if !path.exists() {
                return Err(StoreError::not_found(format!("no wine with id '{id}'")));
            }
            let contents = fs::read_to_string(&path).map_err(io_error)?;
            let mut doc: Value = serde_yaml::from_str(&contents).map_err(yaml_error)?;
            let Value::Mapping(fields) = &mut doc else {
                return Err(StoreError::internal(format!("wine '{id}' is not a map")));
            };
            merge(fields, changes);
            docs.write_doc(&path, &doc)
        })
        .await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        self.blocking(move |docs| {
            let _guard = docs.write_lock.lock();
            let path = docs.doc_path(&id)?;
            if path.exists() {
                fs::remove_file(path).map_err(io_error)?;
            }
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::seed_wines;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsStore) {
        let temp = TempDir::new().expect("temp dir");
        let store = FsStore::new(temp.path().to_path_buf());
        store.init().expect("init store");
        (temp, store)
    }

    #[tokio::test]
    async fn create_then_get_round_trip() {
        let (_temp, store) = store();
        let wine = seed_wines().remove(2);

        let created = store.create(&wine, "key-1").await.unwrap();
        assert_ne!(created.id, wine.id);

        let fetched = store.get(&created.id).await.unwrap().expect("stored wine");
        assert_eq!(fetched, created);

        let raw = fs::read_to_string(
            store.path().join("wines").join(format!("{}.yaml", created.id)),
        )
        .unwrap();
        assert!(!raw.lines().any(|line| line.starts_with("id:")));
    }

    #[tokio::test]
    async fn repeated_key_returns_first_record() {
        let (_temp, store) = store();
        let wine = seed_wines().remove(0);

        let first = store.create(&wine, "same").await.unwrap();
        let second = store.create(&wine, "same").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list(OrderBy::Name).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_orders_by_name() {
        let (_temp, store) = store();
        for (index, wine) in seed_wines().iter().enumerate() {
            store.create(wine, &format!("k{index}")).await.unwrap();
        }

        let names: Vec<_> = store
            .list(OrderBy::Name)
            .await
            .unwrap()
            .into_iter()
            .map(|wine| wine.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "Barolo",
                "Brunello di Montalcino",
                "Franciacorta Brut",
                "Moscato d'Asti",
                "Vermentino di Gallura",
            ]
        );
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() {
        let (_temp, store) = store();
        let created = store.create(&seed_wines().remove(1), "k").await.unwrap();

        store
            .update(&created.id, &WinePatch::new().rating(10).pairing("Tartufo"))
            .await
            .unwrap();

        let updated = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(updated.rating, 10);
        assert_eq!(updated.pairing, "Tartufo");
        assert_eq!(updated.name, created.name);
    }

    #[tokio::test]
    async fn update_of_missing_wine_is_not_found() {
        let (_temp, store) = store();
        let err = store
            .update("missing", &WinePatch::new().rating(3))
            .await
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let (_temp, store) = store();
        let created = store.create(&seed_wines().remove(3), "k").await.unwrap();

        store.delete(&created.id).await.unwrap();
        store.delete(&created.id).await.unwrap();

        assert!(store.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn disabled_network_fails_as_unavailable() {
        let (_temp, store) = store();
        store.disable_network().await.unwrap();

        let err = store.list(OrderBy::Name).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Unavailable);
        assert!(err.is_connectivity());

        store.enable_network().await.unwrap();
        assert!(store.list(OrderBy::Name).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn path_like_ids_are_rejected() {
        let (_temp, store) = store();
        let err = store.get("../config").await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::InvalidArgument);
    }
}
