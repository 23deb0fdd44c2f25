use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use site_builder_core::document::validate::validate_document;
use site_builder_core::events::{EditorEvent, EventBus, SaveEvent};
use site_builder_core::{ensure_latest, Document};
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: SiteStore,
    config: AppConfig,
    event_bus: EventBus,
}

impl AppState {
    pub fn new(store: SiteStore, config: AppConfig, event_bus: EventBus) -> Self {
        Self {
            inner: Arc::new(InnerState {
                store,
                config,
                event_bus,
            }),
        }
    }

    pub fn store(&self) -> &SiteStore {
        &self.inner.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }
}

/// The single stored site document, optionally mirrored to a JSON file.
pub struct SiteStore {
    slot: RwLock<Slot>,
    path: Option<PathBuf>,
}

#[derive(Default)]
struct Slot {
    document: Option<Document>,
    writes: u64,
}

impl SiteStore {
    pub fn in_memory() -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            path: None,
        }
    }

    /// Open the store backed by `path`, reading and upgrading whatever is
    /// there. A missing file means nothing is stored yet.
    pub async fn open(path: Option<PathBuf>) -> ApiResult<Self> {
        let Some(path) = path else {
            return Ok(Self::in_memory());
        };
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let raw: Value = serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::Internal(format!("{}: {e}", path.display())))?;
                ensure_latest(Some(raw))?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        tracing::info!(
            path = %path.display(),
            stored = document.is_some(),
            "Opened site store"
        );
        Ok(Self {
            slot: RwLock::new(Slot {
                document,
                writes: 0,
            }),
            path: Some(path),
        })
    }

    pub async fn get(&self) -> Option<Document> {
        self.slot.read().await.document.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.document.is_none()
    }

    /// Upgrade, validate, stamp and persist a document. Returns the stored
    /// copy and its write number.
    pub async fn put(&self, raw: Value) -> ApiResult<(Document, u64)> {
        let mut document = ensure_latest(Some(raw))?
            .ok_or_else(|| ApiError::BadRequest("document must not be null".to_string()))?;
        validate_document(&document)?;
        document.updated_at = Utc::now().to_rfc3339();

        let mut slot = self.slot.write().await;
        if let Some(path) = &self.path {
            write_atomic(path, &document).await?;
        }
        slot.writes += 1;
        slot.document = Some(document.clone());
        Ok((document, slot.writes))
    }
}

async fn write_atomic(path: &Path, document: &Document) -> ApiResult<()> {
    let bytes = serde_json::to_vec_pretty(document)
        .map_err(|e| ApiError::Internal(format!("serialize document: {e}")))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Publish a stored write on the server's bus.
pub fn announce_write(bus: &EventBus, document: &Document, write: u64) {
    bus.emit(EditorEvent::Saved(SaveEvent {
        revision: write,
        updated_at: document.updated_at.clone(),
        timestamp: Utc::now(),
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use site_builder_core::document::factory::create_empty_document;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("site-builder-{}-{name}.json", std::process::id()))
    }

    #[tokio::test]
    async fn put_stamps_and_stores() {
        let store = SiteStore::in_memory();
        assert!(store.is_empty().await);

        let mut doc = create_empty_document();
        doc.updated_at = "2020-01-01T00:00:00Z".to_string();
        let (stored, write) = store.put(serde_json::to_value(&doc).unwrap()).await.unwrap();

        assert_eq!(write, 1);
        assert_ne!(stored.updated_at, "2020-01-01T00:00:00Z");
        assert_eq!(store.get().await, Some(stored));
    }

    #[tokio::test]
    async fn put_rejects_invalid_documents() {
        let store = SiteStore::in_memory();
        let mut doc = create_empty_document();
        doc.pages[0].is_home_page = false;

        let err = store.put(serde_json::to_value(&doc).unwrap()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(matches!(
            store.put(Value::Null).await.unwrap_err(),
            ApiError::BadRequest(_)
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn file_store_persists_and_upgrades() {
        let path = temp_path("persist");
        let _ = tokio::fs::remove_file(&path).await;

        let store = SiteStore::open(Some(path.clone())).await.unwrap();
        assert!(store.is_empty().await);
        let (stored, _) = store
            .put(serde_json::to_value(create_empty_document()).unwrap())
            .await
            .unwrap();

        let reopened = SiteStore::open(Some(path.clone())).await.unwrap();
        assert_eq!(reopened.get().await, Some(stored));

        let legacy = json!({ "version": 1, "sections": [{ "id": "a", "type": "faq" }] });
        tokio::fs::write(&path, legacy.to_string()).await.unwrap();
        let upgraded = SiteStore::open(Some(path.clone())).await.unwrap();
        let doc = upgraded.get().await.unwrap();
        assert_eq!(doc.version, 2);
        assert_eq!(doc.pages[0].sections[0].variant(), "accordion");

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
