//! Place catalog
//!
//! The catalog owns every saved place. It is constructed once at the
//! composition root (`CatalogStore::open`) and handed out as a cheap clone.
//!
//! Other processes may write the same file (the CLI while the server runs),
//! so every commit starts from the file as it is on disk and reads pick up
//! a newer file when its modification time changes.
//!
//! Each mutation is one transaction: it is applied to a copy of the state,
//! written to disk, and only then swapped in. A failed write leaves both the
//! file and the in-memory catalog as they were. Committed mutations are
//! announced on a broadcast channel after the swap, so subscribers that
//! re-read a [`LiveView`] always see the new state.

pub mod persist;
pub mod view;

pub use view::{LiveView, SortKey, SortOrder};

use crate::error::{Error, Result};
use crate::place::{PlaceFields, PlaceRecord};
use persist::CatalogFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{broadcast, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 64;

/// A committed catalog mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Added(Uuid),
    Updated(Uuid),
    Removed(Uuid),
}

/// Cached catalog and the file modification time it was read at
struct Synced {
    file: CatalogFile,
    modified: Option<SystemTime>,
}

/// Handle to the place catalog
#[derive(Clone)]
pub struct CatalogStore {
    state: Arc<RwLock<Synced>>,
    events: broadcast::Sender<CatalogEvent>,
    path: Option<Arc<PathBuf>>,
}

impl CatalogStore {
    /// Open the catalog stored at `path`, creating it on first write
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let modified = persist::modified(&path);
        let file = persist::load(&path)?;
        info!("Opened catalog {} ({} places)", path.display(), file.places.len());
        Ok(Self::with_state(Synced { file, modified }, Some(path)))
    }

    /// A catalog that is never written to disk
    pub fn in_memory() -> Self {
        Self::with_state(
            Synced {
                file: CatalogFile::default(),
                modified: None,
            },
            None,
        )
    }

    fn with_state(synced: Synced, path: Option<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(synced)),
            events,
            path: path.map(Arc::new),
        }
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Insert a new place
    pub async fn add(&self, fields: PlaceFields) -> Result<PlaceRecord> {
        let fields = fields.normalized();
        fields.validate()?;

        self.commit(|state| {
            let mut record = PlaceRecord::new(fields, state.next_seq);
            if let Some(latest) = state.places.iter().map(|p| p.created_at).max() {
                record.created_at = record.created_at.max(latest);
            }
            state.next_seq += 1;
            state.places.push(record.clone());
            Ok((CatalogEvent::Added(record.id), record))
        })
        .await
    }

    /// Replace every editable field of a stored place at once
    ///
    /// Identity, creation time and insertion order are kept.
    pub async fn update(&self, id: Uuid, fields: PlaceFields) -> Result<PlaceRecord> {
        let fields = fields.normalized();
        fields.validate()?;

        self.commit(|state| {
            let record = state
                .places
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(Error::PlaceNotFound(id))?;
            record.fields = fields;
            Ok((CatalogEvent::Updated(id), record.clone()))
        })
        .await
    }

    /// Delete a stored place
    pub async fn remove(&self, id: Uuid) -> Result<PlaceRecord> {
        self.commit(|state| {
            let idx = state
                .places
                .iter()
                .position(|p| p.id == id)
                .ok_or(Error::PlaceNotFound(id))?;
            let record = state.places.remove(idx);
            Ok((CatalogEvent::Removed(id), record))
        })
        .await
    }

    /// Look up one place
    pub async fn get(&self, id: Uuid) -> Option<PlaceRecord> {
        self.current()
            .await
            .places
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Find a place by a unique id prefix
    pub async fn find_by_prefix(&self, prefix: &str) -> Result<PlaceRecord> {
        let state = self.current().await;
        let mut hits = state
            .places
            .iter()
            .filter(|p| p.id.to_string().starts_with(prefix));

        match (hits.next(), hits.next()) {
            (Some(record), None) => Ok(record.clone()),
            (None, _) => Err(Error::InvalidPlace(format!("No place matches id: {}", prefix))),
            (Some(_), Some(_)) => Err(Error::InvalidPlace(format!("Ambiguous id prefix: {}", prefix))),
        }
    }

    /// Live view over every place, in insertion order
    pub fn all(&self) -> LiveView {
        LiveView::new(self.clone())
    }

    /// Receive an event after every committed mutation
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub async fn len(&self) -> usize {
        self.current().await.places.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub(crate) async fn snapshot(&self) -> Vec<PlaceRecord> {
        self.current().await.places.clone()
    }

    /// Read access to the catalog, reloaded first if the file changed
    async fn current(&self) -> RwLockReadGuard<'_, CatalogFile> {
        if let Some(path) = &self.path {
            let on_disk = persist::modified(path);
            if self.state.read().await.modified != on_disk {
                let mut state = self.state.write().await;
                if let Err(e) = Self::reload(path, &mut state) {
                    warn!("Keeping cached catalog: {}", e);
                }
            }
        }
        RwLockReadGuard::map(self.state.read().await, |s| &s.file)
    }

    fn reload(path: &Path, state: &mut Synced) -> Result<()> {
        let modified = persist::modified(path);
        state.file = persist::load(path)?;
        state.modified = modified;
        debug!("Reloaded catalog {} ({} places)", path.display(), state.file.places.len());
        Ok(())
    }

    async fn commit<T>(
        &self,
        apply: impl FnOnce(&mut CatalogFile) -> Result<(CatalogEvent, T)>,
    ) -> Result<T> {
        let mut state = self.state.write().await;
        if let Some(path) = &self.path {
            Self::reload(path, &mut state)?;
        }

        let mut next = state.file.clone();
        let (event, out) = apply(&mut next)?;

        if let Some(path) = &self.path {
            persist::save(path, &next)?;
            state.modified = persist::modified(path);
        }

        state.file = next;
        drop(state);

        debug!("Catalog commit: {:?}", event);
        // No receivers is fine
        let _ = self.events.send(event);

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::photo::sample_png;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_store() -> (CatalogStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = CatalogStore::open(temp_dir.path().join("places.json")).unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_empty_store() {
        let (store, _temp) = create_test_store();
        assert!(store.is_empty().await);
        assert!(store.all().is_empty().await);
    }

    #[tokio::test]
    async fn test_add_assigns_identity() {
        let (store, _temp) = create_test_store();
        let a = store.add(PlaceFields::new("Cafe A")).await.unwrap();
        let b = store.add(PlaceFields::new("Cafe B")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.seq, 0);
        assert_eq!(b.seq, 1);
        assert_eq!(store.get(a.id).await.unwrap().name(), "Cafe A");
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_fields() {
        let (store, _temp) = create_test_store();

        assert!(matches!(
            store.add(PlaceFields::new("")).await,
            Err(Error::InvalidPlace(_))
        ));
        assert!(matches!(
            store.add(PlaceFields::new("Cafe").with_rating(6.0)).await,
            Err(Error::InvalidRating(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_keeps_image() {
        let (store, _temp) = create_test_store();
        let png = sample_png(8, 8);
        let record = store
            .add(PlaceFields::new("Gallery").with_image(png.clone()))
            .await
            .unwrap();
        assert_eq!(store.get(record.id).await.unwrap().fields.image, Some(png));
    }

    #[tokio::test]
    async fn test_persists_across_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("places.json");

        let id = {
            let store = CatalogStore::open(&path).unwrap();
            store
                .add(PlaceFields::new("Cafe A").with_location("1 Main St").with_rating(4.5))
                .await
                .unwrap()
                .id
        };

        let store = CatalogStore::open(&path).unwrap();
        let record = store.get(id).await.unwrap();
        assert_eq!(record.location(), Some("1 Main St"));
        assert_eq!(record.rating(), 4.5);

        let next = store.add(PlaceFields::new("Cafe B")).await.unwrap();
        assert_eq!(next.seq, 1);
    }

    #[tokio::test]
    async fn test_handles_on_one_file_keep_each_others_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("places.json");
        let cli = CatalogStore::open(&path).unwrap();
        let server = CatalogStore::open(&path).unwrap();

        let from_cli = cli.add(PlaceFields::new("From CLI")).await.unwrap();
        let from_server = server.add(PlaceFields::new("From server")).await.unwrap();
        assert_ne!(from_cli.seq, from_server.seq);

        // The server sees the CLI record without reopening
        assert_eq!(server.get(from_cli.id).await.unwrap().name(), "From CLI");

        server.remove(from_server.id).await.unwrap();
        let names: Vec<_> = CatalogStore::open(&path)
            .unwrap()
            .snapshot()
            .await
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["From CLI"]);
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_keeps_created_at() {
        let (store, _temp) = create_test_store();
        let original = store
            .add(PlaceFields::new("Cafe").with_location("1 Main St").with_category("Coffee"))
            .await
            .unwrap();

        for i in 0..3 {
            store
                .update(
                    original.id,
                    PlaceFields::new(format!("Cafe v{}", i)).with_rating(i as f64),
                )
                .await
                .unwrap();
        }

        let updated = store.get(original.id).await.unwrap();
        assert_eq!(updated.name(), "Cafe v2");
        assert_eq!(updated.rating(), 2.0);
        assert!(updated.location().is_none());
        assert!(updated.category().is_none());
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.seq, original.seq);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_place() {
        let (store, _temp) = create_test_store();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.update(id, PlaceFields::new("Ghost")).await,
            Err(Error::PlaceNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let (store, _temp) = create_test_store();
        let record = store.add(PlaceFields::new("Cafe")).await.unwrap();

        let removed = store.remove(record.id).await.unwrap();
        assert_eq!(removed, record);
        assert!(store.is_empty().await);

        assert!(matches!(
            store.remove(record.id).await,
            Err(Error::PlaceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let store = CatalogStore::open(blocker.join("places.json")).unwrap();
        let mut events = store.subscribe();

        let result = store.add(PlaceFields::new("Cafe")).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(store.is_empty().await);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_events_follow_mutations() {
        let store = CatalogStore::in_memory();
        let mut events = store.subscribe();

        let record = store.add(PlaceFields::new("Cafe")).await.unwrap();
        store.update(record.id, PlaceFields::new("Cafe 2")).await.unwrap();
        store.remove(record.id).await.unwrap();

        assert_eq!(events.recv().await.unwrap(), CatalogEvent::Added(record.id));
        assert_eq!(events.recv().await.unwrap(), CatalogEvent::Updated(record.id));
        assert_eq!(events.recv().await.unwrap(), CatalogEvent::Removed(record.id));
    }

    #[tokio::test]
    async fn test_subscriber_sees_committed_state() {
        let store = CatalogStore::in_memory();
        let view = store.all();
        let mut changes = view.changes();

        let watcher = tokio::spawn(async move {
            changes.recv().await.unwrap();
            view.len().await
        });

        store.add(PlaceFields::new("Cafe")).await.unwrap();
        assert_eq!(watcher.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_created_at_never_goes_backwards() {
        let store = CatalogStore::in_memory();
        let mut last = None;
        for i in 0..20 {
            let record = store.add(PlaceFields::new(format!("p{}", i))).await.unwrap();
            if let Some(prev) = last {
                assert!(record.created_at >= prev);
            }
            last = Some(record.created_at);
        }
    }

    #[tokio::test]
    async fn test_find_by_prefix() {
        let store = CatalogStore::in_memory();
        let record = store.add(PlaceFields::new("Cafe")).await.unwrap();
        let prefix = &record.id.to_string()[..8];

        assert_eq!(store.find_by_prefix(prefix).await.unwrap().id, record.id);
        assert!(store.find_by_prefix("zzzz").await.is_err());
    }
}
