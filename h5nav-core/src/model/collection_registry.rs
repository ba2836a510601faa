//!
//! ``src/model/collection_registry.rs``
//!
//! Open collections in tab order, at most one per resolved path.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::info;

use crate::{
    error::{AppError, AppResult},
    fs::container::ContainerReader,
    model::collection::{Collection, CollectionId},
};

#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: Vec<Collection>,
    by_path: HashMap<PathBuf, CollectionId>,
    active: Option<CollectionId>,
    last_uid: u64,
}

impl CollectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an opened container and make it active. A path that is
    /// already open keeps its uid; the second reader is dropped. Returns the
    /// uid and whether a new collection was created.
    pub fn insert_opened(
        &mut self,
        resolved: PathBuf,
        reader: Arc<dyn ContainerReader>,
    ) -> (CollectionId, bool) {
        if let Some(&uid) = self.by_path.get(&resolved) {
            self.active = Some(uid);
            return (uid, false);
        }

        self.last_uid += 1;
        let uid = CollectionId(self.last_uid);
        info!(uid = %uid, path = %resolved.display(), "Collection opened");

        self.by_path.insert(resolved.clone(), uid);
        self.collections.push(Collection::new(uid, resolved, reader));
        self.active = Some(uid);
        (uid, true)
    }

    /// Remove a collection, cancelling its tasks. Closing the active tab
    /// activates its left neighbour, or the new first tab.
    pub fn close(&mut self, uid: CollectionId) -> AppResult<Collection> {
        let pos = self
            .position(uid)
            .ok_or_else(|| AppError::not_found(format!("collection {uid}")))?;

        let collection = self.collections.remove(pos);
        collection.cancel.cancel();
        self.by_path.remove(&collection.path);

        if self.active == Some(uid) {
            self.active = self
                .collections
                .get(pos.saturating_sub(1))
                .map(|c| c.uid);
        }

        info!(uid = %uid, "Collection closed");
        Ok(collection)
    }

    /// Collections in open order.
    pub fn list_open(&self) -> impl Iterator<Item = &Collection> {
        self.collections.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn set_active(&mut self, uid: CollectionId) -> AppResult<()> {
        if self.position(uid).is_none() {
            return Err(AppError::not_found(format!("collection {uid}")));
        }

        self.active = Some(uid);
        Ok(())
    }

    #[must_use]
    pub const fn active_id(&self) -> Option<CollectionId> {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> Option<&Collection> {
        self.active.and_then(|uid| self.get(uid))
    }

    pub fn active_mut(&mut self) -> Option<&mut Collection> {
        let uid = self.active?;
        self.get_mut(uid)
    }

    #[must_use]
    pub fn get(&self, uid: CollectionId) -> Option<&Collection> {
        self.collections.iter().find(|c| c.uid == uid)
    }

    pub fn get_mut(&mut self, uid: CollectionId) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.uid == uid)
    }

    #[must_use]
    pub fn find_by_path(&self, resolved: &Path) -> Option<CollectionId> {
        self.by_path.get(resolved).copied()
    }

    /// Cycle the active tab; `forward` wraps past the last tab.
    pub fn cycle(&mut self, forward: bool) -> Option<CollectionId> {
        let count = self.collections.len();
        let pos = self.position(self.active?)?;
        let next = if forward {
            (pos + 1) % count
        } else {
            (pos + count - 1) % count
        };

        let uid = self.collections[next].uid;
        self.active = Some(uid);
        Some(uid)
    }

    fn position(&self, uid: CollectionId) -> Option<usize> {
        self.collections.iter().position(|c| c.uid == uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory_container::{MemoryContainer, MemoryNode};

    fn reader() -> Arc<dyn ContainerReader> {
        Arc::new(MemoryContainer::new(MemoryNode::group()).unwrap())
    }

    #[test]
    fn test_uids_are_monotonic_and_paths_unique() {
        let mut registry = CollectionRegistry::new();
        let (a, new_a) = registry.insert_opened("/data/run1.h5".into(), reader());
        let (b, _) = registry.insert_opened("/data/run2.h5".into(), reader());
        let (again, new_again) = registry.insert_opened("/data/run1.h5".into(), reader());

        assert_eq!(a, CollectionId(1));
        assert!(new_a);
        assert_eq!(b, CollectionId(2));
        assert_eq!(again, a);
        assert!(!new_again);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_id(), Some(a));
    }

    #[test]
    fn test_close_activates_left_neighbour_and_cancels() {
        let mut registry = CollectionRegistry::new();
        let (a, _) = registry.insert_opened("/a".into(), reader());
        let (b, _) = registry.insert_opened("/b".into(), reader());
        let (c, _) = registry.insert_opened("/c".into(), reader());

        registry.set_active(b).unwrap();
        let token = registry.get(b).unwrap().task_token();
        let closed = registry.close(b).unwrap();

        assert!(token.is_cancelled());
        assert_eq!(closed.uid, b);
        assert_eq!(registry.active_id(), Some(a));
        assert_eq!(registry.list_open().map(|c| c.uid).collect::<Vec<_>>(), [a, c]);
        assert!(registry.find_by_path(Path::new("/b")).is_none());

        // uids are never reused.
        let (d, _) = registry.insert_opened("/b".into(), reader());
        assert_eq!(d, CollectionId(4));
    }

    #[test]
    fn test_close_first_and_last() {
        let mut registry = CollectionRegistry::new();
        let (a, _) = registry.insert_opened("/a".into(), reader());
        let (b, _) = registry.insert_opened("/b".into(), reader());
        registry.set_active(a).unwrap();
        registry.close(a).unwrap();
        assert_eq!(registry.active_id(), Some(b));
        registry.close(b).unwrap();
        assert_eq!(registry.active_id(), None);
        assert!(registry.close(b).is_err());
    }

    #[test]
    fn test_cycle_wraps() {
        let mut registry = CollectionRegistry::new();
        let (a, _) = registry.insert_opened("/a".into(), reader());
        let (b, _) = registry.insert_opened("/b".into(), reader());
        assert_eq!(registry.cycle(true), Some(a));
        assert_eq!(registry.cycle(true), Some(b));
        assert_eq!(registry.cycle(false), Some(a));
        assert!(registry.set_active(CollectionId(99)).is_err());
    }
}
