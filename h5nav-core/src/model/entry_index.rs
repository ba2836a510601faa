//!
//! ``src/model/entry_index.rs``
//!
//! Flat registry of a collection's entries keyed by path. Iteration order is
//! discovery order. Mutated only on the UI thread, when a background load
//! completes.

use compact_str::CompactString;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    error::{AppError, AppResult},
    fs::container::ChildRecord,
    model::entry::{ChildrenState, Entry, EntryKind, EntryPath, Shape},
};

/// Result of asking a group for its children.
#[derive(Debug)]
pub enum ChildListing<'a> {
    /// Children known, in discovery order.
    Loaded(Vec<&'a Entry>),

    /// Never loaded; the caller should start a load.
    NeedsLoad,

    /// A load is in flight.
    Loading,

    /// Last load failed for good; requires an explicit retry.
    Unavailable(&'a str),
}

/// Outcome of [`EntryIndex::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

#[derive(Debug, Clone)]
pub struct EntryIndex {
    entries: IndexMap<EntryPath, Entry>,
}

impl EntryIndex {
    /// Index holding only the root group.
    #[must_use]
    pub fn new() -> Self {
        let mut entries = IndexMap::with_capacity(256);
        entries.insert(EntryPath::root(), Entry::group(EntryPath::root()));
        Self { entries }
    }

    pub fn get(&self, path: &EntryPath) -> AppResult<&Entry> {
        self.entries.get(path).ok_or_else(|| AppError::not_found(path))
    }

    #[must_use]
    pub fn contains(&self, path: &EntryPath) -> bool {
        self.entries.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Insert a single entry. Its parent must already be indexed as a group.
    /// Re-inserting a path with the same kind is a no-op.
    pub fn insert(&mut self, entry: Entry) -> AppResult<InsertOutcome> {
        if let Some(existing) = self.entries.get(&entry.path) {
            if existing.kind != entry.kind {
                warn!(
                    path = %entry.path,
                    existing = %existing.kind,
                    incoming = %entry.kind,
                    "Rejected conflicting insert"
                );
                return Err(AppError::conflict(&entry.path, existing.kind, entry.kind));
            }
            return Ok(InsertOutcome::AlreadyPresent);
        }

        let parent_path = entry
            .path
            .parent()
            .ok_or_else(|| AppError::not_found(&entry.path))?;

        let parent = self
            .entries
            .get_mut(&parent_path)
            .ok_or_else(|| AppError::not_found(&parent_path))?;

        if parent.kind != EntryKind::Group {
            return Err(AppError::conflict(&parent_path, parent.kind, EntryKind::Group));
        }

        parent.children.push(entry.path.clone());
        self.entries.insert(entry.path.clone(), entry);

        Ok(InsertOutcome::Inserted)
    }

    pub fn list_children(&self, path: &EntryPath) -> AppResult<ChildListing<'_>> {
        let entry = self.get(path)?;

        Ok(match &entry.children_state {
            ChildrenState::Loaded => ChildListing::Loaded(
                entry
                    .children
                    .iter()
                    .filter_map(|child| self.entries.get(child))
                    .collect(),
            ),
            ChildrenState::Unknown => ChildListing::NeedsLoad,
            ChildrenState::Loading => ChildListing::Loading,
            ChildrenState::Unavailable(reason) => ChildListing::Unavailable(reason),
        })
    }

    /// Mark a group as loading. Returns false if a load is not needed
    /// (already loading, loaded, unavailable, or not a group).
    pub fn begin_load(&mut self, path: &EntryPath) -> AppResult<bool> {
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| AppError::not_found(path))?;

        if entry.kind != EntryKind::Group || entry.children_state != ChildrenState::Unknown {
            return Ok(false);
        }

        entry.children_state = ChildrenState::Loading;
        Ok(true)
    }

    /// Put a cancelled load back to `Unknown` so it can be issued again.
    pub fn abort_load(&mut self, path: &EntryPath) {
        if let Some(entry) = self.entries.get_mut(path)
            && entry.children_state == ChildrenState::Loading
        {
            entry.children_state = ChildrenState::Unknown;
        }
    }

    /// Insert a loaded child batch atomically: the whole batch is validated
    /// before anything is mutated. Returns the child paths, in order. A group
    /// that is already loaded is left untouched.
    pub fn apply_children(
        &mut self,
        parent: &EntryPath,
        records: Vec<ChildRecord>,
    ) -> AppResult<Vec<EntryPath>> {
        let parent_entry = self.get(parent)?;

        if parent_entry.kind != EntryKind::Group {
            return Err(AppError::conflict(parent, parent_entry.kind, EntryKind::Group));
        }

        if parent_entry.children_state == ChildrenState::Loaded {
            debug!(path = %parent, "Ignoring children for already loaded group");
            return Ok(parent_entry.children.clone());
        }

        let mut batch: IndexMap<CompactString, ChildRecord> = IndexMap::with_capacity(records.len());
        for record in records {
            if record.name.is_empty() || record.name.contains('/') {
                return Err(AppError::io(
                    parent,
                    format!("reader returned invalid child name {:?}", record.name),
                ));
            }

            if let Some(seen) = batch.get(&record.name) {
                if seen.kind != record.kind {
                    return Err(AppError::conflict(parent.join(&record.name), seen.kind, record.kind));
                }
                continue;
            }

            let child_path = parent.join(&record.name);
            if let Some(existing) = self.entries.get(&child_path)
                && existing.kind != record.kind
            {
                return Err(AppError::conflict(&child_path, existing.kind, record.kind));
            }

            batch.insert(record.name.clone(), record);
        }

        // Validation passed; from here on nothing can fail.
        let mut paths = Vec::with_capacity(batch.len());
        for (name, record) in batch {
            let child_path = parent.join(&name);
            if !self.entries.contains_key(&child_path) {
                let entry = match record.kind {
                    EntryKind::Group => Entry::group(child_path.clone()),
                    EntryKind::Dataset => Entry::dataset(child_path.clone(), record.shape, record.dtype),
                };
                self.entries.insert(child_path.clone(), entry);
            }
            paths.push(child_path);
        }

        if let Some(parent_entry) = self.entries.get_mut(parent) {
            for path in &paths {
                if !parent_entry.children.contains(path) {
                    parent_entry.children.push(path.clone());
                }
            }
            parent_entry.children_state = ChildrenState::Loaded;
        }

        debug!(path = %parent, count = paths.len(), "Children applied");
        Ok(paths)
    }

    pub fn mark_unavailable(&mut self, path: &EntryPath, reason: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(path)
            && entry.kind == EntryKind::Group
            && entry.children_state != ChildrenState::Loaded
        {
            entry.children_state = ChildrenState::Unavailable(reason.into());
        }
    }

    /// Clear an `Unavailable` mark so the next expansion loads again.
    pub fn reset_unavailable(&mut self, path: &EntryPath) -> bool {
        match self.entries.get_mut(path) {
            Some(entry) if matches!(entry.children_state, ChildrenState::Unavailable(_)) => {
                entry.children_state = ChildrenState::Unknown;
                true
            }
            _ => false,
        }
    }

    /// Fill in dataset metadata learned from a sample, without overwriting.
    pub fn update_dataset_meta(&mut self, path: &EntryPath, shape: &Shape, dtype: &CompactString) {
        if let Some(entry) = self.entries.get_mut(path)
            && entry.kind == EntryKind::Dataset
        {
            if entry.shape.is_none() {
                entry.shape = Some(shape.clone());
            }
            if entry.dtype.is_none() {
                entry.dtype = Some(dtype.clone());
            }
        }
    }
}

impl Default for EntryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_root() -> EntryIndex {
        let mut index = EntryIndex::new();
        assert!(index.begin_load(&EntryPath::root()).unwrap());
        index
            .apply_children(
                &EntryPath::root(),
                vec![ChildRecord::group("alpha"), ChildRecord::dataset("beta", None, None)],
            )
            .unwrap();
        index
    }

    fn names(listing: ChildListing<'_>) -> Vec<String> {
        match listing {
            ChildListing::Loaded(entries) => entries.iter().map(|e| e.name().to_string()).collect(),
            other => panic!("expected loaded children, got {other:?}"),
        }
    }

    #[test]
    fn test_children_keep_discovery_order_without_reload() {
        let mut index = loaded_root();
        for _ in 0..3 {
            assert_eq!(names(index.list_children(&EntryPath::root()).unwrap()), ["alpha", "beta"]);
        }
        // Already loaded: no second load is started.
        assert!(!index.begin_load(&EntryPath::root()).unwrap());
    }

    #[test]
    fn test_unknown_group_needs_load() {
        let index = loaded_root();
        assert!(matches!(
            index.list_children(&EntryPath::new("/alpha")).unwrap(),
            ChildListing::NeedsLoad
        ));
        assert!(matches!(
            index.list_children(&EntryPath::new("/nope")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_insert_rejects_orphans_and_conflicts() {
        let mut index = loaded_root();
        let orphan = Entry::group(EntryPath::new("/missing/child"));
        assert!(matches!(index.insert(orphan), Err(AppError::NotFound(_))));

        let conflicting = Entry::dataset(EntryPath::new("/alpha"), None, None);
        assert!(matches!(index.insert(conflicting), Err(AppError::Conflict { .. })));

        let same = Entry::group(EntryPath::new("/alpha"));
        assert_eq!(index.insert(same).unwrap(), InsertOutcome::AlreadyPresent);

        let fresh = Entry::group(EntryPath::new("/alpha/inner"));
        assert_eq!(index.insert(fresh).unwrap(), InsertOutcome::Inserted);
        assert_eq!(index.get(&EntryPath::new("/alpha")).unwrap().children.len(), 1);
    }

    #[test]
    fn test_conflicting_batch_leaves_index_untouched() {
        let mut index = loaded_root();
        let alpha = EntryPath::new("/alpha");
        index.begin_load(&alpha).unwrap();
        let before = index.len();

        let err = index
            .apply_children(
                &alpha,
                vec![ChildRecord::group("x"), ChildRecord::dataset("x", None, None)],
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(index.len(), before);
        assert!(index.get(&alpha).unwrap().children.is_empty());
        assert_eq!(index.get(&alpha).unwrap().children_state, ChildrenState::Loading);
    }

    #[test]
    fn test_unavailable_and_reset() {
        let mut index = loaded_root();
        let alpha = EntryPath::new("/alpha");
        index.begin_load(&alpha).unwrap();
        index.mark_unavailable(&alpha, "disk gone");

        assert!(matches!(
            index.list_children(&alpha).unwrap(),
            ChildListing::Unavailable("disk gone")
        ));
        assert!(!index.begin_load(&alpha).unwrap());
        assert!(index.reset_unavailable(&alpha));
        assert!(index.begin_load(&alpha).unwrap());
    }

    #[test]
    fn test_dataset_meta_is_filled_once() {
        let mut index = loaded_root();
        let beta = EntryPath::new("/beta");
        let shape: Shape = smallvec::smallvec![4];
        index.update_dataset_meta(&beta, &shape, &CompactString::new("f32"));
        let other: Shape = smallvec::smallvec![9];
        index.update_dataset_meta(&beta, &other, &CompactString::new("i8"));

        let entry = index.get(&beta).unwrap();
        assert_eq!(entry.shape.as_deref(), Some(&[4][..]));
        assert_eq!(entry.dtype.as_deref(), Some("f32"));
    }
}
