//!
//! ``src/model/collection.rs``
//!
//! One open container file: its reader, index, cursor and caches.

use std::{fmt, path::PathBuf, sync::Arc};

use tokio_util::sync::CancellationToken;

use crate::{
    fs::container::ContainerReader,
    model::{
        attributes::AttributesResolver, cursor::TreeCursor, entry_index::EntryIndex,
        preview::SampleSlot,
    },
};

/// Monotonic collection uid; the first collection opened is `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(pub u64);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct Collection {
    pub uid: CollectionId,

    /// Resolved filesystem path; unique across the registry.
    pub path: PathBuf,

    pub reader: Arc<dyn ContainerReader>,

    pub index: EntryIndex,

    pub cursor: TreeCursor,

    pub attributes: AttributesResolver,

    pub sample: SampleSlot,

    /// Parent of every task token issued for this collection.
    pub cancel: CancellationToken,
}

impl Collection {
    #[must_use]
    pub fn new(uid: CollectionId, path: PathBuf, reader: Arc<dyn ContainerReader>) -> Self {
        Self {
            uid,
            path,
            reader,
            index: EntryIndex::new(),
            cursor: TreeCursor::new(),
            attributes: AttributesResolver::new(),
            sample: SampleSlot::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Token for a task bound to this collection's lifetime.
    #[must_use]
    pub fn task_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Search/tab label: `"<uid> <path>"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.uid, self.path.display())
    }
}

impl Drop for Collection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
