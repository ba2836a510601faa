//!
//! ``src/model/attributes.rs``
//!
//! Per-collection attribute cache. Entries are loaded once by a background
//! task and kept for the lifetime of the collection.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    fs::container::Attributes,
    model::{entry::EntryPath, entry_index::EntryIndex},
};

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeState {
    Pending,
    Ready(Attributes),
    Unavailable(String),
}

/// What `resolve` found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// Cached.
    Ready(&'a Attributes),

    /// A load is in flight.
    Pending,

    /// The load failed; shown inline.
    Unavailable(&'a str),

    /// Nothing cached and nothing in flight: the caller starts a load.
    NeedsLoad,
}

#[derive(Debug, Clone, Default)]
pub struct AttributesResolver {
    cache: HashMap<EntryPath, AttributeState>,
}

impl AttributesResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `NotFound` if the path is not indexed.
    pub fn resolve<'a>(&'a self, index: &EntryIndex, path: &EntryPath) -> AppResult<Resolution<'a>> {
        if !index.contains(path) {
            return Err(AppError::not_found(path));
        }

        Ok(match self.cache.get(path) {
            Some(AttributeState::Ready(attrs)) => Resolution::Ready(attrs),
            Some(AttributeState::Pending) => Resolution::Pending,
            Some(AttributeState::Unavailable(reason)) => Resolution::Unavailable(reason),
            None => Resolution::NeedsLoad,
        })
    }

    /// Record an outgoing load. Returns false if one is already cached or
    /// pending.
    pub fn begin(&mut self, path: &EntryPath) -> bool {
        if self.cache.contains_key(path) {
            return false;
        }

        self.cache.insert(path.clone(), AttributeState::Pending);
        true
    }

    pub fn complete(&mut self, path: &EntryPath, result: AppResult<Attributes>) {
        let state = match result {
            Ok(attrs) => {
                debug!(path = %path, count = attrs.len(), "Attributes cached");
                AttributeState::Ready(attrs)
            }
            Err(e) => AttributeState::Unavailable(e.to_string()),
        };

        self.cache.insert(path.clone(), state);
    }

    /// Drop a failed load so the next request issues it again.
    pub fn retry(&mut self, path: &EntryPath) -> bool {
        if matches!(self.cache.get(path), Some(AttributeState::Unavailable(_))) {
            self.cache.remove(path);
            return true;
        }

        false
    }

    /// Forget a failed or in-flight load so it can be issued again.
    pub fn forget(&mut self, path: &EntryPath) {
        if !matches!(self.cache.get(path), Some(AttributeState::Ready(_))) {
            self.cache.remove(path);
        }
    }

    #[must_use]
    pub fn state(&self, path: &EntryPath) -> Option<&AttributeState> {
        self.cache.get(path)
    }
}

#[cfg(test)]
mod tests {
    use compact_str::CompactString;

    use super::*;
    use crate::fs::container::{AttrValue, Scalar};

    #[test]
    fn test_lifecycle() {
        let index = EntryIndex::new();
        let root = EntryPath::root();
        let mut resolver = AttributesResolver::new();

        assert_eq!(resolver.resolve(&index, &root).unwrap(), Resolution::NeedsLoad);
        assert!(resolver.begin(&root));
        assert!(!resolver.begin(&root));
        assert_eq!(resolver.resolve(&index, &root).unwrap(), Resolution::Pending);

        let mut attrs = Attributes::new();
        attrs.insert(CompactString::new("units"), AttrValue::Scalar(Scalar::Text("m".into())));
        resolver.complete(&root, Ok(attrs.clone()));
        assert_eq!(resolver.resolve(&index, &root).unwrap(), Resolution::Ready(&attrs));

        // Cached for good.
        resolver.forget(&root);
        assert!(!resolver.begin(&root));
    }

    #[test]
    fn test_empty_mapping_and_not_found() {
        let index = EntryIndex::new();
        let mut resolver = AttributesResolver::new();
        resolver.begin(&EntryPath::root());
        resolver.complete(&EntryPath::root(), Ok(Attributes::new()));

        assert!(matches!(
            resolver.resolve(&index, &EntryPath::root()).unwrap(),
            Resolution::Ready(a) if a.is_empty()
        ));
        assert!(matches!(
            resolver.resolve(&index, &EntryPath::new("/nope")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_failure_can_be_retried() {
        let index = EntryIndex::new();
        let root = EntryPath::root();
        let mut resolver = AttributesResolver::new();
        resolver.begin(&root);
        resolver.complete(&root, Err(AppError::io("/", "bad block")));

        assert!(matches!(
            resolver.resolve(&index, &root).unwrap(),
            Resolution::Unavailable(reason) if reason.contains("bad block")
        ));
        assert!(resolver.retry(&root));
        assert!(!resolver.retry(&root));
        assert!(resolver.begin(&root));
    }
}
