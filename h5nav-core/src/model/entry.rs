//!
//! ``src/model/entry.rs``
//!
//! Paths and nodes of one collection's hierarchy.

use std::fmt;

use compact_str::{CompactString, format_compact};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Dataset dimensions, inline for the common rank <= 4 case.
pub type Shape = SmallVec<[usize; 4]>;

/// Slash-delimited, normalized path of an entry. The root is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryPath(CompactString);

impl EntryPath {
    /// Normalize `raw`: leading slash added, empty and `.` segments dropped,
    /// trailing slash removed.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let mut out = CompactString::with_capacity(raw.len() + 1);
        for segment in raw.split('/').filter(|s| !s.is_empty() && *s != ".") {
            out.push('/');
            out.push_str(segment);
        }

        if out.is_empty() {
            out.push('/');
        }

        Self(out)
    }

    #[must_use]
    pub fn root() -> Self {
        Self(CompactString::const_new("/"))
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment; `/` for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.is_root() {
            return "/";
        }

        self.0.rsplit('/').next().unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        match self.0.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(Self(CompactString::new(&self.0[..idx]))),
        }
    }

    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        if self.is_root() {
            Self::new(name)
        } else {
            Self::new(&format_compact!("{}/{}", self.0, name))
        }
    }

    /// Number of segments; the root has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches('/').count()
        }
    }

    /// Strict ancestor test (`/a` is an ancestor of `/a/b`, not of `/ab`).
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        if self == other {
            return false;
        }

        if self.is_root() {
            return true;
        }

        other
            .0
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Ancestors from the root down to the direct parent.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let mut chain = Vec::with_capacity(self.depth());
        let mut cursor = self.parent();
        while let Some(p) = cursor {
            cursor = p.parent();
            chain.push(p);
        }

        chain.reverse();
        chain
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryPath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<EntryPath> for CompactString {
    fn from(path: EntryPath) -> Self {
        path.0
    }
}

impl From<&EntryPath> for CompactString {
    fn from(path: &EntryPath) -> Self {
        path.0.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Group,
    Dataset,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Group => "group",
            Self::Dataset => "dataset",
        };

        write!(f, "{s}")
    }
}

/// Lazy load state of a group's child list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChildrenState {
    #[default]
    Unknown,

    Loading,

    Loaded,

    /// Load failed after the automatic retry; cleared only by an explicit retry.
    Unavailable(String),
}

/// One node of a collection's hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub path: EntryPath,

    pub kind: EntryKind,

    /// Child paths in discovery order. Append-only.
    pub children: Vec<EntryPath>,

    pub children_state: ChildrenState,

    /// Dataset only, `None` until known.
    pub shape: Option<Shape>,

    /// Dataset only, `None` until known.
    pub dtype: Option<CompactString>,
}

impl Entry {
    #[must_use]
    pub fn group(path: EntryPath) -> Self {
        Self {
            path,
            kind: EntryKind::Group,
            children: Vec::new(),
            children_state: ChildrenState::Unknown,
            shape: None,
            dtype: None,
        }
    }

    #[must_use]
    pub fn dataset(path: EntryPath, shape: Option<Shape>, dtype: Option<CompactString>) -> Self {
        Self {
            path,
            kind: EntryKind::Dataset,
            children: Vec::new(),
            children_state: ChildrenState::Loaded,
            shape,
            dtype,
        }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == EntryKind::Group
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(EntryPath::new("").as_str(), "/");
        assert_eq!(EntryPath::new("groupA//child1/").as_str(), "/groupA/child1");
        assert_eq!(EntryPath::new("/./a").as_str(), "/a");
    }

    #[test]
    fn test_parent_and_name() {
        let p = EntryPath::new("/groupA/child1");
        assert_eq!(p.name(), "child1");
        assert_eq!(p.parent(), Some(EntryPath::new("/groupA")));
        assert_eq!(EntryPath::new("/groupA").parent(), Some(EntryPath::root()));
        assert_eq!(EntryPath::root().parent(), None);
        assert_eq!(EntryPath::root().join("x").as_str(), "/x");
    }

    #[test]
    fn test_ancestry() {
        let a = EntryPath::new("/a");
        assert!(a.is_ancestor_of(&EntryPath::new("/a/b/c")));
        assert!(!a.is_ancestor_of(&EntryPath::new("/ab")));
        assert!(!a.is_ancestor_of(&a));
        assert!(EntryPath::root().is_ancestor_of(&a));
        assert_eq!(
            EntryPath::new("/a/b/c").ancestors(),
            vec![EntryPath::root(), EntryPath::new("/a"), EntryPath::new("/a/b")]
        );
        assert_eq!(EntryPath::new("/a/b/c").depth(), 3);
    }
}
