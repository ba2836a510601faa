//! ``src/fs/memory_container.rs``
//!
//! Fully materialized container tree. The JSON format parses into it, and
//! tests build trees with it directly.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use compact_str::CompactString;
use indexmap::IndexMap;
use smallvec::smallvec;

use crate::{
    error::{AppError, AppResult},
    fs::container::{
        Attributes, ChildRecord, ContainerOpener, ContainerReader, Sample, Scalar,
    },
    model::entry::{EntryKind, EntryPath, Shape},
};

#[derive(Debug, Clone, PartialEq)]
pub enum MemoryNode {
    Group {
        attrs: Attributes,
        children: IndexMap<CompactString, MemoryNode>,
    },
    Dataset {
        attrs: Attributes,
        dtype: CompactString,
        shape: Shape,
        data: Vec<Scalar>,
    },
}

impl MemoryNode {
    #[must_use]
    pub fn group() -> Self {
        Self::Group {
            attrs: Attributes::new(),
            children: IndexMap::new(),
        }
    }

    /// One-dimensional dataset holding `data`.
    #[must_use]
    pub fn dataset(dtype: &str, data: Vec<Scalar>) -> Self {
        Self::Dataset {
            attrs: Attributes::new(),
            dtype: CompactString::new(dtype),
            shape: smallvec![data.len()],
            data,
        }
    }

    /// Builder: add a child (groups only, ignored on datasets).
    #[must_use]
    pub fn with_child(mut self, name: &str, child: Self) -> Self {
        if let Self::Group { children, .. } = &mut self {
            children.insert(CompactString::new(name), child);
        }
        self
    }

    #[must_use]
    pub fn with_attr(mut self, key: &str, value: crate::fs::container::AttrValue) -> Self {
        match &mut self {
            Self::Group { attrs, .. } | Self::Dataset { attrs, .. } => {
                attrs.insert(CompactString::new(key), value);
            }
        }
        self
    }

    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::Group { .. } => EntryKind::Group,
            Self::Dataset { .. } => EntryKind::Dataset,
        }
    }

    const fn attrs(&self) -> &Attributes {
        match self {
            Self::Group { attrs, .. } | Self::Dataset { attrs, .. } => attrs,
        }
    }

    fn record(&self, name: &CompactString) -> ChildRecord {
        match self {
            Self::Group { .. } => ChildRecord::group(name.clone()),
            Self::Dataset { dtype, shape, .. } => {
                ChildRecord::dataset(name.clone(), Some(shape.clone()), Some(dtype.clone()))
            }
        }
    }
}

/// Read-only container backed by a [`MemoryNode`] tree.
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    root: Arc<MemoryNode>,
}

impl MemoryContainer {
    /// `root` must be a group.
    pub fn new(root: MemoryNode) -> AppResult<Self> {
        if root.kind() != EntryKind::Group {
            return Err(AppError::Other("container root must be a group".to_string()));
        }

        Ok(Self {
            root: Arc::new(root),
        })
    }

    fn lookup(&self, path: &EntryPath) -> AppResult<&MemoryNode> {
        let mut node: &MemoryNode = &self.root;
        for segment in path.as_str().split('/').filter(|s| !s.is_empty()) {
            node = match node {
                MemoryNode::Group { children, .. } => children
                    .get(segment)
                    .ok_or_else(|| AppError::not_found(path))?,
                MemoryNode::Dataset { .. } => return Err(AppError::not_found(path)),
            };
        }

        Ok(node)
    }
}

#[async_trait]
impl ContainerReader for MemoryContainer {
    async fn read_children(&self, path: &EntryPath) -> AppResult<Vec<ChildRecord>> {
        match self.lookup(path)? {
            MemoryNode::Group { children, .. } => Ok(children
                .iter()
                .map(|(name, child)| child.record(name))
                .collect()),
            MemoryNode::Dataset { .. } => Ok(Vec::new()),
        }
    }

    async fn read_attributes(&self, path: &EntryPath) -> AppResult<Attributes> {
        Ok(self.lookup(path)?.attrs().clone())
    }

    async fn read_sample(&self, path: &EntryPath, max_count: usize) -> AppResult<Sample> {
        match self.lookup(path)? {
            MemoryNode::Dataset {
                dtype, shape, data, ..
            } => Ok(Sample {
                shape: shape.clone(),
                dtype: dtype.clone(),
                values: data.iter().take(max_count).cloned().collect(),
                truncated: data.len() > max_count,
            }),
            MemoryNode::Group { .. } => Err(AppError::io(path, "not a dataset")),
        }
    }
}

/// Opener over a fixed set of in-memory containers keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemoryOpener {
    containers: HashMap<PathBuf, MemoryContainer>,
}

impl MemoryOpener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_container(mut self, path: impl Into<PathBuf>, container: MemoryContainer) -> Self {
        self.containers.insert(normalize(&path.into()), container);
        self
    }
}

/// Lexical normalization: drops `.` and folds `..`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[async_trait]
impl ContainerOpener for MemoryOpener {
    async fn resolve(&self, path: &Path) -> AppResult<PathBuf> {
        Ok(normalize(path))
    }

    async fn open(&self, resolved: &Path) -> AppResult<Arc<dyn ContainerReader>> {
        self.containers
            .get(resolved)
            .map(|c| Arc::new(c.clone()) as Arc<dyn ContainerReader>)
            .ok_or_else(|| AppError::open(resolved, "no such container"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::container::AttrValue;

    fn sample_tree() -> MemoryContainer {
        let root = MemoryNode::group()
            .with_attr("name", AttrValue::Scalar(Scalar::Text("run1".into())))
            .with_child(
                "groupA",
                MemoryNode::group().with_child("child1", MemoryNode::dataset("i64", vec![Scalar::Int(7)])),
            )
            .with_child(
                "dataset1",
                MemoryNode::dataset("f64", (0..10).map(|i| Scalar::Float(f64::from(i))).collect()),
            );
        MemoryContainer::new(root).unwrap()
    }

    #[tokio::test]
    async fn test_children_keep_insertion_order() {
        let c = sample_tree();
        let kids = c.read_children(&EntryPath::root()).await.unwrap();
        let names: Vec<_> = kids.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, ["groupA", "dataset1"]);
        assert_eq!(kids[1].kind, EntryKind::Dataset);
    }

    #[tokio::test]
    async fn test_sample_is_bounded() {
        let c = sample_tree();
        let s = c.read_sample(&EntryPath::new("/dataset1"), 4).await.unwrap();
        assert_eq!(s.values.len(), 4);
        assert!(s.truncated);
        assert_eq!(s.shape.as_slice(), &[10]);
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let c = sample_tree();
        let err = c.read_attributes(&EntryPath::new("/nope")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_opener_resolves_lexically() {
        let opener = MemoryOpener::new().with_container("/data/run1.h5", sample_tree());
        let resolved = opener.resolve(Path::new("/data/./x/../run1.h5")).await.unwrap();
        assert_eq!(resolved, PathBuf::from("/data/run1.h5"));
        assert!(opener.open(&resolved).await.is_ok());
        assert!(matches!(
            opener.open(Path::new("/data/other.h5")).await,
            Err(AppError::Open { .. })
        ));
    }
}
