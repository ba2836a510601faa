//! ``src/fs/container.rs``
//! ============================================================================
//! # Container reader abstraction
//!
//! The navigator never touches container bytes directly. Background tasks call
//! a [`ContainerReader`] for child listings, attributes and bounded samples,
//! and a [`ContainerOpener`] resolves and validates files before a collection
//! enters the registry.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    model::entry::{EntryKind, EntryPath, Shape},
};

/// A single attribute or sample value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(Scalar),
    Array(Vec<Scalar>),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Attribute mapping in container order.
pub type Attributes = IndexMap<CompactString, AttrValue>;

/// One child as reported by `read_children`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRecord {
    pub name: CompactString,
    pub kind: EntryKind,
    pub shape: Option<Shape>,
    pub dtype: Option<CompactString>,
}

impl ChildRecord {
    pub fn group(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Group,
            shape: None,
            dtype: None,
        }
    }

    pub fn dataset(name: impl Into<CompactString>, shape: Option<Shape>, dtype: Option<CompactString>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dataset,
            shape,
            dtype,
        }
    }
}

/// Bounded leading slice of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub shape: Shape,
    pub dtype: CompactString,
    /// At most the requested number of values, row-major.
    pub values: Vec<Scalar>,
    /// True when the dataset holds more values than `values`.
    pub truncated: bool,
}

/// Read access to one open container. Implementations must be cheap to share
/// across tasks; every call may fail with `AppError::NotFound` or a transient
/// `AppError::Io`.
#[async_trait]
pub trait ContainerReader: Send + Sync + fmt::Debug {
    async fn read_children(&self, path: &EntryPath) -> AppResult<Vec<ChildRecord>>;

    async fn read_attributes(&self, path: &EntryPath) -> AppResult<Attributes>;

    async fn read_sample(&self, path: &EntryPath, max_count: usize) -> AppResult<Sample>;
}

/// Resolves and opens container files. Both calls run inside background tasks.
#[async_trait]
pub trait ContainerOpener: Send + Sync {
    /// Canonical form of `path`, used to deduplicate open collections.
    async fn resolve(&self, path: &Path) -> AppResult<PathBuf>;

    /// Validate and open an already resolved path.
    async fn open(&self, resolved: &Path) -> AppResult<Arc<dyn ContainerReader>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_display() {
        let v = AttrValue::Array(vec![Scalar::Int(1), Scalar::Float(2.5), Scalar::Text("x".into())]);
        assert_eq!(v.to_string(), "[1, 2.5, \"x\"]");
        assert_eq!(AttrValue::Scalar(Scalar::Bool(true)).to_string(), "true");
    }

    #[test]
    fn test_untagged_deserialization() {
        let v: AttrValue = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(v, AttrValue::Array(vec![Scalar::Int(1), Scalar::Int(2)]));
        let v: AttrValue = serde_json::from_str("3.5").unwrap();
        assert_eq!(v, AttrValue::Scalar(Scalar::Float(3.5)));
    }
}
