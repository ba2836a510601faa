//! ``src/fs/json_container.rs``
//! ============================================================================
//! # JSON container files
//!
//! A container file is a JSON document describing the root group:
//!
//! ```json
//! { "attrs": { "created": "2024-01-01" },
//!   "children": {
//!     "groupA":   { "kind": "group", "children": { "child1": { "kind": "dataset", "data": [1.0, 2.0] } } },
//!     "dataset1": { "kind": "dataset", "dtype": "i64", "data": [[1, 2], [3, 4]] } } }
//! ```
//!
//! Children keep document order. A dataset's shape is inferred from the
//! nesting of `data` unless `shape` is given; `dtype` is inferred from the
//! first value when absent.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use compact_str::CompactString;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use tracing::{debug, instrument};

use crate::{
    error::{AppError, AppResult},
    fs::{
        container::{AttrValue, Attributes, ContainerOpener, ContainerReader, Scalar},
        memory_container::{MemoryContainer, MemoryNode},
    },
    model::entry::Shape,
};

/// Opens JSON container files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonOpener;

#[async_trait]
impl ContainerOpener for JsonOpener {
    async fn resolve(&self, path: &Path) -> AppResult<PathBuf> {
        tokio::fs::canonicalize(path)
            .await
            .map_err(|e| AppError::open(path, e.to_string()))
    }

    #[instrument(skip(self), fields(path = %resolved.display()))]
    async fn open(&self, resolved: &Path) -> AppResult<Arc<dyn ContainerReader>> {
        let text = tokio::fs::read_to_string(resolved)
            .await
            .map_err(|e| AppError::open(resolved, e.to_string()))?;

        let container = parse_container(&text).map_err(|reason| AppError::open(resolved, reason))?;
        debug!("Parsed container document ({} bytes)", text.len());

        Ok(Arc::new(container))
    }
}

/// Parse a whole JSON container document.
pub fn parse_container(text: &str) -> Result<MemoryContainer, String> {
    let doc: Value = serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;

    let Value::Object(root) = &doc else {
        return Err("root must be a JSON object".to_string());
    };

    match root.get("kind").and_then(Value::as_str) {
        None | Some("group") => {}
        Some(other) => return Err(format!("root must be a group, found {other:?}")),
    }

    let node = parse_node("/", root)?;
    MemoryContainer::new(node).map_err(|e| e.to_string())
}

fn parse_node(path: &str, obj: &Map<String, Value>) -> Result<MemoryNode, String> {
    let attrs = parse_attrs(path, obj.get("attrs"))?;

    let kind = match obj.get("kind").and_then(Value::as_str) {
        Some(kind) => kind,
        None if obj.contains_key("data") => "dataset",
        None => "group",
    };

    match kind {
        "group" => {
            let mut node = MemoryNode::Group {
                attrs,
                children: indexmap::IndexMap::new(),
            };

            if let Some(children) = obj.get("children") {
                let Value::Object(children) = children else {
                    return Err(format!("{path}: children must be an object"));
                };

                for (name, child) in children {
                    if name.is_empty() || name.contains('/') {
                        return Err(format!("{path}: invalid child name {name:?}"));
                    }

                    let child_path = if path == "/" {
                        format!("/{name}")
                    } else {
                        format!("{path}/{name}")
                    };

                    let Value::Object(child) = child else {
                        return Err(format!("{child_path}: node must be an object"));
                    };

                    let parsed = parse_node(&child_path, child)?;
                    if let MemoryNode::Group { children, .. } = &mut node {
                        children.insert(CompactString::new(name), parsed);
                    }
                }
            }

            Ok(node)
        }

        "dataset" => {
            let raw = obj.get("data").cloned().unwrap_or(Value::Array(Vec::new()));
            let mut inferred: Shape = SmallVec::new();
            let mut data = Vec::new();
            flatten(path, &raw, 0, &mut inferred, &mut data)?;

            let shape = match obj.get("shape") {
                Some(explicit) => serde_json::from_value::<Vec<usize>>(explicit.clone())
                    .map(SmallVec::from_vec)
                    .map_err(|e| format!("{path}: invalid shape: {e}"))?,
                None => inferred,
            };

            let dtype = obj
                .get("dtype")
                .and_then(Value::as_str)
                .map_or_else(|| infer_dtype(data.first()), CompactString::new);

            Ok(MemoryNode::Dataset {
                attrs,
                dtype,
                shape,
                data,
            })
        }

        other => Err(format!("{path}: unknown kind {other:?}")),
    }
}

fn parse_attrs(path: &str, raw: Option<&Value>) -> Result<Attributes, String> {
    let mut attrs = Attributes::new();
    let Some(raw) = raw else {
        return Ok(attrs);
    };

    let Value::Object(map) = raw else {
        return Err(format!("{path}: attrs must be an object"));
    };

    for (key, value) in map {
        // Nested structures are shown verbatim rather than rejected.
        let parsed = serde_json::from_value::<AttrValue>(value.clone())
            .unwrap_or_else(|_| AttrValue::Scalar(Scalar::Text(value.to_string())));
        attrs.insert(CompactString::new(key), parsed);
    }

    Ok(attrs)
}

/// Row-major flatten of nested arrays, recording the extent of each level.
fn flatten(
    path: &str,
    value: &Value,
    depth: usize,
    shape: &mut Shape,
    out: &mut Vec<Scalar>,
) -> Result<(), String> {
    match value {
        Value::Array(items) => {
            if shape.len() == depth {
                shape.push(items.len());
            } else if shape[depth] != items.len() {
                return Err(format!("{path}: ragged data at depth {depth}"));
            }

            for item in items {
                flatten(path, item, depth + 1, shape, out)?;
            }
            Ok(())
        }

        scalar => {
            if shape.len() > depth {
                return Err(format!("{path}: ragged data at depth {depth}"));
            }

            let parsed = serde_json::from_value::<Scalar>(scalar.clone())
                .map_err(|_| format!("{path}: unsupported value {scalar}"))?;
            out.push(parsed);
            Ok(())
        }
    }
}

fn infer_dtype(first: Option<&Scalar>) -> CompactString {
    let name = match first {
        Some(Scalar::Bool(_)) => "bool",
        Some(Scalar::Int(_)) => "i64",
        Some(Scalar::Float(_)) | None => "f64",
        Some(Scalar::Text(_)) => "str",
    };

    CompactString::const_new(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::{EntryKind, EntryPath};

    const DOC: &str = r#"{
        "attrs": { "created": "2024-01-01", "tags": [1, 2] },
        "children": {
            "groupA": { "kind": "group", "children": { "child1": { "data": [1.5, 2.5] } } },
            "dataset1": { "kind": "dataset", "dtype": "i64", "data": [[1, 2, 3], [4, 5, 6]] }
        }
    }"#;

    #[tokio::test]
    async fn test_parse_preserves_order_and_infers_shape() {
        let c = parse_container(DOC).unwrap();
        let kids = c.read_children(&EntryPath::root()).await.unwrap();
        assert_eq!(kids[0].name, "groupA");
        assert_eq!(kids[0].kind, EntryKind::Group);
        assert_eq!(kids[1].shape.as_deref(), Some(&[2, 3][..]));

        let nested = c.read_children(&EntryPath::new("/groupA")).await.unwrap();
        assert_eq!(nested[0].dtype.as_deref(), Some("f64"));
    }

    #[tokio::test]
    async fn test_attributes_parse() {
        let c = parse_container(DOC).unwrap();
        let attrs = c.read_attributes(&EntryPath::root()).await.unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs["tags"], AttrValue::Array(vec![Scalar::Int(1), Scalar::Int(2)]));
    }

    #[test]
    fn test_invalid_documents() {
        assert!(parse_container("not json").is_err());
        assert!(parse_container("[1, 2]").is_err());
        assert!(parse_container(r#"{"kind": "dataset", "data": [1]}"#).is_err());
        assert!(parse_container(r#"{"children": {"x": {"data": [[1], [2, 3]]}}}"#).is_err());
    }

    #[tokio::test]
    async fn test_opener_reports_open_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(JsonOpener.resolve(&missing).await, Err(AppError::Open { .. })));

        let bad = dir.path().join("bad.json");
        tokio::fs::write(&bad, "{ nope").await.unwrap();
        let resolved = JsonOpener.resolve(&bad).await.unwrap();
        assert!(matches!(JsonOpener.open(&resolved).await, Err(AppError::Open { .. })));

        let good = dir.path().join("good.json");
        tokio::fs::write(&good, DOC).await.unwrap();
        let resolved = JsonOpener.resolve(&good).await.unwrap();
        assert!(JsonOpener.open(&resolved).await.is_ok());
    }
}
