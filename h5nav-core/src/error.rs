//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Navigator
//!
//! Every fallible operation in the core returns `Result<T, AppError>`. The
//! variants follow the navigator's error taxonomy: `NotFound` is recoverable
//! and shown inline, `Conflict` signals a reader bug and rejects the offending
//! batch, `Open` keeps a collection out of the registry and `Io`/`Timeout` are
//! transient and eligible for one automatic retry.

use std::{io, path::PathBuf};

use compact_str::CompactString;
use thiserror::Error;

use crate::model::entry::EntryKind;

pub type AppResult<T> = Result<T, AppError>;

/// Unified error type for all navigator operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// An entry path or collection that does not exist.
    #[error("Not found: {0}")]
    NotFound(CompactString),

    /// An insert that contradicts what the index already knows.
    #[error("Conflicting entry at {path}: indexed as {existing}, reader reported {incoming}")]
    Conflict {
        path: CompactString,
        existing: EntryKind,
        incoming: EntryKind,
    },

    /// A container that could not be opened.
    #[error("Cannot open {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// Transient read failure inside a container.
    #[error("I/O error on {path}: {reason}")]
    Io {
        path: CompactString,
        reason: String,
    },

    /// A read that did not complete within the configured timeout.
    #[error("Read of {path} timed out after {timeout_ms} ms")]
    Timeout { path: CompactString, timeout_ms: u64 },

    /// Operation was cancelled by a newer request or a closed collection.
    #[error("Operation was cancelled")]
    Cancelled,

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    pub fn not_found<S: Into<CompactString>>(what: S) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict<S: Into<CompactString>>(path: S, existing: EntryKind, incoming: EntryKind) -> Self {
        Self::Conflict {
            path: path.into(),
            existing,
            incoming,
        }
    }

    pub fn open<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Open {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io<P: Into<CompactString>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Io {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn timeout<P: Into<CompactString>>(path: P, timeout_ms: u64) -> Self {
        Self::Timeout {
            path: path.into(),
            timeout_ms,
        }
    }

    /// Failures worth one automatic retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Timeout { .. })
    }
}

// Manual Clone implementation to handle non-Clone sources
impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound(what) => Self::NotFound(what.clone()),
            Self::Conflict {
                path,
                existing,
                incoming,
            } => Self::Conflict {
                path: path.clone(),
                existing: *existing,
                incoming: *incoming,
            },
            Self::Open { path, reason } => Self::Open {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Io { path, reason } => Self::Io {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Timeout { path, timeout_ms } => Self::Timeout {
                path: path.clone(),
                timeout_ms: *timeout_ms,
            },
            Self::Cancelled => Self::Cancelled,
            Self::Config(e) => Self::Other(format!("Config error: {e}")),
            Self::ConfigIo { path, source } => Self::ConfigIo {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::Serde(e) => Self::Other(format!("Serde error: {e}")),
            Self::Terminal(msg) => Self::Terminal(msg.clone()),
            Self::Other(msg) => Self::Other(msg.clone()),
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AppError::io("/a", "disk hiccup").is_transient());
        assert!(AppError::timeout("/a", 10).is_transient());
        assert!(!AppError::not_found("/a").is_transient());
        assert!(!AppError::conflict("/a", EntryKind::Group, EntryKind::Dataset).is_transient());
    }

    #[test]
    fn test_clone_keeps_variant() {
        let err = AppError::open("/data/run1.h5", "not a container");
        assert!(matches!(err.clone(), AppError::Open { .. }));
        assert_eq!(err.to_string(), err.clone().to_string());
    }
}
