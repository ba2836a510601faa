//! ``src/model/snapshot.rs``
//! ============================================================================
//! # Navigator view-model
//!
//! Immutable picture of everything the view draws. Built by
//! `Navigator::snapshot` after each batch of input/task completions; the view
//! never reads navigator state directly.

use std::path::PathBuf;

use compact_str::CompactString;

use crate::{
    fs::container::Attributes,
    model::{
        attributes::Resolution,
        collection::CollectionId,
        command_palette::CommandPaletteState,
        cursor::VisibleRow,
        entry::EntryPath,
        preview::Preview,
        ui_state::{ConfirmationState, Notification},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub uid: CollectionId,
    pub label: String,
    pub active: bool,
}

/// Attributes of one entry, rendered to display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributesView {
    /// No entry to show attributes for.
    None,
    Loading,
    Ready(Vec<(CompactString, String)>),
    Unavailable(String),
}

impl AttributesView {
    #[must_use]
    pub fn from_attributes(attrs: &Attributes) -> Self {
        Self::Ready(
            attrs
                .iter()
                .map(|(key, value)| (key.clone(), value.to_string()))
                .collect(),
        )
    }

    #[must_use]
    pub fn from_resolution(resolution: Resolution<'_>) -> Self {
        match resolution {
            Resolution::Ready(attrs) => Self::from_attributes(attrs),
            Resolution::Pending | Resolution::NeedsLoad => Self::Loading,
            Resolution::Unavailable(reason) => Self::Unavailable(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavigatorSnapshot {
    pub tabs: Vec<TabView>,

    /// Active collection uid and resolved path.
    pub header: Option<(CollectionId, PathBuf)>,

    pub rows: Vec<VisibleRow>,

    pub preview: Preview,

    pub attributes: AttributesView,

    /// The group containing the selection.
    pub parent_attributes: Option<(EntryPath, AttributesView)>,

    pub palette: Option<CommandPaletteState>,

    pub confirmation: Option<ConfirmationState>,

    pub notification: Option<Notification>,

    /// Any tab, preview or search work outstanding.
    pub loading_visible: bool,

    pub help_panel_visible: bool,
}

impl NavigatorSnapshot {
    #[must_use]
    pub fn selected_row(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.selected)
    }
}
