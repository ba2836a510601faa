//!
//! ``src/model/cursor.rs``
//!
//! Per-collection selection, expansion and hover state. The cursor never
//! mutates the index; operations that need a children load report it back to
//! the caller.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::{
    error::{AppError, AppResult},
    model::{
        entry::{ChildrenState, EntryKind, EntryPath},
        entry_index::EntryIndex,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// One line of the flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow {
    pub path: EntryPath,
    pub depth: usize,
    pub kind: EntryKind,
    pub expanded: bool,
    pub selected: bool,
    pub hovered: bool,
    pub children_state: ChildrenState,
}

impl VisibleRow {
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }
}

/// What a `toggle_expand` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Dataset, root, or a group waiting for an explicit retry.
    Unchanged,

    /// Group expanded; `needs_load` when its children were never fetched.
    Expanded { needs_load: bool },

    /// Group collapsed; `reselected` when the selection was hidden by it and
    /// moved onto the group.
    Collapsed { reselected: bool },
}

#[derive(Debug, Clone, Default)]
pub struct TreeCursor {
    selected: Option<EntryPath>,
    expanded: HashSet<EntryPath>,
    hovered: Option<EntryPath>,
}

impl TreeCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&EntryPath> {
        self.selected.as_ref()
    }

    #[must_use]
    pub const fn hovered(&self) -> Option<&EntryPath> {
        self.hovered.as_ref()
    }

    /// The root counts as permanently expanded.
    #[must_use]
    pub fn is_expanded(&self, path: &EntryPath) -> bool {
        path.is_root() || self.expanded.contains(path)
    }

    /// Depth-first, expansion-aware flattening starting at the root.
    #[must_use]
    pub fn visible_rows(&self, index: &EntryIndex) -> Vec<VisibleRow> {
        let mut rows = Vec::with_capacity(64);
        self.push_rows(index, &EntryPath::root(), &mut rows);
        rows
    }

    fn push_rows(&self, index: &EntryIndex, path: &EntryPath, rows: &mut Vec<VisibleRow>) {
        let Ok(entry) = index.get(path) else {
            return;
        };

        let expanded = entry.is_group() && self.is_expanded(path);
        rows.push(VisibleRow {
            path: path.clone(),
            depth: path.depth(),
            kind: entry.kind,
            expanded,
            selected: self.selected.as_ref() == Some(path),
            hovered: self.hovered.as_ref() == Some(path),
            children_state: entry.children_state.clone(),
        });

        if expanded && entry.children_state == ChildrenState::Loaded {
            for child in &entry.children {
                self.push_rows(index, child, rows);
            }
        }
    }

    /// Step to the previous/next visible row. Returns the new selection when
    /// it changed; `None` at either boundary.
    pub fn move_cursor(&mut self, index: &EntryIndex, direction: Direction) -> Option<EntryPath> {
        let rows = self.visible_rows(index);
        if rows.is_empty() {
            return None;
        }

        let position = self
            .selected
            .as_ref()
            .and_then(|sel| rows.iter().position(|row| &row.path == sel));

        let target = match (position, direction) {
            (None, _) => 0,
            (Some(0), Direction::Up) => return None,
            (Some(pos), Direction::Up) => pos - 1,
            (Some(pos), Direction::Down) if pos + 1 >= rows.len() => return None,
            (Some(pos), Direction::Down) => pos + 1,
        };

        let path = rows[target].path.clone();
        trace!(path = %path, ?direction, "Cursor moved");
        self.selected = Some(path.clone());
        Some(path)
    }

    pub fn toggle_expand(&mut self, index: &EntryIndex, path: &EntryPath) -> AppResult<ToggleOutcome> {
        let entry = index.get(path)?;

        if entry.kind == EntryKind::Dataset || path.is_root() {
            return Ok(ToggleOutcome::Unchanged);
        }

        if self.expanded.contains(path) {
            let reselected = self.collapse(path);
            return Ok(ToggleOutcome::Collapsed { reselected });
        }

        let needs_load = match entry.children_state {
            ChildrenState::Unavailable(_) => return Ok(ToggleOutcome::Unchanged),
            ChildrenState::Unknown => true,
            ChildrenState::Loading | ChildrenState::Loaded => false,
        };

        self.expanded.insert(path.clone());
        debug!(path = %path, needs_load, "Group expanded");
        Ok(ToggleOutcome::Expanded { needs_load })
    }

    /// Collapse `path`. Returns true when the selection was inside it and
    /// moved onto `path`.
    pub fn collapse(&mut self, path: &EntryPath) -> bool {
        if !self.expanded.remove(path) {
            return false;
        }

        let reselected = self
            .selected
            .as_ref()
            .is_some_and(|sel| path.is_ancestor_of(sel));

        if reselected {
            self.selected = Some(path.clone());
        }

        debug!(path = %path, reselected, "Group collapsed");
        reselected
    }

    pub fn select(&mut self, index: &EntryIndex, path: &EntryPath) -> AppResult<()> {
        if !index.contains(path) {
            return Err(AppError::not_found(path));
        }

        self.selected = Some(path.clone());
        Ok(())
    }

    /// Cosmetic; no events.
    pub fn hover(&mut self, path: Option<EntryPath>) {
        self.hovered = path;
    }

    /// Expand every ancestor of an indexed entry so it becomes visible.
    pub fn expand_to(&mut self, index: &EntryIndex, path: &EntryPath) -> AppResult<()> {
        if !index.contains(path) {
            return Err(AppError::not_found(path));
        }

        for ancestor in path.ancestors() {
            if !ancestor.is_root() {
                self.expanded.insert(ancestor);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::container::ChildRecord;

    fn scenario_index() -> EntryIndex {
        let mut index = EntryIndex::new();
        index.begin_load(&EntryPath::root()).unwrap();
        index
            .apply_children(
                &EntryPath::root(),
                vec![ChildRecord::group("groupA"), ChildRecord::dataset("dataset1", None, None)],
            )
            .unwrap();
        index
    }

    fn load_group_a(index: &mut EntryIndex) {
        let group_a = EntryPath::new("/groupA");
        index.begin_load(&group_a).unwrap();
        index
            .apply_children(&group_a, vec![ChildRecord::dataset("child1", None, None)])
            .unwrap();
    }

    fn paths(rows: &[VisibleRow]) -> Vec<&str> {
        rows.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_rows_follow_expansion() {
        let mut index = scenario_index();
        let mut cursor = TreeCursor::new();
        assert_eq!(paths(&cursor.visible_rows(&index)), ["/", "/groupA", "/dataset1"]);

        let group_a = EntryPath::new("/groupA");
        assert_eq!(
            cursor.toggle_expand(&index, &group_a).unwrap(),
            ToggleOutcome::Expanded { needs_load: true }
        );
        // Loading: no child rows yet.
        assert_eq!(cursor.visible_rows(&index).len(), 3);

        load_group_a(&mut index);
        assert_eq!(
            paths(&cursor.visible_rows(&index)),
            ["/", "/groupA", "/groupA/child1", "/dataset1"]
        );
    }

    #[test]
    fn test_no_row_without_expanded_parent() {
        let mut index = scenario_index();
        load_group_a(&mut index);
        let cursor = TreeCursor::new();

        for row in cursor.visible_rows(&index) {
            if let Some(parent) = row.path.parent() {
                assert!(cursor.is_expanded(&parent), "{} shown under collapsed parent", row.path);
            }
        }
        assert_eq!(cursor.visible_rows(&index).len(), 3);
    }

    #[test]
    fn test_move_cursor_boundaries() {
        let index = scenario_index();
        let mut cursor = TreeCursor::new();

        assert_eq!(cursor.move_cursor(&index, Direction::Down), Some(EntryPath::root()));
        assert_eq!(cursor.move_cursor(&index, Direction::Up), None);
        cursor.move_cursor(&index, Direction::Down);
        assert_eq!(
            cursor.move_cursor(&index, Direction::Down),
            Some(EntryPath::new("/dataset1"))
        );
        assert_eq!(cursor.move_cursor(&index, Direction::Down), None);
        assert_eq!(cursor.selected(), Some(&EntryPath::new("/dataset1")));
    }

    #[test]
    fn test_toggle_dataset_and_root_are_noops() {
        let index = scenario_index();
        let mut cursor = TreeCursor::new();
        assert_eq!(
            cursor.toggle_expand(&index, &EntryPath::new("/dataset1")).unwrap(),
            ToggleOutcome::Unchanged
        );
        assert_eq!(
            cursor.toggle_expand(&index, &EntryPath::root()).unwrap(),
            ToggleOutcome::Unchanged
        );
        assert!(cursor.toggle_expand(&index, &EntryPath::new("/missing")).is_err());
    }

    #[test]
    fn test_collapse_pulls_selection_up() {
        let mut index = scenario_index();
        load_group_a(&mut index);
        let mut cursor = TreeCursor::new();
        let group_a = EntryPath::new("/groupA");

        cursor.toggle_expand(&index, &group_a).unwrap();
        cursor.select(&index, &EntryPath::new("/groupA/child1")).unwrap();
        assert_eq!(
            cursor.toggle_expand(&index, &group_a).unwrap(),
            ToggleOutcome::Collapsed { reselected: true }
        );
        assert_eq!(cursor.selected(), Some(&group_a));
    }

    #[test]
    fn test_unavailable_group_stays_collapsed() {
        let mut index = scenario_index();
        let group_a = EntryPath::new("/groupA");
        index.begin_load(&group_a).unwrap();
        index.mark_unavailable(&group_a, "boom");

        let mut cursor = TreeCursor::new();
        assert_eq!(cursor.toggle_expand(&index, &group_a).unwrap(), ToggleOutcome::Unchanged);
        assert!(!cursor.is_expanded(&group_a));
    }

    #[test]
    fn test_select_missing_is_not_found() {
        let index = scenario_index();
        let mut cursor = TreeCursor::new();
        assert!(matches!(
            cursor.select(&index, &EntryPath::new("/ghost")),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(cursor.selected(), None);
    }

    #[test]
    fn test_expand_to_reveals_entry() {
        let mut index = scenario_index();
        load_group_a(&mut index);
        let mut cursor = TreeCursor::new();
        let child = EntryPath::new("/groupA/child1");

        cursor.expand_to(&index, &child).unwrap();
        cursor.select(&index, &child).unwrap();
        let rows = cursor.visible_rows(&index);
        assert!(rows.iter().any(|r| r.path == child && r.selected));
    }
}
