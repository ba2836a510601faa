//!
//!  ``src/model/command_palette.rs``
//!

use tracing::debug;

use crate::model::{
    cursor::Direction,
    search::{ResultSet, SearchMatch, SearchQuery, SearchScope},
};

/// Fuzzy-search palette. Every edit of `input` issues a new revision; only
/// the result set for the latest revision is ever displayed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandPaletteState {
    pub visible: bool,
    pub input: String,
    pub scope: SearchScope,

    /// Latest issued search revision.
    pub revision: u64,

    /// Results currently on screen; may lag behind `revision`.
    pub results: Option<ResultSet>,
    pub selected: usize,
    pub loading_visible: bool,
}

impl CommandPaletteState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the palette with an empty input. The revision counter keeps
    /// counting across openings so older results stay rejectable.
    pub fn open(&mut self, scope: SearchScope) {
        self.visible = true;
        self.scope = scope;
        self.input.clear();
        self.results = None;
        self.selected = 0;
        self.loading_visible = false;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.loading_visible = false;
        self.results = None;
        self.input.clear();
        self.selected = 0;
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Returns false when the input was already empty.
    pub fn pop_char(&mut self) -> bool {
        self.input.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    /// Issue a new revision for the current input.
    pub fn next_query(&mut self) -> (u64, SearchQuery) {
        self.revision += 1;
        self.loading_visible = true;
        (self.revision, SearchQuery::new(self.input.as_str(), self.scope))
    }

    /// Display `results` if they belong to the latest revision.
    pub fn apply_results(&mut self, results: ResultSet) -> bool {
        if !self.visible || results.revision != self.revision {
            debug!(
                stale = results.revision,
                latest = self.revision,
                "Dropping stale search results"
            );
            return false;
        }

        self.results = Some(results);
        self.selected = 0;
        self.loading_visible = false;
        true
    }

    pub fn move_selection(&mut self, direction: Direction) {
        let len = self.results.as_ref().map_or(0, ResultSet::len);
        if len == 0 {
            return;
        }

        self.selected = match direction {
            Direction::Up => self.selected.saturating_sub(1),
            Direction::Down => (self.selected + 1).min(len - 1),
        };
    }

    #[must_use]
    pub fn selected_match(&self) -> Option<&SearchMatch> {
        self.results.as_ref()?.matches.get(self.selected)
    }
}
