//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Decoded User Input
//!
//! The `Action` enum is what the event loop hands to the navigator. Terminal
//! events are mapped to actions according to the current input mode; task
//! completions arrive wrapped in `Action::TaskResult`.

use crate::{controller::event_loop::TaskResult, model::search::SearchScope};

/// Which key map applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Browse,
    Palette,
    Confirm,
}

#[derive(Debug, Clone)]
pub enum Action {
    /// Quit the application.
    Quit,

    MoveUp,

    MoveDown,

    /// Expand or collapse the selected group.
    ToggleExpand,

    /// Re-issue a failed load for the selection.
    Retry,

    NextTab,

    PreviousTab,

    /// Ask to close the active collection; goes through confirmation.
    RequestClose,

    ToggleHelp,

    DismissNotification,

    OpenPalette(SearchScope),

    ClosePalette,

    PaletteInput(char),

    PaletteBackspace,

    PaletteClear,

    PaletteUp,

    PaletteDown,

    PaletteAccept,

    ConfirmFocusNext,

    ConfirmFocusPrevious,

    ConfirmAccept,

    ConfirmDismiss,

    /// Mouse moved over a terminal cell.
    MouseMove { column: u16, row: u16 },

    /// Left click on a terminal cell.
    MouseClick { column: u16, row: u16 },

    /// Pointer over a tree row, once the view has resolved the cell.
    HoverRow(Option<usize>),

    /// Click on a tree row, once the view has resolved the cell.
    ClickRow(usize),

    /// A terminal resize event.
    Resize(u16, u16),

    /// A result from a background task.
    TaskResult(TaskResult),

    /// No operation. Used when an event is consumed but no state change is needed.
    NoOp,
}
