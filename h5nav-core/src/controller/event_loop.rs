//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop: terminal input and task completions
//!
//! Multiplexes the crossterm event stream with the background task completion
//! queue. Key events are decoded into [`Action`]s using the key map of the
//! current [`InputMode`].

use std::{path::PathBuf, sync::Arc};

use crossterm::event::{
    Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::{
    controller::actions::{Action, InputMode},
    error::AppResult,
    fs::container::{Attributes, ChildRecord, ContainerReader, Sample},
    model::{
        collection::CollectionId,
        entry::EntryPath,
        search::{ResultSet, SearchScope},
    },
};

/// Completion of one background task. Every spawned task sends exactly one.
#[derive(Debug, Clone)]
pub enum TaskResult {
    CollectionOpened {
        requested: PathBuf,
        result: AppResult<(PathBuf, Arc<dyn ContainerReader>)>,
    },

    ChildrenLoaded {
        uid: CollectionId,
        path: EntryPath,
        result: AppResult<Vec<ChildRecord>>,
    },

    AttributesLoaded {
        uid: CollectionId,
        path: EntryPath,
        result: AppResult<Attributes>,
    },

    SampleLoaded {
        uid: CollectionId,
        path: EntryPath,
        revision: u64,
        result: AppResult<Sample>,
    },

    SearchFinished {
        revision: u64,
        result: AppResult<ResultSet>,
    },
}

pub struct EventLoop {
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    event_stream: EventStream,
}

impl EventLoop {
    pub fn new(task_rx: mpsc::UnboundedReceiver<TaskResult>) -> Self {
        info!("Initializing event loop");
        Self {
            task_rx,
            event_stream: EventStream::new(),
        }
    }

    /// Wait for the next terminal event or task completion.
    pub async fn next_action(&mut self, mode: InputMode) -> Option<Action> {
        tokio::select! {
            Some(Ok(event)) = self.event_stream.next() => {
                trace!("Terminal event received: {:?}", event);
                let action = map_terminal_event(event, mode);
                debug!("Terminal event mapped to action: {:?}", action);
                Some(action)
            }

            Some(task_result) = self.task_rx.recv() => {
                trace!("Task result received");
                Some(Action::TaskResult(task_result))
            }

            else => {
                info!("Event loop terminated - no more events");
                None
            }
        }
    }

    /// Completions already queued, without waiting.
    pub fn try_next_task(&mut self) -> Option<TaskResult> {
        self.task_rx.try_recv().ok()
    }
}

#[must_use]
pub fn map_terminal_event(event: TermEvent, mode: InputMode) -> Action {
    match event {
        TermEvent::Key(key) if key.kind != KeyEventKind::Release => map_key(key, mode),
        TermEvent::Mouse(mouse) => map_mouse(mouse),
        TermEvent::Resize(w, h) => Action::Resize(w, h),
        _ => Action::NoOp,
    }
}

fn map_key(key: KeyEvent, mode: InputMode) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match mode {
        InputMode::Confirm => match key.code {
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => Action::ConfirmFocusNext,
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => Action::ConfirmFocusPrevious,
            KeyCode::Enter => Action::ConfirmAccept,
            KeyCode::Esc | KeyCode::Char('n') => Action::ConfirmDismiss,
            _ => Action::NoOp,
        },

        InputMode::Palette => match key.code {
            KeyCode::Esc => Action::ClosePalette,
            KeyCode::Enter => Action::PaletteAccept,
            KeyCode::Up => Action::PaletteUp,
            KeyCode::Down => Action::PaletteDown,
            KeyCode::Backspace => Action::PaletteBackspace,
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PaletteClear,
            KeyCode::Char(c) => Action::PaletteInput(c),
            _ => Action::NoOp,
        },

        InputMode::Browse => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
            KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
            KeyCode::Enter | KeyCode::Char(' ') => Action::ToggleExpand,
            KeyCode::Char('r') => Action::Retry,
            KeyCode::Tab | KeyCode::Char(']') => Action::NextTab,
            KeyCode::BackTab | KeyCode::Char('[') => Action::PreviousTab,
            KeyCode::Char('x') => Action::RequestClose,
            KeyCode::Char('?') => Action::ToggleHelp,
            KeyCode::Char('/') => Action::OpenPalette(SearchScope::Collection),
            KeyCode::Char(':') => Action::OpenPalette(SearchScope::Global),
            KeyCode::Esc => Action::DismissNotification,
            _ => Action::NoOp,
        },
    }
}

const fn map_mouse(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Moved => Action::MouseMove {
            column: mouse.column,
            row: mouse.row,
        },
        MouseEventKind::Down(MouseButton::Left) => Action::MouseClick {
            column: mouse.column,
            row: mouse.row,
        },
        _ => Action::NoOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> TermEvent {
        TermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_mode_selects_key_map() {
        assert!(matches!(
            map_terminal_event(key(KeyCode::Char('q')), InputMode::Browse),
            Action::Quit
        ));
        assert!(matches!(
            map_terminal_event(key(KeyCode::Char('q')), InputMode::Palette),
            Action::PaletteInput('q')
        ));
        assert!(matches!(
            map_terminal_event(key(KeyCode::Esc), InputMode::Confirm),
            Action::ConfirmDismiss
        ));
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let event = TermEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(map_terminal_event(event, InputMode::Palette), Action::Quit));
    }
}
