//! ``src/model/ui_state.rs``
//!
//! Presentation flags owned by the navigator: help panel, notifications, the
//! palette and the confirmation prompt.

use std::time::Instant;

use compact_str::CompactString;

use crate::model::{collection::CollectionId, command_palette::CommandPaletteState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NotificationLevel {
    Info = 0,
    Warning = 1,
    Error = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<CompactString>) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Yes,
    No,
}

/// Action held back until the user confirms it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    CloseCollection(CollectionId),
}

/// Modal yes/no prompt. Focus starts on "No".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationState {
    pub prompt: CompactString,
    pub focus: ConfirmChoice,
    pub action: PendingAction,
}

impl ConfirmationState {
    pub fn new(prompt: impl Into<CompactString>, action: PendingAction) -> Self {
        Self {
            prompt: prompt.into(),
            focus: ConfirmChoice::No,
            action,
        }
    }

    /// Two buttons, so next and previous both flip the focus.
    pub const fn focus_next(&mut self) {
        self.focus = match self.focus {
            ConfirmChoice::Yes => ConfirmChoice::No,
            ConfirmChoice::No => ConfirmChoice::Yes,
        };
    }

    pub const fn focus_previous(&mut self) {
        self.focus_next();
    }
}

#[derive(Debug, Clone, Default)]
pub struct UIState {
    pub help_visible: bool,
    pub notification: Option<Notification>,
    pub confirmation: Option<ConfirmationState>,
    pub palette: CommandPaletteState,
}

impl UIState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<CompactString>) {
        self.notification = Some(Notification::new(level, message));
    }

    pub fn notify_info(&mut self, message: impl Into<CompactString>) {
        self.notify(NotificationLevel::Info, message);
    }

    pub fn notify_warning(&mut self, message: impl Into<CompactString>) {
        self.notify(NotificationLevel::Warning, message);
    }

    pub fn notify_error(&mut self, message: impl Into<CompactString>) {
        self.notify(NotificationLevel::Error, message);
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub const fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_defaults_to_no() {
        let mut prompt = ConfirmationState::new("Close?", PendingAction::CloseCollection(CollectionId(1)));
        assert_eq!(prompt.focus, ConfirmChoice::No);
        prompt.focus_next();
        assert_eq!(prompt.focus, ConfirmChoice::Yes);
        prompt.focus_previous();
        assert_eq!(prompt.focus, ConfirmChoice::No);
    }

    #[test]
    fn test_notifications_replace_each_other() {
        let mut ui = UIState::new();
        ui.notify_info("one");
        ui.notify_error("two");
        assert_eq!(ui.notification.as_ref().unwrap().level, NotificationLevel::Error);
        ui.dismiss_notification();
        assert!(ui.notification.is_none());
    }
}
