//! src/view/components/notification_overlay.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    model::ui_state::{Notification, NotificationLevel},
    view::theme,
};

pub struct NotificationOverlay;

impl NotificationOverlay {
    pub fn render(frame: &mut Frame<'_>, notification: &Notification, area: Rect) {
        frame.render_widget(Clear, area);

        let (title, icon) = match notification.level {
            NotificationLevel::Info => ("Info", "ℹ"),
            NotificationLevel::Warning => ("Warning", "⚠"),
            NotificationLevel::Error => ("Error", "✕"),
        };
        let color = theme::notification_color(notification.level);

        let paragraph = Paragraph::new(notification.message.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {icon} {title} "))
                    .title_bottom(Line::styled(" Esc to dismiss ", theme::hint_style()).right_aligned())
                    .title_style(Style::default().fg(color).bold())
                    .border_style(Style::default().fg(color))
                    .style(theme::pane_style()),
            )
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, area);
    }
}
