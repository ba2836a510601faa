//! src/view/components/status_bar.rs
//!
//! Bottom line: active collection, selection, and a loading indicator.

use ratatui::{prelude::*, widgets::Paragraph};

use crate::{model::snapshot::NavigatorSnapshot, view::theme};

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame<'_>, snap: &NavigatorSnapshot, area: Rect) {
        let left = match &snap.header {
            Some((uid, path)) => {
                let selected = snap
                    .selected_row()
                    .map(|i| snap.rows[i].path.to_string())
                    .unwrap_or_default();
                format!(" [{uid}] {} | {selected}", path.display())
            }
            None => " No collection open".to_string(),
        };

        let mut right = Vec::new();
        if snap.loading_visible {
            right.push(Span::styled("loading… ", Style::default().fg(theme::ORANGE)));
        }
        right.push(Span::styled("? help ", theme::hint_style()));

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(20)]).areas(area);

        frame.render_widget(
            Paragraph::new(left).style(Style::default().fg(theme::FOREGROUND).bg(theme::CURRENT_LINE)),
            left_area,
        );
        frame.render_widget(
            Paragraph::new(Line::from(right).right_aligned()).style(Style::default().bg(theme::CURRENT_LINE)),
            right_area,
        );
    }
}
