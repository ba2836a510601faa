//! Key reference overlay.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::view::theme;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Tree",
        &[
            ("↑/k ↓/j", "Move selection"),
            ("Enter/Space", "Expand or collapse group"),
            ("r", "Retry a failed load"),
            ("mouse", "Hover and click rows"),
        ],
    ),
    (
        "Collections",
        &[
            ("Tab/]", "Next collection"),
            ("Shift-Tab/[", "Previous collection"),
            ("x", "Close collection"),
        ],
    ),
    (
        "Search",
        &[
            ("/", "Search active collection"),
            (":", "Search all collections"),
            ("Enter", "Jump to match"),
            ("Ctrl-U", "Clear query"),
            ("Esc", "Close palette"),
        ],
    ),
    (
        "Application",
        &[
            ("?", "Toggle this help"),
            ("Esc", "Dismiss notification"),
            ("q / Ctrl-C", "Quit"),
        ],
    ),
];

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame<'_>, area: Rect) {
        frame.render_widget(Clear, area);

        let mut lines = Vec::new();
        for (title, keys) in SECTIONS {
            lines.push(Line::styled(*title, Style::default().fg(theme::CYAN).bold()));
            for (key, what) in *keys {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {key:<14}"), Style::default().fg(theme::YELLOW)),
                    Span::raw(*what),
                ]));
            }
            lines.push(Line::from(""));
        }

        let help = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" h5nav help ")
                    .title_alignment(Alignment::Center)
                    .title_style(theme::title_style())
                    .border_style(Style::default().fg(theme::CYAN))
                    .style(theme::pane_style()),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(help, area);
    }
}
