//! ``src/view/components/confirmation_overlay.rs``
//! # `ConfirmationOverlay`: modal yes/no prompt

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    model::ui_state::{ConfirmChoice, ConfirmationState},
    view::theme,
};

pub struct ConfirmationOverlay;

impl ConfirmationOverlay {
    pub fn render(frame: &mut Frame<'_>, prompt: &ConfirmationState, area: Rect) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Confirm ")
            .title_alignment(Alignment::Center)
            .title_style(theme::title_style())
            .border_style(Style::default().fg(theme::YELLOW))
            .style(theme::pane_style());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [message_area, buttons_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

        frame.render_widget(
            Paragraph::new(prompt.prompt.as_str())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            message_area,
        );

        let button = |label: &'static str, choice: ConfirmChoice| {
            if prompt.focus == choice {
                Span::styled(format!("[ {label} ]"), theme::highlight_style().fg(theme::YELLOW))
            } else {
                Span::styled(format!("  {label}  "), theme::hint_style())
            }
        };

        let buttons = Line::from(vec![
            button("Yes", ConfirmChoice::Yes),
            Span::raw("   "),
            button("No", ConfirmChoice::No),
        ])
        .centered();

        frame.render_widget(Paragraph::new(buttons), buttons_area);
    }
}
