//! ``src/view/components/command_palette.rs``
//! ============================================================================
//! # `CommandPalette`: fuzzy-search input and ranked results
//!
//! Matched characters are highlighted from the result spans, which are
//! character (not byte) ranges into the display string.

use std::ops::Range;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph},
};

use crate::{
    model::{
        command_palette::CommandPaletteState,
        search::{MatchTarget, SearchMatch},
    },
    view::theme,
};

pub struct CommandPalette;

impl CommandPalette {
    #[allow(clippy::cast_possible_truncation)]
    pub fn render(frame: &mut Frame<'_>, palette: &CommandPaletteState, area: Rect) {
        frame.render_widget(Clear, area);

        let [input_area, results_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);

        let status = if palette.loading_visible { " searching… " } else { "" };
        let input = Paragraph::new(format!("> {}", palette.input)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Search {} ", palette.scope))
                .title_bottom(Line::from(status).right_aligned())
                .title_style(theme::title_style())
                .border_style(theme::border_style(true))
                .style(theme::pane_style()),
        );
        frame.render_widget(input, input_area);

        frame.set_cursor_position((
            input_area.x + 3 + palette.input.chars().count() as u16,
            input_area.y + 1,
        ));

        let matches = palette.results.as_ref().map_or(&[][..], |r| r.matches.as_slice());
        let items: Vec<ListItem> = if matches.is_empty() && palette.results.is_some() {
            vec![ListItem::new(Line::styled("No matches", theme::hint_style()))]
        } else {
            matches.iter().map(Self::match_item).collect()
        };

        let mut state = ListState::default().with_selected((!matches.is_empty()).then_some(palette.selected));

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme::border_style(false))
                    .style(theme::pane_style()),
            )
            .highlight_style(theme::highlight_style().fg(theme::PINK))
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(list, results_area, &mut state);
    }

    fn match_item(m: &SearchMatch) -> ListItem<'static> {
        let tag = match m.target {
            MatchTarget::Collection(_) => "tab  ",
            MatchTarget::Entry { .. } => "     ",
        };

        let mut spans = vec![Span::styled(tag, theme::hint_style())];
        spans.extend(highlight(&m.display, &m.spans));
        ListItem::new(Line::from(spans))
    }
}

/// Split `text` into plain and highlighted runs.
fn highlight(text: &str, ranges: &[Range<usize>]) -> Vec<Span<'static>> {
    let mut out = Vec::new();
    let mut run = String::new();
    let mut run_matched = false;

    for (i, c) in text.chars().enumerate() {
        let matched = ranges.iter().any(|r| r.contains(&i));
        if matched != run_matched && !run.is_empty() {
            out.push(styled_run(std::mem::take(&mut run), run_matched));
        }
        run_matched = matched;
        run.push(c);
    }

    if !run.is_empty() {
        out.push(styled_run(run, run_matched));
    }
    out
}

fn styled_run(text: String, matched: bool) -> Span<'static> {
    if matched {
        Span::styled(text, theme::match_style())
    } else {
        Span::raw(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_runs() {
        let spans = highlight("/groupA", &[1..3, 6..7]);
        let texts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, ["/", "gr", "oup", "A"]);
        assert_eq!(spans[1].style, theme::match_style());
        assert_eq!(spans[2].style, Style::default());
    }
}
