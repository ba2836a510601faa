//! ``src/view/components/preview_pane.rs``
//! # `PreviewPane`: children of a group or the leading values of a dataset

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
    fs::container::Scalar,
    model::{
        entry::EntryKind,
        preview::{Preview, SampleView},
    },
    view::theme,
};

pub struct PreviewPane;

impl PreviewPane {
    pub fn render(frame: &mut Frame<'_>, preview: &Preview, area: Rect) {
        let (title, lines) = Self::lines(preview);

        let paragraph = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {title} "))
                    .title_style(theme::title_style())
                    .border_style(theme::border_style(false))
                    .style(theme::pane_style()),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, area);
    }

    fn lines(preview: &Preview) -> (String, Vec<Line<'static>>) {
        match preview {
            Preview::Empty => ("Preview".into(), vec![Self::hint("Nothing selected")]),

            Preview::NotFound(path) => (path.to_string(), vec![Self::hint("Entry not found")]),

            Preview::GroupLoading(path) => (path.to_string(), vec![Self::loading()]),

            Preview::GroupUnavailable { path, reason } => (
                path.to_string(),
                vec![
                    Line::styled(format!("Unavailable: {reason}"), theme::unavailable_style()),
                    Self::hint("Press r to retry"),
                ],
            ),

            Preview::Group {
                path,
                children,
                more,
            } => {
                let mut lines: Vec<Line> = children
                    .iter()
                    .map(|(name, kind)| {
                        let tag = match kind {
                            EntryKind::Group => "group",
                            EntryKind::Dataset => "dataset",
                        };
                        Line::from(vec![
                            Span::styled(format!("{name:<32}"), theme::kind_style(*kind)),
                            Span::styled(tag, theme::hint_style()),
                        ])
                    })
                    .collect();

                if children.is_empty() {
                    lines.push(Self::hint("(empty group)"));
                }
                if *more > 0 {
                    lines.push(Self::hint(&format!("… {more} more")));
                }

                (path.to_string(), lines)
            }

            Preview::Dataset {
                path,
                shape,
                dtype,
                sample,
            } => {
                let shape = shape.as_ref().map_or_else(
                    || "?".to_string(),
                    |dims| {
                        let dims: Vec<String> = dims.iter().map(ToString::to_string).collect();
                        format!("({})", dims.join(", "))
                    },
                );

                let mut lines = vec![
                    Line::from(vec![
                        Span::styled("shape  ", theme::hint_style()),
                        Span::raw(shape),
                    ]),
                    Line::from(vec![
                        Span::styled("dtype  ", theme::hint_style()),
                        Span::raw(dtype.as_deref().unwrap_or("?").to_string()),
                    ]),
                    Line::from(""),
                ];

                match sample {
                    SampleView::Loading => lines.push(Self::loading()),
                    SampleView::Failed(reason) => {
                        lines.push(Line::styled(
                            format!("Sample unavailable: {reason}"),
                            theme::unavailable_style(),
                        ));
                        lines.push(Self::hint("Press r to retry"));
                    }
                    SampleView::Ready { values, truncated } => {
                        lines.push(Line::raw(format_values(values, *truncated)));
                    }
                }

                (path.to_string(), lines)
            }
        }
    }

    fn hint(text: &str) -> Line<'static> {
        Line::styled(text.to_string(), theme::hint_style())
    }

    fn loading() -> Line<'static> {
        Line::styled("Loading…", Style::default().fg(theme::ORANGE))
    }
}

/// `[1, 2, 3, …]`
#[must_use]
pub fn format_values(values: &[Scalar], truncated: bool) -> String {
    let mut parts: Vec<String> = values.iter().map(ToString::to_string).collect();
    if truncated {
        parts.push("…".into());
    }
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_values() {
        assert_eq!(format_values(&[Scalar::Int(1), Scalar::Int(2)], false), "[1, 2]");
        assert_eq!(format_values(&[Scalar::Float(0.5)], true), "[0.5, …]");
        assert_eq!(format_values(&[], false), "[]");
    }
}
