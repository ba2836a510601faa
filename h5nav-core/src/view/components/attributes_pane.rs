//! src/view/components/attributes_pane.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table},
};

use crate::{
    model::{entry::EntryPath, snapshot::AttributesView},
    view::theme,
};

pub struct AttributesPane;

impl AttributesPane {
    /// Attributes of the selection, followed by those of its parent group.
    pub fn render(
        frame: &mut Frame<'_>,
        selected: &AttributesView,
        parent: Option<&(EntryPath, AttributesView)>,
        area: Rect,
    ) {
        let mut rows = Self::section_rows(selected);

        if let Some((path, view)) = parent {
            rows.push(Row::new(vec![Cell::from("")]));
            rows.push(
                Row::new(vec![Cell::from(format!("parent {path}"))]).style(theme::title_style()),
            );
            rows.extend(Self::section_rows(view));
        }

        let table = Table::new(rows, [Constraint::Length(20), Constraint::Fill(1)]).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Attributes ")
                .title_style(theme::title_style())
                .border_style(theme::border_style(false))
                .style(theme::pane_style()),
        );

        frame.render_widget(table, area);
    }

    fn section_rows(view: &AttributesView) -> Vec<Row<'static>> {
        match view {
            AttributesView::None => Vec::new(),
            AttributesView::Loading => vec![Row::new(vec![Cell::from("Loading…")]).style(Style::default().fg(theme::ORANGE))],
            AttributesView::Unavailable(reason) => {
                vec![Row::new(vec![Cell::from(format!("Unavailable: {reason}"))]).style(theme::unavailable_style())]
            }
            AttributesView::Ready(pairs) if pairs.is_empty() => {
                vec![Row::new(vec![Cell::from("(no attributes)")]).style(theme::hint_style())]
            }
            AttributesView::Ready(pairs) => pairs
                .iter()
                .map(|(key, value)| {
                    Row::new(vec![
                        Cell::from(key.to_string()).style(Style::default().fg(theme::CYAN)),
                        Cell::from(value.clone()),
                    ])
                })
                .collect(),
        }
    }
}
