//! src/view/components/object_tree.rs
//!
//! Flattened group/dataset tree of the active collection.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState},
};

use crate::{
    model::{
        cursor::VisibleRow,
        entry::{ChildrenState, EntryKind},
    },
    view::theme,
};

pub struct ObjectTree;

impl ObjectTree {
    pub fn new() -> Self {
        Self
    }

    /// Draw `rows` into `area`. `state` keeps the scroll offset between frames
    /// so mouse rows can be mapped back to tree rows.
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        rows: &[VisibleRow],
        title: &str,
        state: &mut ListState,
        area: Rect,
    ) {
        let items: Vec<ListItem> = rows.iter().map(Self::row_item).collect();

        state.select(rows.iter().position(|row| row.selected));

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {title} "))
                    .title_style(theme::title_style())
                    .border_style(theme::border_style(true))
                    .style(theme::pane_style()),
            )
            .highlight_style(theme::highlight_style())
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(list, area, state);
    }

    fn row_item(row: &VisibleRow) -> ListItem<'static> {
        let indent = "  ".repeat(row.depth);
        let marker = match (row.kind, &row.children_state) {
            (EntryKind::Dataset, _) => "·",
            (EntryKind::Group, ChildrenState::Unavailable(_)) => "✕",
            (EntryKind::Group, ChildrenState::Loading) => "…",
            (EntryKind::Group, _) if row.expanded => "▾",
            (EntryKind::Group, _) => "▸",
        };

        let name = if row.path.is_root() { "/" } else { row.name() };
        let name_style = match row.children_state {
            ChildrenState::Unavailable(_) => theme::unavailable_style(),
            _ => theme::kind_style(row.kind),
        };

        let line = Line::from(vec![
            Span::raw(indent),
            Span::styled(format!("{marker} "), theme::hint_style()),
            Span::styled(name.to_string(), name_style),
        ]);

        let item = ListItem::new(line);
        if row.hovered && !row.selected {
            item.style(theme::hover_style())
        } else {
            item
        }
    }
}

impl Default for ObjectTree {
    fn default() -> Self {
        Self::new()
    }
}
