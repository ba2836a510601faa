//! src/view/ui.rs
//! ============================================================
//! Frame renderer that draws the whole TUI from an immutable
//! `NavigatorSnapshot`. The renderer keeps only layout state: the
//! tree area and its scroll offset, used to map mouse cells to rows.

use ratatui::{prelude::*, widgets::ListState};
use tracing::{instrument, trace};

use crate::{
    model::snapshot::NavigatorSnapshot,
    view::components::{
        attributes_pane::AttributesPane, command_palette::CommandPalette,
        confirmation_overlay::ConfirmationOverlay, help_overlay::HelpOverlay,
        notification_overlay::NotificationOverlay, object_tree::ObjectTree,
        preview_pane::PreviewPane, status_bar::StatusBar, tabs::CollectionTabs,
    },
};

#[derive(Default)]
pub struct UIRenderer {
    tree_area: Rect,
    tree_state: ListState,
    frames: u64,
}

impl UIRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip_all, fields(frame = self.frames))]
    pub fn render(&mut self, f: &mut Frame<'_>, snap: &NavigatorSnapshot) {
        let screen = f.area();

        let [tabs_area, main_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(screen);

        let [tree_area, detail_area] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(main_area);

        let [preview_area, attributes_area] =
            Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(detail_area);

        CollectionTabs::render(f, &snap.tabs, tabs_area);

        let title = snap
            .header
            .as_ref()
            .map_or_else(|| "No collection".to_string(), |(_, path)| path.display().to_string());
        ObjectTree::new().render(f, &snap.rows, &title, &mut self.tree_state, tree_area);
        self.tree_area = tree_area;

        PreviewPane::render(f, &snap.preview, preview_area);
        AttributesPane::render(
            f,
            &snap.attributes,
            snap.parent_attributes.as_ref(),
            attributes_area,
        );
        StatusBar::render(f, snap, status_area);

        self.draw_overlays(f, snap, screen);

        self.frames += 1;
        trace!(rows = snap.rows.len(), "Frame drawn");
    }

    /// Index into `snap.rows` of the tree row under a terminal cell.
    #[must_use]
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let inner = self.tree_inner();
        if !inner.contains(Position::new(column, row)) {
            return None;
        }

        Some(self.tree_state.offset() + usize::from(row - inner.y))
    }

    fn tree_inner(&self) -> Rect {
        // Tree is drawn inside a one-cell border.
        self.tree_area.inner(Margin::new(1, 1))
    }

    fn draw_overlays(&self, f: &mut Frame<'_>, snap: &NavigatorSnapshot, screen: Rect) {
        if let Some(palette) = &snap.palette {
            CommandPalette::render(f, palette, centered(screen, 70, 60));
        }

        if snap.help_panel_visible {
            HelpOverlay::render(f, centered(screen, 60, 80));
        }

        if let Some(prompt) = &snap.confirmation {
            ConfirmationOverlay::render(f, prompt, centered_fixed(screen, 50, 7));
        }

        if let Some(notification) = &snap.notification {
            let width = screen.width * 60 / 100;
            let area = Rect {
                x: screen.x + (screen.width - width) / 2,
                y: screen.y + 2,
                width,
                height: 4.min(screen.height),
            };
            NotificationOverlay::render(f, notification, area);
        }
    }
}

fn centered(r: Rect, w_pct: u16, h_pct: u16) -> Rect {
    centered_fixed(r, r.width * w_pct / 100, r.height * h_pct / 100)
}

fn centered_fixed(r: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    Rect {
        x: r.x + (r.width - w) / 2,
        y: r.y + (r.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::model::{
        collection::CollectionId,
        cursor::VisibleRow,
        entry::{ChildrenState, EntryKind, EntryPath},
        preview::Preview,
        snapshot::{AttributesView, TabView},
        ui_state::{ConfirmationState, PendingAction},
    };

    fn row(path: &str, kind: EntryKind, selected: bool) -> VisibleRow {
        let path = EntryPath::new(path);
        VisibleRow {
            depth: path.depth(),
            path,
            kind,
            expanded: kind == EntryKind::Group,
            selected,
            hovered: false,
            children_state: ChildrenState::Loaded,
        }
    }

    fn snapshot() -> NavigatorSnapshot {
        NavigatorSnapshot {
            tabs: vec![TabView {
                uid: CollectionId(1),
                label: "1 /data/run1.h5".into(),
                active: true,
            }],
            header: Some((CollectionId(1), PathBuf::from("/data/run1.h5"))),
            rows: vec![
                row("/", EntryKind::Group, false),
                row("/groupA", EntryKind::Group, true),
                row("/dataset1", EntryKind::Dataset, false),
            ],
            preview: Preview::GroupLoading(EntryPath::new("/groupA")),
            attributes: AttributesView::Loading,
            parent_attributes: None,
            palette: None,
            confirmation: Some(ConfirmationState::new(
                "Close collection 1 /data/run1.h5?",
                PendingAction::CloseCollection(CollectionId(1)),
            )),
            notification: None,
            loading_visible: true,
            help_panel_visible: false,
        }
    }

    #[test]
    fn test_render_and_map_mouse_rows() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut renderer = UIRenderer::new();
        let snap = snapshot();

        terminal.draw(|f| renderer.render(f, &snap)).unwrap();

        // Tabs line, then the tree border: first row sits at y = 2.
        assert_eq!(renderer.row_at(2, 2), Some(0));
        assert_eq!(renderer.row_at(2, 4), Some(2));
        assert_eq!(renderer.row_at(0, 2), None);
        assert_eq!(renderer.row_at(80, 2), None);

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("groupA"));
        assert!(text.contains("Confirm"));
    }
}
