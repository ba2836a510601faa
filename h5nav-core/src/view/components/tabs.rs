//! src/view/components/tabs.rs

use ratatui::{prelude::*, widgets::Tabs};

use crate::{model::snapshot::TabView, view::theme};

pub struct CollectionTabs;

impl CollectionTabs {
    pub fn render(frame: &mut Frame<'_>, tabs: &[TabView], area: Rect) {
        let titles: Vec<String> = tabs.iter().map(|t| format!(" {} ", t.label)).collect();

        let widget = Tabs::new(titles)
            .select(tabs.iter().position(|t| t.active))
            .style(Style::default().fg(theme::COMMENT).bg(theme::BACKGROUND))
            .highlight_style(Style::default().fg(theme::YELLOW).add_modifier(Modifier::BOLD))
            .divider("│");

        frame.render_widget(widget, area);
    }
}
