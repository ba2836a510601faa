pub mod error;

pub mod config;

pub mod logging;
pub use logging::{LoggerBuilder, init_logging_with_config};

pub mod fs {
    pub mod container;
    pub use container::{
        AttrValue, Attributes, ChildRecord, ContainerOpener, ContainerReader, Sample, Scalar,
    };

    pub mod memory_container;
    pub use memory_container::{MemoryContainer, MemoryNode, MemoryOpener};

    pub mod json_container;
    pub use json_container::JsonOpener;
}

pub mod model {
    pub mod entry;
    pub use entry::{ChildrenState, Entry, EntryKind, EntryPath, Shape};

    pub mod entry_index;
    pub use entry_index::{ChildListing, EntryIndex};

    pub mod cursor;
    pub use cursor::{Direction, TreeCursor, VisibleRow};

    pub mod preview;
    pub use preview::{Preview, SampleView, render_preview};

    pub mod attributes;
    pub use attributes::{AttributesResolver, Resolution};

    pub mod collection;
    pub use collection::{Collection, CollectionId};

    pub mod collection_registry;
    pub use collection_registry::CollectionRegistry;

    pub mod search;
    pub use search::{FuzzyScorer, ResultSet, SearchMatch, SearchQuery, SearchScope};

    pub mod command_palette;
    pub use command_palette::CommandPaletteState;

    pub mod ui_state;
    pub use ui_state::{Notification, NotificationLevel, UIState};

    pub mod snapshot;
    pub use snapshot::NavigatorSnapshot;
}

pub mod tasks {
    pub mod retry;

    pub mod children_task;
    pub mod attributes_task;
    pub mod sample_task;
    pub mod search_task;
    pub mod open_task;
}

pub mod controller {
    pub mod actions;
    pub use actions::{Action, InputMode};

    pub mod event_loop;
    pub use event_loop::{EventLoop, TaskResult};

    pub mod navigator;
    pub use navigator::{Navigator, NavigatorEvent};
}

pub mod view {
    pub mod theme;

    pub mod ui;
    pub use ui::UIRenderer;

    pub mod components {
        pub mod attributes_pane;
        pub mod command_palette;
        pub mod confirmation_overlay;
        pub mod help_overlay;
        pub mod notification_overlay;
        pub mod object_tree;
        pub mod preview_pane;
        pub mod status_bar;
        pub mod tabs;
    }
}

pub use error::{AppError, AppResult};
