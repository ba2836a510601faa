//! ``src/controller/navigator.rs``
//! ============================================================================
//! # Navigator: single-threaded owner of all navigation state
//!
//! The navigator owns the collection registry, the palette and the UI flags.
//! All mutation happens here, on the UI task. Container reads are handed to
//! background tasks which report back through the completion queue; each
//! completion is checked against its collection uid and revision token before
//! it is applied, so late results from closed collections or superseded
//! requests are no-ops.
//!
//! Outward notifications are queued as [`NavigatorEvent`]s and drained by the
//! caller. Preview, attributes and rows are pulled on demand.

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    controller::{
        actions::{Action, InputMode},
        event_loop::TaskResult,
    },
    error::{AppError, AppResult},
    fs::container::{ContainerOpener, ContainerReader},
    model::{
        collection::{Collection, CollectionId},
        collection_registry::CollectionRegistry,
        cursor::{Direction, ToggleOutcome, VisibleRow},
        entry::{ChildrenState, EntryKind, EntryPath},
        preview::{Preview, SampleState, render_preview},
        search::{Candidate, MatchTarget, ResultSet, SearchScope},
        snapshot::{AttributesView, NavigatorSnapshot, TabView},
        ui_state::{ConfirmChoice, ConfirmationState, PendingAction, UIState},
    },
    tasks::{
        attributes_task::spawn_attributes_task, children_task::spawn_children_task,
        open_task::spawn_open_task, sample_task::spawn_sample_task,
        search_task::spawn_search_task,
    },
};

/// Notifications for whoever drives the navigator.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigatorEvent {
    SelectionChanged { uid: CollectionId, path: EntryPath },
    ResultsChanged(ResultSet),
    CollectionOpened { uid: CollectionId, path: PathBuf },
    CollectionClosed(CollectionId),
    ChildrenLoaded { uid: CollectionId, path: EntryPath },
}

pub struct Navigator {
    config: Config,
    opener: Arc<dyn ContainerOpener>,
    registry: CollectionRegistry,
    ui: UIState,
    task_tx: UnboundedSender<TaskResult>,
    search_token: CancellationToken,
    pending_opens: usize,
    in_flight: usize,
    events: VecDeque<NavigatorEvent>,
}

impl Navigator {
    /// Returns the navigator and the receiving end of its completion queue.
    pub fn new(
        config: Config,
        opener: Arc<dyn ContainerOpener>,
    ) -> (Self, UnboundedReceiver<TaskResult>) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();

        let navigator = Self {
            config,
            opener,
            registry: CollectionRegistry::new(),
            ui: UIState::new(),
            task_tx,
            search_token: CancellationToken::new(),
            pending_opens: 0,
            in_flight: 0,
            events: VecDeque::new(),
        };

        (navigator, task_rx)
    }

    #[must_use]
    pub const fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn ui(&self) -> &UIState {
        &self.ui
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Spawned tasks whose completion has not been applied yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn drain_events(&mut self) -> Vec<NavigatorEvent> {
        self.events.drain(..).collect()
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        if self.ui.confirmation.is_some() {
            InputMode::Confirm
        } else if self.ui.palette.visible {
            InputMode::Palette
        } else {
            InputMode::Browse
        }
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// Open a container file in the background. The collection appears (and
    /// becomes active) once the open task completes; a path that is already
    /// open just becomes active again.
    pub fn open_collection(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        info!(path = %path.display(), "Opening collection");
        spawn_open_task(path, Arc::clone(&self.opener), self.task_tx.clone());
        self.pending_opens += 1;
        self.in_flight += 1;
    }

    pub fn close_collection(&mut self, uid: CollectionId) -> AppResult<()> {
        self.registry.close(uid)?;
        self.events.push_back(NavigatorEvent::CollectionClosed(uid));

        if self.ui.palette.visible {
            self.issue_search();
        }

        Ok(())
    }

    pub fn set_active(&mut self, uid: CollectionId) -> AppResult<()> {
        self.registry.set_active(uid)
    }

    pub fn next_tab(&mut self) {
        self.registry.cycle(true);
    }

    pub fn previous_tab(&mut self) {
        self.registry.cycle(false);
    }

    fn active_uid(&self) -> AppResult<CollectionId> {
        self.registry
            .active_id()
            .ok_or_else(|| AppError::not_found("no open collection"))
    }

    fn active_collection_mut(&mut self) -> AppResult<&mut Collection> {
        let uid = self.active_uid()?;
        self.registry
            .get_mut(uid)
            .ok_or_else(|| AppError::not_found(format!("collection {uid}")))
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// Step the selection; a no-op at either end or without a collection.
    pub fn move_cursor(&mut self, direction: Direction) {
        let Ok(collection) = self.active_collection_mut() else {
            return;
        };

        let uid = collection.uid;
        if let Some(path) = collection.cursor.move_cursor(&collection.index, direction) {
            self.selection_changed(uid, path);
        }
    }

    pub fn select(&mut self, path: &EntryPath) -> AppResult<()> {
        let collection = self.active_collection_mut()?;
        let uid = collection.uid;
        collection.cursor.select(&collection.index, path)?;
        self.selection_changed(uid, path.clone());
        Ok(())
    }

    pub fn toggle_expand(&mut self, path: &EntryPath) -> AppResult<()> {
        let collection = self.active_collection_mut()?;
        let uid = collection.uid;

        match collection.cursor.toggle_expand(&collection.index, path)? {
            ToggleOutcome::Expanded { needs_load: true } => self.start_children_load(uid, path),
            ToggleOutcome::Collapsed { reselected: true } => self.selection_changed(uid, path.clone()),
            ToggleOutcome::Expanded { .. } | ToggleOutcome::Collapsed { .. } | ToggleOutcome::Unchanged => {}
        }

        Ok(())
    }

    pub fn toggle_selected(&mut self) -> AppResult<()> {
        let Some(path) = self.selected_path() else {
            return Ok(());
        };

        self.toggle_expand(&path)
    }

    /// Cosmetic only.
    pub fn hover(&mut self, path: Option<EntryPath>) {
        if let Ok(collection) = self.active_collection_mut() {
            collection.cursor.hover(path);
        }
    }

    pub fn hover_row(&mut self, row: Option<usize>) {
        let path = row.and_then(|i| self.visible_rows().into_iter().nth(i).map(|r| r.path));
        self.hover(path);
    }

    pub fn click_row(&mut self, row: usize) -> AppResult<()> {
        let Some(target) = self.visible_rows().into_iter().nth(row) else {
            return Ok(());
        };

        if target.selected && target.kind == EntryKind::Group {
            return self.toggle_expand(&target.path);
        }

        self.select(&target.path)
    }

    /// Re-issue whatever failed for `path`: its child listing, its attributes,
    /// or the dataset sample.
    pub fn retry(&mut self, path: &EntryPath) -> AppResult<()> {
        let collection = self.active_collection_mut()?;
        let uid = collection.uid;
        let entry = collection.index.get(path)?;
        let is_dataset = entry.kind == EntryKind::Dataset;

        let children_reset = collection.index.reset_unavailable(path);
        if children_reset && !path.is_root() && !collection.cursor.is_expanded(path) {
            collection.cursor.toggle_expand(&collection.index, path)?;
        }

        let attributes_reset = collection.attributes.retry(path);
        let sample_failed = is_dataset
            && collection.sample.path.as_ref() == Some(path)
            && matches!(collection.sample.state, SampleState::Failed(_));

        if !(children_reset || attributes_reset || sample_failed) {
            self.ui.notify_info(format!("Nothing to retry for {path}"));
            return Ok(());
        }

        info!(path = %path, children_reset, attributes_reset, sample_failed, "Retrying");

        if children_reset {
            self.start_children_load(uid, path);
        }
        if attributes_reset {
            self.request_attributes(uid, path);
        }
        if sample_failed {
            self.request_sample(uid, path);
        }

        Ok(())
    }

    #[must_use]
    pub fn selected_path(&self) -> Option<EntryPath> {
        self.registry.active()?.cursor.selected().cloned()
    }

    fn selection_changed(&mut self, uid: CollectionId, path: EntryPath) {
        debug!(uid = %uid, path = %path, "Selection changed");
        self.events.push_back(NavigatorEvent::SelectionChanged {
            uid,
            path: path.clone(),
        });

        let Some(collection) = self.registry.get_mut(uid) else {
            return;
        };

        let Ok(entry) = collection.index.get(&path) else {
            return;
        };

        match entry.kind {
            EntryKind::Group => {
                let unknown = entry.children_state == ChildrenState::Unknown;
                collection.sample.clear();
                if unknown {
                    self.start_children_load(uid, &path);
                }
            }
            EntryKind::Dataset => self.request_sample(uid, &path),
        }

        self.request_attributes(uid, &path);
        if let Some(parent) = path.parent() {
            self.request_attributes(uid, &parent);
        }
    }

    // ------------------------------------------------------------------
    // Background requests
    // ------------------------------------------------------------------

    fn start_children_load(&mut self, uid: CollectionId, path: &EntryPath) {
        let Some(collection) = self.registry.get_mut(uid) else {
            return;
        };

        if !matches!(collection.index.begin_load(path), Ok(true)) {
            return;
        }

        spawn_children_task(
            uid,
            path.clone(),
            Arc::clone(&collection.reader),
            self.config.io.clone(),
            collection.task_token(),
            self.task_tx.clone(),
        );
        self.in_flight += 1;
    }

    fn request_attributes(&mut self, uid: CollectionId, path: &EntryPath) {
        let Some(collection) = self.registry.get_mut(uid) else {
            return;
        };

        if !collection.attributes.begin(path) {
            return;
        }

        spawn_attributes_task(
            uid,
            path.clone(),
            Arc::clone(&collection.reader),
            self.config.io.clone(),
            collection.task_token(),
            self.task_tx.clone(),
        );
        self.in_flight += 1;
    }

    fn request_sample(&mut self, uid: CollectionId, path: &EntryPath) {
        let Some(collection) = self.registry.get_mut(uid) else {
            return;
        };

        let token = collection.task_token();
        let revision = collection.sample.issue(path.clone(), token.clone());

        spawn_sample_task(
            uid,
            path.clone(),
            revision,
            self.config.preview.sample_size,
            Arc::clone(&collection.reader),
            self.config.io.clone(),
            token,
            self.task_tx.clone(),
        );
        self.in_flight += 1;
    }

    // ------------------------------------------------------------------
    // Palette
    // ------------------------------------------------------------------

    pub fn open_palette(&mut self, scope: SearchScope) {
        self.ui.palette.open(scope);
        self.issue_search();
    }

    pub fn close_palette(&mut self) {
        self.search_token.cancel();
        self.ui.palette.close();
    }

    pub fn palette_push_char(&mut self, c: char) {
        self.ui.palette.push_char(c);
        self.issue_search();
    }

    pub fn palette_pop_char(&mut self) {
        if self.ui.palette.pop_char() {
            self.issue_search();
        }
    }

    pub fn palette_clear(&mut self) {
        self.ui.palette.clear();
        self.issue_search();
    }

    pub fn palette_move(&mut self, direction: Direction) {
        self.ui.palette.move_selection(direction);
    }

    /// Jump to the highlighted match: entries are revealed and selected,
    /// collections become active.
    pub fn palette_accept(&mut self) -> AppResult<()> {
        let Some(chosen) = self.ui.palette.selected_match().cloned() else {
            return Ok(());
        };

        self.close_palette();

        match chosen.target {
            MatchTarget::Collection(uid) => self.registry.set_active(uid),
            MatchTarget::Entry { collection, path } => {
                self.registry.set_active(collection)?;
                let target = self
                    .registry
                    .get_mut(collection)
                    .ok_or_else(|| AppError::not_found(format!("collection {collection}")))?;

                target.cursor.expand_to(&target.index, &path)?;
                target.cursor.select(&target.index, &path)?;
                self.selection_changed(collection, path);
                Ok(())
            }
        }
    }

    /// Start scoring the current input as a new revision, cancelling the
    /// previous search.
    fn issue_search(&mut self) {
        self.search_token.cancel();
        self.search_token = CancellationToken::new();

        let (revision, query) = self.ui.palette.next_query();
        let candidates = self.candidates(query.scope);
        debug!(revision, query = %query.text, candidates = candidates.len(), "Search issued");

        spawn_search_task(
            revision,
            query,
            candidates,
            self.config.search.clone(),
            self.search_token.clone(),
            self.task_tx.clone(),
        );
        self.in_flight += 1;
    }

    fn candidates(&self, scope: SearchScope) -> Vec<Candidate> {
        match scope {
            SearchScope::Collection => self
                .registry
                .active()
                .map(|c| entry_candidates(c).collect())
                .unwrap_or_default(),

            SearchScope::Global => {
                let mut out: Vec<Candidate> = self
                    .registry
                    .list_open()
                    .map(|c| Candidate {
                        target: MatchTarget::Collection(c.uid),
                        display: c.display_name(),
                    })
                    .collect();

                for collection in self.registry.list_open() {
                    out.extend(entry_candidates(collection));
                }
                out
            }
        }
    }

    // ------------------------------------------------------------------
    // Confirmation and UI flags
    // ------------------------------------------------------------------

    /// Ask before closing the active collection.
    pub fn request_close_active(&mut self) {
        let Some(collection) = self.registry.active() else {
            return;
        };

        let prompt = format!("Close collection {}?", collection.display_name());
        self.ui.confirmation = Some(ConfirmationState::new(
            prompt,
            PendingAction::CloseCollection(collection.uid),
        ));
    }

    pub fn confirm_focus_next(&mut self) {
        if let Some(prompt) = self.ui.confirmation.as_mut() {
            prompt.focus_next();
        }
    }

    pub fn confirm_focus_previous(&mut self) {
        if let Some(prompt) = self.ui.confirmation.as_mut() {
            prompt.focus_previous();
        }
    }

    /// Resolve with the focused answer; only "yes" runs the pending action.
    pub fn confirm_accept(&mut self) -> AppResult<()> {
        let Some(prompt) = self.ui.confirmation.take() else {
            return Ok(());
        };

        if prompt.focus != ConfirmChoice::Yes {
            debug!("Confirmation declined");
            return Ok(());
        }

        match prompt.action {
            PendingAction::CloseCollection(uid) => self.close_collection(uid),
        }
    }

    /// Resolve with "no".
    pub fn confirm_dismiss(&mut self) {
        self.ui.confirmation = None;
    }

    pub const fn toggle_help(&mut self) {
        self.ui.toggle_help();
    }

    pub fn dismiss_notification(&mut self) {
        self.ui.dismiss_notification();
    }

    // ------------------------------------------------------------------
    // Actions and completions
    // ------------------------------------------------------------------

    /// Apply one decoded action. Returns false when the application should
    /// quit. Recoverable errors are shown as a notification.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = match action {
            Action::Quit => return false,
            Action::MoveUp => {
                self.move_cursor(Direction::Up);
                Ok(())
            }
            Action::MoveDown => {
                self.move_cursor(Direction::Down);
                Ok(())
            }
            Action::ToggleExpand => self.toggle_selected(),
            Action::Retry => match self.selected_path() {
                Some(path) => self.retry(&path),
                None => Ok(()),
            },
            Action::NextTab => {
                self.next_tab();
                Ok(())
            }
            Action::PreviousTab => {
                self.previous_tab();
                Ok(())
            }
            Action::RequestClose => {
                self.request_close_active();
                Ok(())
            }
            Action::ToggleHelp => {
                self.toggle_help();
                Ok(())
            }
            Action::DismissNotification => {
                self.dismiss_notification();
                Ok(())
            }
            Action::OpenPalette(scope) => {
                self.open_palette(scope);
                Ok(())
            }
            Action::ClosePalette => {
                self.close_palette();
                Ok(())
            }
            Action::PaletteInput(c) => {
                self.palette_push_char(c);
                Ok(())
            }
            Action::PaletteBackspace => {
                self.palette_pop_char();
                Ok(())
            }
            Action::PaletteClear => {
                self.palette_clear();
                Ok(())
            }
            Action::PaletteUp => {
                self.palette_move(Direction::Up);
                Ok(())
            }
            Action::PaletteDown => {
                self.palette_move(Direction::Down);
                Ok(())
            }
            Action::PaletteAccept => self.palette_accept(),
            Action::ConfirmFocusNext => {
                self.confirm_focus_next();
                Ok(())
            }
            Action::ConfirmFocusPrevious => {
                self.confirm_focus_previous();
                Ok(())
            }
            Action::ConfirmAccept => self.confirm_accept(),
            Action::ConfirmDismiss => {
                self.confirm_dismiss();
                Ok(())
            }
            Action::HoverRow(row) => {
                self.hover_row(row);
                Ok(())
            }
            Action::ClickRow(row) => self.click_row(row),
            Action::TaskResult(result) => {
                self.apply_task_result(result);
                Ok(())
            }
            // Layout-dependent; translated to rows by the caller.
            Action::MouseMove { .. } | Action::MouseClick { .. } | Action::Resize(..) | Action::NoOp => Ok(()),
        };

        if let Err(e) = result {
            warn!(error = %e, "Action failed");
            self.ui.notify_error(e.to_string());
        }

        true
    }

    pub fn apply_task_result(&mut self, result: TaskResult) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match result {
            TaskResult::CollectionOpened { requested, result } => {
                self.pending_opens = self.pending_opens.saturating_sub(1);
                self.apply_opened(&requested, result);
            }

            TaskResult::ChildrenLoaded { uid, path, result } => {
                let Some(collection) = self.registry.get_mut(uid) else {
                    debug!(uid = %uid, path = %path, "Dropping children for closed collection");
                    return;
                };

                match result {
                    Ok(records) => match collection.index.apply_children(&path, records) {
                        Ok(_) => {
                            self.events.push_back(NavigatorEvent::ChildrenLoaded { uid, path });
                        }
                        Err(e) => {
                            error!(uid = %uid, path = %path, error = %e, "Rejected child batch");
                            collection.index.mark_unavailable(&path, e.to_string());
                            let reselected = collection.cursor.collapse(&path);
                            self.ui.notify_error(e.to_string());
                            if reselected {
                                self.selection_changed(uid, path);
                            }
                        }
                    },
                    Err(AppError::Cancelled) => collection.index.abort_load(&path),
                    Err(e) => {
                        warn!(uid = %uid, path = %path, error = %e, "Children unavailable");
                        collection.index.mark_unavailable(&path, e.to_string());
                        let reselected = collection.cursor.collapse(&path);
                        self.ui.notify_warning(format!("{path}: {e}"));
                        if reselected {
                            self.selection_changed(uid, path);
                        }
                    }
                }
            }

            TaskResult::AttributesLoaded { uid, path, result } => {
                let Some(collection) = self.registry.get_mut(uid) else {
                    return;
                };

                match result {
                    Err(AppError::Cancelled) => collection.attributes.forget(&path),
                    other => collection.attributes.complete(&path, other),
                }
            }

            TaskResult::SampleLoaded {
                uid,
                path,
                revision,
                result,
            } => {
                let Some(collection) = self.registry.get_mut(uid) else {
                    return;
                };

                let state = match result {
                    Ok(sample) => {
                        collection
                            .index
                            .update_dataset_meta(&path, &sample.shape, &sample.dtype);
                        SampleState::Ready(sample)
                    }
                    Err(AppError::Cancelled) => return,
                    Err(e) => SampleState::Failed(e.to_string()),
                };

                if !collection.sample.complete(revision, &path, state) {
                    debug!(uid = %uid, path = %path, revision, "Dropping stale sample");
                }
            }

            TaskResult::SearchFinished { revision, result } => match result {
                Ok(results) => {
                    if self.ui.palette.apply_results(results.clone()) {
                        self.events.push_back(NavigatorEvent::ResultsChanged(results));
                    }
                }
                Err(AppError::Cancelled) => {}
                Err(e) => {
                    if revision == self.ui.palette.revision {
                        self.ui.palette.loading_visible = false;
                        self.ui.notify_error(e.to_string());
                    }
                }
            },
        }
    }

    fn apply_opened(
        &mut self,
        requested: &Path,
        result: AppResult<(PathBuf, Arc<dyn ContainerReader>)>,
    ) {
        let (resolved, reader) = match result {
            Ok(opened) => opened,
            Err(e) => {
                error!(path = %requested.display(), error = %e, "Open failed");
                self.ui.notify_error(e.to_string());
                return;
            }
        };

        let (uid, created) = self.registry.insert_opened(resolved.clone(), reader);
        if !created {
            debug!(uid = %uid, "Collection already open");
            return;
        }

        self.events
            .push_back(NavigatorEvent::CollectionOpened { uid, path: resolved });

        if let Some(collection) = self.registry.get_mut(uid) {
            let root = EntryPath::root();
            if collection.cursor.select(&collection.index, &root).is_ok() {
                self.selection_changed(uid, root);
            }
        }
    }

    // ------------------------------------------------------------------
    // Pull accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        self.registry
            .active()
            .map(|c| c.cursor.visible_rows(&c.index))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn current_preview(&self) -> Preview {
        self.registry.active().map_or(Preview::Empty, |c| {
            render_preview(
                c.cursor.selected(),
                &c.index,
                &c.sample,
                self.config.preview.max_children,
            )
        })
    }

    #[must_use]
    pub fn current_attributes(&self) -> AttributesView {
        let Some(collection) = self.registry.active() else {
            return AttributesView::None;
        };

        let Some(path) = collection.cursor.selected() else {
            return AttributesView::None;
        };

        match collection.attributes.resolve(&collection.index, path) {
            Ok(resolution) => AttributesView::from_resolution(resolution),
            Err(e) => AttributesView::Unavailable(e.to_string()),
        }
    }

    /// Attributes of the group containing the selection.
    #[must_use]
    pub fn parent_attributes(&self) -> Option<(EntryPath, AttributesView)> {
        let collection = self.registry.active()?;
        let parent = collection.cursor.selected()?.parent()?;

        let view = match collection.attributes.resolve(&collection.index, &parent) {
            Ok(resolution) => AttributesView::from_resolution(resolution),
            Err(e) => AttributesView::Unavailable(e.to_string()),
        };

        Some((parent, view))
    }

    #[must_use]
    pub fn loading_visible(&self) -> bool {
        self.pending_opens > 0 || self.ui.palette.loading_visible || self.current_preview().is_loading()
    }

    #[must_use]
    pub fn snapshot(&self) -> NavigatorSnapshot {
        let active = self.registry.active_id();

        NavigatorSnapshot {
            tabs: self
                .registry
                .list_open()
                .map(|c| TabView {
                    uid: c.uid,
                    label: c.display_name(),
                    active: Some(c.uid) == active,
                })
                .collect(),
            header: self.registry.active().map(|c| (c.uid, c.path.clone())),
            rows: self.visible_rows(),
            preview: self.current_preview(),
            attributes: self.current_attributes(),
            parent_attributes: self.parent_attributes(),
            palette: self.ui.palette.visible.then(|| self.ui.palette.clone()),
            confirmation: self.ui.confirmation.clone(),
            notification: self.ui.notification.clone(),
            loading_visible: self.loading_visible(),
            help_panel_visible: self.ui.help_visible,
        }
    }
}

/// Every indexed entry of `collection`, in discovery order.
fn entry_candidates(collection: &Collection) -> impl Iterator<Item = Candidate> + '_ {
    let uid = collection.uid;
    collection.index.iter().map(move |entry| Candidate {
        target: MatchTarget::Entry {
            collection: uid,
            path: entry.path.clone(),
        },
        display: entry.path.to_string(),
    })
}
