//! ``src/tasks/children_task.rs``
//! ============================================================================
//! # Background child listing
//!
//! Reads one group's children off the UI thread. The index is not touched
//! here: the records travel back through the completion queue and are applied
//! atomically by the navigator.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

use crate::{
    config::IoConfig,
    controller::event_loop::TaskResult,
    fs::container::ContainerReader,
    model::{collection::CollectionId, entry::EntryPath},
    tasks::retry::{cancellable, read_with_retry},
};

pub fn spawn_children_task(
    uid: CollectionId,
    path: EntryPath,
    reader: Arc<dyn ContainerReader>,
    io: IoConfig,
    token: CancellationToken,
    task_tx: UnboundedSender<TaskResult>,
) {
    let span = info_span!("children_task", uid = %uid, path = %path);

    tokio::spawn(
        async move {
            let result = cancellable(
                &token,
                read_with_retry(&path, &io, || reader.read_children(&path)),
            )
            .await;

            debug!(ok = result.is_ok(), "Children read finished");
            let _ = task_tx.send(TaskResult::ChildrenLoaded { uid, path, result });
        }
        .instrument(span),
    );
}
