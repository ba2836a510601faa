//! ``src/tasks/sample_task.rs``
//! ============================================================================
//! # Dataset sample extraction
//!
//! Pulls at most `max_count` leading values of a dataset for the preview pane.
//! The result is tagged with the slot revision it was issued for; the
//! navigator drops it if the selection has moved on since.

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

#[allow(clippy::too_many_arguments)]
pub fn spawn_sample_task(
    uid: CollectionId,
    path: EntryPath,
    revision: u64,
    max_count: usize,
    reader: Arc<dyn ContainerReader>,
    io: IoConfig,
    token: CancellationToken,
    task_tx: UnboundedSender<TaskResult>,
) {
    let span = info_span!("sample_task", uid = %uid, path = %path, revision);

    tokio::spawn(
        async move {
            let result = cancellable(
                &token,
                read_with_retry(&path, &io, || reader.read_sample(&path, max_count)),
            )
            .await;

            debug!(ok = result.is_ok(), "Sample read finished");
            let _ = task_tx.send(TaskResult::SampleLoaded {
                uid,
                path,
                revision,
                result,
            });
        }
        .instrument(span),
    );
}
