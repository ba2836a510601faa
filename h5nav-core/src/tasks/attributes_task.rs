//! ``src/tasks/attributes_task.rs``
//!
//! Loads one entry's attribute mapping for the attributes resolver cache.

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

pub fn spawn_attributes_task(
    uid: CollectionId,
    path: EntryPath,
    reader: Arc<dyn ContainerReader>,
    io: IoConfig,
    token: CancellationToken,
    task_tx: UnboundedSender<TaskResult>,
) {
    let span = info_span!("attributes_task", uid = %uid, path = %path);

    tokio::spawn(
        async move {
            let result = cancellable(
                &token,
                read_with_retry(&path, &io, || reader.read_attributes(&path)),
            )
            .await;

            debug!(ok = result.is_ok(), "Attributes read finished");
            let _ = task_tx.send(TaskResult::AttributesLoaded { uid, path, result });
        }
        .instrument(span),
    );
}
