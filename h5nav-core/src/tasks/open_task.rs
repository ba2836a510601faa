//! ``src/tasks/open_task.rs``
//!
//! Resolves and validates a container file before it enters the registry.

use std::{path::PathBuf, sync::Arc};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{Instrument, info, info_span, warn};

use crate::{
    controller::event_loop::TaskResult,
    error::AppResult,
    fs::container::{ContainerOpener, ContainerReader},
};

pub fn spawn_open_task(
    requested: PathBuf,
    opener: Arc<dyn ContainerOpener>,
    task_tx: UnboundedSender<TaskResult>,
) {
    let span = info_span!("open_task", path = %requested.display());

    tokio::spawn(
        async move {
            let result: AppResult<(PathBuf, Arc<dyn ContainerReader>)> = async {
                let resolved = opener.resolve(&requested).await?;
                let reader = opener.open(&resolved).await?;
                Ok((resolved, reader))
            }
            .await;

            match &result {
                Ok((resolved, _)) => info!(resolved = %resolved.display(), "Container opened"),
                Err(e) => warn!(error = %e, "Container rejected"),
            }

            let _ = task_tx.send(TaskResult::CollectionOpened { requested, result });
        }
        .instrument(span),
    );
}
