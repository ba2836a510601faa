//! ``src/tasks/search_task.rs``
//! ============================================================================
//! # Search Task: incremental fuzzy scoring
//!
//! Scores a snapshot of candidates against one query revision. Work is done in
//! chunks of `search.chunk_size`; between chunks the task yields to the
//! runtime and stops early if a newer keystroke cancelled it.

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

use crate::{
    config::SearchConfig,
    controller::event_loop::TaskResult,
    error::{AppError, AppResult},
    model::search::{Candidate, FuzzyScorer, ResultSet, SearchMatch, SearchQuery, finish_ranking},
};

pub fn spawn_search_task(
    revision: u64,
    query: SearchQuery,
    candidates: Vec<Candidate>,
    config: SearchConfig,
    token: CancellationToken,
    task_tx: UnboundedSender<TaskResult>,
) {
    let span = info_span!(
        "search_task",
        revision,
        query = %query.text,
        candidates = candidates.len()
    );

    tokio::spawn(
        async move {
            let result = run_search(revision, query, &candidates, &config, &token).await;
            let _ = task_tx.send(TaskResult::SearchFinished { revision, result });
        }
        .instrument(span),
    );
}

pub async fn run_search(
    revision: u64,
    query: SearchQuery,
    candidates: &[Candidate],
    config: &SearchConfig,
    token: &CancellationToken,
) -> AppResult<ResultSet> {
    let scorer = FuzzyScorer::new(&query.text, config.start_penalty);
    let chunk_size = config.chunk_size.max(1);
    let mut matches: Vec<SearchMatch> = Vec::new();

    for chunk in candidates.chunks(chunk_size) {
        if token.is_cancelled() {
            debug!("Search cancelled");
            return Err(AppError::Cancelled);
        }

        matches.extend(chunk.iter().filter_map(|candidate| {
            scorer.score(&candidate.display).map(|(score, spans)| SearchMatch {
                target: candidate.target.clone(),
                display: candidate.display.clone(),
                score,
                spans,
            })
        }));

        tokio::task::yield_now().await;
    }

    if token.is_cancelled() {
        return Err(AppError::Cancelled);
    }

    finish_ranking(&mut matches, config.max_results);
    debug!(matches = matches.len(), "Search finished");

    Ok(ResultSet {
        revision,
        query,
        matches,
    })
}
