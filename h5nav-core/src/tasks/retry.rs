//! ``src/tasks/retry.rs``
//! ============================================================================
//! # Read policy shared by all container tasks
//!
//! Every container read is bounded by `io.read_timeout`. Transient failures
//! (I/O errors and timeouts) are retried up to `io.retry_attempts` times;
//! anything else is returned immediately. Cancellation wins over both.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    config::IoConfig,
    error::{AppError, AppResult},
    model::entry::EntryPath,
};

pub async fn read_with_retry<T, F, Fut>(path: &EntryPath, io: &IoConfig, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let timeout_ms = u64::try_from(io.read_timeout.as_millis()).unwrap_or(u64::MAX);
    let mut attempt: u32 = 0;

    loop {
        let result = match tokio::time::timeout(io.read_timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(path, timeout_ms)),
        };

        match result {
            Err(e) if e.is_transient() && attempt < io.retry_attempts => {
                attempt += 1;
                warn!(path = %path, attempt, error = %e, "Transient read failure, retrying");
            }
            other => return other,
        }
    }
}

/// Run `work` unless `token` fires first.
pub async fn cancellable<T, Fut>(token: &CancellationToken, work: Fut) -> AppResult<T>
where
    Fut: Future<Output = AppResult<T>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(AppError::Cancelled),
        result = work => result,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    };

    use super::*;

    fn io(retry_attempts: u32) -> IoConfig {
        IoConfig {
            read_timeout: Duration::from_millis(50),
            retry_attempts,
        }
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once() {
        let calls = AtomicU32::new(0);
        let path = EntryPath::new("/a");
        let result = read_with_retry(&path, &io(1), || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::io("/a", "flaky"))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retry() {
        let calls = AtomicU32::new(0);
        let path = EntryPath::new("/a");
        let result: AppResult<()> = read_with_retry(&path, &io(1), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::io("/a", "dead"))
        })
        .await;

        assert!(matches!(result, Err(AppError::Io { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let calls = AtomicU32::new(0);
        let path = EntryPath::new("/a");
        let result: AppResult<()> = read_with_retry(&path, &io(3), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::not_found("/a"))
        })
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_read_times_out() {
        let path = EntryPath::new("/slow");
        let result: AppResult<()> = read_with_retry(&path, &io(0), || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AppError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_cancelled_token_wins() {
        let token = CancellationToken::new();
        token.cancel();
        let result = cancellable(&token, async { Ok(1) }).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }
}
