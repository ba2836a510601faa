//! src/logging.rs
//! ============================================================================
//! # Logging: tracing subscriber setup
//!
//! Events go to a daily rolling file through `tracing-appender`'s non-blocking
//! writer. The terminal belongs to the TUI, so there is no stderr layer.
//! Each line is `SEQ TIMESTAMP LEVEL [file:line module] fields`.

use std::{
    path::{Component, Path},
    str::FromStr,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{Metadata, Subscriber};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter,
    filter::Directive,
    fmt::{
        self, FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static SEQ: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Invalid log directory: {0}")]
    InvalidLogDirectory(String),
}

/// Custom formatter: `SEQ TIMESTAMP LEVEL [file:line mod::path] message`
struct SeqFileMod;

impl<S, N> FormatEvent<S, N> for SeqFileMod
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut w: Writer<'_>,
        ev: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let seq: u64 = SEQ.fetch_add(1, Ordering::Relaxed);

        let meta: &'static Metadata<'static> = ev.metadata();
        write!(
            w,
            "{seq:06} {} {:5} [{}:{} {}] ",
            Utc::now().format("%H:%M:%S%.3f"),
            meta.level(),
            meta.file().unwrap_or("??"),
            meta.line().unwrap_or(0),
            meta.module_path().unwrap_or("???"),
        )?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(w, "{}: ", span.name())?;
            }
        }

        ctx.field_format().format_fields(w.by_ref(), ev)?;
        writeln!(w)
    }
}

pub struct LoggerBuilder {
    config: LoggingConfig,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: LoggingConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LoggingConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: &str) -> Self {
        self.config.level = level.to_string();
        self
    }

    /// Install the global subscriber. Keep the returned guard alive for the
    /// lifetime of the program or buffered lines are lost.
    pub fn build(self) -> Result<WorkerGuard> {
        if INITIALIZED.swap(true, Ordering::SeqCst) {
            return Err(LoggingError::AlreadyInitialized.into());
        }

        validate_log_directory(&self.config.log_dir)?;
        std::fs::create_dir_all(&self.config.log_dir).with_context(|| {
            format!(
                "Failed to create log directory: {}",
                self.config.log_dir.display()
            )
        })?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(self.config.file_prefix.as_str())
            .filename_suffix("log")
            .max_log_files(10)
            .build(&self.config.log_dir)
            .context("Failed to create file appender")?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let filter = EnvFilter::from_default_env().add_directive(
            Directive::from_str(&self.config.level).context("Invalid log level in config")?,
        );

        let file_layer = fmt::layer()
            .event_format(SeqFileMod)
            .with_writer(non_blocking)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .try_init()
            .context("Failed to install global tracing subscriber")?;

        Ok(guard)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_log_directory(path: &Path) -> Result<()> {
    if path.components().count() == 0 {
        return Err(LoggingError::InvalidLogDirectory("Empty path".to_string()).into());
    }

    if path.components().any(|c| c == Component::ParentDir) {
        return Err(LoggingError::InvalidLogDirectory(
            "Path contains parent directory references".to_string(),
        )
        .into());
    }

    Ok(())
}

pub fn init_logging_with_config(config: LoggingConfig) -> Result<WorkerGuard> {
    LoggerBuilder::new().with_config(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_log_directory_validation() {
        assert!(validate_log_directory(Path::new("")).is_err());
        assert!(validate_log_directory(Path::new("logs/../etc")).is_err());
        assert!(validate_log_directory(&PathBuf::from("/tmp/h5nav/logs")).is_ok());
    }
}
