use std::io;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    config::{AppConfig, LogFormat},
    infrastructure::directories::ResolvedPaths,
};

const LOG_FILE_PREFIX: &str = "prospect-triage.log";

static INIT: OnceCell<()> = OnceCell::new();
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Console output goes to stderr so `--json` keeps stdout machine readable.
/// The daily file under `LOGS_DIR` never carries ANSI colours.
pub fn init_tracing(config: &AppConfig, paths: &ResolvedPaths) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let appender = tracing_appender::rolling::daily(&paths.logs_dir, LOG_FILE_PREFIX);
        let (file_writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);

        // Exactly one of each pair is set.
        let format = config.logging.format;
        let (console_text, console_json, file_text, file_json) = match format {
            LogFormat::Text => (
                Some(fmt::layer().with_writer(io::stderr).with_target(true)),
                None,
                Some(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_ansi(false),
                ),
                None,
            ),
            LogFormat::Json => (
                None,
                Some(
                    fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_target(true)
                        .with_ansi(false),
                ),
                None,
                Some(
                    fmt::layer()
                        .json()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_ansi(false),
                ),
            ),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(console_text)
            .with(console_json)
            .with(file_text)
            .with(file_json)
            .init();

        tracing::debug!(
            logs = %paths.logs_dir.display(),
            format = %format,
            "logging ready"
        );
        Ok(())
    })?;
    Ok(())
}
