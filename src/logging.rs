use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

pub const LOG_FILE_NAME: &str = "tasklist.log";

/// File-based logging in the data directory.
///
/// Never stdout: the TUI owns the terminal. `RUST_LOG` overrides `level`.
/// The returned guard flushes buffered lines on drop, so keep it alive until
/// shutdown.
pub fn init_logging(log_dir: &Path, level: &str) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(log_dir).is_err() {
        return None;
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let installed = tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .try_init()
        .is_ok();

    installed.then_some(guard)
}
