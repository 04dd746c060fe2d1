//! Optional file-backed tracing setup for host applications.
//!
//! Interactive programs cannot log to the terminal they are editing on, so
//! diagnostics go to a file through a non-blocking appender. Filtering comes
//! from `RUST_LOG`; with the variable unset nothing below ERROR is recorded.
//! Initialization is best-effort: if another subscriber is already installed
//! the call is a quiet no-op.

use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// Install a file-backed subscriber writing to `dir/file_name`.
///
/// Truncates any previous log. Returns the appender's worker guard, which
/// must be held for the lifetime of the program or buffered records are
/// lost; `None` when a global subscriber was already set.
pub fn init_file_logging(dir: &Path, file_name: &str) -> Option<WorkerGuard> {
    let log_path = dir.join(file_name);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => {
            info!(target: "runtime", file = %log_path.display(), "logging_initialized");
            Some(guard)
        }
        Err(_) => None,
    }
}
