//! Structured logging for holdrec using the tracing crate.
//!
//! Writes to daily-rotated files under the XDG state directory; nothing goes
//! to the terminal, which the recording bar owns. Rotated files older than
//! the retention window are pruned at startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Daily files kept before pruning.
const RETAINED_DAYS: usize = 7;

/// Keeps the non-blocking appender's worker alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes the logging system with file-based output.
///
/// RUST_LOG overrides the filter; the default keeps dependencies at `warn`
/// and holdrec itself at `info`.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If the subscriber initialization fails
pub fn init_logging() -> Result<(), anyhow::Error> {
    let log_dir = log_dir()?;

    if let Err(e) = prune_old_logs(&log_dir) {
        eprintln!("Warning: Failed to prune old logs: {e}");
    }

    let file_appender = rolling::daily(&log_dir, "holdrec.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,holdrec=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", log_dir.display());
    Ok(())
}

/// Determines the log directory, following XDG Base Directory Specification.
///
/// Prefers XDG_STATE_HOME if set, otherwise uses ~/.local/state/holdrec.
///
/// # Errors
/// - If home directory cannot be determined
/// - If log directory cannot be created
pub fn log_dir() -> Result<PathBuf, anyhow::Error> {
    let log_dir = if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg_state).join("holdrec")
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        home.join(".local/state/holdrec")
    };

    fs::create_dir_all(&log_dir)?;

    Ok(log_dir)
}

/// Deletes rotated log files beyond the retention window.
///
/// The `holdrec.log.YYYY-MM-DD` date suffix sorts lexically in chronological
/// order, so retention works off the file name alone.
///
/// # Errors
/// - If the log directory cannot be read
fn prune_old_logs(log_dir: &Path) -> Result<(), anyhow::Error> {
    let mut rotated: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            is_rotated_log(name).then(|| path.clone())
        })
        .collect();

    rotated.sort();
    let excess = rotated.len().saturating_sub(RETAINED_DAYS);

    // Oldest first
    for path in rotated.into_iter().take(excess) {
        if let Err(e) = fs::remove_file(&path) {
            eprintln!("Warning: failed to delete old log {}: {e}", path.display());
        }
    }

    Ok(())
}

/// Whether a file name is a daily-rotated holdrec log (`holdrec.log.YYYY-MM-DD`).
fn is_rotated_log(name: &str) -> bool {
    let Some(date) = name.strip_prefix("holdrec.log.") else {
        return false;
    };
    date.len() == 10
        && date
            .chars()
            .enumerate()
            .all(|(i, c)| match i {
                4 | 7 => c == '-',
                _ => c.is_ascii_digit(),
            })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rotated_log_matches_daily_files() {
        assert!(is_rotated_log("holdrec.log.2026-08-29"));
        assert!(is_rotated_log("holdrec.log.2025-12-01"));
    }

    #[test]
    fn test_is_rotated_log_rejects_other_files() {
        assert!(!is_rotated_log("holdrec.log"));
        assert!(!is_rotated_log("holdrec.log.today"));
        assert!(!is_rotated_log("holdrec.log.2026-8-29"));
        assert!(!is_rotated_log("other.log.2026-08-29"));
    }

    #[test]
    fn test_retention_drops_oldest_names_first() {
        let mut names: Vec<String> = (1..=9)
            .map(|d| format!("holdrec.log.2026-08-{d:02}"))
            .collect();
        names.sort();
        let excess = names.len().saturating_sub(RETAINED_DAYS);
        let dropped: Vec<_> = names.iter().take(excess).collect();
        assert_eq!(dropped, ["holdrec.log.2026-08-01", "holdrec.log.2026-08-02"]);
    }
}
