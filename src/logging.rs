use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the log filter
pub const LOG_ENV: &str = "ONETHING_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

/// Send `tracing` output to `path`.
///
/// The terminal belongs to the UI, so logs only ever go to a file.
/// `ONETHING_LOG` wins over `level` when set.
pub fn init_file_logging(path: &Path, level: Option<&str>) -> Result<(), LoggingError> {
    let open_err = |source| LoggingError::Open {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(open_err)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_err)?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(DEFAULT_LOG_LEVEL)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_log_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("onething.log");

        // another test may already own the global subscriber; the file must exist either way
        let _ = init_file_logging(&path, Some("debug"));

        assert!(path.exists());
    }

    #[test]
    fn unopenable_path_is_reported() {
        let dir = tempdir().unwrap();
        // a directory cannot be opened for appending
        let err = init_file_logging(dir.path(), None).unwrap_err();
        assert!(matches!(err, LoggingError::Open { .. }));
    }
}
