use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::core::error::{LauncherError, LauncherResult};

const DEBUG_FILTER: &str = "info,interface_bootstrap=debug";
const DEFAULT_FILTER: &str = "warn";

fn filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { DEBUG_FILTER } else { DEFAULT_FILTER })
    })
}

/// Installs the global subscriber. With `debug` set and a `log_file`
/// given, output is appended to that file instead of stderr. If the file
/// cannot be opened, stderr logging is installed anyway and the open error
/// is returned so the caller can report it.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(debug: bool, log_file: Option<&Path>) -> LauncherResult<()> {
    let Some(path) = log_file.filter(|_| debug) else {
        init_stderr(debug);
        return Ok(());
    };

    match open_log_file(path) {
        Ok(file) => {
            let installed = tracing_subscriber::fmt()
                .with_env_filter(filter(debug))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
            if installed.is_err() {
                tracing::debug!("Logging already initialised");
            }
            Ok(())
        }
        Err(err) => {
            init_stderr(debug);
            Err(err)
        }
    }
}

fn init_stderr(debug: bool) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("Logging already initialised");
    }
}

fn open_log_file(path: &Path) -> LauncherResult<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_init_creates_log_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("nested").join("launcher.log");
        init(true, Some(log.as_path())).expect("init");
        assert!(log.is_file());
        // A second call must not fail.
        init(false, None).expect("re-init");
    }

    #[test]
    fn unopenable_log_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        // The log path is an existing directory.
        let err = init(true, Some(dir.path())).expect_err("directory is not a file");
        assert!(matches!(err, LauncherError::Io { .. }));
    }
}
