use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the bootstrap launcher.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── Filesystem ──────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Not enough free space at {path:?}: available={available} required={required}")]
    InsufficientSpace {
        path: PathBuf,
        available: u64,
        required: u64,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Failed to write download to {path:?}: {source}")]
    DownloadWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-256 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Install ─────────────────────────────────────────
    #[error("Archiver {program} exited with {code:?}")]
    ArchiverFailed { program: String, code: Option<i32> },

    #[error("Could not start archiver {program}: {source}")]
    ArchiverSpawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid runtime package in {dir:?}: expected one top-level directory, found {found}")]
    InvalidPackage { dir: PathBuf, found: usize },

    // ── Registry ────────────────────────────────────────
    #[error("Registry key {key} unreadable: {source}")]
    Registry {
        key: String,
        source: std::io::Error,
    },

    // ── Launch ──────────────────────────────────────────
    #[error("Could not start {program:?}: {source}")]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("{program:?} exited during start-up with {code:?}")]
    ProcessExited {
        program: PathBuf,
        code: Option<i32>,
    },

    // ── Configuration ───────────────────────────────────
    #[error("Invalid configuration {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Result codes ────────────────────────────────────────
// The installer reports its outcome as an integer: 0, an OS error code,
// or one of these sentinels when no OS code is attached.

pub const CODE_SUCCESS: i32 = 0;
pub const CODE_OTHER: i32 = -1;
pub const CODE_NETWORK: i32 = -2;
pub const CODE_INSTALL: i32 = -3;
pub const CODE_INVALID_PACKAGE: i32 = -4;
pub const CODE_INTEGRITY: i32 = -5;

impl LauncherError {
    /// Integer code for this error: the underlying OS error when there is
    /// one, otherwise a negative sentinel.
    pub fn code(&self) -> i32 {
        match self {
            LauncherError::Io { source, .. }
            | LauncherError::DownloadWrite { source, .. }
            | LauncherError::Registry { source, .. }
            | LauncherError::Launch { source, .. } => {
                source.raw_os_error().unwrap_or(CODE_OTHER)
            }
            LauncherError::ArchiverSpawn { source, .. } => {
                source.raw_os_error().unwrap_or(CODE_INSTALL)
            }
            LauncherError::Http(err) => os_code_in_chain(err).unwrap_or(CODE_NETWORK),
            LauncherError::DownloadFailed { .. } => CODE_NETWORK,
            LauncherError::ArchiverFailed { code, .. } => match code {
                Some(code) if *code != 0 => *code,
                _ => CODE_INSTALL,
            },
            LauncherError::ProcessExited { code, .. } => match code {
                Some(code) if *code != 0 => *code,
                _ => CODE_OTHER,
            },
            LauncherError::Zip(_) => CODE_INSTALL,
            LauncherError::InvalidPackage { .. } => CODE_INVALID_PACKAGE,
            LauncherError::Sha256Mismatch { .. } => CODE_INTEGRITY,
            LauncherError::InsufficientSpace { .. }
            | LauncherError::Config { .. }
            | LauncherError::Json(_)
            | LauncherError::Other(_) => CODE_OTHER,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LauncherError::Http(_)
                | LauncherError::DownloadFailed { .. }
                | LauncherError::DownloadWrite { .. }
        )
    }
}

/// Maps an operation result to the installer's integer contract.
pub fn result_code<T>(result: &LauncherResult<T>) -> i32 {
    match result {
        Ok(_) => CODE_SUCCESS,
        Err(err) => err.code(),
    }
}

fn os_code_in_chain(err: &(dyn std::error::Error + 'static)) -> Option<i32> {
    let mut current = err.source();
    while let Some(inner) = current {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            if let Some(code) = io.raw_os_error() {
                return Some(code);
            }
        }
        current = inner.source();
    }
    None
}
