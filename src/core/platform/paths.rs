use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::error::{LauncherError, LauncherResult};

pub const CACHE_DIR_NAME: &str = ".interface";
pub const RUNTIME_DIR_NAME: &str = "runtime";
pub const BUNDLED_RUNTIME_DIR_NAME: &str = "jre";
pub const LOG_FILE_NAME: &str = "launcher.log";

/// Locations the launcher works with, resolved once per process.
#[derive(Debug, Clone)]
pub struct LauncherPaths {
    exe_path: PathBuf,
    exe_dir: PathBuf,
    cache_dir: PathBuf,
}

impl LauncherPaths {
    pub fn new(exe_path: PathBuf, cache_dir: PathBuf) -> Self {
        let exe_dir = exe_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            exe_path,
            exe_dir,
            cache_dir,
        }
    }

    /// The launcher executable, which doubles as the `-jar` payload.
    pub fn exe_path(&self) -> &Path {
        &self.exe_path
    }

    pub fn exe_dir(&self) -> &Path {
        &self.exe_dir
    }

    /// User-local dot directory holding the installed runtime.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn installed_runtime_dir(&self) -> PathBuf {
        self.cache_dir.join(RUNTIME_DIR_NAME)
    }

    pub fn bundled_runtime_dir(&self) -> PathBuf {
        self.exe_dir.join(BUNDLED_RUNTIME_DIR_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join(LOG_FILE_NAME)
    }
}

static LAUNCHER_PATHS: OnceLock<LauncherPaths> = OnceLock::new();

pub fn launcher_paths() -> LauncherResult<&'static LauncherPaths> {
    if let Some(paths) = LAUNCHER_PATHS.get() {
        return Ok(paths);
    }

    let exe_path = std::env::current_exe().map_err(|source| LauncherError::Io {
        path: PathBuf::from("<current exe>"),
        source,
    })?;
    let exe_path = std::fs::canonicalize(&exe_path).unwrap_or(exe_path);

    let cache_root = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(LAUNCHER_PATHS.get_or_init(|| LauncherPaths::new(exe_path, cache_root.join(CACHE_DIR_NAME))))
}

pub fn ensure_dir(path: &Path) -> LauncherResult<()> {
    std::fs::create_dir_all(path).map_err(|source| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Interpreter used to start the payload.
pub fn java_exe() -> &'static str {
    if cfg!(windows) { "javaw.exe" } else { "java" }
}

/// Normalises a directory path for suffix matching: forward slashes become
/// backslashes and a trailing separator is guaranteed.
pub fn normalize_dir_path(raw: &str) -> String {
    let mut normalized = raw.trim().replace('/', "\\");
    if !normalized.ends_with('\\') {
        normalized.push('\\');
    }
    normalized
}

/// Runtime home for a `PATH` entry ending in a `bin` segment.
pub fn home_from_bin_dir(entry: &str) -> Option<PathBuf> {
    let normalized = normalize_dir_path(entry);
    let lower = normalized.to_ascii_lowercase();
    if !lower.ends_with("\\bin\\") {
        return None;
    }
    let home = &normalized[..normalized.len() - "\\bin\\".len()];
    if home.is_empty() {
        return None;
    }
    if cfg!(windows) {
        Some(PathBuf::from(home))
    } else {
        Some(PathBuf::from(home.replace('\\', "/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_trailing_slash() {
        assert_eq!(normalize_dir_path("C:/Java/bin"), "C:\\Java\\bin\\");
        assert_eq!(normalize_dir_path("C:\\Java\\bin\\"), "C:\\Java\\bin\\");
    }

    #[test]
    fn bin_suffix_is_stripped() {
        let home = home_from_bin_dir("C:\\Program Files\\Java\\jdk-17\\BIN").expect("home");
        let rendered = home.to_string_lossy().replace('/', "\\");
        assert_eq!(rendered, "C:\\Program Files\\Java\\jdk-17");
    }

    #[test]
    fn entries_without_bin_segment_are_skipped() {
        assert_eq!(home_from_bin_dir("C:\\Windows\\System32"), None);
        assert_eq!(home_from_bin_dir("C:\\tools\\mybin"), None);
        assert_eq!(home_from_bin_dir(""), None);
        assert_eq!(home_from_bin_dir("\\bin"), None);
    }

    #[test]
    fn derived_locations_hang_off_cache_and_exe_dirs() {
        let paths = LauncherPaths::new(
            PathBuf::from("/opt/app/launcher.exe"),
            PathBuf::from("/home/u/.interface"),
        );
        assert_eq!(paths.exe_dir(), Path::new("/opt/app"));
        assert_eq!(
            paths.installed_runtime_dir(),
            PathBuf::from("/home/u/.interface/runtime")
        );
        assert_eq!(paths.bundled_runtime_dir(), PathBuf::from("/opt/app/jre"));
        assert_eq!(
            paths.log_file(),
            PathBuf::from("/home/u/.interface/launcher.log")
        );
    }
}
