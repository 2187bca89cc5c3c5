// ─── Platform access ───
// Capability traits the discovery engine talks to, plus their real
// implementations. Tests swap in fakes through `Platform::new`.

pub mod env;
pub mod fs_probe;
pub mod paths;
pub mod registry;
pub mod system;

use std::path::{Path, PathBuf};

use crate::core::error::LauncherResult;
use crate::core::java::version::Version;

pub use env::SystemEnvironment;
pub use fs_probe::SystemFilesystem;
pub use registry::SystemRegistry;

/// Read access to process environment variables.
pub trait EnvironmentReader {
    /// Value of `name`, or `None` when unset or blank.
    fn var(&self, name: &str) -> Option<String>;
}

/// Read access to the local-machine registry hive (64-bit view).
pub trait RegistryReader {
    /// Names of the immediate subkeys of `key`. The outer error means the
    /// key could not be opened; an inner error marks one unreadable name.
    fn subkeys(&self, key: &str) -> LauncherResult<Vec<LauncherResult<String>>>;

    /// String value `name` stored under `key`.
    fn string_value(&self, key: &str, name: &str) -> LauncherResult<String>;
}

/// One entry returned by [`FilesystemProbe::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntryInfo {
    /// `.` and `..` never name a real child.
    pub fn is_pseudo(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Filesystem queries needed to recognise a runtime home.
pub trait FilesystemProbe {
    fn is_file(&self, path: &Path) -> bool;

    fn list_dir(&self, path: &Path) -> LauncherResult<Vec<DirEntryInfo>>;

    /// Version metadata of an executable, `None` if absent or unreadable.
    fn file_version(&self, path: &Path) -> Option<Version>;
}

/// Bundle of OS capabilities threaded through discovery.
pub struct Platform {
    pub env: Box<dyn EnvironmentReader>,
    pub registry: Box<dyn RegistryReader>,
    pub fs: Box<dyn FilesystemProbe>,
}

impl Platform {
    pub fn new(
        env: Box<dyn EnvironmentReader>,
        registry: Box<dyn RegistryReader>,
        fs: Box<dyn FilesystemProbe>,
    ) -> Self {
        Self { env, registry, fs }
    }

    pub fn system() -> Self {
        Self::new(
            Box::new(SystemEnvironment),
            Box::new(SystemRegistry),
            Box::new(SystemFilesystem),
        )
    }

    /// Immediate subdirectories of `dir`, pseudo entries removed.
    pub fn subdirectories(&self, dir: &Path) -> LauncherResult<Vec<PathBuf>> {
        Ok(self
            .fs
            .list_dir(dir)?
            .into_iter()
            .filter(|entry| entry.is_dir && !entry.is_pseudo())
            .map(|entry| dir.join(entry.name))
            .collect())
    }
}
