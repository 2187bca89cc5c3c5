use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::core::config::DownloadConfig;
use crate::core::downloader::{PackageFetcher, DOWNLOAD_CHUNK_SIZE};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::platform::paths::{ensure_dir, RUNTIME_DIR_NAME};

use super::extract::Extractor;

pub const RUNTIME_METADATA_FILE: &str = "runtime.json";
const MIN_FREE_DISK_BYTES: u64 = 256 * 1024 * 1024;

/// One fallback install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInstallRequest {
    /// Install home; the runtime lands in `<home>/runtime`.
    pub home: PathBuf,
    pub host: String,
    pub path: String,
    pub sha256: Option<String>,
}

impl RuntimeInstallRequest {
    pub fn from_config(home: impl Into<PathBuf>, download: &DownloadConfig) -> Self {
        Self {
            home: home.into(),
            host: download.host.clone(),
            path: download.request_path(),
            sha256: download.sha256.clone(),
        }
    }

    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("https://{}{}", self.host, path)
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.home.join(RUNTIME_DIR_NAME)
    }
}

/// Written next to the installed runtime after a successful install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledRuntime {
    pub source_url: String,
    pub archive_sha256: String,
    pub installed_at: String,
    pub launcher_version: String,
}

/// Temporary archive and extraction directory of one attempt. Both are
/// removed when the guard goes out of scope, whatever the outcome.
struct StagingArea {
    archive: PathBuf,
    extract_dir: PathBuf,
}

impl StagingArea {
    fn new(home: &Path) -> Self {
        let staging_id = Uuid::new_v4().simple().to_string();
        Self {
            archive: home.join(format!("{staging_id}.download")),
            extract_dir: home.join(format!("{staging_id}_dir")),
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.extract_dir.exists() {
            if let Err(source) = std::fs::remove_dir_all(&self.extract_dir) {
                debug!("Failed to remove {:?}: {}", self.extract_dir, source);
            }
        }
        if self.archive.exists() {
            if let Err(source) = std::fs::remove_file(&self.archive) {
                debug!("Failed to remove {:?}: {}", self.archive, source);
            }
        }
    }
}

/// Download → extract → relocate.
pub struct RuntimeInstaller<'a> {
    fetcher: &'a dyn PackageFetcher,
    extractor: &'a dyn Extractor,
    min_free_bytes: u64,
}

impl<'a> RuntimeInstaller<'a> {
    pub fn new(fetcher: &'a dyn PackageFetcher, extractor: &'a dyn Extractor) -> Self {
        Self {
            fetcher,
            extractor,
            min_free_bytes: MIN_FREE_DISK_BYTES,
        }
    }

    /// `0` disables the free-space check.
    pub fn with_min_free_space(mut self, bytes: u64) -> Self {
        self.min_free_bytes = bytes;
        self
    }

    /// Installs a runtime into `<home>/runtime` and returns that directory.
    #[instrument(skip(self, request), fields(url = %request.url()))]
    pub async fn install(&self, request: &RuntimeInstallRequest) -> LauncherResult<PathBuf> {
        ensure_dir(&request.home)?;
        let staging = StagingArea::new(&request.home);
        if self.min_free_bytes > 0 {
            ensure_min_disk_space(&request.home, self.min_free_bytes)?;
        }

        let url = request.url();
        let download_start = Instant::now();
        let bytes = self.fetcher.fetch(&url, &staging.archive).await?;
        info!(
            "Runtime download finished: {} bytes in {:?}",
            bytes,
            download_start.elapsed()
        );

        let archive_sha256 = sha256_file(&staging.archive)?;
        if let Some(expected) = &request.sha256 {
            if !archive_sha256.eq_ignore_ascii_case(expected.trim()) {
                return Err(LauncherError::Sha256Mismatch {
                    path: staging.archive.clone(),
                    expected: expected.clone(),
                    actual: archive_sha256,
                });
            }
        }

        std::fs::create_dir(&staging.extract_dir).map_err(|source| LauncherError::Io {
            path: staging.extract_dir.clone(),
            source,
        })?;

        let extract_start = Instant::now();
        self.extractor
            .extract(&staging.archive, &staging.extract_dir)
            .await?;
        info!("Runtime extraction finished in {:?}", extract_start.elapsed());

        let top_level = single_top_level_dir(&staging.extract_dir)?;
        let runtime_dir = request.runtime_dir();
        relocate(&top_level, &runtime_dir)?;

        let metadata = InstalledRuntime {
            source_url: url,
            archive_sha256,
            installed_at: Utc::now().to_rfc3339(),
            launcher_version: env!("CARGO_PKG_VERSION").to_string(),
        };
        if let Err(err) = write_runtime_metadata(&runtime_dir, &metadata) {
            warn!("Could not record runtime metadata: {}", err);
        }

        info!("Runtime installed at {:?}", runtime_dir);
        Ok(runtime_dir)
    }
}

/// The only directory directly inside `dir`. Files are ignored; zero or
/// several directories mean the package layout is not the expected one.
pub fn single_top_level_dir(dir: &Path) -> LauncherResult<PathBuf> {
    let entries = std::fs::read_dir(dir).map_err(|source| LauncherError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let dirs = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            name != "." && name != ".."
        })
        .filter(|entry| entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect::<Vec<_>>();

    match dirs.as_slice() {
        [only] => Ok(only.clone()),
        _ => Err(LauncherError::InvalidPackage {
            dir: dir.to_path_buf(),
            found: dirs.len(),
        }),
    }
}

/// Renames `from` to `to`. A previous runtime at `to` is moved aside first
/// and put back if the rename fails.
fn relocate(from: &Path, to: &Path) -> LauncherResult<()> {
    let backup = to.with_extension("backup");
    if backup.exists() {
        let _ = std::fs::remove_dir_all(&backup);
    }
    if to.exists() {
        std::fs::rename(to, &backup).map_err(|source| LauncherError::Io {
            path: backup.clone(),
            source,
        })?;
    }

    if let Err(source) = std::fs::rename(from, to) {
        if backup.exists() {
            let _ = std::fs::rename(&backup, to);
        }
        return Err(LauncherError::Io {
            path: to.to_path_buf(),
            source,
        });
    }

    if backup.exists() {
        let _ = std::fs::remove_dir_all(&backup);
    }
    Ok(())
}

fn write_runtime_metadata(runtime_dir: &Path, metadata: &InstalledRuntime) -> LauncherResult<()> {
    let metadata_path = runtime_dir.join(RUNTIME_METADATA_FILE);
    let payload = serde_json::to_vec_pretty(metadata)?;
    std::fs::write(&metadata_path, payload).map_err(|source| LauncherError::Io {
        path: metadata_path,
        source,
    })
}

fn ensure_min_disk_space(path: &Path, minimum_bytes: u64) -> LauncherResult<()> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut best_len = 0usize;
    let mut available = None;
    for disk in disks.list() {
        let mount = disk.mount_point();
        if canonical.starts_with(mount) {
            let len = mount.as_os_str().len();
            if len >= best_len {
                best_len = len;
                available = Some(disk.available_space());
            }
        }
    }
    if let Some(bytes) = available
        && bytes < minimum_bytes
    {
        return Err(LauncherError::InsufficientSpace {
            path: path.to_path_buf(),
            available: bytes,
            required: minimum_bytes,
        });
    }
    Ok(())
}

fn sha256_file(path: &Path) -> LauncherResult<String> {
    let io_err = |source: std::io::Error| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;
    let mut reader = BufReader::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher).map_err(io_err)?;
    Ok(format!("{:x}", hasher.finalize()))
}
