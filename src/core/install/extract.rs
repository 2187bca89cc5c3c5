use std::path::{Component, Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::config::{ArchiverConfig, BUILTIN_ZIP_ARCHIVER};
use crate::core::error::{LauncherError, LauncherResult};

/// Placeholder replaced with the archive path in archiver arguments.
pub const ARCHIVE_PLACEHOLDER: &str = "{archive}";

/// Unpacks an archive into an existing, empty directory.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, archive: &Path, into: &Path) -> LauncherResult<()>;
}

/// Dispatcher over the supported extractors.
pub enum ArchiveExtractor {
    External(ExternalArchiver),
    BuiltinZip(ZipExtractor),
}

impl ArchiveExtractor {
    pub fn from_config(config: &ArchiverConfig) -> Self {
        if config.program == BUILTIN_ZIP_ARCHIVER {
            Self::BuiltinZip(ZipExtractor)
        } else {
            Self::External(ExternalArchiver::new(
                config.program.clone(),
                config.args.clone(),
            ))
        }
    }
}

#[async_trait]
impl Extractor for ArchiveExtractor {
    async fn extract(&self, archive: &Path, into: &Path) -> LauncherResult<()> {
        match self {
            ArchiveExtractor::External(e) => e.extract(archive, into).await,
            ArchiveExtractor::BuiltinZip(e) => e.extract(archive, into).await,
        }
    }
}

/// Runs a command-line archiver with the target directory as working
/// directory and waits for it to finish.
#[derive(Debug, Clone)]
pub struct ExternalArchiver {
    program: String,
    args: Vec<String>,
}

impl ExternalArchiver {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn resolved_args(&self, archive: &Path) -> Vec<String> {
        let archive = archive.to_string_lossy();
        let mut args = self
            .args
            .iter()
            .map(|arg| arg.replace(ARCHIVE_PLACEHOLDER, &archive))
            .collect::<Vec<_>>();
        if !self.args.iter().any(|arg| arg.contains(ARCHIVE_PLACEHOLDER)) {
            args.push(archive.to_string());
        }
        args
    }
}

#[async_trait]
impl Extractor for ExternalArchiver {
    async fn extract(&self, archive: &Path, into: &Path) -> LauncherResult<()> {
        let args = self.resolved_args(archive);
        info!("Extracting with {} {:?} in {:?}", self.program, args, into);

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&args)
            .current_dir(into)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let status = cmd
            .status()
            .await
            .map_err(|source| LauncherError::ArchiverSpawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(LauncherError::ArchiverFailed {
                program: self.program.clone(),
                code: status.code(),
            });
        }
        debug!("Archiver {} finished", self.program);
        Ok(())
    }
}

/// In-process zip extraction, keeping the archive's own layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

#[async_trait]
impl Extractor for ZipExtractor {
    async fn extract(&self, archive: &Path, into: &Path) -> LauncherResult<()> {
        let archive = archive.to_path_buf();
        let into = into.to_path_buf();
        tokio::task::spawn_blocking(move || extract_zip_file(&archive, &into))
            .await
            .map_err(|e| LauncherError::Other(format!("Task join error: {e}")))?
    }
}

fn extract_zip_file(zip_path: &Path, into: &Path) -> LauncherResult<()> {
    let zip_file = std::fs::File::open(zip_path).map_err(|source| LauncherError::Io {
        path: zip_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(zip_file)?;

    for index in 0..archive.len() {
        let mut zipped = archive.by_index(index)?;
        let enclosed_name = zipped
            .enclosed_name()
            .ok_or_else(|| LauncherError::Other("Invalid zip entry path".into()))?;

        let mut rel_path = PathBuf::new();
        for component in enclosed_name.components() {
            if let Component::Normal(part) = component {
                rel_path.push(part);
            }
        }
        if rel_path.as_os_str().is_empty() {
            continue;
        }

        let out_path = into.join(rel_path);
        if zipped.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|source| LauncherError::Io {
                path: out_path,
                source,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out = std::fs::File::create(&out_path).map_err(|source| LauncherError::Io {
            path: out_path.clone(),
            source,
        })?;
        std::io::copy(&mut zipped, &mut out).map_err(|source| LauncherError::Io {
            path: out_path,
            source,
        })?;
    }

    Ok(())
}
