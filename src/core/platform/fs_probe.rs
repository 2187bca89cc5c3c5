use std::path::Path;

use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java::version::Version;

use super::{DirEntryInfo, FilesystemProbe};

/// Real filesystem. On Windows, versions come from the executable's
/// `VS_FIXEDFILEINFO`; elsewhere the interpreter is asked directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFilesystem;

impl FilesystemProbe for SystemFilesystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dir(&self, path: &Path) -> LauncherResult<Vec<DirEntryInfo>> {
        let entries = std::fs::read_dir(path).map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(entries
            .filter_map(Result::ok)
            .map(|entry| DirEntryInfo {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false),
            })
            .collect())
    }

    fn file_version(&self, path: &Path) -> Option<Version> {
        if !path.is_file() {
            return None;
        }
        let version = read_version(path);
        debug!("Version of {:?}: {:?}", path, version);
        version
    }
}

#[cfg(windows)]
fn read_version(path: &Path) -> Option<Version> {
    use std::ffi::c_void;
    use std::os::windows::ffi::OsStrExt;

    use windows_sys::Win32::Storage::FileSystem::{
        GetFileVersionInfoSizeW, GetFileVersionInfoW, VS_FIXEDFILEINFO, VerQueryValueW,
    };

    let wide_path = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect::<Vec<u16>>();
    let root_block = "\\"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect::<Vec<u16>>();

    let mut handle = 0u32;
    // SAFETY: `wide_path` is NUL-terminated and outlives the call.
    let size = unsafe { GetFileVersionInfoSizeW(wide_path.as_ptr(), &mut handle) };
    if size == 0 {
        return None;
    }

    let mut block = vec![0u8; size as usize];
    // SAFETY: `block` holds exactly `size` writable bytes.
    let loaded = unsafe {
        GetFileVersionInfoW(
            wide_path.as_ptr(),
            0,
            size,
            block.as_mut_ptr().cast::<c_void>(),
        )
    };
    if loaded == 0 {
        return None;
    }

    let mut info: *mut c_void = std::ptr::null_mut();
    let mut len = 0u32;
    // SAFETY: `block` was filled by GetFileVersionInfoW; `info` points into it.
    let found = unsafe {
        VerQueryValueW(
            block.as_ptr().cast::<c_void>(),
            root_block.as_ptr(),
            &mut info,
            &mut len,
        )
    };
    if found == 0 || info.is_null() || (len as usize) < std::mem::size_of::<VS_FIXEDFILEINFO>() {
        return None;
    }

    // SAFETY: checked non-null and large enough above; `block` is still alive.
    let fixed = unsafe { &*info.cast::<VS_FIXEDFILEINFO>() };
    Some(Version::from_packed(
        fixed.dwFileVersionMS,
        fixed.dwFileVersionLS,
    ))
}

#[cfg(not(windows))]
fn read_version(path: &Path) -> Option<Version> {
    let output = std::process::Command::new(path)
        .arg("-version")
        .output()
        .ok()?;
    let text = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stderr),
        String::from_utf8_lossy(&output.stdout)
    );
    parse_version_output(&text)
}

/// Extracts the quoted version from `java -version` output.
#[cfg_attr(windows, allow(dead_code))]
fn parse_version_output(output: &str) -> Option<Version> {
    output.lines().find_map(|line| {
        let start = line.find('"')?;
        let end = line[start + 1..].find('"')?;
        let version = Version::parse(&line[start + 1..start + 1 + end]);
        (!version.is_zero()).then_some(version)
    })
}
