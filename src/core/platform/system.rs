use std::env;

/// Architecture name as used by the Adoptium API.
pub fn platform_arch() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "aarch64",
        "x86" => "x32",
        other => other,
    }
}

pub fn platform_os() -> &'static str {
    match env::consts::OS {
        "windows" => "windows",
        "linux" => "linux",
        "macos" => "mac",
        _ => "windows",
    }
}

/// Major OS version (e.g. `10` for Windows 10/11), when it can be read.
pub fn os_major_version() -> Option<u32> {
    sysinfo::System::os_version().and_then(|raw| parse_os_major(&raw))
}

fn parse_os_major(raw: &str) -> Option<u32> {
    raw.trim()
        .split(|ch: char| !ch.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|part| part.parse().ok())
}

/// User interface language as a lowercase tag such as `en` or `zh-cn`.
pub fn detect_ui_language() -> Option<String> {
    #[cfg(windows)]
    {
        if let Some(tag) = windows_ui_language() {
            return Some(tag.to_string());
        }
    }

    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find_map(|raw| parse_locale_string(&raw))
}

#[cfg(windows)]
fn windows_ui_language() -> Option<&'static str> {
    use windows_sys::Win32::Globalization::GetUserDefaultUILanguage;

    // SAFETY: no arguments, returns a LANGID.
    let lang_id = unsafe { GetUserDefaultUILanguage() };
    // PRIMARYLANGID
    match lang_id & 0x3ff {
        0x04 => Some("zh-cn"),
        0x0a => Some("es"),
        0x09 => Some("en"),
        _ => None,
    }
}

/// `de_DE.UTF-8` → `de-de`; `C` and `POSIX` carry no language.
fn parse_locale_string(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let locale = trimmed.split(['.', '@']).next()?.replace('_', "-");
    if locale.is_empty() || locale == "C" || locale == "POSIX" {
        return None;
    }
    Some(locale.to_ascii_lowercase())
}
