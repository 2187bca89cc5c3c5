use rfd::{AsyncMessageDialog, MessageButtons, MessageDialogResult, MessageLevel};
use tracing::{info, warn};

use crate::core::config::BootstrapConfig;
use crate::core::platform::system::{os_major_version, platform_arch};

use super::messages::{runtime_missing, Language};

const HELP_BASE_URL: &str = "https://adoptium.net/temurin/releases/";

/// Download page for the current architecture and OS version.
///
/// Windows releases before 10 are pointed at the 11 line, newer ones at 17.
pub fn help_url(arch: &str, os_major: Option<u32>) -> String {
    let feature = match os_major {
        Some(major) if major < 10 => 11,
        _ => 17,
    };
    format!("{HELP_BASE_URL}?os=windows&arch={arch}&package=jre&version={feature}")
}

/// Configured help URL, or the computed one.
pub fn resolve_help_url(config: &BootstrapConfig) -> String {
    match config.help_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => help_url(platform_arch(), os_major_version()),
    }
}

/// Shows the localized "no runtime" dialog; OK opens `url` in the browser.
/// Returns whether the browser was asked to open the page.
pub async fn show_runtime_missing(language: Language, url: &str) -> bool {
    let text = runtime_missing(language);
    let choice = AsyncMessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(text.title)
        .set_description(text.body)
        .set_buttons(MessageButtons::OkCancel)
        .show()
        .await;

    if !matches!(choice, MessageDialogResult::Ok) {
        info!("Runtime dialog dismissed");
        return false;
    }

    info!("Opening help page {}", url);
    match webbrowser::open(url) {
        Ok(()) => true,
        Err(err) => {
            warn!("Could not open browser for {}: {}", url, err);
            false
        }
    }
}
