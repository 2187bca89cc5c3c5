use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java::discovery::SourceKind;
use crate::core::java::version::{Thresholds, Version};
use crate::core::platform::EnvironmentReader;
use crate::core::platform::system::{platform_arch, platform_os};

pub const CONFIG_FILE_NAME: &str = "bootstrap.json";

const DEFAULT_JVM_OPTIONS: &str = "-XX:MinHeapFreeRatio=5 -XX:MaxHeapFreeRatio=15";
const DEFAULT_DOWNLOAD_HOST: &str = "api.adoptium.net";
const DEFAULT_FEATURE_VERSION: u32 = 17;
const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 5;

/// Name of the archiver that selects the in-process zip extractor.
pub const BUILTIN_ZIP_ARCHIVER: &str = "builtin-zip";

/// Launcher settings: defaults, optionally overridden by `bootstrap.json`
/// next to the executable, then by environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub java_home_override_var: String,
    pub java_home_var: String,
    pub jvm_options_var: String,
    pub debug_var: String,
    pub default_jvm_options: String,
    pub usable_version: String,
    pub best_version: String,
    pub discovery_sources: Vec<SourceKind>,
    pub registry_keys: Vec<String>,
    pub program_files: Vec<ProgramFilesRoot>,
    pub vendor_dirs: Vec<String>,
    pub download: DownloadConfig,
    pub archiver: ArchiverConfig,
    pub verify_timeout_secs: u64,
    pub help_url: Option<String>,
}

/// An environment variable naming a Program Files root, with the
/// location assumed when it is unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFilesRoot {
    pub var: String,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub host: String,
    /// Explicit request path; derived from `feature_version` when unset.
    pub path: Option<String>,
    pub feature_version: u32,
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiverConfig {
    pub program: String,
    /// Arguments; `{archive}` is replaced with the downloaded file.
    pub args: Vec<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            java_home_override_var: "INTERFACE_JAVA_HOME".to_string(),
            java_home_var: "JAVA_HOME".to_string(),
            jvm_options_var: "INTERFACE_JAVA_OPTS".to_string(),
            debug_var: "INTERFACE_LAUNCHER_DEBUG".to_string(),
            default_jvm_options: DEFAULT_JVM_OPTIONS.to_string(),
            usable_version: "1.8".to_string(),
            best_version: "11".to_string(),
            discovery_sources: SourceKind::DEFAULT_ORDER.to_vec(),
            registry_keys: [
                "SOFTWARE\\JavaSoft\\JDK",
                "SOFTWARE\\JavaSoft\\JRE",
                "SOFTWARE\\JavaSoft\\Java Development Kit",
                "SOFTWARE\\JavaSoft\\Java Runtime Environment",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            program_files: vec![
                ProgramFilesRoot {
                    var: "ProgramFiles".to_string(),
                    default: Some("C:\\Program Files".to_string()),
                },
                ProgramFilesRoot {
                    var: "ProgramFiles(x86)".to_string(),
                    default: Some("C:\\Program Files (x86)".to_string()),
                },
                ProgramFilesRoot {
                    var: "ProgramW6432".to_string(),
                    default: None,
                },
            ],
            vendor_dirs: [
                "Java",
                "BellSoft",
                "AdoptOpenJDK",
                "Zulu",
                "Microsoft",
                "Eclipse Foundation",
                "Eclipse Adoptium",
                "Semeru",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            download: DownloadConfig::default(),
            archiver: ArchiverConfig::default(),
            verify_timeout_secs: DEFAULT_VERIFY_TIMEOUT_SECS,
            help_url: None,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DOWNLOAD_HOST.to_string(),
            path: None,
            feature_version: DEFAULT_FEATURE_VERSION,
            sha256: None,
        }
    }
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            program: "tar".to_string(),
            args: vec!["-xf".to_string(), "{archive}".to_string()],
        }
    }
}

impl DownloadConfig {
    /// Request path for the current OS and architecture.
    pub fn request_path(&self) -> String {
        match &self.path {
            Some(path) => path.clone(),
            None => format!(
                "/v3/binary/latest/{}/ga/{}/{}/jre/hotspot/normal/eclipse",
                self.feature_version,
                platform_os(),
                platform_arch()
            ),
        }
    }
}

impl BootstrapConfig {
    /// Reads `bootstrap.json` from `dir`. A missing file yields defaults;
    /// an unreadable or malformed one is an error.
    pub fn from_dir(dir: &Path) -> LauncherResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| LauncherError::Io {
            path: path.clone(),
            source,
        })?;
        let config = serde_json::from_str::<Self>(&raw).map_err(|err| LauncherError::Config {
            path: path.clone(),
            message: err.to_string(),
        })?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Like [`Self::from_dir`], falling back to defaults on any error. The
    /// error is handed back so it can be logged once logging is up.
    pub fn load(dir: &Path) -> (Self, Option<LauncherError>) {
        match Self::from_dir(dir) {
            Ok(config) => (config, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        let defaults = Thresholds::default();
        let usable = Version::parse(&self.usable_version);
        let best = Version::parse(&self.best_version);
        Thresholds {
            usable: if usable.is_zero() { defaults.usable } else { usable },
            best: if best.is_zero() { defaults.best } else { best },
        }
    }

    /// JVM options: the override variable wins over the configured default.
    pub fn jvm_options(&self, env: &dyn EnvironmentReader) -> String {
        env.var(&self.jvm_options_var)
            .unwrap_or_else(|| self.default_jvm_options.clone())
    }

    pub fn debug_enabled(&self, env: &dyn EnvironmentReader) -> bool {
        env.var(&self.debug_var)
            .map(|value| {
                let value = value.trim().to_ascii_lowercase();
                !matches!(value.as_str(), "0" | "false" | "no" | "off")
            })
            .unwrap_or(false)
    }

    /// Existing Program Files roots, deduplicated, in configured order.
    pub fn program_files_roots(&self, env: &dyn EnvironmentReader) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for root in &self.program_files {
            let Some(value) = env.var(&root.var).or_else(|| root.default.clone()) else {
                continue;
            };
            let path = PathBuf::from(value.trim());
            if !roots
                .iter()
                .any(|known| known.as_os_str().eq_ignore_ascii_case(path.as_os_str()))
            {
                roots.push(path);
            }
        }
        roots
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct MapEnv(HashMap<String, String>);

    impl EnvironmentReader for MapEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }
    }

    fn env(pairs: &[(&str, &str)]) -> MapEnv {
        MapEnv(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_use_java_8_and_11_thresholds() {
        let thresholds = BootstrapConfig::default().thresholds();
        assert_eq!(thresholds, Thresholds::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = BootstrapConfig::from_dir(dir.path()).expect("config");
        assert_eq!(config.java_home_var, "JAVA_HOME");
        assert_eq!(config.discovery_sources, SourceKind::DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "best_version": "17", "download": { "feature_version": 21 } }"#,
        )
        .expect("write");

        let config = BootstrapConfig::from_dir(dir.path()).expect("config");
        assert_eq!(config.thresholds().best, Version::new(17, 0, 0, 0));
        assert_eq!(config.download.host, "api.adoptium.net");
        assert!(config.download.request_path().starts_with("/v3/binary/latest/21/ga/"));
        assert_eq!(config.archiver.program, "tar");
    }

    #[test]
    fn malformed_file_is_reported_and_ignored_by_loader() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").expect("write");

        assert!(matches!(
            BootstrapConfig::from_dir(dir.path()),
            Err(LauncherError::Config { .. })
        ));
        let (config, err) = BootstrapConfig::load(dir.path());
        assert!(matches!(err, Some(LauncherError::Config { .. })));
        assert_eq!(config.verify_timeout(), Duration::from_secs(5));
        assert_eq!(config.java_home_var, "JAVA_HOME");

        std::fs::remove_file(dir.path().join(CONFIG_FILE_NAME)).expect("remove");
        let (_, err) = BootstrapConfig::load(dir.path());
        assert!(err.is_none());
    }

    #[test]
    fn jvm_options_override_wins() {
        let config = BootstrapConfig::default();
        assert_eq!(config.jvm_options(&env(&[])), DEFAULT_JVM_OPTIONS);
        assert_eq!(
            config.jvm_options(&env(&[("INTERFACE_JAVA_OPTS", "-Xmx1G")])),
            "-Xmx1G"
        );
    }

    #[test]
    fn debug_switch_accepts_truthy_values() {
        let config = BootstrapConfig::default();
        assert!(!config.debug_enabled(&env(&[])));
        assert!(config.debug_enabled(&env(&[("INTERFACE_LAUNCHER_DEBUG", "1")])));
        assert!(!config.debug_enabled(&env(&[("INTERFACE_LAUNCHER_DEBUG", "off")])));
    }

    #[test]
    fn program_files_roots_are_deduplicated() {
        let config = BootstrapConfig::default();
        let roots = config.program_files_roots(&env(&[
            ("ProgramFiles", "C:\\Program Files"),
            ("ProgramW6432", "c:\\program files"),
        ]));
        assert_eq!(
            roots,
            vec![
                PathBuf::from("C:\\Program Files"),
                PathBuf::from("C:\\Program Files (x86)"),
            ]
        );
    }
}
