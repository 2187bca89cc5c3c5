use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::core::config::BootstrapConfig;
use crate::core::platform::env::split_path_list;
use crate::core::platform::paths::{home_from_bin_dir, java_exe};
use crate::core::platform::Platform;

use super::version::{Thresholds, Version};

/// Acceptability of a discovered runtime. Ordered, so `max` picks the
/// better of two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiscoveryStatus {
    #[default]
    NotFound,
    Usable,
    Best,
}

impl DiscoveryStatus {
    pub fn classify(version: Version, thresholds: &Thresholds) -> Self {
        if version >= thresholds.best {
            DiscoveryStatus::Best
        } else if version >= thresholds.usable {
            DiscoveryStatus::Usable
        } else {
            DiscoveryStatus::NotFound
        }
    }
}

/// Where a candidate came from. The variants double as the strategy list
/// the engine iterates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    EnvOverride,
    CacheDir,
    EnvStandard,
    Registry,
    PathScan,
    VendorDirs,
}

impl SourceKind {
    pub const DEFAULT_ORDER: [SourceKind; 6] = [
        SourceKind::EnvOverride,
        SourceKind::CacheDir,
        SourceKind::EnvStandard,
        SourceKind::Registry,
        SourceKind::PathScan,
        SourceKind::VendorDirs,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub home: PathBuf,
    pub status: DiscoveryStatus,
    /// `None` when the home was forced through the override variable.
    pub version: Option<Version>,
    pub source: SourceKind,
}

impl Candidate {
    pub fn interpreter(&self, name: &str) -> PathBuf {
        self.home.join("bin").join(name)
    }
}

/// Keeps the best candidate offered so far; ties go to the first one.
#[derive(Debug, Default)]
struct Selection {
    current: Option<Candidate>,
}

impl Selection {
    /// Records `candidate` if it beats the current one. Returns `true`
    /// once the selection is final.
    fn offer(&mut self, candidate: Candidate) -> bool {
        let improves = self
            .current
            .as_ref()
            .is_none_or(|current| candidate.status > current.status);
        if improves {
            self.current = Some(candidate);
        }
        self.is_final()
    }

    fn is_final(&self) -> bool {
        self.status() == DiscoveryStatus::Best
    }

    fn status(&self) -> DiscoveryStatus {
        self.current
            .as_ref()
            .map(|candidate| candidate.status)
            .unwrap_or_default()
    }
}

/// Result of a discovery run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub candidate: Option<Candidate>,
    /// Sources consulted, in order.
    pub probed: Vec<SourceKind>,
}

impl Discovery {
    pub fn status(&self) -> DiscoveryStatus {
        self.candidate
            .as_ref()
            .map(|candidate| candidate.status)
            .unwrap_or_default()
    }
}

/// Prioritised search for an installed Java runtime.
pub struct RuntimeDiscovery<'a> {
    platform: &'a Platform,
    config: &'a BootstrapConfig,
    thresholds: Thresholds,
    installed_runtime_dir: PathBuf,
    interpreter: String,
}

impl<'a> RuntimeDiscovery<'a> {
    pub fn new(
        platform: &'a Platform,
        config: &'a BootstrapConfig,
        installed_runtime_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform,
            config,
            thresholds: config.thresholds(),
            installed_runtime_dir: installed_runtime_dir.into(),
            interpreter: java_exe().to_string(),
        }
    }

    /// Interpreter file name looked up under `<home>/bin`.
    pub fn with_interpreter(mut self, name: impl Into<String>) -> Self {
        self.interpreter = name.into();
        self
    }

    /// Walks the configured sources in order and stops at the first
    /// `Best` candidate.
    #[instrument(skip(self))]
    pub fn discover(&self) -> Discovery {
        let mut selection = Selection::default();
        let mut probed = Vec::new();

        for &source in &self.config.discovery_sources {
            probed.push(source);
            let Some(candidate) = self.probe(source) else {
                debug!("Discovery source {:?} yielded nothing", source);
                continue;
            };
            debug!(
                "Discovery source {:?} yielded {:?} ({:?})",
                source, candidate.home, candidate.status
            );
            if selection.offer(candidate) {
                break;
            }
        }

        let discovery = Discovery {
            candidate: selection.current,
            probed,
        };
        match &discovery.candidate {
            Some(candidate) => info!(
                "Selected Java runtime {:?} from {:?} ({:?}, version {:?})",
                candidate.home, candidate.source, candidate.status, candidate.version
            ),
            None => info!("No acceptable Java runtime found"),
        }
        discovery
    }

    /// Best candidate a single source can offer.
    pub fn probe(&self, source: SourceKind) -> Option<Candidate> {
        match source {
            SourceKind::EnvOverride => self.probe_env_override(),
            SourceKind::CacheDir => {
                self.classify_home(&self.installed_runtime_dir, SourceKind::CacheDir)
            }
            SourceKind::EnvStandard => self.probe_env_standard(),
            SourceKind::Registry => self.probe_registry(),
            SourceKind::PathScan => self.probe_path(),
            SourceKind::VendorDirs => self.probe_vendor_dirs(),
        }
    }

    /// Checks `<home>/bin/<interpreter>` and classifies its version.
    /// Returns `None` for anything that is not an acceptable runtime.
    pub fn classify_home(&self, home: &Path, source: SourceKind) -> Option<Candidate> {
        let interpreter = home.join("bin").join(&self.interpreter);
        if !self.platform.fs.is_file(&interpreter) {
            return None;
        }
        let Some(version) = self.platform.fs.file_version(&interpreter) else {
            debug!("No version information for {:?}", interpreter);
            return None;
        };

        let status = DiscoveryStatus::classify(version, &self.thresholds);
        debug!("Candidate {:?}: version {} -> {:?}", home, version, status);
        if status == DiscoveryStatus::NotFound {
            return None;
        }

        Some(Candidate {
            home: home.to_path_buf(),
            status,
            version: Some(version),
            source,
        })
    }

    fn probe_env_override(&self) -> Option<Candidate> {
        let home = self.platform.env.var(&self.config.java_home_override_var)?;
        info!(
            "Using {} override without validation: {}",
            self.config.java_home_override_var, home
        );
        Some(Candidate {
            home: PathBuf::from(home.trim()),
            status: DiscoveryStatus::Best,
            version: None,
            source: SourceKind::EnvOverride,
        })
    }

    fn probe_env_standard(&self) -> Option<Candidate> {
        let home = self.platform.env.var(&self.config.java_home_var)?;
        self.classify_home(Path::new(home.trim()), SourceKind::EnvStandard)
    }

    fn probe_registry(&self) -> Option<Candidate> {
        let mut selection = Selection::default();

        for key in &self.config.registry_keys {
            let names = match self.platform.registry.subkeys(key) {
                Ok(names) => names,
                Err(err) => {
                    debug!("Skipping registry key: {}", err);
                    continue;
                }
            };

            for name in names {
                let Ok(name) = name else {
                    debug!("Skipping unreadable subkey of {}", key);
                    continue;
                };
                let subkey = format!("{key}\\{name}");
                let home = match self.platform.registry.string_value(&subkey, "JavaHome") {
                    Ok(home) if !home.trim().is_empty() => home,
                    Ok(_) => continue,
                    Err(err) => {
                        debug!("Skipping {}: {}", subkey, err);
                        continue;
                    }
                };
                let Some(candidate) =
                    self.classify_home(Path::new(home.trim()), SourceKind::Registry)
                else {
                    continue;
                };
                if selection.offer(candidate) {
                    return selection.current;
                }
            }
        }

        selection.current
    }

    fn probe_path(&self) -> Option<Candidate> {
        let path = self.platform.env.var("PATH")?;
        let mut selection = Selection::default();

        for home in split_path_list(&path).filter_map(home_from_bin_dir) {
            let Some(candidate) = self.classify_home(&home, SourceKind::PathScan) else {
                continue;
            };
            if selection.offer(candidate) {
                break;
            }
        }

        selection.current
    }

    fn probe_vendor_dirs(&self) -> Option<Candidate> {
        let mut selection = Selection::default();

        for root in self.config.program_files_roots(self.platform.env.as_ref()) {
            for vendor in &self.config.vendor_dirs {
                let vendor_dir = root.join(vendor);
                let homes = match self.platform.subdirectories(&vendor_dir) {
                    Ok(homes) => homes,
                    Err(_) => continue,
                };
                for home in homes {
                    let Some(candidate) = self.classify_home(&home, SourceKind::VendorDirs)
                    else {
                        continue;
                    };
                    if selection.offer(candidate) {
                        return selection.current;
                    }
                }
            }
        }

        selection.current
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::core::error::{LauncherError, LauncherResult};
    use crate::core::platform::env::PATH_LIST_SEPARATOR;
    use crate::core::platform::{
        DirEntryInfo, EnvironmentReader, FilesystemProbe, RegistryReader,
    };

    type CallLog = Rc<RefCell<Vec<String>>>;

    fn key(path: &Path) -> String {
        path.to_string_lossy().replace('\\', "/")
    }

    #[derive(Default)]
    struct FakeEnv {
        vars: HashMap<String, String>,
        log: CallLog,
    }

    impl EnvironmentReader for FakeEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.log.borrow_mut().push(format!("env:{name}"));
            self.vars.get(name).cloned()
        }
    }

    #[derive(Default)]
    struct FakeRegistry {
        subkeys: HashMap<String, Vec<Option<String>>>,
        values: HashMap<String, String>,
        log: CallLog,
    }

    fn registry_error(key: &str) -> LauncherError {
        LauncherError::Registry {
            key: key.to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
    }

    impl RegistryReader for FakeRegistry {
        fn subkeys(&self, key: &str) -> LauncherResult<Vec<LauncherResult<String>>> {
            self.log.borrow_mut().push(format!("reg:{key}"));
            let names = self.subkeys.get(key).ok_or_else(|| registry_error(key))?;
            Ok(names
                .iter()
                .map(|name| name.clone().ok_or_else(|| registry_error(key)))
                .collect())
        }

        fn string_value(&self, key: &str, name: &str) -> LauncherResult<String> {
            self.log.borrow_mut().push(format!("regval:{key}"));
            self.values
                .get(&format!("{key}\\{name}"))
                .cloned()
                .ok_or_else(|| registry_error(key))
        }
    }

    #[derive(Default)]
    struct FakeFs {
        versions: HashMap<String, Option<Version>>,
        dirs: HashMap<String, Vec<DirEntryInfo>>,
        log: CallLog,
    }

    impl FilesystemProbe for FakeFs {
        fn is_file(&self, path: &Path) -> bool {
            self.log.borrow_mut().push(format!("fs:{}", key(path)));
            self.versions.contains_key(&key(path))
        }

        fn list_dir(&self, path: &Path) -> LauncherResult<Vec<DirEntryInfo>> {
            self.log.borrow_mut().push(format!("ls:{}", key(path)));
            self.dirs.get(&key(path)).cloned().ok_or_else(|| LauncherError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }

        fn file_version(&self, path: &Path) -> Option<Version> {
            self.versions.get(&key(path)).copied().flatten()
        }
    }

    const EXE: &str = "java.exe";

    struct Fixture {
        env: FakeEnv,
        registry: FakeRegistry,
        fs: FakeFs,
        log: CallLog,
        config: BootstrapConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let log = CallLog::default();
            let mut config = BootstrapConfig::default();
            config.program_files = vec![crate::core::config::ProgramFilesRoot {
                var: "ProgramFiles".into(),
                default: None,
            }];
            Self {
                env: FakeEnv {
                    log: log.clone(),
                    ..FakeEnv::default()
                },
                registry: FakeRegistry {
                    log: log.clone(),
                    ..FakeRegistry::default()
                },
                fs: FakeFs {
                    log: log.clone(),
                    ..FakeFs::default()
                },
                log,
                config,
            }
        }

        fn var(mut self, name: &str, value: &str) -> Self {
            self.env.vars.insert(name.into(), value.into());
            self
        }

        fn runtime(mut self, home: &str, version: &str) -> Self {
            let exe = Path::new(home).join("bin").join(EXE);
            self.fs
                .versions
                .insert(key(&exe), Some(Version::parse(version)));
            self
        }

        fn broken_runtime(mut self, home: &str) -> Self {
            let exe = Path::new(home).join("bin").join(EXE);
            self.fs.versions.insert(key(&exe), None);
            self
        }

        fn registry_entry(mut self, reg_key: &str, name: Option<&str>, home: Option<&str>) -> Self {
            self.registry
                .subkeys
                .entry(reg_key.into())
                .or_default()
                .push(name.map(String::from));
            if let (Some(name), Some(home)) = (name, home) {
                self.registry
                    .values
                    .insert(format!("{reg_key}\\{name}\\JavaHome"), home.into());
            }
            self
        }

        fn dir(mut self, path: &str, entries: &[(&str, bool)]) -> Self {
            self.fs.dirs.insert(
                key(Path::new(path)),
                entries
                    .iter()
                    .map(|(name, is_dir)| DirEntryInfo {
                        name: name.to_string(),
                        is_dir: *is_dir,
                    })
                    .collect(),
            );
            self
        }

        fn run(self) -> (Discovery, Vec<String>) {
            let log = self.log.clone();
            let platform = Platform::new(
                Box::new(self.env),
                Box::new(self.registry),
                Box::new(self.fs),
            );
            let discovery = RuntimeDiscovery::new(&platform, &self.config, "/cache/runtime")
                .with_interpreter(EXE)
                .discover();
            let calls = log.borrow().clone();
            (discovery, calls)
        }
    }

    const JDK_KEY: &str = "SOFTWARE\\JavaSoft\\JDK";
    const JRE_KEY: &str = "SOFTWARE\\JavaSoft\\JRE";

    fn path_list(entries: &[&str]) -> String {
        entries.join(&PATH_LIST_SEPARATOR.to_string())
    }

    #[test]
    fn classification_thresholds() {
        let t = Thresholds::default();
        assert_eq!(
            DiscoveryStatus::classify(Version::new(1, 8, 0, 0), &t),
            DiscoveryStatus::Usable
        );
        assert_eq!(
            DiscoveryStatus::classify(Version::new(1, 7, 0, 99), &t),
            DiscoveryStatus::NotFound
        );
        assert_eq!(
            DiscoveryStatus::classify(Version::new(11, 0, 0, 0), &t),
            DiscoveryStatus::Best
        );
        assert_eq!(
            DiscoveryStatus::classify(Version::new(17, 0, 1, 0), &t),
            DiscoveryStatus::Best
        );
        assert!(DiscoveryStatus::NotFound < DiscoveryStatus::Usable);
        assert!(DiscoveryStatus::Usable < DiscoveryStatus::Best);
    }

    #[test]
    fn classifies_windows_file_metadata() {
        let t = Thresholds::default();
        assert_eq!(
            DiscoveryStatus::classify(Version::from_packed(7 << 16, (800 << 16) | 15), &t),
            DiscoveryStatus::NotFound
        );
        assert_eq!(
            DiscoveryStatus::classify(Version::from_packed(8 << 16, (3010 << 16) | 9), &t),
            DiscoveryStatus::Usable
        );
        assert_eq!(
            DiscoveryStatus::classify(Version::from_packed(17 << 16, 8 << 16), &t),
            DiscoveryStatus::Best
        );
    }

    #[test]
    fn override_is_trusted_and_stops_search() {
        let (discovery, calls) = Fixture::new()
            .var("INTERFACE_JAVA_HOME", "/nowhere/jdk")
            .var("JAVA_HOME", "/opt/jdk17")
            .runtime("/opt/jdk17", "17.0.2")
            .run();

        let candidate = discovery.candidate.expect("candidate");
        assert_eq!(candidate.source, SourceKind::EnvOverride);
        assert_eq!(candidate.status, DiscoveryStatus::Best);
        assert_eq!(candidate.version, None);
        assert_eq!(discovery.probed, vec![SourceKind::EnvOverride]);
        assert_eq!(calls, vec!["env:INTERFACE_JAVA_HOME".to_string()]);
    }

    #[test]
    fn cache_dir_best_skips_every_later_source() {
        let (discovery, calls) = Fixture::new()
            .runtime("/cache/runtime", "17.0.8.1")
            .run();

        assert_eq!(discovery.status(), DiscoveryStatus::Best);
        assert_eq!(
            discovery.probed,
            vec![SourceKind::EnvOverride, SourceKind::CacheDir]
        );
        assert!(!calls.iter().any(|c| c == "env:JAVA_HOME"));
        assert!(!calls.iter().any(|c| c.starts_with("reg")));
    }

    #[test]
    fn java_home_best_stops_before_registry() {
        let (discovery, calls) = Fixture::new()
            .var("JAVA_HOME", "/opt/jdk21")
            .runtime("/opt/jdk21", "21.0.1")
            .registry_entry(JDK_KEY, Some("17"), Some("/opt/reg17"))
            .runtime("/opt/reg17", "17")
            .run();

        let candidate = discovery.candidate.expect("candidate");
        assert_eq!(candidate.source, SourceKind::EnvStandard);
        assert_eq!(candidate.home, PathBuf::from("/opt/jdk21"));
        assert!(!calls.iter().any(|c| c.starts_with("reg")));
        assert!(!calls.iter().any(|c| c == "env:PATH"));
    }

    #[test]
    fn usable_java_home_keeps_searching_for_best() {
        let (discovery, _) = Fixture::new()
            .var("JAVA_HOME", "/opt/jre8")
            .runtime("/opt/jre8", "8.0.3010.9")
            .var("ProgramFiles", "/pf")
            .dir("/pf/Zulu", &[(".", true), ("..", true), ("zulu-17", true)])
            .runtime("/pf/Zulu/zulu-17", "17.0.5")
            .run();

        let candidate = discovery.candidate.expect("candidate");
        assert_eq!(candidate.source, SourceKind::VendorDirs);
        assert_eq!(candidate.home, Path::new("/pf/Zulu").join("zulu-17"));
        assert_eq!(candidate.status, DiscoveryStatus::Best);
    }

    #[test]
    fn first_usable_candidate_is_retained() {
        let (discovery, _) = Fixture::new()
            .registry_entry(JRE_KEY, Some("1.8"), Some("/opt/reg8"))
            .runtime("/opt/reg8", "1.8.0_301")
            .var("PATH", &path_list(&["/opt/path8/bin"]))
            .runtime("/opt/path8", "1.8.0_401")
            .run();

        let candidate = discovery.candidate.expect("candidate");
        assert_eq!(candidate.status, DiscoveryStatus::Usable);
        assert_eq!(candidate.source, SourceKind::Registry);
        assert_eq!(discovery.probed, SourceKind::DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn registry_stops_at_first_best_across_keys() {
        let (discovery, calls) = Fixture::new()
            .registry_entry(JDK_KEY, Some("1.8.0_301"), Some("/opt/reg8"))
            .runtime("/opt/reg8", "1.8.0_301")
            .registry_entry(JDK_KEY, Some("17.0.2"), Some("/opt/reg17"))
            .runtime("/opt/reg17", "17.0.2")
            .registry_entry(JRE_KEY, Some("21"), Some("/opt/reg21"))
            .runtime("/opt/reg21", "21")
            .run();

        let candidate = discovery.candidate.expect("candidate");
        assert_eq!(candidate.home, PathBuf::from("/opt/reg17"));
        assert!(!calls.iter().any(|c| c == &format!("reg:{JRE_KEY}")));
        assert!(!calls.iter().any(|c| c == "env:PATH"));
    }

    #[test]
    fn registry_tolerates_bad_names_and_missing_values() {
        let (discovery, _) = Fixture::new()
            .registry_entry(JDK_KEY, None, None)
            .registry_entry(JDK_KEY, Some("11"), None)
            .registry_entry(JDK_KEY, Some("broken"), Some("/opt/broken"))
            .broken_runtime("/opt/broken")
            .registry_entry(JDK_KEY, Some("1.7"), Some("/opt/old"))
            .runtime("/opt/old", "1.7.0_80")
            .registry_entry(JRE_KEY, Some("11.0.2"), Some("/opt/jre11"))
            .runtime("/opt/jre11", "11.0.2")
            .run();

        let candidate = discovery.candidate.expect("candidate");
        assert_eq!(candidate.home, PathBuf::from("/opt/jre11"));
        assert_eq!(candidate.source, SourceKind::Registry);
    }

    #[test]
    fn path_scan_only_considers_bin_entries() {
        let (discovery, calls) = Fixture::new()
            .var(
                "PATH",
                &path_list(&["", "/usr/local/sbin", "/opt/tools/mybin", "/opt/jdk17/bin/"]),
            )
            .runtime("/opt/jdk17", "17")
            .run();

        let candidate = discovery.candidate.expect("candidate");
        assert_eq!(candidate.source, SourceKind::PathScan);
        assert!(key(&candidate.home).ends_with("/opt/jdk17"));
        assert!(!calls.iter().any(|c| c.contains("/opt/tools/bin")));
        assert!(!calls.iter().any(|c| c.starts_with("ls:")));
    }

    #[test]
    fn vendor_dirs_skip_pseudo_entries_and_files() {
        let (discovery, calls) = Fixture::new()
            .var("ProgramFiles", "/pf")
            .dir(
                "/pf/Java",
                &[(".", true), ("..", true), ("notes.txt", false), ("jdk-11", true)],
            )
            .runtime("/pf/Java/jdk-11", "11.0.20")
            .run();

        assert_eq!(discovery.status(), DiscoveryStatus::Best);
        assert!(!calls.iter().any(|c| c.contains("/pf/Java/./")));
        assert!(!calls.iter().any(|c| c.contains("notes.txt")));
    }

    #[test]
    fn degrades_to_not_found() {
        let (discovery, _) = Fixture::new()
            .registry_entry(JDK_KEY, Some("1.6"), Some("/opt/jre6"))
            .runtime("/opt/jre6", "1.6.0_45")
            .var("PATH", &path_list(&["/usr/bin", "/opt/none/bin"]))
            .var("ProgramFiles", "/pf")
            .dir("/pf/Java", &[("empty", true)])
            .run();

        assert_eq!(discovery.status(), DiscoveryStatus::NotFound);
        assert!(discovery.candidate.is_none());
        assert_eq!(discovery.probed, SourceKind::DEFAULT_ORDER.to_vec());
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let mut fixture = Fixture::new()
            .var("JAVA_HOME", "/opt/jdk11")
            .runtime("/opt/jdk11", "11.0.2");
        fixture.config.best_version = "17".into();
        let (discovery, _) = fixture.run();

        let candidate = discovery.candidate.expect("candidate");
        assert_eq!(candidate.status, DiscoveryStatus::Usable);
    }
}
