// ─── Bootstrap ───
// Bundled runtime → discovery → PATH → fallback install → error dialog.

use std::path::{Path, PathBuf};

use tracing::{error, info, instrument, warn};

use crate::core::config::BootstrapConfig;
use crate::core::downloader::HttpFetcher;
use crate::core::error::{result_code, LauncherResult};
use crate::core::install::{ArchiveExtractor, RuntimeInstallRequest, RuntimeInstaller};
use crate::core::java::{DiscoveryStatus, RuntimeDiscovery};
use crate::core::launch::{LaunchMode, LaunchRequest, ProcessStarter, SystemStarter};
use crate::core::platform::paths::{java_exe, LauncherPaths};
use crate::core::platform::Platform;
use crate::core::ui::{self, Language};

pub const EXIT_LAUNCHED: i32 = 0;
pub const EXIT_NO_RUNTIME: i32 = 1;

/// Where a launch attempt's interpreter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOrigin {
    Bundled,
    Discovered(DiscoveryStatus),
    SystemPath,
    Installed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub interpreter: PathBuf,
    pub origin: TargetOrigin,
}

/// Everything one launcher run needs.
pub struct Bootstrap {
    paths: LauncherPaths,
    config: BootstrapConfig,
    platform: Platform,
    starter: Box<dyn ProcessStarter>,
    args: Vec<String>,
}

impl Bootstrap {
    pub fn new(
        paths: LauncherPaths,
        config: BootstrapConfig,
        platform: Platform,
        args: Vec<String>,
    ) -> Self {
        Self {
            paths,
            config,
            platform,
            starter: Box::new(SystemStarter),
            args,
        }
    }

    pub fn with_starter(mut self, starter: Box<dyn ProcessStarter>) -> Self {
        self.starter = starter;
        self
    }

    fn bundled_target(&self) -> Option<LaunchTarget> {
        let bundled = self
            .paths
            .bundled_runtime_dir()
            .join("bin")
            .join(java_exe());
        self.platform.fs.is_file(&bundled).then_some(LaunchTarget {
            interpreter: bundled,
            origin: TargetOrigin::Bundled,
        })
    }

    fn discovered_target(&self) -> Option<LaunchTarget> {
        let candidate = RuntimeDiscovery::new(
            &self.platform,
            &self.config,
            self.paths.installed_runtime_dir(),
        )
        .discover()
        .candidate?;
        Some(LaunchTarget {
            interpreter: candidate.interpreter(java_exe()),
            origin: TargetOrigin::Discovered(candidate.status),
        })
    }

    fn path_target(&self) -> LaunchTarget {
        LaunchTarget {
            interpreter: PathBuf::from(java_exe()),
            origin: TargetOrigin::SystemPath,
        }
    }

    fn launch_request(&self, interpreter: &Path) -> LaunchRequest {
        LaunchRequest {
            interpreter: interpreter.to_path_buf(),
            working_dir: self.paths.exe_dir().to_path_buf(),
            payload: self.paths.exe_path().to_path_buf(),
            jvm_options: self.config.jvm_options(self.platform.env.as_ref()),
            args: self.args.clone(),
        }
    }

    async fn try_launch(&self, target: &LaunchTarget, mode: LaunchMode) -> bool {
        info!("Trying {:?} runtime {:?}", target.origin, target.interpreter);
        let request = self.launch_request(&target.interpreter);
        match self.starter.start(&request, mode).await {
            Ok(()) => true,
            Err(err) => {
                warn!("Launch via {:?} failed: {}", target.origin, err);
                false
            }
        }
    }

    /// Bundled runtime, then discovery, then `PATH`, each in verify mode.
    /// Discovery only runs once the bundled runtime failed or is absent.
    /// Returns the target that started.
    pub async fn launch_existing(&self) -> Option<LaunchTarget> {
        let verify = LaunchMode::Verify(self.config.verify_timeout());

        if let Some(target) = self.bundled_target()
            && self.try_launch(&target, verify).await
        {
            return Some(target);
        }
        if let Some(target) = self.discovered_target()
            && self.try_launch(&target, verify).await
        {
            return Some(target);
        }
        let target = self.path_target();
        if self.try_launch(&target, verify).await {
            return Some(target);
        }
        None
    }

    /// Downloads a runtime into the cache directory. Returns its interpreter.
    async fn install_runtime(&self) -> LauncherResult<PathBuf> {
        let fetcher = HttpFetcher::new()?;
        let extractor = ArchiveExtractor::from_config(&self.config.archiver);
        let request =
            RuntimeInstallRequest::from_config(self.paths.cache_dir(), &self.config.download);

        let result = RuntimeInstaller::new(&fetcher, &extractor)
            .install(&request)
            .await;
        info!("Fallback install finished with code {}", result_code(&result));
        Ok(result?.join("bin").join(java_exe()))
    }

    /// Runs the whole sequence and returns the process exit code.
    #[instrument(skip(self))]
    pub async fn run(&self) -> i32 {
        if self.launch_existing().await.is_some() {
            return EXIT_LAUNCHED;
        }

        match self.install_runtime().await {
            Ok(interpreter) => {
                let target = LaunchTarget {
                    interpreter,
                    origin: TargetOrigin::Installed,
                };
                if self.try_launch(&target, LaunchMode::FireAndExit).await {
                    return EXIT_LAUNCHED;
                }
            }
            Err(err) => warn!("Fallback install unavailable: {}", err),
        }

        error!("No Java runtime could be started");
        let url = ui::resolve_help_url(&self.config);
        ui::show_runtime_missing(Language::detect(), &url).await;
        EXIT_NO_RUNTIME
    }
}
