pub mod core;

use crate::core::bootstrap::{Bootstrap, EXIT_NO_RUNTIME};
use crate::core::config::BootstrapConfig;
use crate::core::platform::paths::launcher_paths;
use crate::core::platform::{Platform, SystemEnvironment};

/// Entry point shared by the binary: resolves paths and configuration,
/// initialises logging and runs the bootstrap sequence. Returns the exit code.
pub async fn run(args: Vec<String>) -> i32 {
    let paths = match launcher_paths() {
        Ok(paths) => paths.clone(),
        Err(err) => {
            eprintln!("interface-bootstrap: {err}");
            return EXIT_NO_RUNTIME;
        }
    };

    let (config, config_error) = BootstrapConfig::load(paths.exe_dir());
    let debug = config.debug_enabled(&SystemEnvironment);
    let log_file = paths.log_file();
    if let Err(err) = core::logging::init(debug, Some(log_file.as_path())) {
        tracing::warn!("Could not open log file, logging to stderr: {}", err);
    }
    if let Some(err) = config_error {
        tracing::warn!("Ignoring launcher configuration: {}", err);
    }

    tracing::info!(
        "InterfaceOficial bootstrap {} starting from {:?}",
        env!("CARGO_PKG_VERSION"),
        paths.exe_path()
    );

    Bootstrap::new(paths, config, Platform::system(), args)
        .run()
        .await
}
