// ─── InterfaceOficial Bootstrap Core ───
// Finds or installs a Java runtime and starts the launcher payload on it.
//
// Architecture:
//   core/
//     java/       - Version model + prioritised runtime discovery
//     platform/   - Environment, registry and filesystem access, paths
//     downloader/ - Streaming HTTPS package fetch
//     install/    - Fallback install: extract + relocate
//     launch/     - Command-line quoting + process start
//     ui/         - Localized "no runtime" dialog
//     bootstrap   - The end-to-end sequence

pub mod bootstrap;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod java;
pub mod launch;
pub mod logging;
pub mod platform;
pub mod ui;
