// ─── Process Launch ───
// Starts the interpreter on the payload and optionally checks that it
// survives start-up.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::core::error::{LauncherError, LauncherResult};

use super::command_line::build_command_line;

const VERIFY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to watch the child after spawning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Spawn and report success as soon as the process exists.
    FireAndExit,
    /// Spawn, then wait up to the given time. Still running or a clean exit
    /// counts as success; any other exit is a failure.
    Verify(Duration),
}

#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub interpreter: PathBuf,
    pub working_dir: PathBuf,
    pub payload: PathBuf,
    pub jvm_options: String,
    pub args: Vec<String>,
}

impl LaunchRequest {
    /// Arguments after the interpreter, as one quoted line.
    pub fn command_line(&self) -> String {
        build_command_line(&self.jvm_options, &self.payload, &self.args)
    }

    fn command(&self) -> std::process::Command {
        let line = self.command_line();
        let mut cmd = std::process::Command::new(&self.interpreter);

        #[cfg(target_os = "windows")]
        cmd.raw_arg(&line);
        #[cfg(not(target_os = "windows"))]
        cmd.args(super::command_line::split_command_line(&line));

        cmd.current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        configure_platform_spawn(&mut cmd);
        cmd
    }
}

/// Starts the interpreter described by `request`.
#[instrument(skip(request), fields(interpreter = ?request.interpreter))]
pub async fn launch(request: &LaunchRequest, mode: LaunchMode) -> LauncherResult<()> {
    let mut cmd = request.command();
    debug!("Command line: {}", request.command_line());

    let mut child = cmd.spawn().map_err(|source| LauncherError::Launch {
        program: request.interpreter.clone(),
        source,
    })?;
    info!("Started {:?} (pid {})", request.interpreter, child.id());

    let timeout = match mode {
        LaunchMode::FireAndExit => return Ok(()),
        LaunchMode::Verify(timeout) => timeout,
    };

    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => {
                debug!("{:?} exited cleanly during verification", request.interpreter);
                return Ok(());
            }
            Ok(Some(status)) => {
                warn!("{:?} exited early with {}", request.interpreter, status);
                return Err(LauncherError::ProcessExited {
                    program: request.interpreter.clone(),
                    code: status.code(),
                });
            }
            Ok(None) => {}
            Err(source) => {
                return Err(LauncherError::Launch {
                    program: request.interpreter.clone(),
                    source,
                });
            }
        }

        let now = tokio::time::Instant::now();
        if now >= deadline {
            debug!("{:?} still running after {:?}", request.interpreter, timeout);
            return Ok(());
        }
        tokio::time::sleep(VERIFY_POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// Starts interpreters on behalf of the bootstrap sequence.
#[async_trait]
pub trait ProcessStarter: Send + Sync {
    async fn start(&self, request: &LaunchRequest, mode: LaunchMode) -> LauncherResult<()>;
}

/// Spawns real child processes through [`launch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemStarter;

#[async_trait]
impl ProcessStarter for SystemStarter {
    async fn start(&self, request: &LaunchRequest, mode: LaunchMode) -> LauncherResult<()> {
        launch(request, mode).await
    }
}

fn configure_platform_spawn(cmd: &mut std::process::Command) {
    #[cfg(target_os = "windows")]
    {
        // The child outlives the launcher and has no console of its own.
        const DETACHED_PROCESS: u32 = 0x00000008;
        cmd.creation_flags(DETACHED_PROCESS);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}
