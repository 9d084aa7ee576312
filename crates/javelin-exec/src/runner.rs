//! Turns a build configuration into a child process and captures its result.

use crate::backend::{Backend, CommandContext};
use crate::config::{BuildConfig, ToolchainConfig, WorkspaceContext};
use crate::environment::{self, EnvMap};
use crate::error::{ExecError, Result};
use crate::resolver;
use log::{error, info};
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Exit code reported when no real build could be attempted.
pub const ABORTED_EXIT_CODE: i32 = -1;

/// A fully composed command: program, arguments, working directory and the
/// complete environment of the child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    pub env: EnvMap,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Trait for executing system commands.
/// This allows us to mock `std::process::Command` in tests.
pub trait CommandExecutor: Send + Sync + fmt::Debug {
    /// Runs the invocation to completion, capturing stdout and stderr.
    ///
    /// An `Err` means the process could not be started (or waited on); a
    /// process that ran and failed is an `Ok` with a nonzero status.
    fn execute(&self, invocation: &Invocation) -> io::Result<Output>;
}

/// Default implementation of [`CommandExecutor`] using `std::process::Command`.
#[derive(Debug)]
pub struct RealCommandExecutor;

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, invocation: &Invocation) -> io::Result<Output> {
        Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .env_clear()
            .envs(&invocation.env)
            .stdin(Stdio::null())
            .output()
    }
}

/// Exit code and combined output of one build attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub exit_code: i32,
    pub log: String,
}

impl RunResult {
    /// A run that never reached a real build process.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self {
            exit_code: ABORTED_EXIT_CODE,
            log: message.into(),
        }
    }

    /// stdout first, then stderr, separated by a newline. A process killed by
    /// a signal has no exit code and is reported as [`ABORTED_EXIT_CODE`].
    pub fn from_output(output: &Output) -> Self {
        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push('\n');
        log.push_str(&String::from_utf8_lossy(&output.stderr));
        Self {
            exit_code: output.status.code().unwrap_or(ABORTED_EXIT_CODE),
            log,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Resolves the tool, composes the command and runs it.
#[derive(Debug)]
pub struct BuildRunner {
    executor: Box<dyn CommandExecutor>,
}

impl Default for BuildRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildRunner {
    pub fn new() -> Self {
        Self {
            executor: Box::new(RealCommandExecutor),
        }
    }

    /// Creates a runner with a custom executor (for testing).
    pub fn with_executor(executor: Box<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Runs one build. Never fails: a nonzero exit is returned as-is, and
    /// anything that prevents a real build (unknown tool, missing binary,
    /// launch error) becomes [`ABORTED_EXIT_CODE`] with the reason as log.
    pub fn run(
        &self,
        config: &BuildConfig,
        workspace: &WorkspaceContext,
        toolchain: &ToolchainConfig,
        base_env: &EnvMap,
    ) -> RunResult {
        info!("Running {} build...", config.build_tool);
        match self.try_run(config, workspace, toolchain, base_env) {
            Ok(result) => result,
            Err(e) => {
                error!("Build could not be attempted: {}", e);
                RunResult::aborted(e.to_string())
            }
        }
    }

    fn try_run(
        &self,
        config: &BuildConfig,
        workspace: &WorkspaceContext,
        toolchain: &ToolchainConfig,
        base_env: &EnvMap,
    ) -> Result<RunResult> {
        let invocation = prepare(config, workspace, toolchain, base_env)?;

        info!("Command: {}", invocation);
        if let Some(java_home) = invocation.env.get(std::ffi::OsStr::new("JAVA_HOME")) {
            info!("JAVA_HOME: {}", Path::new(java_home).display());
        }
        info!("CWD: {}", invocation.cwd.display());

        ensure_executable(&invocation.program)?;
        let output = self
            .executor
            .execute(&invocation)
            .map_err(|source| ExecError::ProcessLaunch {
                program: invocation.program.clone(),
                source,
            })?;

        let result = RunResult::from_output(&output);
        info!("Build finished with exit code {}", result.exit_code);
        Ok(result)
    }
}

/// Composes the invocation for `config` without running anything.
///
/// The tool is resolved first; the environment and the argument list both
/// depend on where it was found.
pub fn prepare(
    config: &BuildConfig,
    workspace: &WorkspaceContext,
    toolchain: &ToolchainConfig,
    base_env: &EnvMap,
) -> Result<Invocation> {
    let backend: Backend = config.build_tool.parse()?;
    let adapter = backend.adapter();

    let tool = resolver::resolve(
        adapter.name(),
        adapter.executable_name(),
        adapter.install_root(toolchain),
    )?;

    let env = environment::compose(
        &config.jdk_version,
        toolchain,
        &adapter.path_entries(&tool.executable),
        base_env,
    );

    let args = adapter.arguments(&CommandContext {
        workspace,
        toolchain,
    })?;

    Ok(Invocation {
        program: tool.executable,
        args,
        cwd: workspace.build_dir(),
        env,
    })
}

/// Adds execute bits to the launcher; unpacked archives sometimes lose them.
#[cfg(unix)]
fn ensure_executable(program: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let prepare_err = |source| ExecError::Prepare {
        path: program.to_path_buf(),
        source,
    };
    let mut permissions = std::fs::metadata(program).map_err(prepare_err)?.permissions();
    let mode = permissions.mode() | 0o755;
    if permissions.mode() != mode {
        permissions.set_mode(mode);
        std::fs::set_permissions(program, permissions).map_err(prepare_err)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_executable(_program: &Path) -> Result<()> {
    Ok(())
}

/// A mocked executor for testing that doesn't actually run system commands.
///
/// Every invocation is recorded; the configured output is returned and the
/// listed files are created relative to the invocation's working directory.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockCommandExecutor {
    pub calls: std::sync::Arc<std::sync::Mutex<Vec<Invocation>>>,
    pub stdout: String,
    pub stderr: String,
    pub status_code: i32,
    pub creates: Vec<PathBuf>,
    pub launch_error: bool,
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, invocation: &Invocation) -> io::Result<Output> {
        self.calls.lock().unwrap().push(invocation.clone());
        if self.launch_error {
            return Err(io::Error::new(io::ErrorKind::NotFound, "mock launch failure"));
        }
        for file in &self.creates {
            let path = invocation.cwd.join(file);
            std::fs::create_dir_all(path.parent().unwrap())?;
            std::fs::write(path, b"\xca\xfe\xba\xbe")?;
        }

        #[cfg(unix)]
        let status = {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(self.status_code << 8)
        };
        #[cfg(windows)]
        let status = {
            use std::os::windows::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(self.status_code as u32)
        };

        Ok(Output {
            status,
            stdout: self.stdout.as_bytes().to_vec(),
            stderr: self.stderr.as_bytes().to_vec(),
        })
    }
}
