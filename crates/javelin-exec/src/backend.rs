//! Build tool backends.
//!
//! Each supported tool is a variant of [`Backend`] backed by an adapter that
//! implements [`BuildBackend`]. The runner only talks to the trait, so a new
//! tool needs a variant and an adapter, nothing else.

use crate::config::{ToolchainConfig, WorkspaceContext};
use crate::error::{ExecError, Result};
use log::info;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Maven flags that stop frontend plugins from downloading node and npm.
pub const MAVEN_SKIP_FRONTEND: [&str; 3] = [
    "-Dskip.npm=true",
    "-Dskip.node=true",
    "-Dskip.installnodenpm=true",
];

/// Name of the Maven module excluded from the reactor when present.
pub const MAVEN_EXCLUDED_MODULE: &str = "distribution";

/// Inputs available while a backend builds its command line.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub workspace: &'a WorkspaceContext,
    pub toolchain: &'a ToolchainConfig,
}

/// Uniform capability every build tool provides to the runner.
pub trait BuildBackend: std::fmt::Debug + Send + Sync {
    /// Short tool name used in logs and errors (e.g. "maven").
    fn name(&self) -> &'static str;

    /// File name of the launcher inside the install's `bin` directory.
    fn executable_name(&self) -> &'static str;

    /// Directory the tool is expected to be unpacked into.
    fn install_root<'a>(&self, toolchain: &'a ToolchainConfig) -> &'a Path;

    /// Arguments following the executable. Workspace preconditions (optional
    /// modules, settings files, init scripts) are probed here, at the moment
    /// the command is built.
    fn arguments(&self, ctx: &CommandContext<'_>) -> Result<Vec<OsString>>;

    /// Directories prepended to `PATH` after `JAVA_HOME/bin`.
    fn path_entries(&self, executable: &Path) -> Vec<PathBuf> {
        executable.parent().map(Path::to_path_buf).into_iter().collect()
    }
}

/// The closed set of supported build tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Maven,
    Gradle,
}

impl FromStr for Backend {
    type Err = ExecError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "maven" => Ok(Backend::Maven),
            "gradle" => Ok(Backend::Gradle),
            other => Err(ExecError::UnknownBackend(other.to_string())),
        }
    }
}

impl Backend {
    pub fn adapter(&self) -> &'static dyn BuildBackend {
        match self {
            Backend::Maven => &MavenBackend,
            Backend::Gradle => &GradleBackend,
        }
    }
}

/// `mvn package` with tests skipped and one thread per core.
#[derive(Debug)]
pub struct MavenBackend;

impl BuildBackend for MavenBackend {
    fn name(&self) -> &'static str {
        "maven"
    }

    fn executable_name(&self) -> &'static str {
        "mvn"
    }

    fn install_root<'a>(&self, toolchain: &'a ToolchainConfig) -> &'a Path {
        &toolchain.maven_home
    }

    fn arguments(&self, ctx: &CommandContext<'_>) -> Result<Vec<OsString>> {
        let mut args: Vec<OsString> = ["package", "-DskipTests", "-T", "1C"]
            .into_iter()
            .map(OsString::from)
            .collect();

        if ctx
            .workspace
            .build_dir()
            .join(MAVEN_EXCLUDED_MODULE)
            .is_dir()
        {
            args.push("-pl".into());
            args.push(format!("!{}", MAVEN_EXCLUDED_MODULE).into());
        }

        args.extend(MAVEN_SKIP_FRONTEND.into_iter().map(OsString::from));

        let settings = ctx.workspace.root.join("settings.xml");
        if settings.is_file() {
            args.push("-s".into());
            args.push(settings.into_os_string());
        }

        Ok(args)
    }
}

/// `gradle compileJava` with tests excluded and verbose diagnostics.
#[derive(Debug)]
pub struct GradleBackend;

impl BuildBackend for GradleBackend {
    fn name(&self) -> &'static str {
        "gradle"
    }

    fn executable_name(&self) -> &'static str {
        "gradle"
    }

    fn install_root<'a>(&self, toolchain: &'a ToolchainConfig) -> &'a Path {
        &toolchain.gradle_home
    }

    fn arguments(&self, ctx: &CommandContext<'_>) -> Result<Vec<OsString>> {
        let mut args: Vec<OsString> = ["compileJava", "-x", "test", "--stacktrace", "--info"]
            .into_iter()
            .map(OsString::from)
            .collect();

        let template = &ctx.toolchain.gradle_init_template;
        if template.is_file() {
            let dest = ctx.workspace.root.join("init.gradle");
            std::fs::copy(template, &dest).map_err(|source| ExecError::Prepare {
                path: dest.clone(),
                source,
            })?;
            info!("Injected init script {:?}", dest);
            args.push("--init-script".into());
            args.push(dest.into_os_string());
        }

        Ok(args)
    }
}
