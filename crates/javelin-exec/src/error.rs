use std::io;
use std::path::PathBuf;

/// Failures that stop a build from being attempted at all.
///
/// A build that runs and exits nonzero is not an error: it is reported as a
/// [`RunResult`](crate::runner::RunResult) carrying the tool's exit code.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Neither `<root>/bin/<tool>` nor any nested `bin/<tool>` exists.
    #[error("{tool} binary not found in {}", root.display())]
    ToolNotFound { tool: String, root: PathBuf },

    /// The configured build tool is not one of the supported backends.
    #[error("Unknown build tool: {0}")]
    UnknownBackend(String),

    /// The operating system refused to start the process.
    #[error("failed to launch {}: {source}", program.display())]
    ProcessLaunch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A filesystem step required before launch failed.
    #[error("failed to prepare {}: {source}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while loading a [`ToolchainConfig`](crate::config::ToolchainConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Deserialization(#[from] toml::de::Error),
}

pub type Result<T, E = ExecError> = std::result::Result<T, E>;
