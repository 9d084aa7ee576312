//! # Javelin Exec
//!
//! Compiles a Java project with Maven or Gradle against a chosen JDK and
//! reports a pass/fail outcome with the full build log.
//!
//! ## Overview
//!
//! One call to [`ExecutionManager::execute`] runs a strictly sequential
//! pipeline:
//!
//! ```text
//! clean ──► resolve tool ──► compose env ──► build command ──► run
//!                                                               │
//!                                       exit 0 + destination? ◄─┘
//!                                               │
//!                                               ▼
//!                                        extract classes
//! ```
//!
//! - [`cleaner`] removes stale `target/` and `build/` directories
//! - [`resolver`] finds `mvn` / `gradle` below their install roots
//! - [`environment`] sets `JAVA_HOME` and prepends tool directories to `PATH`
//! - [`backend`] turns a backend into its command line
//! - [`runner`] launches the process through a mockable [`CommandExecutor`]
//! - [`artifacts`] copies the compiled class tree to a destination
//!
//! Cleaning and extraction problems are returned as report values and never
//! change the verdict. A build that runs and exits nonzero is a normal
//! failed outcome; anything that prevents a build from starting is reported
//! with exit code [`ABORTED_EXIT_CODE`].
//!
//! ## Example
//!
//! ```no_run
//! use javelin_exec::{BuildConfig, ExecutionManager, ToolchainConfig, WorkspaceContext};
//! use std::path::Path;
//!
//! let manager = ExecutionManager::new(
//!     ToolchainConfig::from_env(),
//!     BuildConfig::new("maven", "17"),
//!     WorkspaceContext::new("/work/project", ""),
//! );
//!
//! let (success, logs) = manager.execute(Some(Path::new("/work/out"))).into_pair();
//! if !success {
//!     eprintln!("{}", logs);
//! }
//! ```

pub mod artifacts;
pub mod backend;
pub mod cleaner;
pub mod config;
pub mod environment;
pub mod error;
pub mod manager;
pub mod resolver;
pub mod runner;

pub use artifacts::ExtractionReport;
pub use backend::{Backend, BuildBackend};
pub use cleaner::CleanReport;
pub use config::{BuildConfig, ToolchainConfig, WorkspaceContext};
pub use error::{ConfigError, ExecError};
pub use manager::{BuildOutcome, ExecutionManager};
pub use resolver::ToolInstallation;
pub use runner::{BuildRunner, CommandExecutor, Invocation, RunResult, ABORTED_EXIT_CODE};
