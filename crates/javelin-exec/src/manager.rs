//! The execution pipeline: clean, run, then extract on success.

use crate::artifacts::{self, ExtractionReport};
use crate::cleaner::{self, CleanReport, CleanStatus};
use crate::config::{BuildConfig, ToolchainConfig, WorkspaceContext};
use crate::environment::{self, EnvMap};
use crate::runner::{BuildRunner, ABORTED_EXIT_CODE};
use log::{error, info, warn};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Normalised result of [`ExecutionManager::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    pub success: bool,
    pub exit_code: i32,
    pub log: String,
    pub clean: CleanReport,
    /// Present only when the build succeeded and a destination was given.
    pub extraction: Option<ExtractionReport>,
}

impl BuildOutcome {
    /// The `(success, logs)` pair handed to callers such as a retry loop.
    pub fn into_pair(self) -> (bool, String) {
        (self.success, self.log)
    }
}

/// Compiles one workspace with one configuration.
///
/// Each call to [`execute`](Self::execute) resolves the tool again and takes a
/// fresh snapshot of the process environment; nothing is carried between
/// calls. The workspace is modified in place, so concurrent calls against the
/// same workspace must be serialised by the caller.
#[derive(Debug)]
pub struct ExecutionManager {
    toolchain: ToolchainConfig,
    config: BuildConfig,
    workspace: WorkspaceContext,
    runner: BuildRunner,
    base_env: Option<EnvMap>,
}

impl ExecutionManager {
    pub fn new(
        toolchain: ToolchainConfig,
        config: BuildConfig,
        workspace: WorkspaceContext,
    ) -> Self {
        for missing in toolchain.missing_paths() {
            warn!(
                "Tool path not found: {:?}. Builds needing this tool will fail.",
                missing
            );
        }
        Self {
            toolchain,
            config,
            workspace,
            runner: BuildRunner::new(),
            base_env: None,
        }
    }

    /// Replaces the process runner (for testing).
    pub fn with_runner(mut self, runner: BuildRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Uses `env` instead of the live process environment as the base for
    /// the child environment.
    pub fn with_base_env(mut self, env: EnvMap) -> Self {
        self.base_env = Some(env);
        self
    }

    /// Runs the pipeline. Never panics and never returns an error: every
    /// failure is folded into the returned outcome.
    pub fn execute(&self, destination: Option<&Path>) -> BuildOutcome {
        match panic::catch_unwind(AssertUnwindSafe(|| self.pipeline(destination))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Execution failed: {}", message);
                BuildOutcome {
                    success: false,
                    exit_code: ABORTED_EXIT_CODE,
                    log: message,
                    clean: CleanReport::default(),
                    extraction: None,
                }
            }
        }
    }

    fn pipeline(&self, destination: Option<&Path>) -> BuildOutcome {
        let build_dir = self.workspace.build_dir();

        let clean = cleaner::clean(&build_dir);
        for entry in &clean.entries {
            match &entry.status {
                CleanStatus::Removed => info!("Cleaned {:?}", entry.path),
                CleanStatus::Failed { reason } => {
                    warn!("Failed to clean {:?}: {}", entry.path, reason)
                }
                CleanStatus::Absent => {}
            }
        }

        let base_env = match &self.base_env {
            Some(env) => env.clone(),
            None => environment::inherited(),
        };
        let run = self
            .runner
            .run(&self.config, &self.workspace, &self.toolchain, &base_env);

        if !run.succeeded() {
            return BuildOutcome {
                success: false,
                exit_code: run.exit_code,
                log: run.log,
                clean,
                extraction: None,
            };
        }

        let extraction = destination.map(|dest| {
            info!("Extracting artifacts...");
            let report = artifacts::extract(&build_dir, dest);
            log_extraction(&report);
            report
        });

        BuildOutcome {
            success: true,
            exit_code: run.exit_code,
            log: run.log,
            clean,
            extraction,
        }
    }
}

fn log_extraction(report: &ExtractionReport) {
    match report {
        ExtractionReport::Copied { to, files, .. } => {
            info!("Artifacts extracted to {:?} ({} files)", to, files)
        }
        ExtractionReport::NoClasses { searched } => {
            warn!("No classes found at {:?}", searched)
        }
        ExtractionReport::Failed { to, reason, .. } => {
            error!("Failed to extract artifacts to {:?}: {}", to, reason)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "build execution panicked".to_string()
    }
}
