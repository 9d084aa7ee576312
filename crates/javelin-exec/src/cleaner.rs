//! Removal of stale build output before a run.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Output directories removed before every build, relative to the build dir.
pub const OUTPUT_DIRS: [&str; 2] = ["target", "build"];

/// What happened to one output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanStatus {
    Removed,
    Absent,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: CleanStatus,
}

/// Per-directory results of [`clean`]. Failures here never fail a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub entries: Vec<CleanEntry>,
}

impl CleanReport {
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().filter_map(|entry| match &entry.status {
            CleanStatus::Failed { reason } => Some((entry.path.as_path(), reason.as_str())),
            _ => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Removes `target/` and `build/` under `build_dir`. Each directory is handled
/// independently; a failure on one is recorded and the other is still tried.
pub fn clean(build_dir: &Path) -> CleanReport {
    let entries = OUTPUT_DIRS
        .iter()
        .map(|name| {
            let path = build_dir.join(name);
            let status = match remove(&path) {
                Ok(true) => CleanStatus::Removed,
                Ok(false) => CleanStatus::Absent,
                Err(e) => CleanStatus::Failed {
                    reason: e.to_string(),
                },
            };
            CleanEntry { path, status }
        })
        .collect();
    CleanReport { entries }
}

fn remove(path: &Path) -> io::Result<bool> {
    match std::fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path).map(|_| true),
        Ok(_) => std::fs::remove_file(path).map(|_| true),
    }
}
