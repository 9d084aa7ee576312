//! Copies compiled classes out of the workspace after a successful build.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compiled-class directories, relative to the build dir, in probe order:
/// Maven, Gradle, legacy Gradle (< 4.0).
pub const CLASS_DIRS: [&str; 3] = [
    "target/classes",
    "build/classes/java/main",
    "build/classes/main",
];

/// Name of the directory created under the destination.
pub const DEST_DIR_NAME: &str = "classes";

/// Result of [`extract`]. None of these outcomes affect the build verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionReport {
    Copied {
        from: PathBuf,
        to: PathBuf,
        files: usize,
    },
    NoClasses { searched: Vec<PathBuf> },
    Failed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
}

/// First existing compiled-class tree under `build_dir`, if any.
pub fn locate_classes(build_dir: &Path) -> Option<PathBuf> {
    CLASS_DIRS
        .iter()
        .map(|rel| build_dir.join(rel))
        .find(|candidate| candidate.is_dir())
}

/// Replaces `destination/classes` with the build's compiled classes.
///
/// The old `destination/classes` is removed wholesale first, so files from a
/// previous project never survive.
pub fn extract(build_dir: &Path, destination: &Path) -> ExtractionReport {
    let Some(source) = locate_classes(build_dir) else {
        return ExtractionReport::NoClasses {
            searched: CLASS_DIRS.iter().map(|rel| build_dir.join(rel)).collect(),
        };
    };
    let dest = destination.join(DEST_DIR_NAME);

    match replace_tree(&source, &dest) {
        Ok(files) => ExtractionReport::Copied {
            from: source,
            to: dest,
            files,
        },
        Err(e) => ExtractionReport::Failed {
            from: source,
            to: dest,
            reason: e.to_string(),
        },
    }
}

fn replace_tree(source: &Path, dest: &Path) -> io::Result<usize> {
    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    copy_tree(source, dest)
}

/// Recursively copies `source` to `dest`, returning the number of files.
fn copy_tree(source: &Path, dest: &Path) -> io::Result<usize> {
    let mut files = 0;
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}
