//! Locates build tool executables inside their installation roots.
//!
//! Distributions are not always unpacked flat: a Gradle archive extracted into
//! `gradle/` usually lands in `gradle/gradle-8.5/bin/gradle`. The canonical
//! `<root>/bin/<exe>` is checked first, then the tree below the root is
//! searched for any `bin/<exe>`.

use crate::error::{ExecError, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A resolved tool installation. Resolved fresh on every build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInstallation {
    pub kind: &'static str,
    pub install_root: PathBuf,
    pub executable: PathBuf,
}

/// Finds `executable_name` under `install_root`.
///
/// The fallback search is deterministic: among all files named
/// `executable_name` whose parent directory is called `bin`, the shallowest
/// wins and ties go to the lexicographically smallest path.
pub fn resolve(
    kind: &'static str,
    executable_name: &str,
    install_root: &Path,
) -> Result<ToolInstallation> {
    let canonical = install_root.join("bin").join(executable_name);
    if canonical.is_file() {
        debug!("Using canonical {} binary at {:?}", kind, canonical);
        return Ok(ToolInstallation {
            kind,
            install_root: install_root.to_path_buf(),
            executable: canonical,
        });
    }

    let found = WalkDir::new(install_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .filter(|entry| entry.file_name() == executable_name)
        .filter(|entry| {
            entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .is_some_and(|dir| dir == "bin")
        })
        .map(|entry| (entry.depth(), entry.into_path()))
        .min();

    match found {
        Some((_, executable)) => {
            info!("Found {} binary at {:?}", kind, executable);
            Ok(ToolInstallation {
                kind,
                install_root: install_root.to_path_buf(),
                executable,
            })
        }
        None => Err(ExecError::ToolNotFound {
            tool: kind.to_string(),
            root: install_root.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\n").unwrap();
    }

    #[test]
    fn test_canonical_path_wins() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("bin/mvn"));
        touch(&root.join("apache-maven-3.9/bin/mvn"));

        let tool = resolve("maven", "mvn", root).unwrap();
        assert_eq!(tool.executable, root.join("bin/mvn"));
        assert_eq!(tool.install_root, root);
    }

    #[test]
    fn test_nested_binary_found() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("gradle-8.5/dist/bin/gradle"));

        let tool = resolve("gradle", "gradle", root).unwrap();
        assert_eq!(tool.executable, root.join("gradle-8.5/dist/bin/gradle"));
        assert_eq!(tool.kind, "gradle");
    }

    #[test]
    fn test_ignores_files_outside_bin() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("lib/gradle"));
        touch(&root.join("scripts/gradle"));

        let err = resolve("gradle", "gradle", root).unwrap_err();
        assert!(matches!(err, ExecError::ToolNotFound { .. }));
        assert!(err.to_string().contains(&root.display().to_string()));
    }

    #[test]
    fn test_prefers_shallowest_then_lexicographic() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("a/deep/er/bin/gradle"));
        touch(&root.join("zeta/bin/gradle"));
        touch(&root.join("beta/bin/gradle"));

        let tool = resolve("gradle", "gradle", root).unwrap();
        assert_eq!(tool.executable, root.join("beta/bin/gradle"));
    }

    #[test]
    fn test_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope");
        assert!(resolve("maven", "mvn", &missing).is_err());
    }
}
