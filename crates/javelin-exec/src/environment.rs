//! Child-process environment composition.

use crate::config::ToolchainConfig;
use log::warn;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Environment handed to the build process.
pub type EnvMap = HashMap<OsString, OsString>;

/// JDK selected for a build. Only the two bundled installations exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jdk {
    Jdk8,
    Jdk17,
}

impl Jdk {
    /// Exactly `"17"` selects JDK 17; every other value, including `"11"`,
    /// `"1.8"` and the empty string, selects JDK 8.
    pub fn select(version: &str) -> Self {
        match version {
            "17" => Jdk::Jdk17,
            "8" => Jdk::Jdk8,
            other => {
                warn!("Unsupported JDK version {:?}, falling back to JDK 8", other);
                Jdk::Jdk8
            }
        }
    }

    pub fn home<'a>(&self, toolchain: &'a ToolchainConfig) -> &'a Path {
        match self {
            Jdk::Jdk8 => toolchain.jdk8_home.as_path(),
            Jdk::Jdk17 => toolchain.jdk17_home.as_path(),
        }
    }
}

/// Snapshot of the current process environment.
pub fn inherited() -> EnvMap {
    std::env::vars_os().collect()
}

/// Builds the environment for a build: `JAVA_HOME` points at the JDK chosen
/// by `jdk_version` and `PATH` becomes `JAVA_HOME/bin`, then `tool_bin_dirs`,
/// then the inherited entries. Everything else in `base` passes through
/// untouched.
pub fn compose(
    jdk_version: &str,
    toolchain: &ToolchainConfig,
    tool_bin_dirs: &[PathBuf],
    base: &EnvMap,
) -> EnvMap {
    let java_home = Jdk::select(jdk_version).home(toolchain);
    let mut env = base.clone();
    env.insert(OsString::from("JAVA_HOME"), java_home.as_os_str().to_owned());

    let mut entries = vec![java_home.join("bin")];
    entries.extend_from_slice(tool_bin_dirs);
    if let Some(path) = base.get(OsStr::new("PATH")) {
        entries.extend(std::env::split_paths(path));
    }
    match std::env::join_paths(&entries) {
        Ok(path) => {
            env.insert(OsString::from("PATH"), path);
        }
        Err(e) => warn!("Could not extend PATH, leaving it unchanged: {}", e),
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env() -> EnvMap {
        let mut env = EnvMap::new();
        env.insert("PATH".into(), "/usr/bin:/bin".into());
        env.insert("HOME".into(), "/home/builder".into());
        env.insert("JAVA_HOME".into(), "/usr/lib/jvm/default".into());
        env
    }

    #[test]
    fn test_only_exact_17_selects_jdk17() {
        assert_eq!(Jdk::select("17"), Jdk::Jdk17);
        for version in ["8", "11", "", "1.8", "17.0", " 17", "seventeen"] {
            assert_eq!(Jdk::select(version), Jdk::Jdk8, "version {:?}", version);
        }
    }

    #[test]
    fn test_home_lookup() {
        let toolchain = ToolchainConfig::from_root("/tools");
        assert_eq!(Jdk::Jdk17.home(&toolchain), Path::new("/tools/jdks/temurin17"));
        assert_eq!(Jdk::Jdk8.home(&toolchain), Path::new("/tools/jdks/temurin8"));
    }

    #[test]
    fn test_compose_java_home_by_version() {
        let toolchain = ToolchainConfig::from_root("/tools");
        let bin = [PathBuf::from("/tools/maven/bin")];

        let env = compose("17", &toolchain, &bin, &base_env());
        assert_eq!(env[OsStr::new("JAVA_HOME")], "/tools/jdks/temurin17");

        for version in ["8", "11", "", "1.8"] {
            let env = compose(version, &toolchain, &bin, &base_env());
            assert_eq!(env[OsStr::new("JAVA_HOME")], "/tools/jdks/temurin8");
        }
    }

    #[test]
    fn test_compose_prepends_path() {
        let toolchain = ToolchainConfig::from_root("/tools");
        let env = compose(
            "17",
            &toolchain,
            &[PathBuf::from("/tools/maven/bin")],
            &base_env(),
        );

        assert_eq!(
            env[OsStr::new("PATH")],
            "/tools/jdks/temurin17/bin:/tools/maven/bin:/usr/bin:/bin"
        );
        assert_eq!(env[OsStr::new("HOME")], "/home/builder");
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn test_compose_without_inherited_path() {
        let toolchain = ToolchainConfig::from_root("/t");
        let env = compose("8", &toolchain, &[PathBuf::from("/gradle/bin")], &EnvMap::new());
        assert_eq!(env[OsStr::new("PATH")], "/t/jdks/temurin8/bin:/gradle/bin");
    }

    #[test]
    fn test_compose_leaves_base_untouched() {
        let toolchain = ToolchainConfig::from_root("/t");
        let base = base_env();
        let _ = compose("17", &toolchain, &[PathBuf::from("/mvn/bin")], &base);
        assert_eq!(base[OsStr::new("JAVA_HOME")], "/usr/lib/jvm/default");
        assert_eq!(base[OsStr::new("PATH")], "/usr/bin:/bin");
    }
}
