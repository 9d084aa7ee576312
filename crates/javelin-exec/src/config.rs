//! Toolchain layout and per-invocation build settings.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the directory that holds every tool install.
pub const TOOLS_ROOT_ENV: &str = "JAVELIN_TOOLS_ROOT";

/// Used when [`TOOLS_ROOT_ENV`] is unset.
pub const DEFAULT_TOOLS_ROOT: &str = "/opt/javelin/tools";

/// Locations of the JDK, Maven and Gradle installations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    pub tools_root: PathBuf,
    pub jdk8_home: PathBuf,
    pub jdk17_home: PathBuf,
    pub maven_home: PathBuf,
    pub gradle_home: PathBuf,
    /// Gradle init script copied into the workspace when it exists.
    pub gradle_init_template: PathBuf,
}

/// On-disk form of [`ToolchainConfig`]; every home is optional.
#[derive(Debug, Deserialize)]
struct RawToolchainConfig {
    tools_root: PathBuf,
    jdk8_home: Option<PathBuf>,
    jdk17_home: Option<PathBuf>,
    maven_home: Option<PathBuf>,
    gradle_home: Option<PathBuf>,
    gradle_init_template: Option<PathBuf>,
}

impl ToolchainConfig {
    /// Derives the standard layout below `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            jdk8_home: root.join("jdks").join("temurin8"),
            jdk17_home: root.join("jdks").join("temurin17"),
            maven_home: root.join("maven"),
            gradle_home: root.join("gradle"),
            gradle_init_template: root.join("templates").join("init.gradle"),
            tools_root: root,
        }
    }

    /// Uses `$JAVELIN_TOOLS_ROOT`, or [`DEFAULT_TOOLS_ROOT`] when unset.
    pub fn from_env() -> Self {
        let root = std::env::var_os(TOOLS_ROOT_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOOLS_ROOT));
        Self::from_root(root)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(value: &str) -> Result<Self, ConfigError> {
        let raw: RawToolchainConfig = toml::from_str(value)?;
        let defaults = Self::from_root(&raw.tools_root);
        Ok(Self {
            jdk8_home: raw.jdk8_home.unwrap_or(defaults.jdk8_home),
            jdk17_home: raw.jdk17_home.unwrap_or(defaults.jdk17_home),
            maven_home: raw.maven_home.unwrap_or(defaults.maven_home),
            gradle_home: raw.gradle_home.unwrap_or(defaults.gradle_home),
            gradle_init_template: raw
                .gradle_init_template
                .unwrap_or(defaults.gradle_init_template),
            tools_root: raw.tools_root,
        })
    }

    /// Tool homes in the order they are reported, labelled for logging.
    pub fn homes(&self) -> [(&'static str, &Path); 4] {
        [
            ("jdk8", self.jdk8_home.as_path()),
            ("jdk17", self.jdk17_home.as_path()),
            ("maven", self.maven_home.as_path()),
            ("gradle", self.gradle_home.as_path()),
        ]
    }

    /// Configured homes that are absent on disk.
    pub fn missing_paths(&self) -> Vec<PathBuf> {
        self.homes()
            .into_iter()
            .filter(|(_, path)| !path.exists())
            .map(|(_, path)| path.to_path_buf())
            .collect()
    }
}

/// Caller-selected build tool and JDK, kept as the raw strings the caller
/// supplied so an unsupported tool can be reported rather than rejected early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub build_tool: String,
    pub jdk_version: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_tool: "maven".to_string(),
            jdk_version: "8".to_string(),
        }
    }
}

impl BuildConfig {
    pub fn new(build_tool: impl Into<String>, jdk_version: impl Into<String>) -> Self {
        Self {
            build_tool: build_tool.into(),
            jdk_version: jdk_version.into(),
        }
    }
}

/// The project being built: `root` holds shared files such as `settings.xml`,
/// the build itself runs in `root/build_subpath`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    pub root: PathBuf,
    pub build_subpath: PathBuf,
}

impl WorkspaceContext {
    pub fn new(root: impl Into<PathBuf>, build_subpath: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            build_subpath: build_subpath.into(),
        }
    }

    /// Working directory of the build command.
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.build_subpath)
    }
}
