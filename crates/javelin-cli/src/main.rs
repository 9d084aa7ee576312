use anyhow::Context;
use clap::{Parser, Subcommand};
use javelin_exec::backend::Backend;
use javelin_exec::{resolver, BuildConfig, ExecutionManager, ToolchainConfig, WorkspaceContext};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "javelin")]
#[command(about = "Compile Java projects with Maven or Gradle", long_about = None)]
struct Cli {
    /// TOML file describing the tool installations. Defaults to the layout
    /// under $JAVELIN_TOOLS_ROOT.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, build and optionally extract compiled classes
    Build {
        /// Workspace root (holds settings.xml and receives init.gradle)
        #[arg(long, value_name = "DIR")]
        workspace: PathBuf,
        /// Directory to build in, relative to the workspace root
        #[arg(long, value_name = "DIR")]
        subdir: Option<PathBuf>,
        /// Build tool: maven or gradle
        #[arg(long, default_value = "maven")]
        tool: String,
        /// JDK version; only "17" selects JDK 17, anything else uses JDK 8
        #[arg(long, default_value = "8")]
        jdk: String,
        /// Copy compiled classes to <DIR>/classes on success
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Print the outcome as JSON instead of the raw log
        #[arg(long)]
        json: bool,
    },
    /// Print the executable a build tool resolves to
    Resolve {
        #[arg(long)]
        tool: String,
    },
    /// Report which configured tool installations exist
    Doctor,
}

fn load_toolchain(path: Option<&Path>) -> anyhow::Result<ToolchainConfig> {
    match path {
        Some(path) => ToolchainConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ToolchainConfig::from_env()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let toolchain = load_toolchain(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            workspace,
            subdir,
            tool,
            jdk,
            output,
            json,
        } => {
            let manager = ExecutionManager::new(
                toolchain,
                BuildConfig::new(tool, jdk),
                WorkspaceContext::new(workspace, subdir.unwrap_or_default()),
            );
            let outcome = manager.execute(output.as_deref());

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.log);
            }
            if !outcome.success {
                std::process::exit(1);
            }
        }
        Commands::Resolve { tool } => {
            let backend: Backend = tool.parse()?;
            let adapter = backend.adapter();
            let installation = resolver::resolve(
                adapter.name(),
                adapter.executable_name(),
                adapter.install_root(&toolchain),
            )?;
            println!("{}", installation.executable.display());
        }
        Commands::Doctor => {
            for (name, home) in toolchain.homes() {
                let state = if home.exists() { "ok" } else { "missing" };
                println!("{:<8} {:<8} {}", name, state, home.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["javelin", "build", "--workspace", "/ws"]).unwrap();

        assert!(cli.config.is_none());
        match cli.command {
            Commands::Build {
                workspace,
                subdir,
                tool,
                jdk,
                output,
                json,
            } => {
                assert_eq!(workspace, PathBuf::from("/ws"));
                assert!(subdir.is_none());
                assert_eq!(tool, "maven");
                assert_eq!(jdk, "8");
                assert!(output.is_none());
                assert!(!json);
                let ctx = WorkspaceContext::new(workspace, subdir.unwrap_or_default());
                assert_eq!(ctx.build_dir(), PathBuf::from("/ws"));
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_build_with_subdir_and_global_config() {
        let cli = Cli::try_parse_from([
            "javelin",
            "build",
            "--workspace",
            "/ws",
            "--subdir",
            "server",
            "--tool",
            "gradle",
            "--jdk",
            "17",
            "--config",
            "/etc/javelin.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/javelin.toml")));
        match cli.command {
            Commands::Build { subdir, tool, jdk, .. } => {
                assert_eq!(subdir, Some(PathBuf::from("server")));
                assert_eq!(tool, "gradle");
                assert_eq!(jdk, "17");
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_build_requires_workspace() {
        assert!(Cli::try_parse_from(["javelin", "build"]).is_err());
    }
}
