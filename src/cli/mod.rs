//! Command-line interface for hpkg.
//!
//! Every subcommand runs one packaging goal against the project found from
//! the working directory (or `--manifest-path`):
//!
//! | Command | Goal |
//! |---------|------|
//! | `package` | build `{finalName}.hpi` with its bundled libraries |
//! | `hpl` | write a local descriptor into a host home for development |
//! | `assemble-dependencies` | copy every plugin dependency's archive into one directory |
//! | `list-plugin-dependencies` | print the direct plugin dependencies |
//! | `validate` | check plugin dependencies against the host version |
//! | `record-core-location` | record a snapshot's workspace in the workspace map |
//! | `tree` | show the dependency tree with bundling decisions |
//! | `isolation check` | evaluate names against a class-isolation chain |
//!
//! # Global Options
//!
//! - `--verbose` / `--quiet` - log level (`debug` / `error`; default `info`,
//!   `RUST_LOG` wins when set)
//! - `--config` - global configuration file (default `~/.hpkg/config.toml`)
//! - `--manifest-path` - project file or directory to use instead of
//!   searching upwards for `hpkg.toml`
//!
//! # Example
//!
//! ```bash
//! hpkg package
//! hpkg --verbose tree --format json
//! hpkg assemble-dependencies --output work/plugins --scopes compile,runtime,provided
//! hpkg isolation check --chain servlet javax.servlet.Filter org.apache.maven.Maven
//! ```

pub mod common;
mod development;
mod isolation;
mod package;
mod plugins;
mod tree;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use common::{CommandContext, GlobalOptions};

/// Main CLI structure for hpkg.
#[derive(Parser, Debug)]
#[command(
    name = "hpkg",
    about = "Plugin packager - builds plugin archives with their bundled libraries",
    version,
    long_about = "hpkg resolves a plugin project's dependencies, decides which libraries to \
                  bundle and which dependencies are plugins loaded by the host, and writes the \
                  plugin archive together with its manifest header."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output (wins over `--quiet`)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file
    ///
    /// Defaults to `~/.hpkg/config.toml`. The file sets the local repository,
    /// the workspace map and the default host home.
    #[arg(short, long, global = true, env = "HPKG_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the project file (hpkg.toml) or its directory
    ///
    /// By default hpkg searches the current directory and its parents.
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the plugin archive
    Package(package::PackageCommand),

    /// Write a local `.hpl` descriptor into a host home
    Hpl(development::HplCommand),

    /// Copy the archives of all plugin dependencies into one directory
    AssembleDependencies(plugins::AssembleDependenciesCommand),

    /// Print the direct plugin dependencies
    ListPluginDependencies(plugins::ListPluginDependenciesCommand),

    /// Check that plugin dependencies run on the project's host version
    Validate(plugins::ValidateCommand),

    /// Record a snapshot project's workspace in the workspace map
    RecordCoreLocation(development::RecordCoreLocationCommand),

    /// Show the dependency tree with bundling decisions
    Tree(tree::TreeCommand),

    /// Inspect the class-isolation chains
    Isolation(isolation::IsolationCommand),
}

impl Cli {
    /// Log filter for the subscriber when `RUST_LOG` is not set.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Runs the selected subcommand.
    ///
    /// # Errors
    ///
    /// Whatever the command reports; `main` renders it with
    /// [`user_friendly_error`](crate::core::user_friendly_error).
    pub async fn execute(self) -> Result<()> {
        let options = GlobalOptions {
            config: self.config,
            manifest_path: self.manifest_path,
        };
        match self.command {
            Commands::Package(cmd) => cmd.execute(&options).await,
            Commands::Hpl(cmd) => cmd.execute(&options).await,
            Commands::AssembleDependencies(cmd) => cmd.execute(&options).await,
            Commands::ListPluginDependencies(cmd) => cmd.execute(&options).await,
            Commands::Validate(cmd) => cmd.execute(&options).await,
            Commands::RecordCoreLocation(cmd) => cmd.execute(&options).await,
            Commands::Tree(cmd) => cmd.execute(&options).await,
            Commands::Isolation(cmd) => cmd.execute().await,
        }
    }
}
