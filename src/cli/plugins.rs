//! Commands about plugin dependencies: `assemble-dependencies`,
//! `list-plugin-dependencies` and `validate`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, GlobalOptions, run_blocking};
use crate::artifact::Scope;
use crate::packaging::{AssembleOptions, assemble_dependencies, list_plugin_dependencies, validate};

/// Copy plugin dependency archives into one directory.
#[derive(Args, Debug)]
pub struct AssembleDependenciesCommand {
    /// Target directory (default: `{output-dir}/plugins`)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Comma separated scopes to follow
    #[arg(long, default_value = "compile,runtime")]
    scopes: String,

    /// Also follow optional dependencies
    #[arg(long)]
    include_optional: bool,
}

impl AssembleDependenciesCommand {
    pub async fn execute(self, options: &GlobalOptions) -> Result<()> {
        let scopes = Scope::parse_list(&self.scopes)?;
        let context = CommandContext::load(options).await?;
        let assemble = AssembleOptions {
            output: self.output,
            scopes,
            include_optional: self.include_optional,
        };

        let build = context.build;
        let report = run_blocking(move || assemble_dependencies(&build, &assemble)).await?;
        println!(
            "{} {} plugin(s) into {} ({} copied)",
            "Assembled".green().bold(),
            report.plugins.len(),
            report.output_dir.display(),
            report.copied.len()
        );
        for plugin in &report.plugins {
            println!("  {}", plugin.cyan());
        }
        Ok(())
    }
}

/// Print direct plugin dependencies as `groupId:artifactId:version`.
#[derive(Args, Debug)]
pub struct ListPluginDependenciesCommand {
    /// Also write the list to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl ListPluginDependenciesCommand {
    pub async fn execute(self, options: &GlobalOptions) -> Result<()> {
        let context = CommandContext::load(options).await?;
        let build = context.build;
        let output = self.output;
        let lines =
            run_blocking(move || list_plugin_dependencies(&build, output.as_deref())).await?;
        for line in lines {
            println!("{line}");
        }
        Ok(())
    }
}

/// Check plugin dependencies against the host version.
#[derive(Args, Debug)]
pub struct ValidateCommand {}

impl ValidateCommand {
    pub async fn execute(self, options: &GlobalOptions) -> Result<()> {
        let context = CommandContext::load(options).await?;
        let build = context.build;
        let report = run_blocking(move || validate(&build)).await?;

        println!(
            "{} {} plugin dependencies run on host {}",
            "✓".green(),
            report.checked,
            report.host_version.bold()
        );
        if let Some((artifact, required)) = report.max_required {
            println!("  highest requirement: {required} ({artifact})");
        }
        Ok(())
    }
}
