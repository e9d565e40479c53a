//! The `package` command.
//!
//! ```bash
//! hpkg package
//! hpkg package --list-bundled
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, GlobalOptions, run_blocking};
use crate::archive::ZipArchiveWriter;
use crate::packaging::package;

/// Build the plugin archive.
#[derive(Args, Debug)]
pub struct PackageCommand {
    /// Print every bundled library
    #[arg(long)]
    list_bundled: bool,
}

impl PackageCommand {
    pub async fn execute(self, options: &GlobalOptions) -> Result<()> {
        let context = CommandContext::load(options).await?;
        let build = context.build;
        let report = run_blocking(move || package(&build, &ZipArchiveWriter)).await?;

        println!("{} {}", "Packaged".green().bold(), report.archive.display());
        println!(
            "  {} libraries bundled ({} copied, {} up to date), {} overlay file(s)",
            report.bundled.len(),
            report.assembly.copied,
            report.assembly.up_to_date,
            report.assembly.overlaid
        );
        if self.list_bundled {
            for name in &report.bundled {
                println!("  {}", name.cyan());
            }
        }
        Ok(())
    }
}
