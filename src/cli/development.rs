//! Local development commands: `hpl` and `record-core-location`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, GlobalOptions, run_blocking};
use crate::config::expand_path;
use crate::packaging::{record_core_location, write_hpl};
use crate::workspace_map::FileWorkspaceMap;

/// Write `{host-home}/plugins/{finalName}.hpl`.
#[derive(Args, Debug)]
pub struct HplCommand {
    /// Host home directory; defaults to `host-home` from the global config
    #[arg(long, value_name = "DIR")]
    host_home: Option<String>,
}

impl HplCommand {
    pub async fn execute(self, options: &GlobalOptions) -> Result<()> {
        let context = CommandContext::load(options).await?;
        let host_home = match self.host_home.as_deref() {
            Some(value) => Some(expand_path(value)?),
            None => context.config.host_home_path()?,
        };

        let build = context.build;
        let written = run_blocking(move || write_hpl(&build, host_home.as_deref())).await?;
        match written {
            Some(path) => println!("{} {}", "Wrote".green().bold(), path.display()),
            None => println!("{}", "Nothing to do: the project is not an hpi plugin".yellow()),
        }
        Ok(())
    }
}

/// Record the project's base directory in the workspace map.
#[derive(Args, Debug)]
pub struct RecordCoreLocationCommand {
    /// Workspace map file; defaults to `workspace-map` from the global config
    #[arg(long, value_name = "FILE")]
    workspace_map: Option<PathBuf>,
}

impl RecordCoreLocationCommand {
    pub async fn execute(self, options: &GlobalOptions) -> Result<()> {
        let context = CommandContext::load(options).await?;
        let map_path = match self.workspace_map {
            Some(path) => path,
            None => context.config.workspace_map_path()?,
        };

        let build = context.build;
        let recorded = run_blocking(move || {
            record_core_location(&build, &FileWorkspaceMap::new(map_path))
        })
        .await?;
        match recorded {
            Some(id) => println!("{} {id}", "Recorded".green().bold()),
            None => println!("{}", "Nothing to record: the project is not a snapshot".yellow()),
        }
        Ok(())
    }
}
