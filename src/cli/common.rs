//! Shared plumbing for CLI commands

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::GlobalConfig;
use crate::core::HpkgError;
use crate::packaging::BuildContext;
use crate::project::{Project, find_project_file};
use crate::resolver::LocalRepository;

/// Options every command inherits from the top level.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub manifest_path: Option<PathBuf>,
}

impl GlobalOptions {
    /// Loads the global configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration file exists but is invalid
    pub async fn load_config(&self) -> Result<GlobalConfig> {
        GlobalConfig::load_with_optional(self.config.clone()).await
    }
}

/// Everything a goal needs: configuration, project and repository.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: GlobalConfig,
    /// Path to the project file
    pub project_file: PathBuf,
    pub build: BuildContext,
}

impl CommandContext {
    /// Finds and loads the project and the global configuration.
    ///
    /// # Errors
    /// Returns an error if no project file is found, the project or the
    /// configuration is invalid, or the repository path cannot be expanded
    pub async fn load(options: &GlobalOptions) -> Result<Self> {
        let config = options.load_config().await?;

        let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
        let project_file = find_project_file(options.manifest_path.as_deref(), &cwd)?;
        let project = Project::load(&project_file)?;

        let repository = LocalRepository::new(config.repository_path()?);
        tracing::debug!(
            project = %project_file.display(),
            repository = %repository.root().display(),
            "Loaded project"
        );

        Ok(Self {
            config,
            project_file,
            build: BuildContext::new(project, repository),
        })
    }
}

/// Runs a synchronous goal on the blocking pool.
///
/// # Errors
/// Returns the goal's error, or an error if the task panicked
pub async fn run_blocking<T, F>(goal: F) -> Result<T>
where
    F: FnOnce() -> Result<T, HpkgError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(goal).await.context("Packaging task failed")?;
    Ok(result?)
}
