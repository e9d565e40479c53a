//! Source-control facts for the manifest header.
//!
//! Only git is probed, and only when the project's SCM connection says it
//! lives in git. Any failure to run git simply leaves the value out.

use crate::utils::fs::to_slash_path;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs `git rev-parse` in the project's base directory.
#[derive(Debug, Clone)]
pub struct GitProbe {
    base_dir: PathBuf,
    git: Option<PathBuf>,
}

impl GitProbe {
    /// A probe that runs git only if `scm_connection` starts with `scm:git`
    /// and a git executable is on the `PATH`.
    pub fn new(base_dir: impl Into<PathBuf>, scm_connection: Option<&str>) -> Self {
        let uses_git = scm_connection.is_some_and(|c| c.starts_with("scm:git"));
        let git = if uses_git { which::which("git").ok() } else { None };
        Self {
            base_dir: base_dir.into(),
            git,
        }
    }

    /// A probe that never runs anything.
    pub fn disabled(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            git: None,
        }
    }

    fn rev_parse(&self, args: &[&str]) -> Option<String> {
        let git = self.git.as_ref()?;
        let output = Command::new(git)
            .arg("rev-parse")
            .args(args)
            .current_dir(&self.base_dir)
            .stdin(Stdio::null())
            .output();
        match output {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            }
            Ok(output) => {
                debug!(status = %output.status, ?args, "git rev-parse failed");
                None
            }
            Err(e) => {
                debug!(error = %e, ?args, "Failed to run git");
                None
            }
        }
    }

    /// Full hash of `HEAD`; `None` for a repository without commits.
    #[must_use]
    pub fn head_revision(&self) -> Option<String> {
        self.rev_parse(&["HEAD"]).filter(|hash| hash.len() >= 8)
    }

    /// Path of the base directory relative to the repository root, with
    /// forward slashes; `None` at the root itself.
    #[must_use]
    pub fn module_path(&self) -> Option<String> {
        let top_level = self.rev_parse(&["--show-toplevel"])?;
        relative_module_path(Path::new(&top_level), &self.base_dir)
    }
}

fn relative_module_path(top_level: &Path, base_dir: &Path) -> Option<String> {
    let top = top_level.canonicalize().unwrap_or_else(|_| top_level.to_path_buf());
    let base = base_dir.canonicalize().unwrap_or_else(|_| base_dir.to_path_buf());
    let relative = base.strip_prefix(&top).ok()?;
    let path = to_slash_path(relative);
    (!path.trim().is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_non_git_connection_is_skipped() {
        let temp = TempDir::new().unwrap();
        let probe = GitProbe::new(temp.path(), Some("scm:svn:https://example.org/repo"));
        assert_eq!(probe.head_revision(), None);
        assert_eq!(probe.module_path(), None);
        assert_eq!(GitProbe::new(temp.path(), None).head_revision(), None);
    }

    #[test]
    fn test_relative_module_path() {
        let temp = TempDir::new().unwrap();
        let module = temp.path().join("plugins/hello");
        std::fs::create_dir_all(&module).unwrap();
        assert_eq!(relative_module_path(temp.path(), &module), Some("plugins/hello".to_string()));
        assert_eq!(relative_module_path(temp.path(), temp.path()), None);
    }

    #[test]
    fn test_repository_without_commits() {
        if which::which("git").is_err() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let status = Command::new("git")
            .args(["init", "-q"])
            .current_dir(temp.path())
            .status()
            .unwrap();
        assert!(status.success());
        let module = temp.path().join("core");
        std::fs::create_dir_all(&module).unwrap();

        let probe = GitProbe::new(&module, Some("scm:git:https://example.org/repo.git"));
        assert_eq!(probe.head_revision(), None);
        assert_eq!(probe.module_path(), Some("core".to_string()));
    }
}
