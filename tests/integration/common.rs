//! Shared harness for the integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use hpkg_cli::resolver::DeclaredDependency;
use hpkg_cli::test_utils::RepositoryBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Provided dependency on the host core, present in every test project.
pub const HOST_CORE: &str = r#"
[[dependencies]]
group-id = "org.jenkins-ci.main"
artifact-id = "jenkins-core"
version = "2.401"
scope = "provided"
"#;

/// A plugin project, a local repository and a global config pointing at it.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    root: PathBuf,
    project_dir: PathBuf,
    config_path: PathBuf,
    repository: RepositoryBuilder,
}

impl TestProject {
    /// Creates the layout and a repository holding the host core.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_path_buf();
        let project_dir = root.join("hello");
        fs::create_dir_all(&project_dir)?;

        let repository = RepositoryBuilder::new(root.join("repository"));
        repository.library("org.jenkins-ci.main", "jenkins-core", "2.401", &[])?;

        let config_path = root.join("config.toml");
        let config = format!(
            "repository = {:?}\nworkspace-map = {:?}\nhost-home = {:?}\n",
            repository.root().display().to_string(),
            root.join("hpl-map").display().to_string(),
            root.join("host-home").display().to_string(),
        );
        fs::write(&config_path, config)?;

        Ok(Self {
            _temp_dir: temp_dir,
            root,
            project_dir,
            config_path,
            repository,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn repository(&self) -> &RepositoryBuilder {
        &self.repository
    }

    /// Writes `hpkg.toml` for `org.example:hello:{version}` with the host
    /// core dependency followed by `extra`.
    pub fn write_project(&self, version: &str, extra: &str) -> Result<()> {
        let content = format!(
            "[project]\ngroup-id = \"org.example\"\nartifact-id = \"hello\"\nversion = \"{version}\"\nname = \"Hello Plugin\"\n{HOST_CORE}\n{extra}"
        );
        let path = self.project_dir.join("hpkg.toml");
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Creates a compiled class and a webapp file so `package` has inputs.
    pub fn write_sources(&self) -> Result<()> {
        let classes = self.project_dir.join("target/classes/org/example");
        fs::create_dir_all(&classes)?;
        fs::write(classes.join("HelloBuilder.class"), b"\xca\xfe\xba\xbe")?;
        let webapp = self.project_dir.join("src/main/webapp");
        fs::create_dir_all(&webapp)?;
        fs::write(webapp.join("help.html"), "<div>Hello</div>")?;
        Ok(())
    }

    /// `hpkg` with the test config, run from the project directory.
    pub fn hpkg(&self) -> Command {
        let mut cmd = Command::cargo_bin("hpkg").expect("hpkg binary is built");
        cmd.arg("--config")
            .arg(&self.config_path)
            .current_dir(&self.project_dir)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("HPKG_CONFIG");
        cmd
    }
}

/// A `[[dependencies]]` block on `org.example:{artifact_id}:{version}`.
pub fn dependency(artifact_id: &str, version: &str) -> String {
    format!(
        "\n[[dependencies]]\ngroup-id = \"org.example\"\nartifact-id = \"{artifact_id}\"\nversion = \"{version}\"\n"
    )
}

/// Shorthand for a declared dependency in `org.example`.
pub fn declared(artifact_id: &str, version: &str) -> DeclaredDependency {
    DeclaredDependency::new("org.example", artifact_id, version)
}
