//! Test utilities for hpkg
//!
//! Helpers for writing tests against real archives and repositories instead
//! of mocks:
//! - [`init_test_logging`] wires `tracing` into the test harness once
//! - [`JarBuilder`] writes a jar with a chosen manifest and entries
//! - [`RepositoryBuilder`] lays out a local artifact repository with
//!   descriptors, ready for [`LocalRepository`]
//!
//! # Example
//!
//! ```rust,no_run
//! use hpkg_cli::test_utils::{JarBuilder, RepositoryBuilder};
//!
//! # fn example() -> anyhow::Result<()> {
//! let temp = tempfile::TempDir::new()?;
//! let repo = RepositoryBuilder::new(temp.path().join("repo"));
//! repo.library("org.example", "util", "1.0", &[])?;
//! repo.plugin("org.example", "credentials", "2.3", &[])?;
//!
//! let jar = JarBuilder::new()
//!     .attribute("Plugin-Version", "1.0")
//!     .entry("org/example/Foo.class", b"cafebabe")
//!     .write_to(&temp.path().join("foo.jar"))?;
//! # Ok(())
//! # }
//! ```

use crate::archive::Manifest;
use crate::artifact::ArtifactCoordinate;
use crate::constants::{MANIFEST_ENTRY, attr};
use crate::resolver::{ArtifactDescriptor, DeclaredDependency, LocalRepository};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `None` the `RUST_LOG`
/// environment variable decides; without it, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Writes a jar-format archive for tests.
#[derive(Debug, Clone)]
pub struct JarBuilder {
    manifest: Option<Manifest>,
    entries: Vec<(String, Vec<u8>)>,
}

impl Default for JarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JarBuilder {
    /// A jar whose manifest only carries `Manifest-Version: 1.0`.
    pub fn new() -> Self {
        let mut manifest = Manifest::new();
        manifest.insert(attr::MANIFEST_VERSION, "1.0");
        Self {
            manifest: Some(manifest),
            entries: Vec::new(),
        }
    }

    /// Sets a main-section manifest attribute.
    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        if let Some(manifest) = self.manifest.as_mut() {
            manifest.insert(name, value);
        }
        self
    }

    /// Drops `META-INF/MANIFEST.MF` altogether.
    pub fn without_manifest(mut self) -> Self {
        self.manifest = None;
        self
    }

    /// Adds a file entry.
    pub fn entry(mut self, name: &str, content: &[u8]) -> Self {
        self.entries.push((name.to_string(), content.to_vec()));
        self
    }

    /// Writes the archive, creating parent directories, and returns `path`.
    pub fn write_to(self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        if let Some(manifest) = &self.manifest {
            zip.start_file(MANIFEST_ENTRY, options)?;
            zip.write_all(&manifest.to_bytes())?;
        }
        for (name, content) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(content)?;
        }
        zip.finish()?;
        Ok(path.to_path_buf())
    }
}

/// Lays out a Maven-style local repository for tests.
#[derive(Debug, Clone)]
pub struct RepositoryBuilder {
    repository: LocalRepository,
}

impl RepositoryBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            repository: LocalRepository::new(root),
        }
    }

    #[must_use]
    pub fn repository(&self) -> &LocalRepository {
        &self.repository
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.repository.root()
    }

    /// Installs `jar` at the coordinate's location, plus a descriptor when
    /// a packaging or dependencies are given. Returns the artifact path.
    pub fn install(
        &self,
        coordinate: &ArtifactCoordinate,
        jar: JarBuilder,
        packaging: Option<&str>,
        dependencies: &[DeclaredDependency],
    ) -> Result<PathBuf> {
        let path = jar.write_to(&self.repository.artifact_path(coordinate))?;
        if packaging.is_some() || !dependencies.is_empty() {
            let descriptor = ArtifactDescriptor {
                packaging: packaging.map(str::to_string),
                dependencies: dependencies.to_vec(),
            };
            let text = toml::to_string(&descriptor)?;
            std::fs::write(self.repository.descriptor_path(coordinate), text)?;
        }
        Ok(path)
    }

    /// A plain library jar.
    pub fn library(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        dependencies: &[DeclaredDependency],
    ) -> Result<PathBuf> {
        let coordinate = ArtifactCoordinate::new(group_id, artifact_id, version);
        let jar = JarBuilder::new().entry(
            &format!("{}/{}.class", group_id.replace('.', "/"), artifact_id),
            b"\xca\xfe\xba\xbe",
        );
        self.install(&coordinate, jar, None, dependencies)
    }

    /// A plugin: its jar (with plugin manifest attributes) and its `hpi`
    /// archive side by side, with `hpi` packaging in the descriptor.
    /// Returns the jar path.
    pub fn plugin(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        dependencies: &[DeclaredDependency],
    ) -> Result<PathBuf> {
        self.plugin_for_host(group_id, artifact_id, version, None, dependencies)
    }

    /// Like [`plugin`](Self::plugin), with a `Jenkins-Version` attribute
    /// when `host_version` is given.
    pub fn plugin_for_host(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        host_version: Option<&str>,
        dependencies: &[DeclaredDependency],
    ) -> Result<PathBuf> {
        let plugin_jar = || {
            let jar = JarBuilder::new()
                .attribute(attr::SHORT_NAME, artifact_id)
                .attribute(attr::PLUGIN_VERSION, version)
                .attribute(attr::GROUP_ID, group_id);
            match host_version {
                Some(host) => jar.attribute(attr::JENKINS_VERSION, host),
                None => jar,
            }
        };
        let coordinate = ArtifactCoordinate::new(group_id, artifact_id, version);
        let jar = self.install(&coordinate, plugin_jar(), Some("hpi"), dependencies)?;
        plugin_jar()
            .entry("WEB-INF/lib/placeholder.txt", b"")
            .write_to(&self.repository.artifact_path(&coordinate.with_type("hpi")))?;
        Ok(jar)
    }

    /// A web application archive with the given entries.
    pub fn war(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        entries: &[(&str, &str)],
    ) -> Result<PathBuf> {
        let coordinate = ArtifactCoordinate::new(group_id, artifact_id, version).with_type("war");
        let mut jar = JarBuilder::new();
        for (name, content) in entries {
            jar = jar.entry(name, content.as_bytes());
        }
        self.install(&coordinate, jar, Some("war"), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::read_manifest;
    use crate::resolver::ResolutionService;
    use tempfile::TempDir;

    #[test]
    fn test_plugin_layout() {
        let temp = TempDir::new().unwrap();
        let repo = RepositoryBuilder::new(temp.path());
        let jar = repo.plugin("org.example", "credentials", "2.3", &[]).unwrap();

        let manifest = read_manifest(&jar).unwrap().unwrap();
        assert_eq!(manifest.get("Short-Name"), Some("credentials"));

        let coordinate = ArtifactCoordinate::new("org.example", "credentials", "2.3");
        let descriptor = repo.repository().describe(&coordinate).unwrap();
        assert_eq!(descriptor.packaging.as_deref(), Some("hpi"));
        assert!(repo.repository().resolve_file(&coordinate.with_type("hpi")).is_ok());
    }

    #[test]
    fn test_library_with_dependencies() {
        let temp = TempDir::new().unwrap();
        let repo = RepositoryBuilder::new(temp.path());
        repo.library("g", "a", "1", &[DeclaredDependency::new("g", "b", "2")]).unwrap();

        let descriptor =
            repo.repository().describe(&ArtifactCoordinate::new("g", "a", "1")).unwrap();
        assert_eq!(descriptor.dependencies.len(), 1);
        assert_eq!(descriptor.dependencies[0].artifact_id, "b");
    }
}
