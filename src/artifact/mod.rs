//! Artifacts of a resolved dependency graph.
//!
//! An [`ArtifactCoordinate`] identifies an artifact the way the repository
//! does (`groupId:artifactId:type[:classifier]:version` plus the scope and
//! optional flag of the edge that brought it in). An [`ArtifactFacade`] wraps
//! one coordinate together with its resolved file and its dependency trail
//! and answers the questions the packaging engine keeps asking:
//!
//! - is it a plugin or a plain library ([`ArtifactFacade::is_plugin`])?
//! - which of two versions is newer ([`ArtifactFacade::is_newer_than`])?
//! - what file name does it get when bundled ([`ArtifactFacade::default_final_name`])?
//!
//! A facade is a read-only view: it is created once per resolved node and
//! never mutated afterwards.
//!
//! # Plugin detection
//!
//! An artifact is a plugin when its declared type or resolved packaging is
//! `hpi`/`jpi`, or when it is a `jar` whose `META-INF/MANIFEST.MF` carries a
//! `Plugin-Class` or `Plugin-Version` attribute. Anything else, including
//! directories (reactor build output) and missing files, is a library.
//!
//! ```rust,no_run
//! use hpkg_cli::artifact::{ArtifactCoordinate, ArtifactFacade};
//!
//! let coordinate = ArtifactCoordinate::new("org.example", "widgets", "1.2");
//! let facade = ArtifactFacade::new(coordinate).with_file("/repo/widgets-1.2.jar");
//! if facade.is_plugin_best_effort() {
//!     println!("{} is a plugin", facade.id());
//! }
//! ```

pub mod classify;
pub mod filters;

pub use classify::{ArchiveClassifier, ClassificationMode, KnownPlugins, PluginClassifier};
pub use filters::ArtifactSet;

use crate::archive::{Manifest, read_manifest};
use crate::constants::attr;
use crate::core::HpkgError;
use crate::version::ArtifactVersion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Dependency scope of an edge in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Needed to compile and run; bundled
    Compile,
    /// Supplied by the host at runtime; never bundled
    Provided,
    /// Needed only at runtime; bundled
    Runtime,
    /// Test classpath only
    Test,
    /// Supplied by the system; never bundled
    System,
}

impl Scope {
    /// Lower-case scope name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
        }
    }

    /// Scope of a transitive dependency given the scope of its parent edge.
    ///
    /// `system` and `test` dependencies keep their own scope. Below a
    /// `compile` (or root) edge the declared scope is kept; below `test` or
    /// `runtime` the parent scope wins; below `provided` or `system`
    /// everything becomes `provided`.
    #[must_use]
    pub const fn derive(parent: Option<Self>, declared: Self) -> Self {
        match (parent, declared) {
            (_, Self::System | Self::Test) => declared,
            (None | Some(Self::Compile), _) => declared,
            (Some(Self::Test), _) => Self::Test,
            (Some(Self::Runtime), _) => Self::Runtime,
            (Some(Self::Provided | Self::System), _) => Self::Provided,
        }
    }

    /// Parses a comma separated scope list such as `compile,runtime`.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, HpkgError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::from_str)
            .collect()
    }
}

impl FromStr for Scope {
    type Err = HpkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compile" => Ok(Self::Compile),
            "provided" => Ok(Self::Provided),
            "runtime" => Ok(Self::Runtime),
            "test" => Ok(Self::Test),
            "system" => Ok(Self::System),
            other => Err(HpkgError::ConfigError {
                message: format!("Unknown dependency scope '{other}'"),
            }),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default file extension for an artifact type.
#[must_use]
pub fn extension_for_type(artifact_type: &str) -> &str {
    match artifact_type {
        "ejb" | "ejb-client" | "test-jar" | "java-source" | "javadoc" => "jar",
        other => other,
    }
}

/// Coordinates of one artifact plus the scope and optional flag of its edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub artifact_type: String,
    pub classifier: Option<String>,
    /// `None` for the root of a graph.
    pub scope: Option<Scope>,
    pub optional: bool,
}

impl ArtifactCoordinate {
    /// A `jar` coordinate in `compile` scope.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            artifact_type: "jar".to_string(),
            classifier: None,
            scope: Some(Scope::Compile),
            optional: false,
        }
    }

    #[must_use]
    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// `groupId:artifactId:type[:classifier]:version`
    #[must_use]
    pub fn id(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.artifact_type, classifier, self.version
            ),
            None => format!(
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.artifact_type, self.version
            ),
        }
    }

    /// `groupId:artifactId`
    #[must_use]
    pub fn ga(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// File extension implied by the type.
    #[must_use]
    pub fn extension(&self) -> &str {
        extension_for_type(&self.artifact_type)
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Free-text qualifier appended to snapshot plugin versions, e.g. `1.0-SNAPSHOT (private-abc-dev)`.
static PLUGIN_VERSION_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" [(].+[)]$").expect("plugin version qualifier pattern is valid"));

fn is_plugin_packaging(value: &str) -> bool {
    matches!(value, "hpi" | "jpi")
}

/// Read-only view over one resolved artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFacade {
    coordinate: ArtifactCoordinate,
    file: Option<PathBuf>,
    trail: Vec<String>,
    packaging: Option<String>,
    premanaged_version: Option<String>,
}

impl ArtifactFacade {
    /// Wraps a coordinate with no file and an empty trail.
    #[must_use]
    pub fn new(coordinate: ArtifactCoordinate) -> Self {
        Self {
            coordinate,
            file: None,
            trail: Vec::new(),
            packaging: None,
            premanaged_version: None,
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the dependency trail (root first, this artifact last).
    #[must_use]
    pub fn with_trail(mut self, trail: Vec<String>) -> Self {
        self.trail = trail;
        self
    }

    /// Records the packaging declared by the artifact's own descriptor.
    #[must_use]
    pub fn with_packaging(mut self, packaging: Option<String>) -> Self {
        self.packaging = packaging;
        self
    }

    /// Records the version before dependency management replaced it.
    #[must_use]
    pub fn with_premanaged_version(mut self, version: Option<String>) -> Self {
        self.premanaged_version = version;
        self
    }

    #[must_use]
    pub const fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.coordinate.group_id
    }

    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.coordinate.artifact_id
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.coordinate.version
    }

    #[must_use]
    pub fn artifact_type(&self) -> &str {
        &self.coordinate.artifact_type
    }

    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.coordinate.classifier.as_deref()
    }

    #[must_use]
    pub const fn scope(&self) -> Option<Scope> {
        self.coordinate.scope
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.coordinate.optional
    }

    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    #[must_use]
    pub fn trail(&self) -> &[String] {
        &self.trail
    }

    #[must_use]
    pub fn packaging(&self) -> Option<&str> {
        self.packaging.as_deref()
    }

    #[must_use]
    pub fn premanaged_version(&self) -> Option<&str> {
        self.premanaged_version.as_deref()
    }

    /// `groupId:artifactId:type[:classifier]:version`
    #[must_use]
    pub fn id(&self) -> String {
        self.coordinate.id()
    }

    #[must_use]
    pub fn has_same_ga(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id() == group_id && self.artifact_id() == artifact_id
    }

    /// Returns true if the artifact is a plugin.
    ///
    /// Declared `hpi`/`jpi` types and packagings are plugins without looking
    /// at any file. Other non-`jar` types, missing files and directories are
    /// never plugins. For a regular jar the manifest decides.
    ///
    /// # Errors
    ///
    /// [`HpkgError::Classification`] when the jar cannot be opened or read.
    pub fn is_plugin(&self) -> Result<bool, HpkgError> {
        if is_plugin_packaging(self.artifact_type())
            || self.packaging().is_some_and(is_plugin_packaging)
        {
            return Ok(true);
        }
        if self.artifact_type() != "jar" {
            return Ok(false);
        }
        let Some(file) = self.file() else {
            return Ok(false);
        };
        if !file.is_file() {
            debug!(artifact = %self.id(), path = %file.display(), "Not a regular file, treating as library");
            return Ok(false);
        }

        let manifest = read_manifest(file).map_err(|e| HpkgError::Classification {
            artifact: self.id(),
            path: file.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(manifest.is_some_and(|m| {
            m.contains(attr::PLUGIN_CLASS) || m.contains(attr::PLUGIN_VERSION)
        }))
    }

    /// Like [`is_plugin`](Self::is_plugin) but logs failures and answers `false`.
    #[must_use]
    pub fn is_plugin_best_effort(&self) -> bool {
        match self.is_plugin() {
            Ok(is_plugin) => is_plugin,
            Err(e) => {
                warn!("Could not tell whether {} is a plugin, assuming it is not: {e}", self.id());
                false
            }
        }
    }

    /// Negation of [`is_plugin`](Self::is_plugin).
    pub fn is_library(&self) -> Result<bool, HpkgError> {
        self.is_plugin().map(|p| !p)
    }

    /// Strictly newer by version ordering; equal versions are not newer.
    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        ArtifactVersion::parse(self.version()) > ArtifactVersion::parse(other.version())
    }

    /// `{artifactId}-{version}[-{classifier}].{extension}`
    #[must_use]
    pub fn default_final_name(&self) -> String {
        let mut name = format!("{}-{}", self.artifact_id(), self.version());
        if let Some(classifier) = self.classifier() {
            name.push('-');
            name.push_str(classifier);
        }
        name.push('.');
        name.push_str(self.coordinate.extension());
        name
    }

    /// The manifest of the artifact's file, if it is a readable jar.
    pub fn read_manifest(&self) -> Result<Option<Manifest>, HpkgError> {
        match self.file() {
            Some(file) if file.is_file() => read_manifest(file),
            _ => Ok(None),
        }
    }

    /// Short name the host knows this plugin by (`Short-Name`), falling back
    /// to the artifactId.
    pub fn actual_artifact_id(&self) -> Result<String, HpkgError> {
        let manifest = self.read_manifest()?;
        Ok(manifest
            .and_then(|m| m.get(attr::SHORT_NAME).map(str::to_string))
            .unwrap_or_else(|| self.artifact_id().to_string()))
    }

    /// Plugin version without the trailing ` (qualifier)`, falling back to
    /// the coordinate version.
    pub fn actual_version(&self) -> Result<String, HpkgError> {
        let manifest = self.read_manifest()?;
        Ok(match manifest.as_ref().and_then(|m| m.get(attr::PLUGIN_VERSION)) {
            Some(version) => PLUGIN_VERSION_QUALIFIER.replace(version, "").into_owned(),
            None => self.version().to_string(),
        })
    }
}

impl fmt::Display for ArtifactFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::JarBuilder;
    use tempfile::TempDir;

    fn jar(artifact_id: &str, version: &str) -> ArtifactFacade {
        ArtifactFacade::new(ArtifactCoordinate::new("org.example", artifact_id, version))
    }

    #[test]
    fn test_id_and_final_name() {
        let plain = jar("widgets", "1.2");
        assert_eq!(plain.id(), "org.example:widgets:jar:1.2");
        assert_eq!(plain.default_final_name(), "widgets-1.2.jar");

        let classified = ArtifactFacade::new(
            ArtifactCoordinate::new("org.example", "widgets", "1.2")
                .with_type("ejb-client")
                .with_classifier("client"),
        );
        assert_eq!(classified.id(), "org.example:widgets:ejb-client:client:1.2");
        assert_eq!(classified.default_final_name(), "widgets-1.2-client.jar");

        let par = ArtifactFacade::new(
            ArtifactCoordinate::new("org.example", "legacy", "0.9").with_type("par"),
        );
        assert_eq!(par.default_final_name(), "legacy-0.9.par");
    }

    #[test]
    fn test_is_plugin_by_manifest() {
        let temp = TempDir::new().unwrap();
        let with_class = JarBuilder::new()
            .attribute("Plugin-Class", "org.example.PluginImpl")
            .write_to(&temp.path().join("a.jar"))
            .unwrap();
        let with_version = JarBuilder::new()
            .attribute("Plugin-Version", "1.0")
            .write_to(&temp.path().join("b.jar"))
            .unwrap();
        let plain = JarBuilder::new()
            .attribute("Implementation-Version", "1.0")
            .write_to(&temp.path().join("c.jar"))
            .unwrap();

        assert!(jar("a", "1").with_file(with_class).is_plugin().unwrap());
        assert!(jar("b", "1").with_file(with_version).is_plugin().unwrap());
        assert!(!jar("c", "1").with_file(&plain).is_plugin().unwrap());
        assert!(jar("c", "1").with_file(plain).is_library().unwrap());
    }

    #[test]
    fn test_is_plugin_false_without_opening() {
        let temp = TempDir::new().unwrap();
        let garbage = temp.path().join("garbage.war");
        std::fs::write(&garbage, b"not a zip").unwrap();

        let war = ArtifactFacade::new(
            ArtifactCoordinate::new("org.example", "web", "1").with_type("war"),
        )
        .with_file(&garbage);
        assert!(!war.is_plugin().unwrap());

        let directory = jar("reactor", "1").with_file(temp.path());
        assert!(!directory.is_plugin().unwrap());

        let missing = jar("missing", "1").with_file(temp.path().join("nope.jar"));
        assert!(!missing.is_plugin().unwrap());

        assert!(!jar("unresolved", "1").is_plugin().unwrap());
    }

    #[test]
    fn test_declared_plugin_type_or_packaging() {
        let hpi = ArtifactFacade::new(
            ArtifactCoordinate::new("org.example", "p", "1").with_type("hpi"),
        );
        assert!(hpi.is_plugin().unwrap());
        let packaged = jar("p", "1").with_packaging(Some("jpi".to_string()));
        assert!(packaged.is_plugin().unwrap());
    }

    #[test]
    fn test_is_plugin_strict_vs_best_effort() {
        let temp = TempDir::new().unwrap();
        let corrupt = temp.path().join("corrupt.jar");
        std::fs::write(&corrupt, b"PK\x03\x04 truncated").unwrap();
        let facade = jar("corrupt", "1").with_file(&corrupt);

        let err = facade.is_plugin().unwrap_err();
        assert!(matches!(err, HpkgError::Classification { .. }));
        assert!(err.to_string().contains("Failed to open artifact"));
        assert!(!facade.is_plugin_best_effort());
    }

    #[test]
    fn test_is_newer_than() {
        assert!(jar("l2", "1.2").is_newer_than(&jar("l2", "1.0")));
        assert!(!jar("l2", "1.0").is_newer_than(&jar("l2", "1.2")));
        assert!(!jar("l2", "1.0").is_newer_than(&jar("l2", "1.0")));
        assert!(jar("l2", "1.0").is_newer_than(&jar("l2", "1.0-SNAPSHOT")));
    }

    #[test]
    fn test_actual_id_and_version() {
        let temp = TempDir::new().unwrap();
        let file = JarBuilder::new()
            .attribute("Short-Name", "credentials")
            .attribute("Plugin-Version", "2.1-SNAPSHOT (private-01/02/2024 10:00-dev)")
            .write_to(&temp.path().join("credentials-plugin.jar"))
            .unwrap();
        let facade = jar("credentials-plugin", "2.1-SNAPSHOT").with_file(file);

        assert_eq!(facade.actual_artifact_id().unwrap(), "credentials");
        assert_eq!(facade.actual_version().unwrap(), "2.1-SNAPSHOT");

        let unresolved = jar("other", "3.0");
        assert_eq!(unresolved.actual_artifact_id().unwrap(), "other");
        assert_eq!(unresolved.actual_version().unwrap(), "3.0");
    }

    #[test]
    fn test_plugin_version_qualifier() {
        let strip = |v: &str| PLUGIN_VERSION_QUALIFIER.replace(v, "").into_owned();
        assert_eq!(strip("1.0-SNAPSHOT (private-abc-dev)"), "1.0-SNAPSHOT");
        assert_eq!(strip("1.0"), "1.0");
        assert_eq!(strip("1.0 (beta) final"), "1.0 (beta) final");
        assert_eq!(strip("1.0(beta)"), "1.0(beta)");
    }

    #[test]
    fn test_scope_derivation() {
        use Scope::*;
        assert_eq!(Scope::derive(None, Runtime), Runtime);
        assert_eq!(Scope::derive(Some(Compile), Runtime), Runtime);
        assert_eq!(Scope::derive(Some(Runtime), Compile), Runtime);
        assert_eq!(Scope::derive(Some(Test), Compile), Test);
        assert_eq!(Scope::derive(Some(Provided), Compile), Provided);
        assert_eq!(Scope::derive(Some(Compile), Test), Test);
        assert_eq!(Scope::derive(Some(Runtime), System), System);
    }

    #[test]
    fn test_scope_parse_list() {
        assert_eq!(
            Scope::parse_list("compile, runtime").unwrap(),
            vec![Scope::Compile, Scope::Runtime]
        );
        assert!(Scope::parse_list("compile,bogus").is_err());
        assert!(Scope::parse_list("").unwrap().is_empty());
    }
}
