//! Project descriptor (`hpkg.toml`) parsing and validation.
//!
//! The descriptor names the component being packaged, where its build
//! output lives, how its manifest header is computed and what it depends
//! on. It is discovered by walking up from the working directory, the same
//! way git looks for `.git`.
//!
//! # Example
//!
//! ```toml
//! [project]
//! group-id = "org.example"
//! artifact-id = "hello"
//! version = "1.2-SNAPSHOT"
//! name = "Hello Plugin"
//!
//! [[project.developers]]
//! id = "jdoe"
//! name = "Jane Doe"
//!
//! [build]
//! classes-dir = "target/classes"
//!
//! [plugin]
//! compatible-since-version = "1.0"
//! mask-classes = "org.example.shaded."
//!
//! [[dependencies]]
//! group-id = "org.jenkins-ci.main"
//! artifact-id = "jenkins-core"
//! version = "2.401"
//! scope = "provided"
//!
//! [[dependencies]]
//! group-id = "org.example"
//! artifact-id = "credentials"
//! version = "2.3"
//! type = "hpi"
//! ```
//!
//! Relative paths in `[build]` resolve against `base-dir`, which itself
//! resolves against the directory holding `hpkg.toml`.

use crate::artifact::{ArtifactCoordinate, ArtifactFacade};
use crate::assembler::OverlayFilter;
use crate::constants::{DEFAULT_HOST_CORE_IDS, DEFAULT_HOST_CORE_MARKERS, PROJECT_FILE};
use crate::core::HpkgError;
use crate::resolver::{CollectRequest, DeclaredDependency, TrailSubstringMatcher};
use crate::utils::fs::find_upwards;
use crate::version::is_snapshot;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Packaging of the project itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Packaging {
    /// A regular plugin archive.
    #[default]
    Hpi,
    /// A core module; its header carries no `Plugin-Version`.
    JenkinsModule,
    Jar,
}

impl Packaging {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hpi => "hpi",
            Self::JenkinsModule => "jenkins-module",
            Self::Jar => "jar",
        }
    }
}

impl fmt::Display for Packaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File extension of the produced plugin archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginExtension {
    #[default]
    Hpi,
    Jpi,
}

impl PluginExtension {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hpi => "hpi",
            Self::Jpi => "jpi",
        }
    }
}

impl fmt::Display for PluginExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Developer {
    pub name: Option<String>,
    pub id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct License {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Source control coordinates copied into the manifest header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scm {
    pub connection: Option<String>,
    pub tag: Option<String>,
    pub url: Option<String>,
}

/// The `[project]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectInfo {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default)]
    pub packaging: Packaging,
    pub name: Option<String>,
    pub url: Option<String>,
    pub final_name: Option<String>,
    #[serde(default)]
    pub developers: Vec<Developer>,
    #[serde(default)]
    pub licenses: Vec<License>,
    pub scm: Option<Scm>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_classes_dir() -> PathBuf {
    PathBuf::from("target/classes")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("target")
}

fn default_webapp_dir() -> PathBuf {
    PathBuf::from("src/main/webapp")
}

fn default_resources() -> Vec<PathBuf> {
    vec![PathBuf::from("src/main/resources")]
}

fn default_war_includes() -> Vec<String> {
    vec!["**".to_string()]
}

fn default_war_excludes() -> Vec<String> {
    vec!["META-INF/**".to_string()]
}

/// The `[build]` table: where inputs and outputs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    pub base_dir: Option<PathBuf>,
    #[serde(default = "default_classes_dir")]
    pub classes_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_webapp_dir")]
    pub webapp_dir: PathBuf,
    #[serde(default = "default_resources")]
    pub resources: Vec<PathBuf>,
    #[serde(default = "default_war_includes")]
    pub dependent_war_includes: Vec<String>,
    #[serde(default = "default_war_excludes")]
    pub dependent_war_excludes: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            classes_dir: default_classes_dir(),
            output_dir: default_output_dir(),
            webapp_dir: default_webapp_dir(),
            resources: default_resources(),
            dependent_war_includes: default_war_includes(),
            dependent_war_excludes: default_war_excludes(),
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_host_core_markers() -> Vec<String> {
    DEFAULT_HOST_CORE_MARKERS.iter().map(|m| (*m).to_string()).collect()
}

/// The `[plugin]` table: inputs of the manifest header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginConfig {
    pub compatible_since_version: Option<String>,
    pub sandbox_status: Option<String>,
    pub mask_classes: Option<String>,
    pub global_mask_classes: Option<String>,
    #[serde(default)]
    pub plugin_first_class_loader: bool,
    pub snapshot_version_override: Option<String>,
    #[serde(default = "default_true")]
    pub fail_on_version_override_to_different_release: bool,
    pub version_description: Option<String>,
    /// `groupId:artifactId` of the host core dependency.
    pub host_core_id: Option<String>,
    pub host_version_override: Option<String>,
    #[serde(default)]
    pub extension: PluginExtension,
    #[serde(default = "default_host_core_markers")]
    pub host_core_markers: Vec<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            compatible_since_version: None,
            sandbox_status: None,
            mask_classes: None,
            global_mask_classes: None,
            plugin_first_class_loader: false,
            snapshot_version_override: None,
            fail_on_version_override_to_different_release: true,
            version_description: None,
            host_core_id: None,
            host_version_override: None,
            extension: PluginExtension::default(),
            host_core_markers: default_host_core_markers(),
        }
    }
}

/// A parsed and validated `hpkg.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    pub project: ProjectInfo,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub dependencies: Vec<DeclaredDependency>,
    #[serde(default)]
    pub dependency_management: Vec<DeclaredDependency>,
    /// Directory containing `hpkg.toml`.
    #[serde(skip)]
    project_dir: PathBuf,
}

/// Finds `hpkg.toml`: `explicit` if given, else the nearest one at or
/// above `start`.
///
/// # Errors
///
/// [`HpkgError::ProjectNotFound`] if the explicit path does not exist or
/// no descriptor is found.
pub fn find_project_file(explicit: Option<&Path>, start: &Path) -> Result<PathBuf, HpkgError> {
    match explicit {
        Some(path) if path.is_dir() => {
            let file = path.join(PROJECT_FILE);
            if file.is_file() { Ok(file) } else { Err(HpkgError::ProjectNotFound) }
        }
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(_) => Err(HpkgError::ProjectNotFound),
        None => find_upwards(start, PROJECT_FILE).ok_or(HpkgError::ProjectNotFound),
    }
}

impl Project {
    /// Reads, parses and validates the descriptor at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML for this schema
    /// ([`HpkgError::ProjectParseError`]), or fails [`Project::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {}", path.display()))?;
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let project_dir = std::path::absolute(parent)
            .with_context(|| format!("Cannot resolve directory of {}", path.display()))?;
        Self::parse(&content, &path.display().to_string(), project_dir)
    }

    /// Parses descriptor text as if it were stored in `project_dir`.
    ///
    /// # Errors
    ///
    /// See [`Project::load`].
    pub fn parse(content: &str, file: &str, project_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut project: Self = toml::from_str(content)
            .map_err(|e| HpkgError::ProjectParseError {
                file: file.to_string(),
                reason: e.to_string(),
            })
            .with_context(|| {
                format!(
                    "Invalid project file {file}\n\n\
                    Required keys: [project] group-id, artifact-id and version"
                )
            })?;
        project.project_dir = project_dir.into();
        project.validate()?;
        Ok(project)
    }

    /// Checks the semantic rules the TOML schema cannot express.
    ///
    /// # Errors
    ///
    /// [`HpkgError::ProjectValidationError`] naming the first problem.
    pub fn validate(&self) -> Result<(), HpkgError> {
        let invalid = |reason: String| Err(HpkgError::ProjectValidationError { reason });

        for (key, value) in [
            ("group-id", &self.project.group_id),
            ("artifact-id", &self.project.artifact_id),
            ("version", &self.project.version),
        ] {
            if value.trim().is_empty() {
                return invalid(format!("[project] {key} must not be empty"));
            }
        }
        if let Some(final_name) = &self.project.final_name
            && final_name.trim().is_empty()
        {
            return invalid("[project] final-name must not be empty when set".to_string());
        }
        if let Some(id) = &self.plugin.host_core_id
            && split_ga(id).is_none()
        {
            return invalid(format!(
                "[plugin] host-core-id '{id}' must have the form groupId:artifactId"
            ));
        }
        if self.plugin.host_core_markers.iter().any(|m| m.is_empty()) {
            return invalid("[plugin] host-core-markers must not contain empty entries".to_string());
        }

        for (table, entries) in [
            ("dependencies", &self.dependencies),
            ("dependency-management", &self.dependency_management),
        ] {
            for dependency in entries {
                if dependency.group_id.trim().is_empty() || dependency.artifact_id.trim().is_empty() {
                    return invalid(format!(
                        "[[{table}]] entries need a group-id and an artifact-id"
                    ));
                }
                if dependency.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
                    return invalid(format!("[[{table}]] {} has an empty version", dependency.ga()));
                }
            }
        }
        Ok(())
    }

    pub fn group_id(&self) -> &str {
        &self.project.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.project.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.project.version
    }

    pub const fn packaging(&self) -> Packaging {
        self.project.packaging
    }

    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        is_snapshot(&self.project.version)
    }

    /// `name`, or the artifactId when no name is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.project.name.as_deref().unwrap_or(&self.project.artifact_id)
    }

    /// `final-name`, defaulting to `{artifactId}-{version}`.
    #[must_use]
    pub fn final_name(&self) -> String {
        self.project
            .final_name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.project.artifact_id, self.project.version))
    }

    /// A free-form `[project.properties]` value.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.project.properties.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Directory all `[build]` paths are relative to.
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        match &self.build.base_dir {
            Some(dir) => self.project_dir.join(dir),
            None => self.project_dir.clone(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir().join(path)
    }

    #[must_use]
    pub fn classes_dir(&self) -> PathBuf {
        self.resolve(&self.build.classes_dir)
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.build.output_dir)
    }

    #[must_use]
    pub fn webapp_dir(&self) -> PathBuf {
        self.resolve(&self.build.webapp_dir)
    }

    #[must_use]
    pub fn resource_dirs(&self) -> Vec<PathBuf> {
        self.build.resources.iter().map(|r| self.resolve(r)).collect()
    }

    /// Exploded webapp: `{output}/{finalName}`.
    #[must_use]
    pub fn exploded_dir(&self) -> PathBuf {
        self.output_dir().join(self.final_name())
    }

    /// Where `war` overlays are unpacked.
    #[must_use]
    pub fn unpack_dir(&self) -> PathBuf {
        self.output_dir().join("war-overlays")
    }

    /// The project's own classes packed as a jar: `{output}/{finalName}.jar`.
    #[must_use]
    pub fn classes_jar(&self) -> PathBuf {
        self.output_dir().join(format!("{}.jar", self.final_name()))
    }

    /// `{output}/{finalName}.{hpi|jpi}`
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.output_dir()
            .join(format!("{}.{}", self.final_name(), self.plugin.extension))
    }

    /// Coordinate of the project, typed by its packaging and without scope.
    #[must_use]
    pub fn coordinate(&self) -> ArtifactCoordinate {
        ArtifactCoordinate::new(
            &self.project.group_id,
            &self.project.artifact_id,
            &self.project.version,
        )
        .with_type(self.project.packaging.as_str())
        .with_scope(None)
    }

    /// The root node of every traversal.
    #[must_use]
    pub fn root_artifact(&self) -> ArtifactFacade {
        let coordinate = self.coordinate();
        let trail = vec![coordinate.id()];
        ArtifactFacade::new(coordinate)
            .with_packaging(Some(self.project.packaging.as_str().to_string()))
            .with_trail(trail)
    }

    #[must_use]
    pub fn collect_request(&self) -> CollectRequest {
        CollectRequest {
            root: self.root_artifact(),
            dependencies: self.dependencies.clone(),
            managed: self.dependency_management.clone(),
        }
    }

    #[must_use]
    pub fn host_core_matcher(&self) -> TrailSubstringMatcher {
        TrailSubstringMatcher::new(self.plugin.host_core_markers.iter().cloned())
    }

    /// `(groupId, artifactId)` pairs that identify the host core among
    /// the direct dependencies.
    #[must_use]
    pub fn host_core_ids(&self) -> Vec<(String, String)> {
        match self.plugin.host_core_id.as_deref().and_then(split_ga) {
            Some((group, artifact)) => vec![(group.to_string(), artifact.to_string())],
            None => DEFAULT_HOST_CORE_IDS
                .iter()
                .map(|(g, a)| ((*g).to_string(), (*a).to_string()))
                .collect(),
        }
    }

    /// # Errors
    ///
    /// [`HpkgError::ProjectValidationError`] for an invalid glob.
    pub fn overlay_filter(&self) -> Result<OverlayFilter, HpkgError> {
        OverlayFilter::new(&self.build.dependent_war_includes, &self.build.dependent_war_excludes)
    }
}

fn split_ga(id: &str) -> Option<(&str, &str)> {
    let (group, artifact) = id.split_once(':')?;
    (!group.is_empty() && !artifact.is_empty() && !artifact.contains(':'))
        .then_some((group, artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Scope;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[project]
group-id = "org.example"
artifact-id = "hello"
version = "1.0-SNAPSHOT"
"#;

    fn parse(text: &str) -> Result<Project> {
        Project::parse(text, "hpkg.toml", "/work/hello")
    }

    #[test]
    fn test_defaults() {
        let project = parse(MINIMAL).unwrap();
        assert_eq!(project.packaging(), Packaging::Hpi);
        assert_eq!(project.final_name(), "hello-1.0-SNAPSHOT");
        assert_eq!(project.display_name(), "hello");
        assert!(project.is_snapshot());
        assert_eq!(project.classes_dir(), PathBuf::from("/work/hello/target/classes"));
        assert_eq!(
            project.archive_path(),
            PathBuf::from("/work/hello/target/hello-1.0-SNAPSHOT.hpi")
        );
        assert!(project.plugin.fail_on_version_override_to_different_release);
        assert_eq!(project.plugin.host_core_markers, vec![":hudson-core:", ":jenkins-core:"]);
        assert_eq!(project.host_core_ids().len(), 2);
    }

    #[test]
    fn test_full_descriptor() {
        let text = r#"
[project]
group-id = "org.example"
artifact-id = "hello"
version = "1.0"
packaging = "jenkins-module"
name = "Hello"
final-name = "hello"

[[project.developers]]
id = "jdoe"
name = "Jane Doe"

[project.scm]
connection = "scm:git:https://example.org/hello.git"

[project.properties]
"hpi.pluginLogoUrl" = "https://example.org/logo.png"

[build]
base-dir = "module"
output-dir = "out"

[plugin]
extension = "jpi"
host-core-id = "org.example:core"

[[dependencies]]
group-id = "org.example"
artifact-id = "core"
version = "2.0"
scope = "provided"
exclusions = ["org.slf4j:*"]
"#;
        let project = parse(text).unwrap();
        assert_eq!(project.packaging(), Packaging::JenkinsModule);
        assert_eq!(project.display_name(), "Hello");
        assert_eq!(project.archive_path(), PathBuf::from("/work/hello/module/out/hello.jpi"));
        assert_eq!(project.property("hpi.pluginLogoUrl"), Some("https://example.org/logo.png"));
        assert_eq!(
            project.host_core_ids(),
            vec![("org.example".to_string(), "core".to_string())]
        );
        assert_eq!(project.dependencies[0].scope, Some(Scope::Provided));
        assert_eq!(project.coordinate().id(), "org.example:hello:jenkins-module:1.0");
        assert_eq!(project.root_artifact().trail(), ["org.example:hello:jenkins-module:1.0"]);
    }

    #[test]
    fn test_validation_failures() {
        let empty_group = MINIMAL.replace("org.example", " ");
        let err = parse(&empty_group).unwrap_err();
        assert!(err.to_string().contains("group-id"));

        let bad_core = format!("{MINIMAL}\n[plugin]\nhost-core-id = \"jenkins-core\"\n");
        let err = parse(&bad_core).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HpkgError>(),
            Some(HpkgError::ProjectValidationError { .. })
        ));
    }

    #[test]
    fn test_parse_error_is_typed() {
        let err = parse("[project\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HpkgError>(),
            Some(HpkgError::ProjectParseError { .. })
        ));
    }

    #[test]
    fn test_find_project_file() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src/main/java");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(PROJECT_FILE), MINIMAL).unwrap();

        let found = find_project_file(None, &nested).unwrap();
        assert_eq!(found.file_name().unwrap(), PROJECT_FILE);
        assert!(find_project_file(Some(temp.path()), &nested).is_ok());
        assert!(matches!(
            find_project_file(Some(temp.path().join("missing.toml").as_path()), &nested),
            Err(HpkgError::ProjectNotFound)
        ));

        let project = Project::load(&found).unwrap();
        assert_eq!(project.artifact_id(), "hello");
    }
}
