//! Declared dependencies and artifact descriptors.
//!
//! These are the serde models shared by the project file (`hpkg.toml`) and
//! the per-artifact descriptors of a local repository
//! (`{artifactId}-{version}.toml`).

use crate::artifact::{ArtifactCoordinate, Scope};
use crate::core::HpkgError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `groupId:artifactId` pattern pruning a subtree. `*` matches anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn parse(pattern: &str) -> Result<Self, HpkgError> {
        match pattern.split_once(':') {
            Some((group, artifact)) if !group.is_empty() && !artifact.is_empty() => Ok(Self {
                group_id: group.trim().to_string(),
                artifact_id: artifact.trim().to_string(),
            }),
            _ => Err(HpkgError::ProjectValidationError {
                reason: format!("Invalid exclusion '{pattern}', expected 'groupId:artifactId'"),
            }),
        }
    }

    #[must_use]
    pub fn matches(&self, coordinate: &ArtifactCoordinate) -> bool {
        (self.group_id == "*" || self.group_id == coordinate.group_id)
            && (self.artifact_id == "*" || self.artifact_id == coordinate.artifact_id)
    }
}

impl TryFrom<String> for Exclusion {
    type Error = HpkgError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Exclusion> for String {
    fn from(value: Exclusion) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

fn default_type() -> String {
    "jar".to_string()
}

fn is_default_type(value: &str) -> bool {
    value == "jar"
}

/// One `[[dependencies]]` entry as written by a user or a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeclaredDependency {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", default = "default_type", skip_serializing_if = "is_default_type")]
    pub artifact_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// Absent means `compile`, unless dependency management says otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Exclusion>,
}

impl DeclaredDependency {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: Some(version.into()),
            artifact_type: default_type(),
            classifier: None,
            scope: None,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    /// `groupId:artifactId`
    #[must_use]
    pub fn ga(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Key used by dependency management: `groupId:artifactId:type[:classifier]`.
    #[must_use]
    pub fn management_key(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!("{}:{}", self.versionless_key(), classifier),
            None => self.versionless_key(),
        }
    }

    fn versionless_key(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.artifact_type)
    }
}

/// What the resolution service knows about one artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactDescriptor {
    /// Packaging of the artifact's own project (e.g. `hpi`, `jar`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DeclaredDependency>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_parse_and_match() {
        let exact = Exclusion::parse("org.a:lib").unwrap();
        let any_artifact = Exclusion::parse("org.a:*").unwrap();
        let everything = Exclusion::parse("*:*").unwrap();

        let coordinate = ArtifactCoordinate::new("org.a", "lib", "1.0");
        let other = ArtifactCoordinate::new("org.b", "lib", "1.0");
        assert!(exact.matches(&coordinate));
        assert!(!exact.matches(&other));
        assert!(any_artifact.matches(&coordinate));
        assert!(!any_artifact.matches(&other));
        assert!(everything.matches(&other));

        assert!(Exclusion::parse("nocolon").is_err());
        assert!(Exclusion::parse(":lib").is_err());
    }

    #[test]
    fn test_declared_dependency_toml() {
        let text = r#"
group-id = "org.example"
artifact-id = "widgets"
version = "1.2"
scope = "runtime"
exclusions = ["org.noise:*"]
"#;
        let dep: DeclaredDependency = toml::from_str(text).unwrap();
        assert_eq!(dep.artifact_type, "jar");
        assert_eq!(dep.scope, Some(Scope::Runtime));
        assert!(!dep.optional);
        assert_eq!(dep.exclusions, vec![Exclusion::parse("org.noise:*").unwrap()]);
        assert_eq!(dep.management_key(), "org.example:widgets:jar");
    }

    #[test]
    fn test_invalid_exclusion_fails_deserialization() {
        let text = r#"
group-id = "g"
artifact-id = "a"
exclusions = ["broken"]
"#;
        assert!(toml::from_str::<DeclaredDependency>(text).is_err());
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor: ArtifactDescriptor = toml::from_str("").unwrap();
        assert!(descriptor.packaging.is_none());
        assert!(descriptor.dependencies.is_empty());
    }
}
