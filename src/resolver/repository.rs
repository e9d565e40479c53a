//! The resolution service seam and its local-repository implementation.
//!
//! The collector never touches the filesystem layout of a repository
//! itself; it asks a [`ResolutionService`] to describe an artifact (its
//! packaging and declared dependencies) and to hand back the resolved file.

use super::descriptor::ArtifactDescriptor;
use crate::artifact::ArtifactCoordinate;
use crate::core::HpkgError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// External dependency-resolution subsystem.
pub trait ResolutionService {
    /// Packaging and declared dependencies of an artifact.
    fn describe(&self, coordinate: &ArtifactCoordinate) -> Result<ArtifactDescriptor, HpkgError>;

    /// Resolved file (or build output directory) of an artifact.
    fn resolve_file(&self, coordinate: &ArtifactCoordinate) -> Result<PathBuf, HpkgError>;
}

/// A Maven-layout directory on disk.
///
/// ```text
/// {root}/org/example/widgets/1.2/widgets-1.2.jar
/// {root}/org/example/widgets/1.2/widgets-1.2.toml   (optional descriptor)
/// ```
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every file of one artifact version.
    #[must_use]
    pub fn version_dir(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in coordinate.group_id.split('.') {
            dir.push(segment);
        }
        dir.push(&coordinate.artifact_id);
        dir.push(&coordinate.version);
        dir
    }

    /// Path the artifact file is expected at.
    #[must_use]
    pub fn artifact_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        let mut name = format!("{}-{}", coordinate.artifact_id, coordinate.version);
        if let Some(classifier) = &coordinate.classifier {
            name.push('-');
            name.push_str(classifier);
        }
        name.push('.');
        name.push_str(coordinate.extension());
        self.version_dir(coordinate).join(name)
    }

    /// Path of the optional descriptor.
    #[must_use]
    pub fn descriptor_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        self.version_dir(coordinate)
            .join(format!("{}-{}.toml", coordinate.artifact_id, coordinate.version))
    }
}

impl ResolutionService for LocalRepository {
    fn describe(&self, coordinate: &ArtifactCoordinate) -> Result<ArtifactDescriptor, HpkgError> {
        let path = self.descriptor_path(coordinate);
        if !path.exists() {
            debug!(artifact = %coordinate, "No descriptor, assuming no dependencies");
            return Ok(ArtifactDescriptor::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| HpkgError::Resolution {
            artifact: coordinate.id(),
            reason: format!("cannot read descriptor {}: {e}", path.display()),
        })?;
        toml::from_str(&text).map_err(|e| HpkgError::Resolution {
            artifact: coordinate.id(),
            reason: format!("invalid descriptor {}: {e}", path.display()),
        })
    }

    fn resolve_file(&self, coordinate: &ArtifactCoordinate) -> Result<PathBuf, HpkgError> {
        let path = self.artifact_path(coordinate);
        if path.exists() {
            Ok(path)
        } else {
            Err(HpkgError::Resolution {
                artifact: coordinate.id(),
                reason: format!("artifact file not found at {}", path.display()),
            })
        }
    }
}
