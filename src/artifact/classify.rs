//! Plugin classification as a pluggable policy.
//!
//! Traversal asks a [`PluginClassifier`] instead of calling
//! [`ArtifactFacade::is_plugin`] directly, so trees can be walked in tests
//! with a fixed answer set and no archives on disk.

use super::ArtifactFacade;
use crate::core::HpkgError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Decides whether an artifact is a plugin.
pub trait PluginClassifier {
    fn is_plugin(&self, artifact: &ArtifactFacade) -> Result<bool, HpkgError>;
}

/// How archive read failures are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationMode {
    /// Propagate [`HpkgError::Classification`]; used while packaging.
    Strict,
    /// Log and assume "not a plugin"; used by validation and listing goals.
    BestEffort,
}

/// Classifies by reading the artifact's archive, caching answers per id.
#[derive(Debug)]
pub struct ArchiveClassifier {
    mode: ClassificationMode,
    cache: Mutex<HashMap<String, bool>>,
}

impl ArchiveClassifier {
    #[must_use]
    pub fn new(mode: ClassificationMode) -> Self {
        Self {
            mode,
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn strict() -> Self {
        Self::new(ClassificationMode::Strict)
    }

    #[must_use]
    pub fn best_effort() -> Self {
        Self::new(ClassificationMode::BestEffort)
    }

    #[must_use]
    pub const fn mode(&self) -> ClassificationMode {
        self.mode
    }
}

impl PluginClassifier for ArchiveClassifier {
    fn is_plugin(&self, artifact: &ArtifactFacade) -> Result<bool, HpkgError> {
        let id = artifact.id();
        if let Ok(cache) = self.cache.lock() {
            if let Some(answer) = cache.get(&id) {
                return Ok(*answer);
            }
        }

        let answer = match self.mode {
            ClassificationMode::Strict => artifact.is_plugin()?,
            ClassificationMode::BestEffort => artifact.is_plugin_best_effort(),
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(id, answer);
        }
        Ok(answer)
    }
}

/// Fixed answer set keyed by artifactId. Handy for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct KnownPlugins {
    artifact_ids: HashSet<String>,
}

impl KnownPlugins {
    pub fn new<I, S>(artifact_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            artifact_ids: artifact_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl PluginClassifier for KnownPlugins {
    fn is_plugin(&self, artifact: &ArtifactFacade) -> Result<bool, HpkgError> {
        Ok(self.artifact_ids.contains(artifact.artifact_id()))
    }
}
