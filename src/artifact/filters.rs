//! Composable filters over a collection of artifacts.
//!
//! [`ArtifactSet`] is an ordered list of [`ArtifactFacade`] with chainable
//! narrowing operations. Every filter consumes the set and returns the
//! survivors in their original order.
//!
//! ```rust,no_run
//! use hpkg_cli::artifact::{ArtifactSet, Scope};
//!
//! # fn example(artifacts: ArtifactSet) {
//! let bundled = artifacts
//!     .scope_is(&[Scope::Compile, Scope::Runtime])
//!     .type_is(&["jar"])
//!     .group_id_is_not(&["org.jenkins-ci.main"]);
//! # }
//! ```

use super::{ArtifactFacade, Scope};

/// Ordered artifact collection with predicate filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    artifacts: Vec<ArtifactFacade>,
}

impl ArtifactSet {
    #[must_use]
    pub fn new(artifacts: Vec<ArtifactFacade>) -> Self {
        Self {
            artifacts,
        }
    }

    /// Keeps the artifacts matching `predicate`.
    #[must_use]
    pub fn retain<F>(mut self, predicate: F) -> Self
    where
        F: FnMut(&ArtifactFacade) -> bool,
    {
        self.artifacts.retain(predicate);
        self
    }

    /// Drops the artifacts matching `predicate`.
    #[must_use]
    pub fn remove<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&ArtifactFacade) -> bool,
    {
        self.retain(|a| !predicate(a))
    }

    /// Scope in `scopes`. Artifacts without a scope (graph roots) never match.
    #[must_use]
    pub fn scope_is(self, scopes: &[Scope]) -> Self {
        self.retain(|a| a.scope().is_some_and(|s| scopes.contains(&s)))
    }

    #[must_use]
    pub fn scope_is_not(self, scopes: &[Scope]) -> Self {
        self.remove(|a| a.scope().is_some_and(|s| scopes.contains(&s)))
    }

    #[must_use]
    pub fn type_is(self, types: &[&str]) -> Self {
        self.retain(|a| types.contains(&a.artifact_type()))
    }

    #[must_use]
    pub fn type_is_not(self, types: &[&str]) -> Self {
        self.remove(|a| types.contains(&a.artifact_type()))
    }

    #[must_use]
    pub fn group_id_is(self, group_ids: &[&str]) -> Self {
        self.retain(|a| group_ids.contains(&a.group_id()))
    }

    #[must_use]
    pub fn group_id_is_not(self, group_ids: &[&str]) -> Self {
        self.remove(|a| group_ids.contains(&a.group_id()))
    }

    #[must_use]
    pub fn artifact_id_is(self, artifact_ids: &[&str]) -> Self {
        self.retain(|a| artifact_ids.contains(&a.artifact_id()))
    }

    #[must_use]
    pub fn artifact_id_is_not(self, artifact_ids: &[&str]) -> Self {
        self.remove(|a| artifact_ids.contains(&a.artifact_id()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactFacade> {
        self.artifacts.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ArtifactFacade> {
        self.artifacts
    }
}

impl FromIterator<ArtifactFacade> for ArtifactSet {
    fn from_iter<T: IntoIterator<Item = ArtifactFacade>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ArtifactSet {
    type Item = ArtifactFacade;
    type IntoIter = std::vec::IntoIter<ArtifactFacade>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a ArtifactFacade;
    type IntoIter = std::slice::Iter<'a, ArtifactFacade>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactCoordinate;

    fn artifact(group: &str, id: &str, kind: &str, scope: Scope) -> ArtifactFacade {
        ArtifactFacade::new(
            ArtifactCoordinate::new(group, id, "1.0").with_type(kind).with_scope(Some(scope)),
        )
    }

    fn sample() -> ArtifactSet {
        ArtifactSet::new(vec![
            artifact("org.a", "lib-a", "jar", Scope::Compile),
            artifact("org.a", "web", "war", Scope::Runtime),
            artifact("org.b", "lib-b", "jar", Scope::Test),
            artifact("org.b", "taglib", "tld", Scope::Provided),
        ])
    }

    fn ids(set: &ArtifactSet) -> Vec<&str> {
        set.iter().map(ArtifactFacade::artifact_id).collect()
    }

    #[test]
    fn test_scope_filters() {
        let set = sample().scope_is(&[Scope::Compile, Scope::Runtime]);
        assert_eq!(ids(&set), vec!["lib-a", "web"]);

        let set = sample().scope_is_not(&[Scope::Test]);
        assert_eq!(ids(&set), vec!["lib-a", "web", "taglib"]);
    }

    #[test]
    fn test_root_without_scope_is_excluded_by_scope_is() {
        let root = ArtifactFacade::new(ArtifactCoordinate::new("g", "root", "1").with_scope(None));
        let set = ArtifactSet::new(vec![root]);
        assert!(set.clone().scope_is(&[Scope::Compile]).is_empty());
        assert_eq!(set.scope_is_not(&[Scope::Compile]).len(), 1);
    }

    #[test]
    fn test_type_filters() {
        assert_eq!(ids(&sample().type_is(&["jar"])), vec!["lib-a", "lib-b"]);
        assert_eq!(ids(&sample().type_is_not(&["jar", "war"])), vec!["taglib"]);
    }

    #[test]
    fn test_group_and_artifact_filters_compare_their_own_fields() {
        assert_eq!(ids(&sample().group_id_is(&["org.b"])), vec!["lib-b", "taglib"]);
        assert_eq!(ids(&sample().group_id_is_not(&["org.b"])), vec!["lib-a", "web"]);
        // A type name must not match a group or artifact filter.
        assert!(sample().group_id_is(&["jar"]).is_empty());
        assert_eq!(ids(&sample().artifact_id_is(&["web", "taglib"])), vec!["web", "taglib"]);
        assert_eq!(sample().artifact_id_is_not(&["web"]).len(), 3);
        assert!(sample().artifact_id_is(&["jar"]).is_empty());
    }

    #[test]
    fn test_filters_compose() {
        let set = sample()
            .scope_is_not(&[Scope::Test, Scope::Provided])
            .type_is(&["jar", "war"])
            .group_id_is(&["org.a"])
            .artifact_id_is_not(&["web"]);
        assert_eq!(ids(&set), vec!["lib-a"]);
    }
}
