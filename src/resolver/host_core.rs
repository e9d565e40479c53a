//! Detection of artifacts that reach the project through the host core.
//!
//! The host runtime puts its own transitive classpath in front of every
//! plugin, so anything pulled in through the host core must not be bundled.
//! Detection is a substring match over the dependency trail; a renamed or
//! forked host core defeats it. The [`HostCoreMatcher`] trait keeps the
//! heuristic replaceable.

use crate::constants::DEFAULT_HOST_CORE_MARKERS;

/// Decides whether a dependency trail passes through the host core.
///
/// A trail is covered as soon as one entry matches, so walkers can carry a
/// single flag down the tree instead of re-checking whole trails.
pub trait HostCoreMatcher {
    /// Whether one trail entry (a coordinate id) is the host core.
    fn matches(&self, entry: &str) -> bool;

    /// `trail` runs from the root to the artifact itself.
    fn covers(&self, trail: &[String]) -> bool {
        trail.iter().any(|entry| self.matches(entry))
    }
}

/// Matches when any trail entry contains one of the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailSubstringMatcher {
    markers: Vec<String>,
}

impl TrailSubstringMatcher {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for TrailSubstringMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_HOST_CORE_MARKERS.iter().copied())
    }
}

impl HostCoreMatcher for TrailSubstringMatcher {
    fn matches(&self, entry: &str) -> bool {
        self.markers.iter().any(|m| entry.contains(m.as_str()))
    }
}

/// Never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostCore;

impl HostCoreMatcher for NoHostCore {
    fn matches(&self, _entry: &str) -> bool {
        false
    }
}
