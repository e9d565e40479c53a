//! Version ordering for artifact coordinates
//!
//! Artifact versions in a resolved graph are not semver: they look like
//! `1.0`, `2.5-SNAPSHOT`, `1.2-rc1.abcdef-SNAPSHOT` or `20071105`. This module
//! provides a total order over such strings following the repository
//! conventions (numeric segments compare numerically, well-known qualifiers
//! compare by maturity, a pre-release sorts before its release).
//!
//! - [`comparison::ArtifactVersion`] - a parsed, ordered version
//! - [`comparison::VersionComparator`] - helpers used by the newest-wins merge

pub mod comparison;

pub use comparison::{ArtifactVersion, VersionComparator};

/// Marker suffix for development snapshots.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Returns true if the version is a development snapshot.
#[must_use]
pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_snapshot() {
        assert!(is_snapshot("2.5-SNAPSHOT"));
        assert!(!is_snapshot("2.5"));
        assert!(!is_snapshot("2.5-snapshot"));
    }
}
