//! Plugin version computation.
//!
//! A snapshot build may publish a different version through an override,
//! and every snapshot gets a free-text qualifier so two private builds of
//! the same snapshot can be told apart in the host's plugin manager.

use crate::core::HpkgError;
use crate::version::{SNAPSHOT_SUFFIX, is_snapshot};
use chrono::{DateTime, Local};
use tracing::{info, warn};

/// Inputs of the `Plugin-Version` value.
#[derive(Debug, Clone, Default)]
pub struct VersionPolicy {
    pub snapshot_override: Option<String>,
    pub fail_on_different_release: bool,
    pub description: Option<String>,
}

/// Where a synthesized qualifier gets its build marker from.
#[derive(Debug, Clone)]
pub struct BuildStamp {
    /// Full revision hash of the working tree, if known.
    pub revision: Option<String>,
    pub user: String,
    pub time: DateTime<Local>,
}

impl BuildStamp {
    /// Stamp for the current user and time.
    #[must_use]
    pub fn now(revision: Option<String>) -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());
        Self {
            revision,
            user,
            time: Local::now(),
        }
    }

    fn marker(&self) -> String {
        match &self.revision {
            Some(hash) if hash.len() >= 8 => hash[..8].to_string(),
            _ => self.time.format("%m/%d/%Y %H:%M").to_string(),
        }
    }
}

impl VersionPolicy {
    /// Applies the snapshot override to `version`.
    ///
    /// # Errors
    ///
    /// [`HpkgError::VersionPolicyViolation`] if the override does not start
    /// with the release part of `version` and violations are fatal.
    pub fn effective_version(&self, version: &str) -> Result<String, HpkgError> {
        let Some(override_version) = self.snapshot_override.as_deref() else {
            return Ok(version.to_string());
        };
        let Some(release) = version.strip_suffix(SNAPSHOT_SUFFIX) else {
            return Ok(version.to_string());
        };

        if !override_version.starts_with(release) {
            let violation = HpkgError::VersionPolicyViolation {
                version: version.to_string(),
                override_version: override_version.to_string(),
            };
            if self.fail_on_different_release {
                return Err(violation);
            }
            warn!("{violation}");
        }
        info!("Snapshot version override enabled. Using {override_version} in place of {version}");
        Ok(override_version.to_string())
    }

    /// Full `Plugin-Version` value: the effective version plus a
    /// ` (qualifier)` suffix when one is set or synthesized.
    ///
    /// # Errors
    ///
    /// See [`VersionPolicy::effective_version`].
    pub fn plugin_version(&self, version: &str, stamp: &BuildStamp) -> Result<String, HpkgError> {
        let effective = self.effective_version(version)?;
        let description = match &self.description {
            Some(description) => Some(description.clone()),
            None if is_snapshot(&effective) => {
                Some(format!("private-{}-{}", stamp.marker(), stamp.user))
            }
            None => None,
        };
        Ok(match description {
            Some(description) => format!("{effective} ({description})"),
            None => effective,
        })
    }
}
