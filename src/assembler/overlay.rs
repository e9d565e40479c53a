//! Unpacking and overlaying nested web-application archives.
//!
//! A `war` dependency is unpacked once into a cache directory and its files
//! are then copied into the exploded webapp. Files already present in the
//! webapp are never overwritten, so the first writer wins: the project's
//! own files beat every overlay, and earlier overlays beat later ones.

use crate::archive::extract_all;
use crate::core::HpkgError;
use crate::utils::fs::{copy_if_modified, ensure_dir, modified_time, to_slash_path};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Include/exclude glob patterns over overlay entry paths (`/`-separated).
#[derive(Debug, Clone)]
pub struct OverlayFilter {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl Default for OverlayFilter {
    /// Everything except `META-INF/**`.
    fn default() -> Self {
        Self {
            includes: Pattern::new("**").into_iter().collect(),
            excludes: Pattern::new("META-INF/**").into_iter().collect(),
        }
    }
}

impl OverlayFilter {
    /// Compiles the given patterns.
    ///
    /// # Errors
    ///
    /// [`HpkgError::ProjectValidationError`] for an invalid glob.
    pub fn new<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Result<Self, HpkgError> {
        let compile = |patterns: &[S]| -> Result<Vec<Pattern>, HpkgError> {
            patterns
                .iter()
                .map(|p| {
                    Pattern::new(p.as_ref()).map_err(|e| HpkgError::ProjectValidationError {
                        reason: format!("Invalid overlay pattern '{}': {e}", p.as_ref()),
                    })
                })
                .collect()
        };
        Ok(Self {
            includes: compile(includes)?,
            excludes: compile(excludes)?,
        })
    }

    /// True if `path` matches an include and no exclude.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.includes.iter().any(|p| p.matches(path))
            && !self.excludes.iter().any(|p| p.matches(path))
    }
}

/// Directory of unpacked overlay archives, one subdirectory per artifact.
#[derive(Debug, Clone)]
pub struct UnpackCache {
    root: PathBuf,
}

impl UnpackCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Unpacks `archive` into `{root}/{key}` unless an unpacked copy exists
    /// that is not older than the archive.
    ///
    /// Returns the unpack directory and whether the archive was extracted
    /// during this call.
    pub fn unpack(&self, archive: &Path, key: &str) -> Result<(PathBuf, bool), HpkgError> {
        let directory = self.root.join(key);
        let fresh = match (modified_time(archive), modified_time(&directory)) {
            (Some(source), Some(cached)) => source <= cached,
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if fresh && directory.is_dir() {
            debug!(archive = %archive.display(), "Overlay already unpacked");
            return Ok((directory, false));
        }

        if directory.exists() {
            fs::remove_dir_all(&directory)
                .map_err(|e| HpkgError::assembly_io("clear unpack cache", archive, &directory, e))?;
        }
        ensure_dir(&directory)?;
        info!("Unpacking {} into {}", archive.display(), directory.display());
        extract_all(archive, &directory)?;
        Ok((directory, true))
    }
}

/// Copies every file below `unpacked` that `filter` admits into `target`,
/// skipping files that already exist there. Returns the number copied.
pub fn apply_overlay(
    unpacked: &Path,
    target: &Path,
    filter: &OverlayFilter,
) -> Result<usize, HpkgError> {
    let mut copied = 0;
    for entry in WalkDir::new(unpacked).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            HpkgError::assembly_io("walk overlay", unpacked, target, std::io::Error::from(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(unpacked) else {
            continue;
        };
        if !filter.matches(&to_slash_path(relative)) {
            continue;
        }
        let destination = target.join(relative);
        if destination.exists() {
            debug!(file = %relative.display(), "Overlay file already present, keeping existing");
            continue;
        }
        if copy_if_modified(entry.path(), &destination)? {
            copied += 1;
        }
    }
    Ok(copied)
}
