//! File system helpers used by the assembly engine.
//!
//! All functions report failures as [`HpkgError::AssemblyIo`] carrying the
//! source and destination of the failed step, so a broken copy deep inside
//! an assembly still names both files.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hpkg_cli::utils::fs::{copy_if_modified, ensure_dir, safe_write};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), hpkg_cli::core::HpkgError> {
//! ensure_dir(Path::new("target/demo/WEB-INF/lib"))?;
//! copy_if_modified(
//!     Path::new("/repo/commons-io-2.11.0.jar"),
//!     Path::new("target/demo/WEB-INF/lib/commons-io-2.11.0.jar"),
//! )?;
//! safe_write(Path::new("target/demo.hpi.mf"), "Manifest-Version: 1.0\r\n")?;
//! # Ok(())
//! # }
//! ```

use crate::core::HpkgError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Errors
///
/// Fails if creation fails or the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<(), HpkgError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| HpkgError::assembly_io("create directory", path, path, e))?;
    } else if !path.is_dir() {
        return Err(HpkgError::assembly_io(
            "create directory",
            path,
            path,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        ));
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// Content goes to `{path}.tmp` first, is synced, and then renamed over the
/// target, so readers see either the old or the new content.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), HpkgError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    {
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| HpkgError::assembly_io("create temp file", &temp_path, path, e))?;
        file.write_all(content)
            .map_err(|e| HpkgError::assembly_io("write", &temp_path, path, e))?;
        file.sync_all().map_err(|e| HpkgError::assembly_io("sync", &temp_path, path, e))?;
    }

    fs::rename(&temp_path, path)
        .map_err(|e| HpkgError::assembly_io("rename", &temp_path, path, e))
}

/// Safely writes a string to a file using atomic operations.
pub fn safe_write(path: &Path, content: &str) -> Result<(), HpkgError> {
    atomic_write(path, content.as_bytes())
}

/// Last modification time, or `None` when the path is missing or the
/// platform does not report one.
#[must_use]
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// True when `destination` is missing or `source` was modified strictly
/// after it.
///
/// Equal timestamps count as up to date. A source whose timestamp was moved
/// backwards is therefore never copied again.
#[must_use]
pub fn is_stale(source: &Path, destination: &Path) -> bool {
    match (modified_time(source), modified_time(destination)) {
        (_, None) => true,
        (Some(src), Some(dst)) => src > dst,
        (None, Some(_)) => false,
    }
}

/// Copies `source` to `destination` unless the destination is up to date.
///
/// Returns whether a copy happened.
pub fn copy_if_modified(source: &Path, destination: &Path) -> Result<bool, HpkgError> {
    if !is_stale(source, destination) {
        return Ok(false);
    }
    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(source, destination)
        .map_err(|e| HpkgError::assembly_io("copy", source, destination, e))?;
    Ok(true)
}

/// Copies every regular file below `source` to the same relative path
/// below `destination`, using [`copy_if_modified`] per file.
///
/// A missing `source` copies nothing. Returns the number of files copied.
pub fn copy_dir(source: &Path, destination: &Path) -> Result<usize, HpkgError> {
    if !source.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| {
            HpkgError::assembly_io("walk", source, destination, std::io::Error::from(e))
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() && copy_if_modified(entry.path(), &target)? {
            copied += 1;
        }
    }
    Ok(copied)
}

/// Walks up from `start` looking for a directory that contains `file_name`,
/// the way git looks for `.git`.
///
/// Returns the path of the file itself.
#[must_use]
pub fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut current = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    loop {
        let candidate = current.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Renders `path` with forward slashes, for archive entry names and
/// manifest values that must not depend on the platform.
#[must_use]
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
