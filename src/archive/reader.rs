//! Read access to jar-format archives.

use super::manifest::Manifest;
use crate::constants::MANIFEST_ENTRY;
use crate::core::HpkgError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Reads the main manifest of an archive.
///
/// Returns `Ok(None)` when the archive opens fine but has no
/// `META-INF/MANIFEST.MF` entry. Any failure to open or read the archive is
/// an [`HpkgError::ArchiveError`].
pub fn read_manifest(path: &Path) -> Result<Option<Manifest>, HpkgError> {
    let archive_error = |reason: String| HpkgError::ArchiveError {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| archive_error(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_error(e.to_string()))?;

    let mut entry = match archive.by_name(MANIFEST_ENTRY) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            debug!(path = %path.display(), "Archive has no manifest");
            return Ok(None);
        }
        Err(e) => return Err(archive_error(e.to_string())),
    };

    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).map_err(|e| archive_error(e.to_string()))?;
    let text = String::from_utf8_lossy(&bytes);
    Manifest::parse(&text).map(Some)
}

/// Extracts every entry of an archive below `destination`.
///
/// Entries whose names would escape the destination are rejected by the
/// zip reader.
pub fn extract_all(path: &Path, destination: &Path) -> Result<(), HpkgError> {
    let file = File::open(path)
        .map_err(|e| HpkgError::assembly_io("unpack", path, destination, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| HpkgError::ArchiveError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    archive.extract(destination).map_err(|e| match e {
        zip::result::ZipError::Io(io) => HpkgError::assembly_io("unpack", path, destination, io),
        other => HpkgError::ArchiveError {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })
}
