//! Archive container writer.
//!
//! The packaging engine only needs one thing from an archive writer: given a
//! manifest and a directory tree, produce an archive file. [`ArchiveWriter`]
//! is that seam; [`ZipArchiveWriter`] is the jar-format implementation.

use super::manifest::Manifest;
use crate::constants::MANIFEST_ENTRY;
use crate::core::HpkgError;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Produces an archive from a manifest and a directory tree.
pub trait ArchiveWriter {
    /// Writes `destination`, containing `manifest` as `META-INF/MANIFEST.MF`
    /// followed by every file below `root`.
    fn write_archive(&self, manifest: &Manifest, root: &Path, destination: &Path)
    -> Result<(), HpkgError>;
}

/// Jar-format writer backed by the `zip` crate.
///
/// The archive is built in a temporary file next to the destination and
/// renamed into place, so readers never observe a half-written archive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter;

impl ZipArchiveWriter {
    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644)
    }

    fn write_entries<W: Write + io::Seek>(
        zip: &mut ZipWriter<W>,
        manifest: &Manifest,
        root: &Path,
    ) -> Result<usize, zip::result::ZipError> {
        let options = Self::options();
        zip.add_directory("META-INF/", options)?;
        zip.start_file(MANIFEST_ENTRY, options)?;
        zip.write_all(&manifest.to_bytes())?;

        let mut count = 0;
        if !root.is_dir() {
            return Ok(count);
        }
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry.path().strip_prefix(root).map_err(io::Error::other)?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if entry.file_type().is_dir() {
                if name != "META-INF" {
                    zip.add_directory(format!("{name}/"), options)?;
                }
            } else if name != MANIFEST_ENTRY {
                zip.start_file(name, options)?;
                let mut source = File::open(entry.path())?;
                io::copy(&mut source, zip)?;
                count += 1;
            }
        }
        Ok(count)
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn write_archive(
        &self,
        manifest: &Manifest,
        root: &Path,
        destination: &Path,
    ) -> Result<(), HpkgError> {
        let parent = destination.parent().unwrap_or_else(|| Path::new("."));
        crate::utils::fs::ensure_dir(parent)?;

        let archive_error = |reason: String| HpkgError::ArchiveError {
            path: destination.to_path_buf(),
            reason,
        };

        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| HpkgError::assembly_io("create archive", root, destination, e))?;
        let files = {
            let mut zip = ZipWriter::new(temp.as_file_mut());
            let files = Self::write_entries(&mut zip, manifest, root)
                .map_err(|e| archive_error(e.to_string()))?;
            zip.finish().map_err(|e| archive_error(e.to_string()))?;
            files
        };
        temp.persist(destination)
            .map_err(|e| HpkgError::assembly_io("write archive", root, destination, e.error))?;

        debug!(archive = %destination.display(), files, "Wrote archive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::reader::read_manifest;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_write_archive_with_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("webapp");
        std::fs::create_dir_all(root.join("WEB-INF/lib")).unwrap();
        std::fs::write(root.join("WEB-INF/lib/a.jar"), b"jar").unwrap();
        std::fs::write(root.join("index.jelly"), b"<j/>").unwrap();

        let mut manifest = Manifest::new();
        manifest.insert("Manifest-Version", "1.0");
        manifest.insert("Short-Name", "demo");

        let out = temp.path().join("demo.hpi");
        ZipArchiveWriter.write_archive(&manifest, &root, &out).unwrap();

        let read_back = read_manifest(&out).unwrap().unwrap();
        assert_eq!(read_back.get("Short-Name"), Some("demo"));

        let mut archive = zip::ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut content = String::new();
        archive.by_name("WEB-INF/lib/a.jar").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "jar");
        assert!(archive.by_name("index.jelly").is_ok());
    }

    #[test]
    fn test_tree_manifest_is_replaced() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("classes");
        std::fs::create_dir_all(root.join("META-INF")).unwrap();
        std::fs::write(root.join("META-INF/MANIFEST.MF"), "Stale: yes\n").unwrap();

        let mut manifest = Manifest::new();
        manifest.insert("Fresh", "yes");
        let out = temp.path().join("classes.jar");
        ZipArchiveWriter.write_archive(&manifest, &root, &out).unwrap();

        let read_back = read_manifest(&out).unwrap().unwrap();
        assert_eq!(read_back.get("Fresh"), Some("yes"));
        assert!(!read_back.contains("Stale"));
    }

    #[test]
    fn test_missing_root_writes_manifest_only() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("empty.jar");
        ZipArchiveWriter
            .write_archive(&Manifest::new(), &temp.path().join("nope"), &out)
            .unwrap();
        assert!(read_manifest(&out).unwrap().is_some());
    }
}
