//! Jar-format archives: manifest codec, reading and writing.
//!
//! - [`manifest`] - `META-INF/MANIFEST.MF` main-section model and codec
//! - [`reader`] - manifest lookup and full extraction of existing archives
//! - [`writer`] - the [`writer::ArchiveWriter`] seam and its zip implementation

pub mod manifest;
pub mod reader;
pub mod writer;

pub use manifest::Manifest;
pub use reader::{extract_all, read_manifest};
pub use writer::{ArchiveWriter, ZipArchiveWriter};
