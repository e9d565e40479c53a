//! Developer workspace map.
//!
//! Records where the sources of a snapshot component live on this machine so
//! a host running in development mode can load classes straight from the
//! workspace. The file is a properties-style list of
//! `absolutePath=groupId:artifactId:type:version` lines shared by every
//! build on the machine.
//!
//! Writers take an exclusive lock on a sibling `.lock` file and replace the
//! map atomically, so concurrent builds never lose each other's entries.
//! Readers take no lock and treat a missing file as an empty map.

use crate::constants::WORKSPACE_MAP_HEADER;
use crate::core::HpkgError;
use crate::utils::fs::{ensure_dir, safe_write};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Component id to workspace directory lookup.
pub trait WorkspaceMap {
    /// Finds a recorded directory for `id` that still exists.
    ///
    /// With `workspace` set, a directory below it is preferred over other
    /// matches.
    fn read(&self, id: &str, workspace: Option<&Path>) -> Result<Option<PathBuf>, HpkgError>;

    /// Records `dir` as the workspace of `id`.
    fn write(&self, id: &str, dir: &Path) -> Result<(), HpkgError>;
}

/// [`WorkspaceMap`] stored in a single file.
#[derive(Debug, Clone)]
pub struct FileWorkspaceMap {
    path: PathBuf,
}

impl FileWorkspaceMap {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// All entries in file order.
    ///
    /// # Errors
    ///
    /// [`HpkgError::IoError`] if the file exists but cannot be read.
    pub fn entries(&self) -> Result<Vec<(String, String)>, HpkgError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(parse_properties(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn lock(&self) -> Result<File, HpkgError> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            ensure_dir(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| HpkgError::assembly_io("open lock", &lock_path, &self.path, e))?;
        file.lock_exclusive()
            .map_err(|e| HpkgError::assembly_io("lock", &lock_path, &self.path, e))?;
        debug!(path = %lock_path.display(), "Workspace map locked");
        Ok(file)
    }
}

impl WorkspaceMap for FileWorkspaceMap {
    fn read(&self, id: &str, workspace: Option<&Path>) -> Result<Option<PathBuf>, HpkgError> {
        let mut matching = None;
        for (path, value) in self.entries()? {
            if value != id {
                continue;
            }
            let candidate = PathBuf::from(path);
            if !candidate.exists() {
                continue;
            }
            let preferred = workspace.is_none_or(|ws| candidate.starts_with(ws));
            matching = Some(candidate);
            if preferred {
                break;
            }
        }
        Ok(matching)
    }

    fn write(&self, id: &str, dir: &Path) -> Result<(), HpkgError> {
        let lock = self.lock()?;

        let key = dir.display().to_string();
        let mut entries = self.entries()?;
        match entries.iter_mut().find(|(path, _)| *path == key) {
            Some(entry) => entry.1 = id.to_string(),
            None => entries.push((key, id.to_string())),
        }
        safe_write(&self.path, &render_properties(&entries))?;

        #[allow(unstable_name_collisions)]
        if let Err(e) = lock.unlock() {
            debug!(error = %e, "Failed to release workspace map lock");
        }
        Ok(())
    }
}

fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for line in content.lines() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = split_entry(line);
        entries.push((unescape(key), unescape(value.trim_start())));
    }
    entries
}

/// Splits at the first unescaped `=` or `:`.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '=' | ':' if !escaped => return (&line[..index], &line[index + 1..]),
            _ => escaped = false,
        }
    }
    (line, "")
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || index == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

fn render_properties(entries: &[(String, String)]) -> String {
    let mut out = format!("#{WORKSPACE_MAP_HEADER}\n");
    for (key, value) in entries {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}
