//! Reading and writing `META-INF/MANIFEST.MF` main sections.
//!
//! The format is line based: `Name: value`, lines at most 72 bytes, longer
//! values continued on following lines that start with a single space.
//! Only the main section is modelled; per-entry sections after the first
//! blank line are ignored when reading.

use crate::core::HpkgError;
use std::fmt;

/// Maximum encoded line length in bytes, excluding the line terminator.
const MAX_LINE_BYTES: usize = 72;

/// Ordered main-section attributes of a jar manifest.
///
/// Insertion order is preserved on write. Lookups are case-insensitive on
/// the attribute name, as in the jar format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(String, String)>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Sets an attribute when a value is present.
    pub fn insert_opt(&mut self, name: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Looks up an attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes an attribute.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterates attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the main section of a manifest.
    ///
    /// Accepts `\n`, `\r\n` and `\r` line endings and an optional UTF-8 BOM.
    pub fn parse(text: &str) -> Result<Self, HpkgError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut manifest = Self::new();
        let mut current: Option<(String, String)> = None;

        for (idx, line) in normalized.split('\n').enumerate() {
            if line.is_empty() {
                // End of the main section.
                break;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                match current.as_mut() {
                    Some((_, value)) => value.push_str(continuation),
                    None => {
                        return Err(HpkgError::ManifestParseError {
                            line: idx + 1,
                            reason: "continuation line without an attribute".to_string(),
                        });
                    }
                }
                continue;
            }
            if let Some((name, value)) = current.take() {
                manifest.insert(name, value);
            }
            let Some((name, value)) = line.split_once(':') else {
                return Err(HpkgError::ManifestParseError {
                    line: idx + 1,
                    reason: format!("expected 'Name: value', found '{line}'"),
                });
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(HpkgError::ManifestParseError {
                    line: idx + 1,
                    reason: "empty attribute name".to_string(),
                });
            }
            let value = value.strip_prefix(' ').unwrap_or(value);
            current = Some((name.to_string(), value.to_string()));
        }
        if let Some((name, value)) = current {
            manifest.insert(name, value);
        }
        Ok(manifest)
    }

    /// Encodes the manifest with CRLF endings and 72-byte line wrapping.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        for (name, value) in &self.entries {
            write_wrapped(&mut out, &format!("{name}: {value}"));
        }
        out.push_str("\r\n");
        out.into_bytes()
    }
}

fn write_wrapped(out: &mut String, line: &str) {
    let mut limit = MAX_LINE_BYTES;
    let mut chunk = String::new();
    for ch in line.chars() {
        if chunk.len() + ch.len_utf8() > limit {
            out.push_str(&chunk);
            out.push_str("\r\n ");
            chunk.clear();
            // Continuation lines spend one byte on the leading space.
            limit = MAX_LINE_BYTES - 1;
        }
        chunk.push(ch);
    }
    out.push_str(&chunk);
    out.push_str("\r\n");
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}
