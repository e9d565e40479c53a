//! Dynamic-loadability of a plugin.
//!
//! The compiled extension index lists one extension per line:
//!
//! ```text
//! org.example.HelloBuilder dynamicLoadable=YES
//! org.example.HelloListener dynamicLoadable=NO
//! org.example.HelloAction
//! ```
//!
//! A missing value counts as `MAYBE`. The whole plugin takes the most
//! restrictive answer: any `NO` makes it `false`, otherwise any `MAYBE`
//! leaves it unknown (`None`), otherwise it is `true`. A plugin without
//! extensions is dynamically loadable.

use crate::constants::EXTENSION_INDEX_FILE;
use crate::core::HpkgError;
use std::path::Path;
use tracing::debug;

/// Tri-state value of one extension declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loadability {
    Yes,
    No,
    Maybe,
}

impl Loadability {
    fn parse_line(line: &str) -> Self {
        let value = line
            .split_whitespace()
            .skip(1)
            .find_map(|token| token.strip_prefix("dynamicLoadable="));
        match value.map(str::to_ascii_uppercase).as_deref() {
            Some("YES") => Self::Yes,
            Some("NO") => Self::No,
            _ => Self::Maybe,
        }
    }
}

/// Folds the index text into the plugin's `Support-Dynamic-Loading` value.
#[must_use]
pub fn merge_index(index: &str) -> Option<bool> {
    let mut maybe = false;
    for line in index.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match Loadability::parse_line(line) {
            Loadability::No => return Some(false),
            Loadability::Maybe => maybe = true,
            Loadability::Yes => {}
        }
    }
    if maybe { None } else { Some(true) }
}

/// Reads `{classes}/META-INF/annotations/hudson.Extension.txt`.
///
/// A missing index means no extensions, hence `Some(true)`.
///
/// # Errors
///
/// [`HpkgError::IoError`] if the index exists but cannot be read.
pub fn support_dynamic_loading(classes_dir: &Path) -> Result<Option<bool>, HpkgError> {
    let index = classes_dir.join(EXTENSION_INDEX_FILE);
    match std::fs::read_to_string(&index) {
        Ok(content) => Ok(merge_index(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %index.display(), "No extension index");
            Ok(Some(true))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_merge_rules() {
        assert_eq!(merge_index(""), Some(true));
        assert_eq!(merge_index("a.A dynamicLoadable=YES\nb.B dynamicLoadable=YES"), Some(true));
        assert_eq!(merge_index("a.A dynamicLoadable=YES\nb.B"), None);
        assert_eq!(merge_index("a.A dynamicLoadable=MAYBE\nb.B dynamicLoadable=NO"), Some(false));
        assert_eq!(merge_index("a.A dynamicLoadable=NO\nb.B"), Some(false));
    }

    #[test]
    fn test_missing_index_is_loadable() {
        let temp = TempDir::new().unwrap();
        assert_eq!(support_dynamic_loading(temp.path()).unwrap(), Some(true));

        let index = temp.path().join(EXTENSION_INDEX_FILE);
        std::fs::create_dir_all(index.parent().unwrap()).unwrap();
        std::fs::write(&index, "org.example.Hello dynamicLoadable=NO\n").unwrap();
        assert_eq!(support_dynamic_loading(temp.path()).unwrap(), Some(false));
    }
}
