//! Maven-style version comparison.
//!
//! A version string is split into tokens at `.`, `-` and `_` and at every
//! switch between digits and letters. Tokens are then compared pairwise,
//! padding the shorter list with "null" tokens:
//!
//! - numbers compare numerically (arbitrary length, leading zeros ignored)
//! - qualifiers compare by maturity:
//!   `alpha < beta < milestone < rc < snapshot < (release) < sp < other`
//! - a number is always newer than a qualifier
//! - a missing token equals `0` or the release qualifier
//!
//! Two versions that are equal under these rules but spelled differently
//! (`1.0` vs `1.0.0`) are ordered by plain string comparison so the order is
//! total.
//!
//! # Examples
//!
//! ```rust
//! use hpkg_cli::version::comparison::{ArtifactVersion, VersionComparator};
//!
//! assert!(ArtifactVersion::parse("1.10") > ArtifactVersion::parse("1.9"));
//! assert!(ArtifactVersion::parse("2.5-SNAPSHOT") < ArtifactVersion::parse("2.5"));
//! assert!(VersionComparator::is_newer("1.2", "1.0"));
//! ```

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Digits with leading zeros removed ("" means zero)
    Number(String),
    Qualifier(String),
}

const QUALIFIER_ORDER: &[&str] = &["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

fn canonical_qualifier(raw: &str) -> String {
    match raw {
        "a" => "alpha".to_string(),
        "b" => "beta".to_string(),
        "m" => "milestone".to_string(),
        "cr" => "rc".to_string(),
        "ga" | "final" | "release" => String::new(),
        other => other.to_string(),
    }
}

fn qualifier_rank(qualifier: &str) -> (usize, &str) {
    match QUALIFIER_ORDER.iter().position(|q| *q == qualifier) {
        Some(idx) => (idx, ""),
        None => (QUALIFIER_ORDER.len(), qualifier),
    }
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn push_token(current: &mut String, is_digit: bool, tokens: &mut Vec<Token>) {
    if current.is_empty() {
        return;
    }
    if is_digit {
        tokens.push(Token::Number(current.trim_start_matches('0').to_string()));
    } else {
        tokens.push(Token::Qualifier(canonical_qualifier(current)));
    }
    current.clear();
}

impl Token {
    fn compare(left: Option<&Self>, right: Option<&Self>) -> Ordering {
        match (left, right) {
            (None, None) => Ordering::Equal,
            (Some(l), None) => l.compare_to_null(),
            (None, Some(r)) => r.compare_to_null().reverse(),
            (Some(Self::Number(a)), Some(Self::Number(b))) => compare_numbers(a, b),
            (Some(Self::Number(_)), Some(Self::Qualifier(_))) => Ordering::Greater,
            (Some(Self::Qualifier(_)), Some(Self::Number(_))) => Ordering::Less,
            (Some(Self::Qualifier(a)), Some(Self::Qualifier(b))) => {
                qualifier_rank(a).cmp(&qualifier_rank(b))
            }
        }
    }

    fn compare_to_null(&self) -> Ordering {
        match self {
            Self::Number(n) if n.is_empty() => Ordering::Equal,
            Self::Number(_) => Ordering::Greater,
            Self::Qualifier(q) => qualifier_rank(q).cmp(&qualifier_rank("")),
        }
    }
}

/// A parsed artifact version with a total order.
#[derive(Debug, Clone)]
pub struct ArtifactVersion {
    raw: String,
    tokens: Vec<Token>,
}

impl ArtifactVersion {
    /// Parses a version string. Parsing never fails; unknown text becomes a
    /// qualifier token.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_is_digit = false;

        for ch in lowered.chars() {
            if matches!(ch, '.' | '-' | '_') {
                push_token(&mut current, current_is_digit, &mut tokens);
                continue;
            }
            let is_digit = ch.is_ascii_digit();
            if !current.is_empty() && is_digit != current_is_digit {
                push_token(&mut current, current_is_digit, &mut tokens);
            }
            current_is_digit = is_digit;
            current.push(ch);
        }
        push_token(&mut current, current_is_digit, &mut tokens);

        Self {
            raw: raw.to_string(),
            tokens,
        }
    }

    /// The original version text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compares ignoring spelling; `1.0` and `1.0.0` are equivalent here.
    #[must_use]
    pub fn compare_semantic(&self, other: &Self) -> Ordering {
        let len = self.tokens.len().max(other.tokens.len());
        for idx in 0..len {
            let ord = Token::compare(self.tokens.get(idx), other.tokens.get(idx));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialEq for ArtifactVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArtifactVersion {}

impl PartialOrd for ArtifactVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArtifactVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_semantic(other).then_with(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Static helpers over version strings.
pub struct VersionComparator;

impl VersionComparator {
    /// Returns true if `candidate` is strictly newer than `current`.
    #[must_use]
    pub fn is_newer(candidate: &str, current: &str) -> bool {
        ArtifactVersion::parse(candidate) > ArtifactVersion::parse(current)
    }

    /// Returns the newest version of the list, if any.
    pub fn get_latest<'a, I>(versions: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        versions.into_iter().max_by_key(|v| ArtifactVersion::parse(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> ArtifactVersion {
        ArtifactVersion::parse(raw)
    }

    #[test]
    fn test_numeric_segments() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("2.0") > v("1.99.99"));
        assert!(v("1.0.1") > v("1.0"));
        assert!(v("20071105") > v("1.0"));
        assert!(v("1.00000000000000000000001") < v("1.2"));
        assert!(v("1.123456789012345678901234567890") > v("1.2"));
    }

    #[test]
    fn test_qualifiers() {
        assert!(v("1.0-alpha") < v("1.0-beta"));
        assert!(v("1.0-beta") < v("1.0-rc1"));
        assert!(v("1.0-rc1") < v("1.0-rc2"));
        assert!(v("1.0-SNAPSHOT") < v("1.0"));
        assert!(v("1.0-rc1") < v("1.0-SNAPSHOT"));
        assert!(v("1.0") < v("1.0-sp1"));
        assert_eq!(v("1.0-cr1").compare_semantic(&v("1.0-rc1")), Ordering::Equal);
    }

    #[test]
    fn test_number_beats_qualifier() {
        assert!(v("1.0.1") > v("1.0-rc1"));
        assert!(v("2.5") > v("2.5-rc1.abcdef-SNAPSHOT"));
    }

    #[test]
    fn test_equivalent_spellings_are_ordered_deterministically() {
        assert_eq!(v("1.0").compare_semantic(&v("1.0.0")), Ordering::Equal);
        assert_eq!(v("1.0").compare_semantic(&v("1")), Ordering::Equal);
        assert_ne!(v("1.0"), v("1.0.0"));
        assert!(v("1.0") < v("1.0.0"));
        assert_eq!(v("1.0"), v("1.0"));
    }

    #[test]
    fn test_is_newer_is_strict() {
        assert!(VersionComparator::is_newer("1.2", "1.0"));
        assert!(!VersionComparator::is_newer("1.0", "1.2"));
        assert!(!VersionComparator::is_newer("1.2", "1.2"));
    }

    #[test]
    fn test_get_latest() {
        let versions = ["1.0", "1.2-SNAPSHOT", "1.1", "1.2-beta"];
        assert_eq!(VersionComparator::get_latest(versions), Some("1.2-SNAPSHOT"));
        assert_eq!(VersionComparator::get_latest(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_display_keeps_raw_text() {
        assert_eq!(v("2.5-SNAPSHOT").to_string(), "2.5-SNAPSHOT");
        assert_eq!(v("2.5-SNAPSHOT").as_str(), "2.5-SNAPSHOT");
    }
}
