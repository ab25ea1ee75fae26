//! Platform version tokens and their ordering.
//!
//! A version token is either a released API level (`"28"`) or the codename of
//! an unreleased platform (`"Q"`, `"UpsideDownCake"`). Codenames always sort
//! above every numeric level.
//!
//! Pure functions with no I/O or side effects.

use crate::error::{FixerError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static CODENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.\-]*$").expect("codename pattern is valid")
});

/// A parsed version token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
    /// Released API level, stored as digits without leading zeros.
    Level(String),
    /// Pre-release codename.
    Codename(String),
}

impl VersionToken {
    /// Parses a token from its manifest / command-line form.
    ///
    /// ## Rules
    /// - All ASCII digits: API level (`"0028"` equals `"28"`)
    /// - ASCII letter followed by `[A-Za-z0-9_.-]`: codename
    /// - Anything else, including the empty string, is rejected
    pub fn parse(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(FixerError::MalformedVersion(
                token.to_string(),
                "cannot be empty".to_string(),
            ));
        }

        if token.bytes().all(|b| b.is_ascii_digit()) {
            let digits = token.trim_start_matches('0');
            let digits = if digits.is_empty() { "0" } else { digits };
            return Ok(VersionToken::Level(digits.to_string()));
        }

        if CODENAME.is_match(token) {
            return Ok(VersionToken::Codename(token.to_string()));
        }

        Err(FixerError::MalformedVersion(
            token.to_string(),
            "expected an API level or a platform codename".to_string(),
        ))
    }

    pub fn is_codename(&self) -> bool {
        matches!(self, VersionToken::Codename(_))
    }
}

impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Normalized digit strings: longer is larger, same length compares
            // lexicographically. Avoids overflow on absurdly long levels.
            (VersionToken::Level(a), VersionToken::Level(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (VersionToken::Codename(a), VersionToken::Codename(b)) => a.cmp(b),
            (VersionToken::Codename(_), VersionToken::Level(_)) => Ordering::Greater,
            (VersionToken::Level(_), VersionToken::Codename(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Returns `true` if `a` denotes a strictly higher platform version than `b`.
///
/// # Errors
///
/// - `MalformedVersion`: either token is empty or not a valid level/codename
///
/// # Examples
///
/// ```
/// # use manifest_fixer::version::compare_version_gt;
/// assert!(compare_version_gt("18", "8").unwrap());
/// assert!(compare_version_gt("Q", "P").unwrap());
/// assert!(compare_version_gt("Q", "28").unwrap());
/// assert!(!compare_version_gt("28", "28").unwrap());
/// ```
pub fn compare_version_gt(a: &str, b: &str) -> Result<bool> {
    Ok(VersionToken::parse(a)? > VersionToken::parse(b)?)
}
