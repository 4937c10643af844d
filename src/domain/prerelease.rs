//! Pre-release tag handling for semantic versions
//!
//! A pre-release tag is a label with an optional trailing number, such as
//! `beta.4`, `alpha` or `PullRequest12.3`. The number is what the engine
//! advances when a pre-release version is incremented.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

static PRE_RELEASE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>.*?)\.?(?P<number>\d+)?$").expect("static regex"));

/// Pre-release label with optional number
///
/// # Examples
/// - "alpha" -> PreReleaseTag { name: "alpha", number: None }
/// - "beta.1" -> PreReleaseTag { name: "beta", number: Some(1) }
/// - "rc3" -> PreReleaseTag { name: "rc", number: Some(3) }
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PreReleaseTag {
    pub name: String,
    pub number: Option<u64>,
}

impl PreReleaseTag {
    pub fn new(name: impl Into<String>, number: Option<u64>) -> Self {
        PreReleaseTag {
            name: name.into(),
            number,
        }
    }

    /// Parse a pre-release tag. Never fails: anything without a trailing
    /// number is kept whole as the name.
    pub fn parse(s: &str) -> Self {
        match PRE_RELEASE_TAG.captures(s) {
            Some(captures) => {
                let name = captures
                    .name("name")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                let number = captures
                    .name("number")
                    .and_then(|m| m.as_str().parse::<u64>().ok());
                // A number too large for u64 stays part of the name.
                if number.is_none() && captures.name("number").is_some() {
                    return PreReleaseTag::new(s, None);
                }
                PreReleaseTag { name, number }
            }
            None => PreReleaseTag::new(s, None),
        }
    }

    /// True when the tag carries a label or a number
    pub fn has_tag(&self) -> bool {
        !self.name.is_empty() || self.number.is_some()
    }

    /// Advance the number; a tag without one starts at 1
    pub fn increment_number(&self) -> Self {
        PreReleaseTag {
            name: self.name.clone(),
            number: Some(self.number.map_or(1, |n| n.saturating_add(1))),
        }
    }

    pub fn with_number(&self, number: u64) -> Self {
        PreReleaseTag {
            name: self.name.clone(),
            number: Some(number),
        }
    }

    /// Case-insensitive label comparison
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Precedence between two tags: names compare case-insensitively, then
    /// a missing number sorts below any number.
    pub fn precedence_cmp(&self, other: &PreReleaseTag) -> Ordering {
        let by_name = self
            .name
            .to_ascii_lowercase()
            .cmp(&other.name.to_ascii_lowercase());
        if by_name != Ordering::Equal {
            return by_name;
        }
        self.number.cmp(&other.number)
    }
}

impl fmt::Display for PreReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name.is_empty(), self.number) {
            (true, Some(number)) => write!(f, "{}", number),
            (false, Some(number)) => write!(f, "{}.{}", self.name, number),
            (_, None) => write!(f, "{}", self.name),
        }
    }
}
