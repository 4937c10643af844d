//! Build metadata attached to a calculated version
//!
//! Only `commits_since_tag`, `branch`, `sha` and `other_metadata` take part
//! in the textual form (`5.Branch.main.Sha.abc123.extra`). The remaining
//! fields describe the calculation and are exposed through output variables.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static BUILD_METADATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<build>\d+)?(\.?Branch(Name)?\.(?P<branch>[^\.]+))?(\.?Sha?\.(?P<sha>[^\.]+))?(?P<other>.*)$",
    )
    .expect("static regex")
});

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z.\-]").expect("static regex"));

/// Number of characters in a short sha
pub const SHORT_SHA_LENGTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildMetaData {
    pub commits_since_tag: Option<u64>,
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub short_sha: Option<String>,
    pub other_metadata: Option<String>,
    pub commit_date: Option<DateTime<Utc>>,
    pub version_source_sha: Option<String>,
    pub commits_since_version_source: u64,
    pub uncommitted_changes: u64,
}

impl BuildMetaData {
    /// Parse the part of a version string following `+`.
    pub fn parse(s: &str) -> Self {
        let mut metadata = BuildMetaData::default();
        if s.is_empty() {
            return metadata;
        }

        let Some(captures) = BUILD_METADATA.captures(s) else {
            metadata.other_metadata = Some(s.to_string());
            return metadata;
        };

        metadata.commits_since_tag = captures
            .name("build")
            .and_then(|m| m.as_str().parse::<u64>().ok());
        metadata.branch = captures.name("branch").map(|m| m.as_str().to_string());
        if let Some(sha) = captures.name("sha") {
            metadata.sha = Some(sha.as_str().to_string());
            metadata.short_sha = Some(short_sha(sha.as_str()));
        }
        metadata.other_metadata = captures
            .name("other")
            .map(|m| m.as_str().trim_start_matches('.'))
            .filter(|m| !m.is_empty())
            .map(|m| m.to_string());

        metadata
    }

    /// True when none of the textual parts are set
    pub fn is_empty(&self) -> bool {
        self.commits_since_tag.is_none()
            && self.branch.is_none()
            && self.sha.is_none()
            && self.other_metadata.is_none()
    }

    /// Short form: the number of commits since the tag, if any
    pub fn format_short(&self) -> String {
        self.commits_since_tag
            .map(|count| count.to_string())
            .unwrap_or_default()
    }

    /// Full form: `{commits}.Branch.{branch}.Sha.{sha}.{other}`, skipping absent parts
    pub fn format_full(&self) -> String {
        let mut parts = Vec::new();
        if let Some(count) = self.commits_since_tag {
            parts.push(count.to_string());
        }
        if let Some(branch) = &self.branch {
            parts.push(format!("Branch.{}", escape_branch(branch)));
        }
        if let Some(sha) = &self.sha {
            parts.push(format!("Sha.{}", sha));
        }
        if let Some(other) = &self.other_metadata {
            parts.push(other.clone());
        }
        parts.join(".")
    }
}

impl fmt::Display for BuildMetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_full())
    }
}

/// Truncate a full sha to its short form
pub fn short_sha(sha: &str) -> String {
    sha.chars().take(SHORT_SHA_LENGTH).collect()
}

/// Branch names may contain characters that are not valid in build metadata
pub fn escape_branch(branch: &str) -> String {
    UNSAFE_CHARS.replace_all(branch, "-").into_owned()
}
