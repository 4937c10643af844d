//! Recognition of merge commit messages
//!
//! Merge commits produced by git, SmartGit, GitHub, Bitbucket and TFS carry the
//! merged branch name in their first line. That name is what the engine uses
//! to find release versions and merged branch types.

use crate::domain::branch::{version_from_branch_name, without_default_remote};
use crate::domain::tag::TagPrefix;
use crate::domain::version::SemanticVersion;
use crate::error::{GitSemverError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static DEFAULT_FORMATS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        (
            "Default",
            r"^Merge (branch|tag) '(?P<SourceBranch>[^']*)'(?: into (?P<TargetBranch>[^\s]*))*",
        ),
        (
            "SmartGit",
            r"^Finish (?P<SourceBranch>[^\s]*)(?: into (?P<TargetBranch>[^\s]*))*",
        ),
        (
            "BitBucketPull",
            r"^Merge pull request #(?P<PullRequestNumber>\d+) (from|in) (?P<Source>.*) from (?P<SourceBranch>[^\s]*) to (?P<TargetBranch>[^\s]*)",
        ),
        (
            "BitBucketPullv7",
            r"^Merged in (?P<SourceBranch>[^\s]*) \(pull request #(?P<PullRequestNumber>\d+)\)",
        ),
        (
            "GitHubPull",
            r"^Merge pull request #(?P<PullRequestNumber>\d+) (from|in) (?:[^\s/]+/)?(?P<SourceBranch>[^\s]*)(?: into (?P<TargetBranch>[^\s]*))*",
        ),
        (
            "RemoteTracking",
            r"^Merge remote-tracking branch '(?P<SourceBranch>[^\s]*)'(?: into (?P<TargetBranch>[^\s]*))*",
        ),
        (
            "TfsMergeMessageEnglishUS",
            r"^Merge (?P<SourceBranch>[^\s]*) to (?P<TargetBranch>[^\s]*)",
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("static regex")))
    .collect()
});

/// A recognized merge commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeMessage {
    pub format_name: String,
    /// Merged branch, without a leading `origin/`
    pub merged_branch: String,
    pub target_branch: Option<String>,
    pub pull_request_number: Option<u64>,
    /// Version embedded in the merged branch name, if any
    pub version: Option<SemanticVersion>,
}

impl MergeMessage {
    pub fn is_merged_pull_request(&self) -> bool {
        self.pull_request_number.is_some()
    }
}

/// Matches merge messages against user formats first, then the built-in ones
#[derive(Debug, Clone, Default)]
pub struct MergeMessageParser {
    custom_formats: Vec<(String, Regex)>,
}

impl MergeMessageParser {
    /// Compile user-defined formats (name -> regex with a `SourceBranch` group)
    pub fn new(custom_formats: &BTreeMap<String, String>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(custom_formats.len());
        for (name, pattern) in custom_formats {
            let regex = Regex::new(pattern).map_err(|e| {
                GitSemverError::config(format!(
                    "Invalid merge message format '{}': {}",
                    name, e
                ))
            })?;
            if !regex
                .capture_names()
                .flatten()
                .any(|group| group == "SourceBranch")
            {
                return Err(GitSemverError::config(format!(
                    "Merge message format '{}' must define a SourceBranch group",
                    name
                )));
            }
            compiled.push((name.clone(), regex));
        }
        Ok(MergeMessageParser {
            custom_formats: compiled,
        })
    }

    /// Parse a commit message. Messages that match no format yield `None`.
    pub fn parse(&self, message: &str, prefix: &TagPrefix) -> Option<MergeMessage> {
        let first_line = message.lines().next().unwrap_or_default().trim();
        if first_line.is_empty() {
            return None;
        }

        let formats = self
            .custom_formats
            .iter()
            .map(|(name, regex)| (name.as_str(), regex))
            .chain(DEFAULT_FORMATS.iter().map(|(name, regex)| (*name, regex)));

        for (name, regex) in formats {
            let Some(captures) = regex.captures(first_line) else {
                continue;
            };
            let Some(source) = captures.name("SourceBranch") else {
                continue;
            };

            let merged_branch = without_default_remote(source.as_str()).to_string();
            if merged_branch.is_empty() {
                continue;
            }

            let version = version_from_branch_name(&merged_branch, prefix).map(|b| b.version);
            return Some(MergeMessage {
                format_name: name.to_string(),
                merged_branch,
                target_branch: captures
                    .name("TargetBranch")
                    .map(|m| m.as_str().to_string())
                    .filter(|target| !target.is_empty()),
                pull_request_number: captures
                    .name("PullRequestNumber")
                    .and_then(|m| m.as_str().parse::<u64>().ok()),
                version,
            });
        }

        None
    }
}
