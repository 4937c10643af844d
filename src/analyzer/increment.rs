use crate::config::{compile, CommitMessageIncrementMode, EffectiveConfiguration};
use crate::domain::{SemanticVersion, VersionField};
use crate::error::Result;
use crate::git::{Commit, CommitFilter, Repository};
use git2::Oid;
use regex::Regex;
use std::cmp::Ordering;

/// Scans commit messages for `+semver:` style increment markers
#[derive(Debug, Clone)]
pub struct IncrementAnalyzer {
    mode: CommitMessageIncrementMode,
    major: Regex,
    minor: Regex,
    patch: Regex,
    none: Regex,
}

impl IncrementAnalyzer {
    /// Compile the marker regexes of the effective configuration
    pub fn new(config: &EffectiveConfiguration) -> Result<Self> {
        Ok(IncrementAnalyzer {
            mode: config.commit_message_incrementing,
            major: compile("major-version-bump-message", &config.major_version_bump_message)?,
            minor: compile("minor-version-bump-message", &config.minor_version_bump_message)?,
            patch: compile("patch-version-bump-message", &config.patch_version_bump_message)?,
            none: compile("no-bump-message", &config.no_bump_message)?,
        })
    }

    /// Marker carried by a single message, highest first
    pub fn marker(&self, message: &str) -> Option<VersionField> {
        if self.major.is_match(message) {
            Some(VersionField::Major)
        } else if self.minor.is_match(message) {
            Some(VersionField::Minor)
        } else if self.patch.is_match(message) {
            Some(VersionField::Patch)
        } else if self.none.is_match(message) {
            Some(VersionField::None)
        } else {
            None
        }
    }

    /// Highest marker among `commits`, honoring the incrementing mode
    pub fn analyze_commits<'c>(
        &self,
        commits: impl IntoIterator<Item = &'c Commit>,
    ) -> Option<VersionField> {
        match self.mode {
            CommitMessageIncrementMode::Disabled => None,
            CommitMessageIncrementMode::Enabled => commits
                .into_iter()
                .filter_map(|commit| self.marker(&commit.message))
                .max(),
            CommitMessageIncrementMode::MergeMessageOnly => commits
                .into_iter()
                .filter(|commit| commit.is_merge())
                .filter_map(|commit| self.marker(&commit.message))
                .max(),
        }
    }

    /// Highest marker in commits reachable from `to` but not from `from`
    pub fn analyze_repository_range(
        &self,
        repo: &dyn Repository,
        from: Option<Oid>,
        to: Oid,
    ) -> Result<Option<VersionField>> {
        if self.mode == CommitMessageIncrementMode::Disabled {
            return Ok(None);
        }
        let commits = repo.commits(&CommitFilter::reachable_from(to).excluding(from))?;
        Ok(self.analyze_commits(&commits))
    }
}

/// Combine the configured increment with a commit message marker.
///
/// A marker never lowers the configured increment, so a `no-bump-message`
/// marker keeps the configured increment. A major marker is capped to minor
/// while the version is below 1.0.0.
pub fn combine_increment(
    version: &SemanticVersion,
    configured: VersionField,
    marker: Option<VersionField>,
) -> VersionField {
    let Some(mut marker) = marker else {
        return configured;
    };

    if marker == VersionField::Major
        && version.precedence_cmp(&SemanticVersion::new(1, 0, 0)) == Ordering::Less
    {
        marker = VersionField::Minor;
    }

    marker.max(configured)
}
