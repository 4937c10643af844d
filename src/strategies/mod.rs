//! Base version strategies
//!
//! Each strategy looks at the repository from one angle and proposes zero or
//! more base versions. Strategies never depend on each other and never write
//! anything; the consolidation step in [`crate::analyzer::base_version`]
//! picks the winner.

pub mod config_next_version;
pub mod fallback;
pub mod merge_message;
pub mod tagged_commit;
pub mod track_merge_target;
pub mod track_release_branches;
pub mod version_in_branch_name;
pub mod version_in_merged_release_branch_name;

use crate::context::GitVersionContext;
use crate::domain::{short_sha, SemanticVersion};
use crate::error::Result;
use git2::Oid;
use std::fmt;

/// A version proposed by a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseVersion {
    /// Human readable provenance, e.g. `Git tag 'v1.2.0'`
    pub source: String,
    pub should_increment: bool,
    pub semantic_version: SemanticVersion,
    /// Commit the version was taken from; commits are counted from here
    pub base_version_source: Option<Oid>,
    /// Replaces the branch name when deriving the pre-release label
    pub branch_name_override: Option<String>,
}

impl BaseVersion {
    pub fn new(
        source: impl Into<String>,
        should_increment: bool,
        semantic_version: SemanticVersion,
        base_version_source: Option<Oid>,
    ) -> Self {
        BaseVersion {
            source: source.into(),
            should_increment,
            semantic_version,
            base_version_source,
            branch_name_override: None,
        }
    }

    pub fn with_branch_name_override(mut self, name: impl Into<String>) -> Self {
        self.branch_name_override = Some(name.into());
        self
    }
}

impl fmt::Display for BaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.semantic_version)?;
        if let Some(oid) = self.base_version_source {
            write!(f, " from {}", short_sha(&oid.to_string()))?;
        }
        if self.should_increment {
            write!(f, " (increment)")?;
        }
        Ok(())
    }
}

/// The fixed set of strategies, evaluated in [`BaseVersionStrategy::ALL`] order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseVersionStrategy {
    ConfigNextVersion,
    TaggedCommit,
    MergeMessage,
    VersionInBranchName,
    TrackMergeTarget,
    TrackReleaseBranches,
    VersionInMergedReleaseBranchName,
    Fallback,
}

impl BaseVersionStrategy {
    pub const ALL: [BaseVersionStrategy; 8] = [
        BaseVersionStrategy::ConfigNextVersion,
        BaseVersionStrategy::TaggedCommit,
        BaseVersionStrategy::MergeMessage,
        BaseVersionStrategy::VersionInBranchName,
        BaseVersionStrategy::TrackMergeTarget,
        BaseVersionStrategy::TrackReleaseBranches,
        BaseVersionStrategy::VersionInMergedReleaseBranchName,
        BaseVersionStrategy::Fallback,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BaseVersionStrategy::ConfigNextVersion => "ConfigNextVersion",
            BaseVersionStrategy::TaggedCommit => "TaggedCommit",
            BaseVersionStrategy::MergeMessage => "MergeMessage",
            BaseVersionStrategy::VersionInBranchName => "VersionInBranchName",
            BaseVersionStrategy::TrackMergeTarget => "TrackMergeTarget",
            BaseVersionStrategy::TrackReleaseBranches => "TrackReleaseBranches",
            BaseVersionStrategy::VersionInMergedReleaseBranchName => {
                "VersionInMergedReleaseBranchName"
            }
            BaseVersionStrategy::Fallback => "Fallback",
        }
    }

    /// Candidates proposed by this strategy; inapplicable strategies return
    /// an empty vector
    pub fn get_versions(self, context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
        match self {
            BaseVersionStrategy::ConfigNextVersion => config_next_version::get_versions(context),
            BaseVersionStrategy::TaggedCommit => tagged_commit::get_versions(context),
            BaseVersionStrategy::MergeMessage => merge_message::get_versions(context),
            BaseVersionStrategy::VersionInBranchName => {
                version_in_branch_name::get_versions(context)
            }
            BaseVersionStrategy::TrackMergeTarget => track_merge_target::get_versions(context),
            BaseVersionStrategy::TrackReleaseBranches => {
                track_release_branches::get_versions(context)
            }
            BaseVersionStrategy::VersionInMergedReleaseBranchName => {
                version_in_merged_release_branch_name::get_versions(context)
            }
            BaseVersionStrategy::Fallback => fallback::get_versions(context),
        }
    }
}

impl fmt::Display for BaseVersionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = BaseVersionStrategy::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.first(), Some(&"ConfigNextVersion"));
        assert_eq!(names.last(), Some(&"Fallback"));
        assert_eq!(names.len(), 8);
    }

    #[test]
    fn test_base_version_display() {
        let oid = Oid::from_str("0123456789abcdef0123456789abcdef01234567").unwrap();
        let base = BaseVersion::new("Git tag 'v1.2.0'", true, SemanticVersion::new(1, 2, 0), Some(oid));
        assert_eq!(base.to_string(), "Git tag 'v1.2.0': 1.2.0 from 0123456 (increment)");

        let plain = BaseVersion::new("Fallback base version", false, SemanticVersion::new(0, 1, 0), None);
        assert_eq!(plain.to_string(), "Fallback base version: 0.1.0");
    }
}
