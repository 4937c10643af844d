use crate::context::GitVersionContext;
use crate::domain::short_sha;
use crate::strategies::{fallback, BaseVersion};
use std::fmt;

/// Non-fatal conditions noticed while evaluating a repository.
/// They never change the calculated version but should be reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// HEAD is detached; the version was calculated for the named branch
    DetachedHead { commit: String, branch: String },
    /// The working tree has changes not reflected in the version
    UncommittedChanges { count: usize },
    /// No tag matched the configured prefix
    NoVersionTags { tag_prefix: String },
    /// Shallow clone evaluated because `ignore-shallow` is set
    ShallowClone,
    /// Nothing but the fallback strategy produced a base version
    FallbackVersion,
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::DetachedHead { commit, branch } => write!(
                f,
                "HEAD is detached at {}; versioning as '{}'",
                short_sha(commit),
                branch
            ),
            BoundaryWarning::UncommittedChanges { count } => {
                write!(f, "{} uncommitted change(s) are not part of this version", count)
            }
            BoundaryWarning::NoVersionTags { tag_prefix } => {
                write!(f, "No tags match the version pattern '{}'", tag_prefix)
            }
            BoundaryWarning::ShallowClone => {
                write!(f, "Repository is a shallow clone; the version may be wrong")
            }
            BoundaryWarning::FallbackVersion => {
                write!(f, "No version source found, starting from the fallback version")
            }
        }
    }
}

/// Warnings for one evaluation
pub fn collect_warnings(context: &GitVersionContext<'_>, base: &BaseVersion) -> Vec<BoundaryWarning> {
    let mut warnings = Vec::new();

    if context.is_detached_head {
        warnings.push(BoundaryWarning::DetachedHead {
            commit: context.current_commit.sha(),
            branch: context.branch_name().to_string(),
        });
    }
    if context.uncommitted_changes > 0 {
        warnings.push(BoundaryWarning::UncommittedChanges {
            count: context.uncommitted_changes,
        });
    }
    if context.version_tags().is_empty() {
        warnings.push(BoundaryWarning::NoVersionTags {
            tag_prefix: context.configuration.tag_prefix.clone(),
        });
    }
    if context.repository.is_shallow() {
        warnings.push(BoundaryWarning::ShallowClone);
    }
    if base.source == fallback::SOURCE {
        warnings.push(BoundaryWarning::FallbackVersion);
    }

    warnings
}
