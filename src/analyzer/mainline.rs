//! Mainline versioning
//!
//! The first-parent history of the mainline is replayed from the base
//! version: every merged branch bumps the version once, by the increment of
//! its branch type. Release branches carrying a higher version set it.

use crate::analyzer::increment::combine_increment;
use crate::analyzer::next_version::{apply_label, configured_increment};
use crate::config::IncrementStrategy;
use crate::context::GitVersionContext;
use crate::domain::{BuildMetaData, PreReleaseTag, SemanticVersion, VersionField};
use crate::error::Result;
use crate::git::{Commit, CommitFilter};
use crate::strategies::BaseVersion;
use std::cmp::Ordering;
use tracing::debug;

/// Result of replaying the mainline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainlineVersion {
    pub version: SemanticVersion,
    /// Commits counted from the base version source
    pub commits_since_version_source: u64,
}

/// Replay the mainline history on top of `base`
pub fn calculate(context: &GitVersionContext<'_>, base: &BaseVersion) -> Result<MainlineVersion> {
    let mainline = context.mainline_branch()?;
    let off_mainline_base = match &mainline {
        Some(point) if !context.configuration.is_mainline => Some(point.commit),
        _ => None,
    };
    let walk_tip = off_mainline_base.unwrap_or(context.current_commit.id);

    let walk = context.repository.commits(
        &CommitFilter::reachable_from(walk_tip)
            .excluding(base.base_version_source)
            .first_parent_only()
            .reversed(),
    )?;

    let mut version = base
        .semantic_version
        .clone()
        .with_build_metadata(BuildMetaData::default());
    let mut incremented = false;

    for commit in walk.iter().filter(|commit| commit.is_merge()) {
        if let Some(next) = merged_release_version(context, commit, &version) {
            debug!(commit = %commit.id, version = %next, "merged release sets the version");
            version = next;
            incremented = true;
            continue;
        }

        let field = merge_increment(context, commit, &version)?;
        if field != VersionField::None {
            version = version.increment(field);
            incremented = true;
            debug!(commit = %commit.id, increment = ?field, version = %version, "merge increments the version");
        }
    }

    if !incremented && !walk.is_empty() && base.should_increment {
        let marker = context.increment_analyzer.analyze_commits(&walk);
        let field = combine_increment(&version, configured_increment(context), marker);
        version = version.increment(field);
        debug!(increment = ?field, "no merge incremented the version, applying the branch increment");
    }

    let mut commits_since_version_source = walk.len() as u64;

    if let Some(merge_base) = off_mainline_base {
        let branch_commits = context.repository.commits(
            &CommitFilter::reachable_from(context.current_commit.id).excluding(Some(merge_base)),
        )?;
        let marker = context.increment_analyzer.analyze_commits(&branch_commits);
        let field = combine_increment(&version, configured_increment(context), marker);
        version = version.increment(field);
        commits_since_version_source += branch_commits.len() as u64;

        let label_source = apply_label(context, version.clone(), base.branch_name_override.as_deref())?;
        if let Some(tag) = label_source.pre_release_tag.filter(|tag| tag.has_tag()) {
            version.pre_release_tag = Some(PreReleaseTag::new(tag.name, Some(branch_commits.len() as u64)));
        }
    } else {
        version = apply_label(context, version, base.branch_name_override.as_deref())?;
    }

    Ok(MainlineVersion {
        version,
        commits_since_version_source,
    })
}

/// A merged release branch whose name carries a version above `current`
fn merged_release_version(
    context: &GitVersionContext<'_>,
    commit: &Commit,
    current: &SemanticVersion,
) -> Option<SemanticVersion> {
    let merge = context.merge_messages.parse(&commit.message, &context.tag_prefix)?;
    if !context.resolver.is_release_branch(&merge.merged_branch) {
        return None;
    }
    let version = merge.version?;
    (version.core_cmp(current) == Ordering::Greater).then(|| {
        let mut next = current.with_core_of(&version);
        next.pre_release_tag = None;
        next
    })
}

/// Increment for one merge: the merged branch type's increment, raised by
/// markers in the merge commit and the commits it brought in
fn merge_increment(
    context: &GitVersionContext<'_>,
    merge: &Commit,
    current: &SemanticVersion,
) -> Result<VersionField> {
    let branch_field = match context.merge_messages.parse(&merge.message, &context.tag_prefix) {
        Some(parsed) => match context.resolver.increment(&parsed.merged_branch) {
            IncrementStrategy::Inherit => VersionField::Minor,
            strategy => strategy.field().unwrap_or(VersionField::Patch),
        },
        None => configured_increment(context),
    };

    let mut brought_in = vec![merge.clone()];
    if let Some(first_parent) = merge.parents.first() {
        for parent in merge.parents.iter().skip(1) {
            brought_in.extend(context.repository.commits(
                &CommitFilter::reachable_from(*parent).excluding(Some(*first_parent)),
            )?);
        }
    }
    let marker = context.increment_analyzer.analyze_commits(&brought_in);

    Ok(combine_increment(current, branch_field, marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, VersioningMode};
    use crate::git::MockRepository;
    use crate::strategies::test_support::context;

    fn mainline_config() -> Config {
        Config {
            mode: VersioningMode::Mainline,
            ..Config::default()
        }
    }

    fn base(version: &str, source: git2::Oid) -> BaseVersion {
        BaseVersion::new("test", true, SemanticVersion::parse(version).unwrap(), Some(source))
    }

    fn merge_branch(repo: &mut MockRepository, branch: &str, message: &str) {
        repo.create_branch(branch, "main");
        repo.commit_on(branch, &format!("work on {}", branch));
        repo.merge(branch, "main", &format!("Merge branch '{}'{}", branch, message));
    }

    #[test]
    fn test_feature_then_hotfix() {
        let mut repo = MockRepository::new();
        let root = repo.commit_on("main", "initial");
        merge_branch(&mut repo, "feature/a", "");
        merge_branch(&mut repo, "hotfix/b", "");
        repo.commit_on("main", "tip");
        repo.checkout("main");

        let config = mainline_config();
        let ctx = context(&repo, &config);
        let result = calculate(&ctx, &base("1.0.0", root)).unwrap();
        assert_eq!(result.version.to_string(), "1.1.1");
        assert_eq!(result.commits_since_version_source, 3);
    }

    #[test]
    fn test_marker_in_merged_commits_raises_increment() {
        let mut repo = MockRepository::new();
        let root = repo.commit_on("main", "initial");
        repo.create_branch("hotfix/api", "main");
        repo.commit_on("hotfix/api", "rework api +semver: major");
        repo.merge("hotfix/api", "main", "Merge branch 'hotfix/api'");
        repo.checkout("main");

        let config = mainline_config();
        let ctx = context(&repo, &config);
        let result = calculate(&ctx, &base("1.0.0", root)).unwrap();
        assert_eq!(result.version.to_string(), "2.0.0");
    }

    #[test]
    fn test_merged_release_sets_version() {
        let mut repo = MockRepository::new();
        let root = repo.commit_on("main", "initial");
        merge_branch(&mut repo, "release/3.0.0", "");
        repo.checkout("main");

        let config = mainline_config();
        let ctx = context(&repo, &config);
        let result = calculate(&ctx, &base("1.0.0", root)).unwrap();
        assert_eq!(result.version.to_string(), "3.0.0");
    }

    #[test]
    fn test_direct_commits_apply_increment_once() {
        let mut repo = MockRepository::new();
        let root = repo.commit_on("main", "initial");
        repo.commit_on("main", "one");
        repo.commit_on("main", "two");
        repo.checkout("main");

        let config = mainline_config();
        let ctx = context(&repo, &config);
        let result = calculate(&ctx, &base("1.0.0", root)).unwrap();
        assert_eq!(result.version.to_string(), "1.0.1");
        assert_eq!(result.commits_since_version_source, 2);
    }

    #[test]
    fn test_no_commits_keeps_version() {
        let mut repo = MockRepository::new();
        let root = repo.commit_on("main", "initial");
        repo.checkout("main");

        let config = mainline_config();
        let ctx = context(&repo, &config);
        let result = calculate(&ctx, &base("1.0.0", root)).unwrap();
        assert_eq!(result.version.to_string(), "1.0.0");
        assert_eq!(result.commits_since_version_source, 0);
    }

    #[test]
    fn test_feature_branch_off_mainline() {
        let mut repo = MockRepository::new();
        let root = repo.commit_on("main", "initial");
        repo.create_branch("feature/search", "main");
        repo.commit_on("feature/search", "one");
        repo.commit_on("feature/search", "two");
        repo.checkout("feature/search");

        let config = mainline_config();
        let ctx = context(&repo, &config);
        let result = calculate(&ctx, &base("1.0.0", root)).unwrap();
        // feature inherits patch from main
        assert_eq!(result.version.to_string(), "1.0.1-search.2");
    }
}
