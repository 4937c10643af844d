use crate::context::GitVersionContext;
use crate::domain::{short_sha, BuildMetaData, SemanticVersion};
use crate::error::Result;
use crate::git::CommitFilter;
use crate::strategies::BaseVersion;

/// Number of commits reachable from the current commit but not from the
/// base version source
pub fn commits_since_source(context: &GitVersionContext<'_>, base: &BaseVersion) -> Result<u64> {
    let commits = context.repository.commits(
        &CommitFilter::reachable_from(context.current_commit.id).excluding(base.base_version_source),
    )?;
    Ok(commits.len() as u64)
}

/// Build metadata describing the current commit, counted from `base`
pub fn build_metadata(
    context: &GitVersionContext<'_>,
    base: &BaseVersion,
    commits_since_version_source: u64,
) -> BuildMetaData {
    let sha = context.current_commit.sha();
    BuildMetaData {
        commits_since_tag: Some(commits_since_version_source),
        branch: Some(context.branch_name().to_string()),
        short_sha: Some(short_sha(&sha)),
        sha: Some(sha),
        other_metadata: None,
        commit_date: context.current_commit.date(),
        version_source_sha: base.base_version_source.map(|oid| oid.to_string()),
        commits_since_version_source,
        uncommitted_changes: context.uncommitted_changes as u64,
    }
}

/// Attach build metadata to `version`
pub fn attach(
    version: SemanticVersion,
    context: &GitVersionContext<'_>,
    base: &BaseVersion,
    commits_since_version_source: u64,
) -> SemanticVersion {
    version.with_build_metadata(build_metadata(context, base, commits_since_version_source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::MockRepository;
    use crate::strategies::test_support::context;

    #[test]
    fn test_metadata_counts_from_source() {
        let mut repo = MockRepository::new();
        let root = repo.commit_on("main", "initial");
        repo.commit_on("main", "one");
        let tip = repo.commit_on("main", "two");
        repo.checkout("main");
        repo.set_uncommitted_changes(3);

        let config = Config::default();
        let ctx = context(&repo, &config);
        let base = BaseVersion::new("test", true, SemanticVersion::new(1, 0, 0), Some(root));

        let count = commits_since_source(&ctx, &base).unwrap();
        assert_eq!(count, 2);

        let metadata = build_metadata(&ctx, &base, count);
        assert_eq!(metadata.commits_since_tag, Some(2));
        assert_eq!(metadata.branch.as_deref(), Some("main"));
        assert_eq!(metadata.sha, Some(tip.to_string()));
        assert_eq!(metadata.short_sha, Some(tip.to_string()[..7].to_string()));
        assert_eq!(metadata.version_source_sha, Some(root.to_string()));
        assert_eq!(metadata.uncommitted_changes, 3);
        assert!(metadata.commit_date.is_some());
    }

    #[test]
    fn test_without_source_counts_all_commits() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.commit_on("main", "one");
        repo.checkout("main");

        let config = Config::default();
        let ctx = context(&repo, &config);
        let base = BaseVersion::new("test", false, SemanticVersion::new(1, 0, 0), None);
        assert_eq!(commits_since_source(&ctx, &base).unwrap(), 2);
    }
}
