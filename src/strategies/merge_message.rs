use crate::context::GitVersionContext;
use crate::error::Result;
use crate::git::CommitFilter;
use crate::strategies::BaseVersion;
use tracing::debug;

/// Number of merged release versions taken from the history
pub const MAX_MERGED_VERSIONS: usize = 2;

/// Versions of release branches merged into the history of the current
/// commit, read from merge commit messages
pub fn get_versions(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    let should_increment = !context.configuration.prevent_increment_of_merged_branch_version;

    let commits = context
        .repository
        .commits(&CommitFilter::reachable_from(context.current_commit.id))?;

    let mut versions = Vec::new();
    for commit in commits
        .iter()
        .filter(|commit| commit.id != context.current_commit.id && commit.is_merge())
    {
        let Some(merge) = context.merge_messages.parse(&commit.message, &context.tag_prefix) else {
            continue;
        };
        if !context.resolver.is_release_branch(&merge.merged_branch) {
            debug!(branch = %merge.merged_branch, "merged branch is not a release branch");
            continue;
        }
        let Some(version) = merge.version else {
            continue;
        };

        versions.push(BaseVersion::new(
            format!("Merge message '{}'", commit.message.lines().next().unwrap_or_default().trim()),
            should_increment,
            version,
            Some(commit.id),
        ));
        if versions.len() == MAX_MERGED_VERSIONS {
            break;
        }
    }

    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::SemanticVersion;
    use crate::git::MockRepository;
    use crate::strategies::test_support::context;

    fn release_merged_into_main(message: &str) -> MockRepository {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.create_branch("release/2.0.0", "main");
        repo.commit_on("release/2.0.0", "stabilize");
        repo.merge("release/2.0.0", "main", message);
        repo.checkout("main");
        repo
    }

    #[test]
    fn test_merge_on_current_commit_is_skipped() {
        let repo = release_merged_into_main("Merge branch 'release/2.0.0'");
        let config = Config::default();
        assert!(get_versions(&context(&repo, &config)).unwrap().is_empty());
    }

    #[test]
    fn test_merged_release_version() {
        let mut repo = release_merged_into_main("Merge branch 'release/2.0.0'");
        repo.commit_on("main", "after release");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].semantic_version, SemanticVersion::new(2, 0, 0));
        // main prevents incrementing merged release versions
        assert!(!versions[0].should_increment);
    }

    #[test]
    fn test_merged_feature_branch_is_ignored() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.create_branch("feature/3.0.0-ui", "main");
        repo.commit_on("feature/3.0.0-ui", "ui");
        repo.merge("feature/3.0.0-ui", "main", "Merge branch 'feature/3.0.0-ui'");
        repo.commit_on("main", "after");
        repo.checkout("main");

        let config = Config::default();
        assert!(get_versions(&context(&repo, &config)).unwrap().is_empty());
    }

    #[test]
    fn test_increment_when_not_prevented() {
        let mut repo = MockRepository::new();
        repo.commit_on("develop", "initial");
        repo.create_branch("release/1.1.0", "develop");
        repo.commit_on("release/1.1.0", "fix");
        repo.merge("release/1.1.0", "develop", "Merge pull request #3 from org/release/1.1.0");
        repo.commit_on("develop", "next feature");
        repo.checkout("develop");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions[0].should_increment);
    }

    #[test]
    fn test_only_newest_merges_are_taken() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        let mut merges = Vec::new();
        for release in ["1.0.0", "1.1.0", "1.2.0"] {
            let branch = format!("release/{}", release);
            repo.create_branch(&branch, "main");
            repo.commit_on(&branch, "stabilize");
            merges.push(repo.merge(&branch, "main", &format!("Merge branch '{}'", branch)));
        }
        repo.commit_on("main", "after releases");
        repo.checkout("main");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        let found: Vec<String> = versions
            .iter()
            .map(|v| v.semantic_version.to_string())
            .collect();
        assert_eq!(found, vec!["1.2.0", "1.1.0"]);
        assert_eq!(versions[0].base_version_source, Some(merges[2]));
        assert_eq!(versions[1].base_version_source, Some(merges[1]));
    }
}
