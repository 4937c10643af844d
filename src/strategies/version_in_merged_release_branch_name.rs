use crate::context::GitVersionContext;
use crate::error::Result;
use crate::strategies::version_in_branch_name::branch_version;
use crate::strategies::BaseVersion;

/// On a mainline branch, the version of a release branch merged by the
/// current commit
pub fn get_versions(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    let commit = &context.current_commit;
    if !context.configuration.is_mainline || !commit.is_merge() {
        return Ok(Vec::new());
    }

    if let Some(merge) = context.merge_messages.parse(&commit.message, &context.tag_prefix) {
        if context.resolver.is_release_branch(&merge.merged_branch) {
            if let Some(version) = merge.version {
                return Ok(vec![BaseVersion::new(
                    format!("Version in merged branch name '{}'", merge.merged_branch),
                    false,
                    version,
                    Some(commit.id),
                )]);
            }
        }
    }

    let release_branches = context.release_branches();
    for parent in commit.parents.iter().skip(1) {
        let merged = release_branches
            .iter()
            .filter(|branch| branch.tip == *parent)
            .find_map(|branch| branch_version(context, branch).map(|found| (branch, found)));

        if let Some((branch, found)) = merged {
            return Ok(vec![BaseVersion::new(
                format!("Version in merged branch name '{}'", branch.name_without_remote()),
                false,
                found.version,
                Some(commit.id),
            )]);
        }
    }

    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::SemanticVersion;
    use crate::git::MockRepository;
    use crate::strategies::test_support::context;

    #[test]
    fn test_version_from_merge_message() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.create_branch("release/3.0.0", "main");
        repo.commit_on("release/3.0.0", "stabilize");
        let merge = repo.merge("release/3.0.0", "main", "Merge branch 'release/3.0.0'");
        repo.checkout("main");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].semantic_version, SemanticVersion::new(3, 0, 0));
        assert_eq!(versions[0].base_version_source, Some(merge));
        assert!(!versions[0].should_increment);
    }

    #[test]
    fn test_version_from_merged_branch_tip() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.create_branch("release-3.1.0", "main");
        repo.commit_on("release-3.1.0", "stabilize");
        repo.merge("release-3.1.0", "main", "Integrated the release");
        repo.checkout("main");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].semantic_version, SemanticVersion::new(3, 1, 0));
    }

    #[test]
    fn test_no_candidate_off_mainline_or_without_merge() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.checkout("main");
        let config = Config::default();
        assert!(get_versions(&context(&repo, &config)).unwrap().is_empty());

        repo.create_branch("develop", "main");
        repo.create_branch("release/1.0.0", "main");
        repo.commit_on("release/1.0.0", "stabilize");
        repo.merge("release/1.0.0", "develop", "Merge branch 'release/1.0.0' into develop");
        repo.checkout("develop");
        assert!(get_versions(&context(&repo, &config)).unwrap().is_empty());
    }
}
