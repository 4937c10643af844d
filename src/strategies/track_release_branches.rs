use crate::context::GitVersionContext;
use crate::error::Result;
use crate::strategies::tagged_commit::tagged_versions;
use crate::strategies::version_in_branch_name::branch_version;
use crate::strategies::BaseVersion;
use tracing::debug;

/// Versions of open release branches plus tags on the mainline. Only active
/// with `tracks-release-branches`.
///
/// A release branch version is taken as is, with the commit it shares with
/// the current branch as source.
pub fn get_versions(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    if !context.configuration.tracks_release_branches {
        return Ok(Vec::new());
    }

    let mut versions = Vec::new();
    for branch in context.release_branches() {
        let Some(found) = branch_version(context, branch) else {
            continue;
        };
        let Some(merge_base) = context
            .repository
            .merge_base(branch.tip, context.current_commit.id)?
        else {
            debug!(branch = %branch.name, "release branch shares no history");
            continue;
        };

        versions.push(BaseVersion::new(
            format!("Release branch '{}'", branch.name_without_remote()),
            false,
            found.version,
            Some(merge_base),
        ));
    }

    if let Some(mainline) = context.mainline_branch()? {
        if mainline.branch.tip != context.current_commit.id {
            versions.extend(tagged_versions(context, mainline.branch.tip)?);
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

    #[test]
    fn test_tracks_open_release_branch() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.create_branch("develop", "main");
        repo.commit_on("develop", "feature work");
        let branch_point = repo.create_branch("release/1.0.0", "develop");
        repo.commit_on("release/1.0.0", "stabilize");
        repo.commit_on("develop", "next feature");
        repo.checkout("develop");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].semantic_version, SemanticVersion::new(1, 0, 0));
        assert_eq!(versions[0].base_version_source, Some(branch_point));
        assert!(!versions[0].should_increment);
    }

    #[test]
    fn test_includes_mainline_tags() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.create_branch("develop", "main");
        repo.commit_on("develop", "feature work");
        let hotfix = repo.commit_on("main", "hotfix");
        repo.add_tag("1.0.1", hotfix);
        repo.checkout("develop");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].semantic_version, SemanticVersion::new(1, 0, 1));
        assert_eq!(versions[0].base_version_source, Some(hotfix));
    }

    #[test]
    fn test_inactive_on_main() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.create_branch("release/1.0.0", "main");
        repo.checkout("main");

        let config = Config::default();
        assert!(get_versions(&context(&repo, &config)).unwrap().is_empty());
    }
}
