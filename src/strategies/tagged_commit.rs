use crate::context::GitVersionContext;
use crate::domain::{BuildMetaData, VersionTag};
use crate::error::Result;
use crate::git::CommitFilter;
use crate::strategies::BaseVersion;
use git2::Oid;
use std::collections::HashMap;
use tracing::debug;

/// Number of tagged versions taken from the history
pub const MAX_TAGGED_VERSIONS: usize = 5;

/// Version tags reachable from the current commit
pub fn get_versions(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    tagged_versions(context, context.current_commit.id)
}

/// Version tags reachable from `tip`, newest commit first. Tags sharing a
/// commit are taken highest version first.
pub(crate) fn tagged_versions(context: &GitVersionContext<'_>, tip: Oid) -> Result<Vec<BaseVersion>> {
    if context.version_tags().is_empty() {
        return Ok(Vec::new());
    }

    let mut by_commit: HashMap<Oid, Vec<&VersionTag>> = HashMap::new();
    for tag in context.version_tags() {
        by_commit.entry(tag.target).or_default().push(tag);
    }

    let mut versions = Vec::new();
    for commit in context.repository.commits(&CommitFilter::reachable_from(tip))? {
        let Some(tags) = by_commit.get_mut(&commit.id) else {
            continue;
        };
        tags.sort_by(|a, b| b.version.precedence_cmp(&a.version));

        for tag in tags.iter() {
            debug!(tag = %tag.name, commit = %commit.id, "found version tag");
            versions.push(BaseVersion::new(
                format!("Git tag '{}'", tag.name),
                tag.target != context.current_commit.id,
                tag.version.clone().with_build_metadata(BuildMetaData::default()),
                Some(tag.target),
            ));
            if versions.len() == MAX_TAGGED_VERSIONS {
                return Ok(versions);
            }
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
    fn test_tag_on_current_commit_is_not_incremented() {
        let mut repo = MockRepository::new();
        let tip = repo.commit_on("main", "initial");
        repo.add_tag("v1.4.2", tip);
        repo.checkout("main");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].semantic_version, SemanticVersion::new(1, 4, 2));
        assert!(!versions[0].should_increment);
        assert_eq!(versions[0].base_version_source, Some(tip));
    }

    #[test]
    fn test_older_tag_is_incremented() {
        let mut repo = MockRepository::new();
        let tagged = repo.commit_on("main", "initial");
        repo.add_tag("1.0.0", tagged);
        repo.commit_on("main", "more");
        repo.checkout("main");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert!(versions[0].should_increment);
    }

    #[test]
    fn test_unreachable_tags_are_ignored() {
        let mut repo = MockRepository::new();
        repo.commit_on("main", "initial");
        repo.create_branch("feature/x", "main");
        let side = repo.commit_on("feature/x", "side");
        repo.add_tag("9.0.0", side);
        repo.checkout("main");

        let config = Config::default();
        assert!(get_versions(&context(&repo, &config)).unwrap().is_empty());
    }

    #[test]
    fn test_takes_newest_five_highest_first_per_commit() {
        let mut repo = MockRepository::new();
        for minor in 0..4 {
            let oid = repo.commit_on("main", &format!("commit {}", minor));
            repo.add_tag(format!("1.{}.0", minor), oid);
        }
        let tip = repo.commit_on("main", "double tagged");
        repo.add_tag("2.0.0-rc.1", tip);
        repo.add_tag("2.0.0", tip);
        repo.checkout("main");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        let found: Vec<String> = versions
            .iter()
            .map(|v| v.semantic_version.to_string())
            .collect();
        assert_eq!(found, vec!["2.0.0", "2.0.0-rc.1", "1.3.0", "1.2.0", "1.1.0"]);
    }

    #[test]
    fn test_build_metadata_is_dropped() {
        let mut repo = MockRepository::new();
        let tip = repo.commit_on("main", "initial");
        repo.add_tag("1.0.0+12", tip);
        repo.checkout("main");

        let config = Config::default();
        let versions = get_versions(&context(&repo, &config)).unwrap();
        assert_eq!(versions[0].semantic_version, SemanticVersion::new(1, 0, 0));
    }
}
