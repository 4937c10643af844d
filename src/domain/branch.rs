use crate::domain::tag::TagPrefix;
use crate::domain::version::SemanticVersion;

/// Remote prefix stripped from branch names found in merge messages
pub const DEFAULT_REMOTE_PREFIX: &str = "origin/";

/// Shorten a full reference name to the name users see
pub fn friendly_name(reference: &str) -> &str {
    ["refs/heads/", "refs/remotes/", "refs/"]
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
        .unwrap_or(reference)
}

/// Strip a leading `origin/` from a branch name
pub fn without_default_remote(name: &str) -> &str {
    name.strip_prefix(DEFAULT_REMOTE_PREFIX).unwrap_or(name)
}

/// Version embedded in a branch name, e.g. `release/2.0.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchVersion {
    pub version: SemanticVersion,
    /// The name with the version segment removed (`release/`)
    pub name_without_version: String,
}

/// Split the branch name on `/` and `-`; the first segment that parses as a
/// version wins.
pub fn version_from_branch_name(name: &str, prefix: &TagPrefix) -> Option<BranchVersion> {
    let mut offset = 0;
    for segment in name.split(['/', '-']) {
        if let Some(version) = prefix.parse_version(segment) {
            let mut name_without_version = String::with_capacity(name.len());
            name_without_version.push_str(&name[..offset]);
            name_without_version.push_str(&name[offset + segment.len()..]);
            return Some(BranchVersion {
                version,
                name_without_version,
            });
        }
        offset += segment.len() + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendly_name() {
        assert_eq!(friendly_name("refs/heads/main"), "main");
        assert_eq!(friendly_name("refs/remotes/origin/develop"), "origin/develop");
        assert_eq!(friendly_name("refs/pull/5/merge"), "pull/5/merge");
        assert_eq!(friendly_name("feature/x"), "feature/x");
    }

    #[test]
    fn test_without_default_remote() {
        assert_eq!(without_default_remote("origin/release/1.0"), "release/1.0");
        assert_eq!(without_default_remote("release/1.0"), "release/1.0");
    }

    #[test]
    fn test_version_from_slash_name() {
        let found = version_from_branch_name("release/2.0.0", &TagPrefix::default()).unwrap();
        assert_eq!(found.version, SemanticVersion::new(2, 0, 0));
        assert_eq!(found.name_without_version, "release/");
    }

    #[test]
    fn test_version_from_dash_name_with_prefix() {
        let found = version_from_branch_name("release-v1.4", &TagPrefix::default()).unwrap();
        assert_eq!(found.version, SemanticVersion::new(1, 4, 0));
        assert_eq!(found.name_without_version, "release-");
    }

    #[test]
    fn test_first_parsing_segment_wins() {
        let found =
            version_from_branch_name("hotfix/3.1.1/2.0.0", &TagPrefix::default()).unwrap();
        assert_eq!(found.version, SemanticVersion::new(3, 1, 1));
    }

    #[test]
    fn test_no_version_in_name() {
        assert!(version_from_branch_name("release/next", &TagPrefix::default()).is_none());
        assert!(version_from_branch_name("develop", &TagPrefix::default()).is_none());
    }
}
