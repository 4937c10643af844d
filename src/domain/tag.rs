use crate::domain::version::SemanticVersion;
use crate::error::{GitSemverError, Result};
use git2::Oid;
use regex::Regex;

/// A git tag whose name parsed as a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTag {
    pub name: String,
    pub target: Oid,
    pub version: SemanticVersion,
}

/// Optional prefix in front of versions in tag and branch names (e.g. `v1.2.3`)
///
/// The prefix is a regex anchored at the start of the name. It is optional:
/// `1.2.3` parses with a `[vV]` prefix as well.
#[derive(Debug, Clone)]
pub struct TagPrefix {
    pattern: String,
    regex: Regex,
}

impl TagPrefix {
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
            GitSemverError::config(format!("Invalid tag prefix '{}': {}", pattern, e))
        })?;
        Ok(TagPrefix { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Remove the prefix if present
    pub fn strip<'a>(&self, name: &'a str) -> &'a str {
        match self.regex.find(name) {
            Some(m) => &name[m.end()..],
            None => name,
        }
    }

    /// Parse a version out of a tag name or name segment
    pub fn parse_version(&self, name: &str) -> Option<SemanticVersion> {
        SemanticVersion::try_parse(self.strip(name))
    }

    /// Build a [`VersionTag`], skipping tags that are not versions
    pub fn version_tag(&self, name: &str, target: Oid) -> Option<VersionTag> {
        self.parse_version(name).map(|version| VersionTag {
            name: name.to_string(),
            target,
            version,
        })
    }
}

impl Default for TagPrefix {
    fn default() -> Self {
        TagPrefix {
            pattern: "[vV]".to_string(),
            regex: Regex::new("^(?:[vV])").expect("static regex"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_default_prefix() {
        let prefix = TagPrefix::default();
        assert_eq!(prefix.strip("v1.2.3"), "1.2.3");
        assert_eq!(prefix.strip("V1.2.3"), "1.2.3");
        assert_eq!(prefix.strip("1.2.3"), "1.2.3");
    }

    #[test]
    fn test_parse_version_with_custom_prefix() {
        let prefix = TagPrefix::new("release-").unwrap();
        assert_eq!(
            prefix.parse_version("release-1.2.3"),
            Some(SemanticVersion::new(1, 2, 3))
        );
        assert_eq!(prefix.parse_version("v1.2.3"), None);
    }

    #[test]
    fn test_version_tag_skips_non_versions() {
        let prefix = TagPrefix::default();
        let oid = Oid::from_bytes(&[1; 20]).unwrap();
        assert!(prefix.version_tag("latest", oid).is_none());
        let tag = prefix.version_tag("v2.0.0-rc.1", oid).unwrap();
        assert_eq!(tag.version.to_string(), "2.0.0-rc.1");
        assert_eq!(tag.target, oid);
    }

    #[test]
    fn test_invalid_prefix_is_config_error() {
        let err = TagPrefix::new("[v").unwrap_err();
        assert!(err.is_configuration_error());
    }
}
