use crate::domain::build_metadata::BuildMetaData;
use crate::domain::prerelease::PreReleaseTag;
use crate::error::{GitSemverError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

static LOOSE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<major>\d+)(\.(?P<minor>\d+))?(\.(?P<patch>\d+))?(\.(?P<fourth>\d+))?(-(?P<tag>[^+]*))?(\+(?P<build>.*))?$",
    )
    .expect("static regex")
});

/// Semantic version with pre-release tag and build metadata
///
/// Equality covers every field, build metadata included. Ordering between
/// versions is precedence only (see [`SemanticVersion::precedence_cmp`]), so
/// the type deliberately does not implement `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release_tag: Option<PreReleaseTag>,
    pub build_metadata: BuildMetaData,
}

/// Version component selected by an increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionField {
    None,
    Patch,
    Minor,
    Major,
}

/// Textual forms of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFormat {
    /// `1.2.3`
    MajorMinorPatch,
    /// `1.2.3-beta.4`
    SemVer,
    /// `1.2.3-beta.4+5`
    FullSemVer,
    /// `1.2.3-beta.4+5.Branch.release-1.2.3.Sha.abcdef`
    Informational,
}

impl FromStr for VersionFormat {
    type Err = GitSemverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "j" => Ok(VersionFormat::MajorMinorPatch),
            "s" => Ok(VersionFormat::SemVer),
            "f" => Ok(VersionFormat::FullSemVer),
            "i" => Ok(VersionFormat::Informational),
            other => Err(GitSemverError::version(format!(
                "Unknown version format '{}', expected one of j, s, f, i",
                other
            ))),
        }
    }
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            ..Default::default()
        }
    }

    /// Attach a pre-release tag; an empty tag leaves the version a release
    pub fn with_pre_release(mut self, tag: PreReleaseTag) -> Self {
        self.pre_release_tag = tag.has_tag().then_some(tag);
        self
    }

    pub fn with_build_metadata(mut self, metadata: BuildMetaData) -> Self {
        self.build_metadata = metadata;
        self
    }

    /// Parse with the semver.org grammar: exactly three numeric components,
    /// validated pre-release and build identifiers.
    pub fn parse_strict(input: &str) -> Result<Self> {
        let parsed = semver::Version::parse(input).map_err(|e| {
            GitSemverError::version(format!("'{}' is not a strict semantic version: {}", input, e))
        })?;

        let version = SemanticVersion::new(parsed.major, parsed.minor, parsed.patch)
            .with_pre_release(PreReleaseTag::parse(parsed.pre.as_str()))
            .with_build_metadata(BuildMetaData::parse(parsed.build.as_str()));
        Ok(version)
    }

    /// Parse with the loose grammar: minor and patch may be omitted, a fourth
    /// numeric component is read as the commit count, and pre-release tags
    /// are not validated.
    pub fn parse(input: &str) -> Result<Self> {
        let captures = LOOSE_VERSION.captures(input.trim()).ok_or_else(|| {
            GitSemverError::version(format!("'{}' is not a semantic version", input))
        })?;

        let component = |name: &str| -> Result<u64> {
            match captures.name(name) {
                Some(m) => m.as_str().parse::<u64>().map_err(|_| {
                    GitSemverError::version(format!(
                        "Invalid {} version component in '{}'",
                        name, input
                    ))
                }),
                None => Ok(0),
            }
        };

        let mut build_metadata = captures
            .name("build")
            .map(|m| BuildMetaData::parse(m.as_str()))
            .unwrap_or_default();
        if build_metadata.commits_since_tag.is_none() && captures.name("fourth").is_some() {
            build_metadata.commits_since_tag = Some(component("fourth")?);
        }

        let pre_release = captures
            .name("tag")
            .map(|m| PreReleaseTag::parse(m.as_str()))
            .unwrap_or_default();

        Ok(
            SemanticVersion::new(component("major")?, component("minor")?, component("patch")?)
                .with_pre_release(pre_release)
                .with_build_metadata(build_metadata),
        )
    }

    /// Loose parse that swallows the failure
    pub fn try_parse(input: &str) -> Option<Self> {
        Self::parse(input).ok()
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release_tag
            .as_ref()
            .map_or(false, PreReleaseTag::has_tag)
    }

    /// Label of the pre-release tag, empty for a release
    pub fn pre_release_name(&self) -> &str {
        self.pre_release_tag
            .as_ref()
            .map_or("", |tag| tag.name.as_str())
    }

    /// Compare Major, Minor, Patch and pre-release tag. Build metadata never
    /// participates; a release outranks any pre-release of the same version.
    pub fn precedence_cmp(&self, other: &SemanticVersion) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| {
                match (self.active_pre_release(), other.active_pre_release()) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(a), Some(b)) => a.precedence_cmp(b),
                }
            })
    }

    /// Compare Major.Minor.Patch only
    pub fn core_cmp(&self, other: &SemanticVersion) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }

    /// True if Major.Minor.Patch match
    pub fn same_core(&self, other: &SemanticVersion) -> bool {
        self.core_cmp(other) == Ordering::Equal
    }

    /// Increment by `field`. A pre-release version only advances its
    /// pre-release number, whatever the field; a release version
    /// incremented by `VersionField::None` is returned unchanged.
    pub fn increment(&self, field: VersionField) -> Self {
        match self.active_pre_release() {
            Some(tag) => {
                let mut next = self.clone();
                next.pre_release_tag = Some(tag.increment_number());
                next
            }
            None => self.bump(field),
        }
    }

    /// Bump Major, Minor or Patch regardless of any pre-release tag, which is
    /// dropped. Lower components reset to zero.
    pub fn bump(&self, field: VersionField) -> Self {
        let mut next = self.clone();
        match field {
            VersionField::Major => {
                next.major = next.major.saturating_add(1);
                next.minor = 0;
                next.patch = 0;
            }
            VersionField::Minor => {
                next.minor = next.minor.saturating_add(1);
                next.patch = 0;
            }
            VersionField::Patch => {
                next.patch = next.patch.saturating_add(1);
            }
            VersionField::None => return next,
        }
        next.pre_release_tag = None;
        next
    }

    /// Replace Major.Minor.Patch, keeping pre-release tag and build metadata
    pub fn with_core_of(&self, other: &SemanticVersion) -> Self {
        let mut next = self.clone();
        next.major = other.major;
        next.minor = other.minor;
        next.patch = other.patch;
        next
    }

    pub fn format(&self, format: VersionFormat) -> String {
        let core = format!("{}.{}.{}", self.major, self.minor, self.patch);
        let semver = match self.active_pre_release() {
            Some(tag) => format!("{}-{}", core, tag),
            None => core.clone(),
        };

        match format {
            VersionFormat::MajorMinorPatch => core,
            VersionFormat::SemVer => semver,
            VersionFormat::FullSemVer => match self.build_metadata.commits_since_tag {
                Some(_) => format!("{}+{}", semver, self.build_metadata.format_short()),
                None => semver,
            },
            VersionFormat::Informational => {
                if self.build_metadata.is_empty() {
                    semver
                } else {
                    format!("{}+{}", semver, self.build_metadata.format_full())
                }
            }
        }
    }

    fn active_pre_release(&self) -> Option<&PreReleaseTag> {
        self.pre_release_tag.as_ref().filter(|tag| tag.has_tag())
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(VersionFormat::SemVer))
    }
}

impl FromStr for SemanticVersion {
    type Err = GitSemverError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SemanticVersion {
        SemanticVersion::parse(s).unwrap()
    }

    #[test]
    fn test_parse_full_version() {
        let version = v("1.2.3-beta.4+5");
        assert_eq!((version.major, version.minor, version.patch), (1, 2, 3));
        assert_eq!(
            version.pre_release_tag,
            Some(PreReleaseTag::new("beta", Some(4)))
        );
        assert_eq!(version.build_metadata.commits_since_tag, Some(5));
    }

    #[test]
    fn test_parse_loose_short_forms() {
        assert_eq!(v("1"), SemanticVersion::new(1, 0, 0));
        assert_eq!(v("1.2"), SemanticVersion::new(1, 2, 0));
    }

    #[test]
    fn test_parse_fourth_part_is_commit_count() {
        let version = v("1.2.3.4");
        assert_eq!(version.build_metadata.commits_since_tag, Some(4));
        assert_eq!(version.to_string(), "1.2.3");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(SemanticVersion::parse("release").is_err());
        assert!(SemanticVersion::parse("1.2.3.4.5").is_err());
        assert!(SemanticVersion::parse("").is_err());
        assert!(SemanticVersion::try_parse("v1.2.3").is_none());
    }

    #[test]
    fn test_parse_strict_rejects_loose_forms() {
        assert!(SemanticVersion::parse_strict("1.2").is_err());
        assert!(SemanticVersion::parse_strict("1.2.3.4").is_err());
        assert!(SemanticVersion::parse_strict("01.2.3").is_err());
        assert!(SemanticVersion::parse_strict("1.2.3-beta.4").is_ok());
    }

    #[test]
    fn test_release_outranks_pre_release() {
        assert_eq!(v("1.0.0").precedence_cmp(&v("1.0.0-rc.9")), Ordering::Greater);
        assert_eq!(v("1.0.0-rc.9").precedence_cmp(&v("1.0.0")), Ordering::Less);
    }

    #[test]
    fn test_major_wins_regardless_of_tag() {
        assert_eq!(v("2.0.0-alpha").precedence_cmp(&v("1.9.9")), Ordering::Greater);
        assert_eq!(v("1.3.0-alpha.1").precedence_cmp(&v("1.2.9")), Ordering::Greater);
    }

    #[test]
    fn test_precedence_ignores_build_metadata() {
        let a = v("1.2.3+4");
        let b = v("1.2.3+9");
        assert_eq!(a.precedence_cmp(&b), Ordering::Equal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_increment_fields() {
        let version = v("1.2.3");
        assert_eq!(version.increment(VersionField::Major), v("2.0.0"));
        assert_eq!(version.increment(VersionField::Minor), v("1.3.0"));
        assert_eq!(version.increment(VersionField::Patch), v("1.2.4"));
    }

    #[test]
    fn test_increment_none_is_identity_for_release() {
        let version = v("1.2.3+7");
        assert_eq!(version.increment(VersionField::None), version);
    }

    #[test]
    fn test_increment_none_advances_pre_release_number() {
        assert_eq!(v("2.0.0-beta.1").increment(VersionField::None), v("2.0.0-beta.2"));
        assert_eq!(v("2.0.0-beta").increment(VersionField::None), v("2.0.0-beta.1"));
    }

    #[test]
    fn test_increment_saturates_at_the_maximum() {
        let max = u64::MAX;
        let version = SemanticVersion::new(max, max, max);
        assert_eq!(version.increment(VersionField::Patch).patch, max);
        assert_eq!(version.increment(VersionField::Minor).minor, max);
        assert_eq!(version.increment(VersionField::Major).major, max);

        let tagged = version.with_pre_release(PreReleaseTag::new("beta", Some(max)));
        assert_eq!(
            tagged.increment(VersionField::None).pre_release_tag.unwrap().number,
            Some(max)
        );
    }

    #[test]
    fn test_increment_pre_release_advances_number_only() {
        assert_eq!(v("1.2.3-beta.4").increment(VersionField::Major), v("1.2.3-beta.5"));
        assert_eq!(v("1.2.3-beta").increment(VersionField::Patch), v("1.2.3-beta.1"));
    }

    #[test]
    fn test_bump_drops_pre_release() {
        assert_eq!(v("1.2.3-beta.4").bump(VersionField::Minor), v("1.3.0"));
    }

    #[test]
    fn test_with_core_of_keeps_tag() {
        let next = v("1.2.3-alpha.2").with_core_of(&v("2.0.0"));
        assert_eq!(next, v("2.0.0-alpha.2"));
    }

    #[test]
    fn test_formats() {
        let mut version = v("1.2.3-beta.4+5");
        version.build_metadata.branch = Some("release/1.2.3".to_string());
        version.build_metadata.sha = Some("abcdef0".to_string());

        assert_eq!(version.format(VersionFormat::MajorMinorPatch), "1.2.3");
        assert_eq!(version.format(VersionFormat::SemVer), "1.2.3-beta.4");
        assert_eq!(version.format(VersionFormat::FullSemVer), "1.2.3-beta.4+5");
        assert_eq!(
            version.format(VersionFormat::Informational),
            "1.2.3-beta.4+5.Branch.release-1.2.3.Sha.abcdef0"
        );
    }

    #[test]
    fn test_full_semver_without_commits() {
        assert_eq!(v("1.2.3").format(VersionFormat::FullSemVer), "1.2.3");
    }

    #[test]
    fn test_strict_round_trip() {
        for input in [
            "0.1.0",
            "1.2.3",
            "1.2.3-beta.4",
            "1.2.3-alpha",
            "1.2.3-alpha.beta",
            "1.2.3-rc.1+12",
            "10.20.30+exp.sha.5114f85",
        ] {
            let version = SemanticVersion::parse_strict(input).unwrap();
            let formatted = version.format(VersionFormat::Informational);
            assert_eq!(SemanticVersion::parse_strict(&formatted).unwrap(), version);
            assert_eq!(formatted, input);
        }
    }

    #[test]
    fn test_version_format_codes() {
        assert_eq!("j".parse::<VersionFormat>().unwrap(), VersionFormat::MajorMinorPatch);
        assert_eq!("i".parse::<VersionFormat>().unwrap(), VersionFormat::Informational);
        assert!("x".parse::<VersionFormat>().is_err());
    }

    #[test]
    fn test_version_field_priority() {
        assert!(VersionField::Major > VersionField::Minor);
        assert!(VersionField::Minor > VersionField::Patch);
        assert!(VersionField::Patch > VersionField::None);
    }
}
