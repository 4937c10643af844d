//! Branch configuration resolution
//!
//! A branch name is matched against every branch type regex
//! case-insensitively. Matching types are layered over the global defaults in
//! declaration order, so the last match wins field by field.

use crate::config::{
    BranchConfig, CommitMessageIncrementMode, Config, IncrementStrategy, VersioningMode,
};
use crate::error::{GitSemverError, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

/// The flattened configuration for one branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EffectiveConfiguration {
    /// Names of the branch types that matched, in layering order
    pub branch_types: Vec<String>,
    pub mode: VersioningMode,
    pub tag_prefix: String,
    pub tag: String,
    pub increment: IncrementStrategy,
    pub prevent_increment_of_merged_branch_version: bool,
    pub track_merge_target: bool,
    pub tracks_release_branches: bool,
    pub is_release_branch: bool,
    pub is_mainline: bool,
    pub source_branches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_number_pattern: Option<String>,
    /// Regex of the last matching branch type, removed from the branch name
    /// before it becomes a label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_prefix_to_trim: Option<String>,
    pub commit_message_incrementing: CommitMessageIncrementMode,
    pub major_version_bump_message: String,
    pub minor_version_bump_message: String,
    pub patch_version_bump_message: String,
    pub no_bump_message: String,
    pub continuous_delivery_fallback_tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_version: Option<String>,
}

impl EffectiveConfiguration {
    /// Global defaults with no branch type applied
    pub fn from_global(config: &Config) -> Self {
        EffectiveConfiguration {
            branch_types: Vec::new(),
            mode: config.mode,
            tag_prefix: config.tag_prefix.clone(),
            tag: config.tag.clone(),
            increment: config.increment,
            prevent_increment_of_merged_branch_version: false,
            track_merge_target: false,
            tracks_release_branches: false,
            is_release_branch: false,
            is_mainline: false,
            source_branches: Vec::new(),
            tag_number_pattern: None,
            branch_prefix_to_trim: None,
            commit_message_incrementing: config.commit_message_incrementing,
            major_version_bump_message: config.major_version_bump_message.clone(),
            minor_version_bump_message: config.minor_version_bump_message.clone(),
            patch_version_bump_message: config.patch_version_bump_message.clone(),
            no_bump_message: config.no_bump_message.clone(),
            continuous_delivery_fallback_tag: config.continuous_delivery_fallback_tag.clone(),
            next_version: config.next_version.clone(),
        }
    }

    fn apply(&mut self, branch: &BranchConfig) {
        self.branch_types.push(branch.name.clone());
        if let Some(mode) = branch.mode {
            self.mode = mode;
        }
        if let Some(tag) = &branch.tag {
            self.tag = tag.clone();
        }
        if let Some(increment) = branch.increment {
            self.increment = increment;
        }
        if let Some(value) = branch.prevent_increment_of_merged_branch_version {
            self.prevent_increment_of_merged_branch_version = value;
        }
        if let Some(value) = branch.track_merge_target {
            self.track_merge_target = value;
        }
        if let Some(value) = branch.tracks_release_branches {
            self.tracks_release_branches = value;
        }
        if let Some(value) = branch.is_release_branch {
            self.is_release_branch = value;
        }
        if let Some(value) = branch.is_mainline {
            self.is_mainline = value;
        }
        if let Some(sources) = &branch.source_branches {
            self.source_branches = sources.clone();
        }
        if let Some(pattern) = &branch.tag_number_pattern {
            self.tag_number_pattern = Some(pattern.clone());
        }
        if let Some(regex) = &branch.regex {
            self.branch_prefix_to_trim = Some(regex.clone());
        }
    }
}

/// Branch types with their regexes compiled once per run
#[derive(Debug, Clone)]
pub struct BranchConfigResolver {
    global: EffectiveConfiguration,
    branch_types: Vec<(BranchConfig, Regex)>,
}

impl BranchConfigResolver {
    /// Compile every branch type regex.
    ///
    /// # Returns
    /// * `Err(GitSemverError::Config)` - a branch type has no regex or an invalid one
    pub fn new(config: &Config) -> Result<Self> {
        let mut branch_types = Vec::with_capacity(config.branches.len());
        for branch in &config.branches {
            let pattern = branch.regex.as_deref().ok_or_else(|| {
                GitSemverError::config(format!("Branch type '{}' has no regex", branch.name))
            })?;
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    GitSemverError::config(format!(
                        "Invalid regex for branch type '{}': {}",
                        branch.name, e
                    ))
                })?;
            branch_types.push((branch.clone(), regex));
        }

        Ok(BranchConfigResolver {
            global: EffectiveConfiguration::from_global(config),
            branch_types,
        })
    }

    /// Branch types whose regex matches `branch_name`, in declaration order
    pub fn matching<'a>(&'a self, branch_name: &'a str) -> impl Iterator<Item = &'a BranchConfig> + 'a {
        self.branch_types
            .iter()
            .filter(move |(_, regex)| regex.is_match(branch_name))
            .map(|(branch, _)| branch)
    }

    /// Look up a branch type by name
    pub fn branch_type(&self, name: &str) -> Option<&BranchConfig> {
        self.branch_types
            .iter()
            .map(|(branch, _)| branch)
            .find(|branch| branch.name.eq_ignore_ascii_case(name))
    }

    /// Layer every matching branch type over the global defaults
    pub fn resolve(&self, branch_name: &str) -> EffectiveConfiguration {
        let mut effective = self.global.clone();
        for branch in self.matching(branch_name) {
            effective.apply(branch);
        }

        if effective.branch_types.is_empty() {
            debug!(branch = branch_name, "no branch type matched, using global configuration");
        } else {
            debug!(branch = branch_name, types = ?effective.branch_types, "resolved branch configuration");
        }
        effective
    }

    /// True if `branch_name` matches a branch type of the given name
    pub fn is_of_type(&self, branch_name: &str, type_name: &str) -> bool {
        self.matching(branch_name)
            .any(|branch| branch.name.eq_ignore_ascii_case(type_name))
    }

    pub fn is_release_branch(&self, branch_name: &str) -> bool {
        self.resolve_field(branch_name, |b| b.is_release_branch)
            .unwrap_or(false)
    }

    pub fn is_mainline(&self, branch_name: &str) -> bool {
        self.resolve_field(branch_name, |b| b.is_mainline)
            .unwrap_or(false)
    }

    /// Configured increment for `branch_name`, possibly `Inherit`
    pub fn increment(&self, branch_name: &str) -> IncrementStrategy {
        self.resolve_field(branch_name, |b| b.increment)
            .unwrap_or(self.global.increment)
    }

    /// Last value set by a matching branch type
    fn resolve_field<T>(&self, branch_name: &str, field: impl Fn(&BranchConfig) -> Option<T>) -> Option<T> {
        self.matching(branch_name).filter_map(field).last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> BranchConfigResolver {
        BranchConfigResolver::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_resolve_main() {
        let effective = resolver().resolve("main");
        assert_eq!(effective.branch_types, vec!["main".to_string()]);
        assert_eq!(effective.tag, "");
        assert_eq!(effective.increment, IncrementStrategy::Patch);
        assert!(effective.is_mainline);
        assert!(effective.prevent_increment_of_merged_branch_version);
        assert_eq!(effective.mode, VersioningMode::ContinuousDelivery);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let effective = resolver().resolve("Release/2.0.0");
        assert!(effective.is_release_branch);
        assert_eq!(effective.tag, "beta");
        assert_eq!(effective.increment, IncrementStrategy::None);
    }

    #[test]
    fn test_unmatched_branch_uses_global() {
        let effective = resolver().resolve("wip");
        assert!(effective.branch_types.is_empty());
        assert_eq!(effective.tag, "useBranchName");
        assert_eq!(effective.increment, IncrementStrategy::Patch);
        assert!(effective.branch_prefix_to_trim.is_none());
    }

    #[test]
    fn test_later_match_wins() {
        let mut config = Config::default();
        config.branches.push(BranchConfig {
            tag: Some("exp".to_string()),
            ..BranchConfig::new("experimental-feature", "^feature/exp-")
        });
        let resolver = BranchConfigResolver::new(&config).unwrap();

        let effective = resolver.resolve("feature/exp-1");
        assert_eq!(
            effective.branch_types,
            vec!["feature".to_string(), "experimental-feature".to_string()]
        );
        assert_eq!(effective.tag, "exp");
        // Not overridden by the later match
        assert_eq!(effective.increment, IncrementStrategy::Inherit);
        assert_eq!(effective.branch_prefix_to_trim.as_deref(), Some("^feature/exp-"));
    }

    #[test]
    fn test_develop_settings() {
        let effective = resolver().resolve("develop");
        assert_eq!(effective.mode, VersioningMode::ContinuousDeployment);
        assert!(effective.tracks_release_branches);
        assert_eq!(effective.increment, IncrementStrategy::Minor);
    }

    #[test]
    fn test_shortcuts() {
        let resolver = resolver();
        assert!(resolver.is_release_branch("releases/1.0"));
        assert!(!resolver.is_release_branch("hotfix/1.0.1"));
        assert!(resolver.is_mainline("support/1.x"));
        assert!(resolver.is_of_type("pr/42", "pull-request"));
        assert_eq!(resolver.increment("hotfix-1.0.1"), IncrementStrategy::Patch);
        assert_eq!(resolver.increment("random"), IncrementStrategy::Patch);
    }

    #[test]
    fn test_invalid_branch_regex() {
        let mut config = Config::default();
        config.branches.push(BranchConfig::new("broken", "(["));
        let err = BranchConfigResolver::new(&config).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_missing_branch_regex() {
        let mut config = Config::default();
        config.branches.push(BranchConfig {
            name: "no-regex".to_string(),
            ..Default::default()
        });
        assert!(BranchConfigResolver::new(&config).is_err());
    }
}
