//! Configuration document, defaults and loading
//!
//! The document is TOML with kebab-case keys. Global keys set the defaults;
//! `[[branches]]` tables describe branch types, each matched against the
//! branch name by regex. User branch types that reuse a built-in name are
//! layered onto it; new ones are appended after the built-ins.

pub mod effective;

pub use effective::{BranchConfigResolver, EffectiveConfiguration};

use crate::domain::{MergeMessageParser, SemanticVersion, TagPrefix, VersionField};
use crate::error::{GitSemverError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the configuration file looked up in the repository root
pub const CONFIG_FILE_NAME: &str = "gitsemver.toml";

/// How versions are produced for a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersioningMode {
    /// Pre-release labels stay stable; build metadata counts commits
    ContinuousDelivery,
    /// Every commit gets its own pre-release number
    ContinuousDeployment,
    /// Versions are replayed from the first-parent history of the mainline
    Mainline,
}

/// Increment applied to the base version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncrementStrategy {
    None,
    Patch,
    Minor,
    Major,
    /// Use the increment of the branch this branch was created from
    Inherit,
}

impl IncrementStrategy {
    /// The version field to bump, `None` while still `Inherit`
    pub fn field(self) -> Option<VersionField> {
        match self {
            IncrementStrategy::None => Some(VersionField::None),
            IncrementStrategy::Patch => Some(VersionField::Patch),
            IncrementStrategy::Minor => Some(VersionField::Minor),
            IncrementStrategy::Major => Some(VersionField::Major),
            IncrementStrategy::Inherit => None,
        }
    }
}

/// Whether `+semver:` markers in commit messages change the increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitMessageIncrementMode {
    #[default]
    Enabled,
    Disabled,
    MergeMessageOnly,
}

/// One branch type. Unset fields fall through to the global configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BranchConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    /// Pre-release label; `useBranchName` or `{BranchName}` use the branch name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<IncrementStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<VersioningMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevent_increment_of_merged_branch_version: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_merge_target: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks_release_branches: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_release_branch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mainline: Option<bool>,
    /// Branch types this type is created from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_branches: Option<Vec<String>>,
    /// Regex with a `number` group appended to the label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_number_pattern: Option<String>,
}

impl BranchConfig {
    pub fn new(name: impl Into<String>, regex: impl Into<String>) -> Self {
        BranchConfig {
            name: name.into(),
            regex: Some(regex.into()),
            ..Default::default()
        }
    }

    /// Overwrite every field `other` sets
    pub fn layer(&mut self, other: &BranchConfig) {
        fn set<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut self.regex, &other.regex);
        set(&mut self.tag, &other.tag);
        set(&mut self.increment, &other.increment);
        set(&mut self.mode, &other.mode);
        set(
            &mut self.prevent_increment_of_merged_branch_version,
            &other.prevent_increment_of_merged_branch_version,
        );
        set(&mut self.track_merge_target, &other.track_merge_target);
        set(&mut self.tracks_release_branches, &other.tracks_release_branches);
        set(&mut self.is_release_branch, &other.is_release_branch);
        set(&mut self.is_mainline, &other.is_mainline);
        set(&mut self.source_branches, &other.source_branches);
        set(&mut self.tag_number_pattern, &other.tag_number_pattern);
    }
}

fn default_mode() -> VersioningMode {
    VersioningMode::ContinuousDelivery
}

fn default_tag_prefix() -> String {
    "[vV]".to_string()
}

fn default_increment() -> IncrementStrategy {
    IncrementStrategy::Patch
}

fn default_tag() -> String {
    "useBranchName".to_string()
}

fn default_major_message() -> String {
    r"\+semver:\s?(breaking|major)".to_string()
}

fn default_minor_message() -> String {
    r"\+semver:\s?(feature|minor)".to_string()
}

fn default_patch_message() -> String {
    r"\+semver:\s?(fix|patch)".to_string()
}

fn default_no_bump_message() -> String {
    r"\+semver:\s?(none|skip)".to_string()
}

fn default_fallback_tag() -> String {
    "ci".to_string()
}

fn strings(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|s| s.to_string()).collect())
}

/// Built-in branch types, in matching order
pub fn default_branches() -> Vec<BranchConfig> {
    vec![
        BranchConfig {
            tag: Some(String::new()),
            increment: Some(IncrementStrategy::Patch),
            prevent_increment_of_merged_branch_version: Some(true),
            is_mainline: Some(true),
            source_branches: strings(&["develop", "release"]),
            ..BranchConfig::new("main", "^master$|^main$")
        },
        BranchConfig {
            tag: Some("alpha".to_string()),
            increment: Some(IncrementStrategy::Minor),
            mode: Some(VersioningMode::ContinuousDeployment),
            tracks_release_branches: Some(true),
            source_branches: strings(&[]),
            ..BranchConfig::new("develop", "^dev(elop)?(ment)?$")
        },
        BranchConfig {
            tag: Some("beta".to_string()),
            increment: Some(IncrementStrategy::None),
            is_release_branch: Some(true),
            prevent_increment_of_merged_branch_version: Some(true),
            source_branches: strings(&["develop", "main", "support", "release"]),
            ..BranchConfig::new("release", "^releases?[/-]")
        },
        BranchConfig {
            tag: Some("useBranchName".to_string()),
            increment: Some(IncrementStrategy::Inherit),
            source_branches: strings(&[
                "develop", "main", "release", "feature", "support", "hotfix",
            ]),
            ..BranchConfig::new("feature", "^features?[/-]")
        },
        BranchConfig {
            tag: Some("PullRequest".to_string()),
            increment: Some(IncrementStrategy::Inherit),
            tag_number_pattern: Some(r"[/-](?P<number>\d+)".to_string()),
            source_branches: strings(&[
                "develop", "main", "release", "feature", "support", "hotfix",
            ]),
            ..BranchConfig::new("pull-request", r"^(pull|pull\-requests|pr)[/-]")
        },
        BranchConfig {
            tag: Some("beta".to_string()),
            increment: Some(IncrementStrategy::Patch),
            source_branches: strings(&["develop", "main", "support"]),
            ..BranchConfig::new("hotfix", "^hotfix(es)?[/-]")
        },
        BranchConfig {
            tag: Some(String::new()),
            increment: Some(IncrementStrategy::Patch),
            is_mainline: Some(true),
            prevent_increment_of_merged_branch_version: Some(true),
            source_branches: strings(&["main"]),
            ..BranchConfig::new("support", "^support[/-]")
        },
    ]
}

/// Layer user branch types over the built-ins by name (case-insensitive);
/// unknown names are appended in document order
pub fn merge_branches(defaults: Vec<BranchConfig>, user: Vec<BranchConfig>) -> Vec<BranchConfig> {
    let mut merged = defaults;
    for branch in user {
        match merged
            .iter_mut()
            .find(|existing| existing.name.eq_ignore_ascii_case(&branch.name))
        {
            Some(existing) => existing.layer(&branch),
            None => merged.push(branch),
        }
    }
    merged
}

/// Represents the complete configuration for git-semver.
///
/// Global keys are the defaults every branch type starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default = "default_mode")]
    pub mode: VersioningMode,

    /// Regex matched at the start of tag names (and version segments of
    /// branch names) before the version
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Explicit floor for the next version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_version: Option<String>,

    #[serde(default = "default_increment")]
    pub increment: IncrementStrategy,

    #[serde(default = "default_tag")]
    pub tag: String,

    #[serde(default)]
    pub commit_message_incrementing: CommitMessageIncrementMode,

    #[serde(default = "default_major_message")]
    pub major_version_bump_message: String,

    #[serde(default = "default_minor_message")]
    pub minor_version_bump_message: String,

    #[serde(default = "default_patch_message")]
    pub patch_version_bump_message: String,

    /// Marks a commit as asking for no increment. Markers never lower the
    /// branch increment, so this one leaves the configured increment in place.
    #[serde(default = "default_no_bump_message")]
    pub no_bump_message: String,

    #[serde(default = "default_fallback_tag")]
    pub continuous_delivery_fallback_tag: String,

    /// Extra merge message formats: name -> regex with a `SourceBranch` group
    #[serde(default)]
    pub merge_message_formats: BTreeMap<String, String>,

    /// Evaluate shallow clones instead of refusing them
    #[serde(default)]
    pub ignore_shallow: bool,

    #[serde(default)]
    pub branches: Vec<BranchConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: default_mode(),
            tag_prefix: default_tag_prefix(),
            next_version: None,
            increment: default_increment(),
            tag: default_tag(),
            commit_message_incrementing: CommitMessageIncrementMode::default(),
            major_version_bump_message: default_major_message(),
            minor_version_bump_message: default_minor_message(),
            patch_version_bump_message: default_patch_message(),
            no_bump_message: default_no_bump_message(),
            continuous_delivery_fallback_tag: default_fallback_tag(),
            merge_message_formats: BTreeMap::new(),
            ignore_shallow: false,
            branches: default_branches(),
        }
    }
}

impl Config {
    /// Parse a TOML document and layer its branch types over the built-ins
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.branches = merge_branches(default_branches(), config.branches);
        Ok(config)
    }

    /// Look up a branch type by name
    pub fn branch(&self, name: &str) -> Option<&BranchConfig> {
        self.branches
            .iter()
            .find(|branch| branch.name.eq_ignore_ascii_case(name))
    }

    /// Check everything that can be checked without a repository.
    ///
    /// # Returns
    /// * `Ok(())` - every regex compiles and every reference resolves
    /// * `Err(GitSemverError::Config)` - the first problem found
    pub fn validate(&self) -> Result<()> {
        TagPrefix::new(self.tag_prefix.as_str())?;
        self.parsed_next_version()?;

        for (key, pattern) in [
            ("major-version-bump-message", &self.major_version_bump_message),
            ("minor-version-bump-message", &self.minor_version_bump_message),
            ("patch-version-bump-message", &self.patch_version_bump_message),
            ("no-bump-message", &self.no_bump_message),
        ] {
            compile(key, pattern)?;
        }

        MergeMessageParser::new(&self.merge_message_formats)?;
        self.check_branch_types()?;
        BranchConfigResolver::new(self)?;
        Ok(())
    }

    /// The configured `next-version`, parsed
    pub fn parsed_next_version(&self) -> Result<Option<SemanticVersion>> {
        self.next_version
            .as_deref()
            .map(|next_version| {
                SemanticVersion::parse(next_version).map_err(|e| {
                    GitSemverError::config(format!(
                        "next-version '{}' is invalid: {}",
                        next_version, e
                    ))
                })
            })
            .transpose()
    }

    /// Branch type names are unique and every `source-branches` entry names
    /// a known type. Regexes are checked by [`BranchConfigResolver::new`].
    pub fn check_branch_types(&self) -> Result<()> {
        let mut names = HashSet::new();
        for branch in &self.branches {
            if branch.name.trim().is_empty() {
                return Err(GitSemverError::config("Every branch type needs a name"));
            }
            if !names.insert(branch.name.to_lowercase()) {
                return Err(GitSemverError::config(format!(
                    "Branch type '{}' is defined more than once",
                    branch.name
                )));
            }
            if let Some(pattern) = &branch.tag_number_pattern {
                compile(&format!("branches.{}.tag-number-pattern", branch.name), pattern)?;
            }
        }

        for branch in &self.branches {
            for source in branch.source_branches.iter().flatten() {
                if !names.contains(&source.to_lowercase()) {
                    return Err(GitSemverError::config(format!(
                        "Branch type '{}' lists unknown source branch '{}'",
                        branch.name, source
                    )));
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn compile(key: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| GitSemverError::config(format!("Invalid regex for {}: {}", key, e)))
}

/// Resolve which configuration file to read, if any.
///
/// Lookup order:
/// 1. Custom path provided as parameter
/// 2. `gitsemver.toml` in the repository working directory
/// 3. `.gitsemver.toml` in the user config directory
pub fn find_config_file(config_path: Option<&Path>, repo_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    if let Some(candidate) = repo_dir.map(|dir| dir.join(CONFIG_FILE_NAME)) {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join(format!(".{}", CONFIG_FILE_NAME)))
        .filter(|candidate| candidate.exists())
}

/// Loads configuration from file or returns defaults.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `repo_dir` - Working directory of the repository being evaluated
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration, validated
/// * `Err` - If the file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, repo_dir: Option<&Path>) -> Result<Config> {
    let config = match find_config_file(config_path, repo_dir) {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            let content = fs::read_to_string(&path)?;
            Config::from_toml(&content)?
        }
        None => {
            debug!("no configuration file found, using defaults");
            Config::default()
        }
    };

    config.validate()?;
    Ok(config)
}
