//! Turns the consolidated base version into the next version

use crate::analyzer::increment::combine_increment;
use crate::config::VersioningMode;
use crate::context::GitVersionContext;
use crate::domain::{BuildMetaData, PreReleaseTag, SemanticVersion, VersionField};
use crate::error::{GitSemverError, Result};
use crate::strategies::BaseVersion;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use tracing::debug;

/// Label value replaced by the branch name
pub const USE_BRANCH_NAME: &str = "useBranchName";
/// Placeholder in a label replaced by the branch name
pub const BRANCH_NAME_PLACEHOLDER: &str = "{BranchName}";

static LABEL_UNSAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9-]").expect("static regex"));

/// Increment to apply to `base`: nothing unless the base asks for it, else
/// the configured increment raised by commit message markers
pub fn determine_increment(
    context: &GitVersionContext<'_>,
    base: &BaseVersion,
) -> Result<VersionField> {
    if !base.should_increment {
        return Ok(VersionField::None);
    }

    let configured = configured_increment(context);
    let marker = context.increment_analyzer.analyze_repository_range(
        context.repository,
        base.base_version_source,
        context.current_commit.id,
    )?;
    Ok(combine_increment(&base.semantic_version, configured, marker))
}

/// The increment of the current branch
pub fn configured_increment(context: &GitVersionContext<'_>) -> VersionField {
    context
        .configuration
        .increment
        .field()
        .unwrap_or(VersionField::Patch)
}

/// Increment the base version, then apply the `next-version` floor and the
/// branch label
pub fn calculate(
    context: &GitVersionContext<'_>,
    base: &BaseVersion,
) -> Result<SemanticVersion> {
    let mut version = base
        .semantic_version
        .clone()
        .with_build_metadata(BuildMetaData::default());
    if base.should_increment {
        let field = determine_increment(context, base)?;
        version = version.increment(field);
        debug!(increment = ?field, version = %version, "incremented base version");
    }

    version = apply_next_version(context, version);
    apply_label(context, version, base.branch_name_override.as_deref())
}

/// A configured `next-version` above the computed Major.Minor.Patch
/// replaces them; pre-release tag and metadata are kept
pub fn apply_next_version(context: &GitVersionContext<'_>, version: SemanticVersion) -> SemanticVersion {
    match &context.next_version {
        Some(next) if next.core_cmp(&version) == Ordering::Greater => {
            debug!(next_version = %next, "next-version raises the computed version");
            version.with_core_of(next)
        }
        _ => version,
    }
}

/// Attach the branch label as pre-release tag when the version has none or
/// carries a different label
pub fn apply_label(
    context: &GitVersionContext<'_>,
    mut version: SemanticVersion,
    branch_name_override: Option<&str>,
) -> Result<SemanticVersion> {
    let label = branch_label(context, branch_name_override)?;
    if label.is_empty() {
        return Ok(version);
    }

    let has_other_label =
        version.is_pre_release() && !version.pre_release_name().eq_ignore_ascii_case(&label);
    if !version.is_pre_release() || has_other_label {
        let number = next_label_number(context, &version, &label)?;
        version.pre_release_tag = Some(PreReleaseTag::new(label, Some(number)));
    }
    Ok(version)
}

/// Derive the pre-release label from the configured `tag`.
///
/// `useBranchName` and `{BranchName}` are replaced by the branch name (or
/// its override) with the branch type prefix removed and every character
/// outside `[a-zA-Z0-9-]` replaced by `-`. A `tag-number-pattern` match on
/// the branch name is appended.
pub fn branch_label(
    context: &GitVersionContext<'_>,
    branch_name_override: Option<&str>,
) -> Result<String> {
    let configuration = &context.configuration;
    let tag = configuration.tag.as_str();

    let mut label = if tag == USE_BRANCH_NAME || tag.contains(BRANCH_NAME_PLACEHOLDER) {
        let branch_name = branch_name_override.unwrap_or_else(|| context.branch_name());
        let trimmed = match &configuration.branch_prefix_to_trim {
            Some(prefix) => case_insensitive(prefix)?
                .replace(branch_name, "")
                .into_owned(),
            None => branch_name.to_string(),
        };
        let sanitized = LABEL_UNSAFE.replace_all(&trimmed, "-");
        if tag == USE_BRANCH_NAME {
            sanitized.into_owned()
        } else {
            tag.replace(BRANCH_NAME_PLACEHOLDER, &sanitized)
        }
    } else {
        tag.to_string()
    };

    if let Some(pattern) = &configuration.tag_number_pattern {
        let regex = case_insensitive(pattern)?;
        if let Some(number) = regex
            .captures(context.branch_name())
            .and_then(|captures| captures.name("number"))
        {
            label.push_str(number.as_str());
        }
    }

    Ok(label)
}

/// One past the highest pre-release number of a reachable tag with the same
/// Major.Minor.Patch and label, else 1
pub fn next_label_number(
    context: &GitVersionContext<'_>,
    version: &SemanticVersion,
    label: &str,
) -> Result<u64> {
    let mut highest: Option<u64> = None;
    for tag in context.version_tags() {
        let Some(pre_release) = &tag.version.pre_release_tag else {
            continue;
        };
        if !tag.version.same_core(version) || !pre_release.has_name(label) {
            continue;
        }
        let reachable = tag.target == context.current_commit.id
            || context
                .repository
                .merge_base(tag.target, context.current_commit.id)?
                == Some(tag.target);
        if reachable {
            let number = pre_release.number.unwrap_or(0);
            highest = Some(highest.map_or(number, |h| h.max(number)));
        }
    }
    Ok(highest.map_or(1, |h| h.saturating_add(1)))
}

/// Continuous deployment: every commit gets its own pre-release number
pub fn apply_continuous_deployment(
    context: &GitVersionContext<'_>,
    mut version: SemanticVersion,
) -> SemanticVersion {
    if context.configuration.mode != VersioningMode::ContinuousDeployment {
        return version;
    }

    let commits = version.build_metadata.commits_since_version_source;
    if version.is_pre_release() {
        if let Some(tag) = version.pre_release_tag.as_mut() {
            tag.number = Some(commits);
        }
    } else {
        let fallback = &context.configuration.continuous_delivery_fallback_tag;
        if !fallback.is_empty() {
            version.pre_release_tag = Some(PreReleaseTag::new(fallback.clone(), Some(commits)));
        }
    }
    version.build_metadata.commits_since_tag = None;
    version
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| GitSemverError::config(format!("Invalid regex '{}': {}", pattern, e)))
}
