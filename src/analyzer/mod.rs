//! Version determination engine
//!
//! [`evaluate`] builds the context, runs every base version strategy,
//! consolidates the candidates and turns the winner into the final version,
//! either through the increment rule or by replaying the mainline.

pub mod base_version;
pub mod increment;
pub mod mainline;
pub mod metadata;
pub mod next_version;

pub use base_version::{calculate_base_version, collect_candidates, select_base_version};
pub use increment::{combine_increment, IncrementAnalyzer};

use crate::boundary::{collect_warnings, BoundaryWarning};
use crate::config::{Config, EffectiveConfiguration, VersioningMode};
use crate::context::{EvaluationOptions, GitVersionContext};
use crate::domain::{SemanticVersion, VersionFormat};
use crate::error::{GitSemverError, Result};
use crate::git::Repository;
use crate::strategies::BaseVersion;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Everything one evaluation produced
#[derive(Debug, Clone)]
pub struct VersionResult {
    /// Final version with build metadata attached
    pub version: SemanticVersion,
    /// Configuration the current branch resolved to
    pub configuration: EffectiveConfiguration,
    /// Consolidated base version
    pub base_version: BaseVersion,
    /// Every candidate in strategy order
    pub candidates: Vec<BaseVersion>,
    /// Position of the winner in `candidates`
    pub selected: usize,
    pub warnings: Vec<BoundaryWarning>,
}

/// Calculate the version of the repository's current commit
pub fn evaluate(
    repository: &dyn Repository,
    config: &Config,
    options: &EvaluationOptions,
) -> Result<VersionResult> {
    let context = GitVersionContext::new(repository, config, options)?;

    let candidates = collect_candidates(&context)?;
    let (selected, base) = calculate_base_version(&context, &candidates)?.ok_or_else(|| {
        GitSemverError::repository_state(
            "No base version could be determined",
            "Make sure the current branch has at least one commit",
        )
    })?;

    let version = match exact_tag(&context) {
        Some(tagged) => {
            let mut version = tagged.with_build_metadata(metadata::build_metadata(&context, &base, 0));
            version.build_metadata.commits_since_tag = None;
            version.build_metadata.version_source_sha = Some(context.current_commit.sha());
            version
        }
        None if context.configuration.mode == VersioningMode::Mainline => {
            let calculated = mainline::calculate(&context, &base)?;
            metadata::attach(
                calculated.version,
                &context,
                &base,
                calculated.commits_since_version_source,
            )
        }
        None => {
            let version = next_version::calculate(&context, &base)?;
            let commits = metadata::commits_since_source(&context, &base)?;
            let version = metadata::attach(version, &context, &base, commits);
            next_version::apply_continuous_deployment(&context, version)
        }
    };

    let warnings = collect_warnings(&context, &base);
    for warning in &warnings {
        debug!(%warning, "boundary warning");
    }

    info!(
        version = %version.format(VersionFormat::FullSemVer),
        base = %base,
        "calculated version"
    );

    Ok(VersionResult {
        version,
        configuration: context.configuration.clone(),
        base_version: base,
        candidates,
        selected,
        warnings,
    })
}

/// The tagged version of the current commit, unless `next-version` asks for
/// something higher
fn exact_tag(context: &GitVersionContext<'_>) -> Option<SemanticVersion> {
    let tagged = context.current_commit_tagged_version.as_ref()?;
    match &context.next_version {
        Some(next) if next.core_cmp(tagged) == Ordering::Greater => None,
        _ => Some(tagged.clone()),
    }
}
