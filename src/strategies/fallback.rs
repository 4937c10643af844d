use crate::context::GitVersionContext;
use crate::domain::SemanticVersion;
use crate::error::Result;
use crate::git::CommitFilter;
use crate::strategies::BaseVersion;

/// Provenance of the fallback candidate
pub const SOURCE: &str = "Fallback base version";

/// Always `0.1.0`, sourced at the root reached through first parents
pub fn get_versions(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    let history = context
        .repository
        .commits(&CommitFilter::reachable_from(context.current_commit.id).first_parent_only())?;
    let root = history
        .last()
        .map_or(context.current_commit.id, |commit| commit.id);

    Ok(vec![BaseVersion::new(
        SOURCE,
        false,
        SemanticVersion::new(0, 1, 0),
        Some(root),
    )])
}
