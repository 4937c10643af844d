use crate::context::GitVersionContext;
use crate::domain::BuildMetaData;
use crate::error::Result;
use crate::git::CommitFilter;
use crate::strategies::BaseVersion;

/// Tags on branch tips merged into the current branch. Only active with
/// `track-merge-target`.
pub fn get_versions(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    if !context.configuration.track_merge_target {
        return Ok(Vec::new());
    }

    let history = context.repository.commits(
        &CommitFilter::reachable_from(context.current_commit.id).first_parent_only(),
    )?;

    let mut versions = Vec::new();
    for merge in history.iter().filter(|commit| commit.is_merge()) {
        for parent in merge.parents.iter().skip(1) {
            for tag in context.tags_on(*parent) {
                versions.push(BaseVersion::new(
                    format!("Merge target tagged '{}'", tag.name),
                    merge.id != context.current_commit.id,
                    tag.version.clone().with_build_metadata(BuildMetaData::default()),
                    Some(merge.id),
                ));
            }
        }
    }

    Ok(versions)
}
