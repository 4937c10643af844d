use crate::context::GitVersionContext;
use crate::domain::{version_from_branch_name, BranchVersion};
use crate::error::Result;
use crate::git::Branch;
use crate::strategies::BaseVersion;

/// Version embedded in the name of the current release branch, sourced at
/// the point the branch was created
pub fn get_versions(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    if !context.configuration.is_release_branch {
        return Ok(Vec::new());
    }

    let Some(found) = branch_version(context, &context.current_branch) else {
        return Ok(Vec::new());
    };

    let branch_point = context.find_branch_point()?.map(|point| point.commit);
    Ok(vec![BaseVersion::new(
        format!("Version in branch name '{}'", context.branch_name()),
        false,
        found.version,
        branch_point,
    )
    .with_branch_name_override(found.name_without_version)])
}

/// Version in a branch name, ignoring any remote prefix
pub(crate) fn branch_version(context: &GitVersionContext<'_>, branch: &Branch) -> Option<BranchVersion> {
    version_from_branch_name(branch.name_without_remote(), &context.tag_prefix)
}
