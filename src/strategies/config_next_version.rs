use crate::context::GitVersionContext;
use crate::error::Result;
use crate::strategies::BaseVersion;

/// `next-version` from the configuration, unless the current commit is
/// already tagged
pub fn get_versions(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    if context.is_current_commit_tagged() {
        return Ok(Vec::new());
    }

    Ok(context
        .next_version
        .iter()
        .map(|version| {
            BaseVersion::new("NextVersion in configuration file", false, version.clone(), None)
        })
        .collect())
}
