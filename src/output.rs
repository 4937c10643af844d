//! Version variables: the flat, named view of a calculated version that
//! build pipelines consume.

use crate::domain::{escape_branch, SemanticVersion, VersionFormat};
use serde::Serialize;

/// Every variable exposed for a version.
///
/// Field names serialize in PascalCase (`Major`, `FullSemVer`, ...), which is
/// also the name accepted by [`VersionVariables::get`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionVariables {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release_tag: String,
    pub pre_release_tag_with_dash: String,
    pub pre_release_label: String,
    pub pre_release_number: Option<u64>,
    pub build_meta_data: Option<u64>,
    pub full_build_meta_data: String,
    pub major_minor_patch: String,
    pub sem_ver: String,
    pub full_sem_ver: String,
    pub informational_version: String,
    pub branch_name: String,
    pub escaped_branch_name: String,
    pub sha: String,
    pub short_sha: String,
    pub version_source_sha: String,
    pub commits_since_version_source: u64,
    pub uncommitted_changes: u64,
    pub commit_date: String,
}

impl VersionVariables {
    pub fn from_version(version: &SemanticVersion) -> Self {
        let metadata = &version.build_metadata;
        let pre_release = version
            .pre_release_tag
            .as_ref()
            .filter(|tag| tag.has_tag());
        let pre_release_tag = pre_release.map(|tag| tag.to_string()).unwrap_or_default();
        let branch_name = metadata.branch.clone().unwrap_or_default();

        VersionVariables {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre_release_tag_with_dash: if pre_release_tag.is_empty() {
                String::new()
            } else {
                format!("-{}", pre_release_tag)
            },
            pre_release_tag,
            pre_release_label: pre_release.map(|tag| tag.name.clone()).unwrap_or_default(),
            pre_release_number: pre_release.and_then(|tag| tag.number),
            build_meta_data: metadata.commits_since_tag,
            full_build_meta_data: metadata.format_full(),
            major_minor_patch: version.format(VersionFormat::MajorMinorPatch),
            sem_ver: version.format(VersionFormat::SemVer),
            full_sem_ver: version.format(VersionFormat::FullSemVer),
            informational_version: version.format(VersionFormat::Informational),
            escaped_branch_name: escape_branch(&branch_name),
            branch_name,
            sha: metadata.sha.clone().unwrap_or_default(),
            short_sha: metadata.short_sha.clone().unwrap_or_default(),
            version_source_sha: metadata.version_source_sha.clone().unwrap_or_default(),
            commits_since_version_source: metadata.commits_since_version_source,
            uncommitted_changes: metadata.uncommitted_changes,
            commit_date: metadata
                .commit_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    /// Variables as `(name, value)` pairs in declaration order
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        fn optional(value: Option<u64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        vec![
            ("Major", self.major.to_string()),
            ("Minor", self.minor.to_string()),
            ("Patch", self.patch.to_string()),
            ("PreReleaseTag", self.pre_release_tag.clone()),
            ("PreReleaseTagWithDash", self.pre_release_tag_with_dash.clone()),
            ("PreReleaseLabel", self.pre_release_label.clone()),
            ("PreReleaseNumber", optional(self.pre_release_number)),
            ("BuildMetaData", optional(self.build_meta_data)),
            ("FullBuildMetaData", self.full_build_meta_data.clone()),
            ("MajorMinorPatch", self.major_minor_patch.clone()),
            ("SemVer", self.sem_ver.clone()),
            ("FullSemVer", self.full_sem_ver.clone()),
            ("InformationalVersion", self.informational_version.clone()),
            ("BranchName", self.branch_name.clone()),
            ("EscapedBranchName", self.escaped_branch_name.clone()),
            ("Sha", self.sha.clone()),
            ("ShortSha", self.short_sha.clone()),
            ("VersionSourceSha", self.version_source_sha.clone()),
            (
                "CommitsSinceVersionSource",
                self.commits_since_version_source.to_string(),
            ),
            ("UncommittedChanges", self.uncommitted_changes.to_string()),
            ("CommitDate", self.commit_date.clone()),
        ]
    }

    /// Look a variable up by name, case-insensitively
    pub fn get(&self, name: &str) -> Option<String> {
        self.pairs()
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}
