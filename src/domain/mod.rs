//! Domain logic - pure version rules independent of git operations

pub mod branch;
pub mod build_metadata;
pub mod merge_message;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::{friendly_name, version_from_branch_name, BranchVersion};
pub use build_metadata::{escape_branch, short_sha, BuildMetaData};
pub use merge_message::{MergeMessage, MergeMessageParser};
pub use prerelease::PreReleaseTag;
pub use tag::{TagPrefix, VersionTag};
pub use version::{SemanticVersion, VersionField, VersionFormat};
