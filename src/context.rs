//! Per-run evaluation context
//!
//! Everything the strategies and calculators read is resolved once here:
//! the current branch and commit, the effective configuration, version tags
//! and the compiled regexes. Nothing in the context changes afterwards.

use crate::analyzer::increment::IncrementAnalyzer;
use crate::config::{BranchConfigResolver, Config, EffectiveConfiguration, IncrementStrategy};
use crate::domain::{friendly_name, MergeMessageParser, SemanticVersion, TagPrefix, VersionTag};
use crate::error::{GitSemverError, Result};
use crate::git::{Branch, Commit, Head, Repository};
use git2::Oid;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Branch name used when a detached HEAD matches no branch
pub const NO_BRANCH_NAME: &str = "(no branch)";

/// Inputs that select what is evaluated
#[derive(Debug, Clone, Default)]
pub struct EvaluationOptions {
    /// Evaluate the tip of this branch instead of HEAD
    pub target_branch: Option<String>,
}

/// Where a branch was created from another one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPoint {
    /// The other branch
    pub branch: Branch,
    /// Merge base of the other branch and the current commit
    pub commit: Oid,
}

pub struct GitVersionContext<'a> {
    pub repository: &'a dyn Repository,
    pub resolver: BranchConfigResolver,
    /// Configuration of the current branch, `inherit` already resolved
    pub configuration: EffectiveConfiguration,
    pub current_branch: Branch,
    pub current_commit: Commit,
    pub is_detached_head: bool,
    /// Highest version tagged on the current commit
    pub current_commit_tagged_version: Option<SemanticVersion>,
    pub tag_prefix: TagPrefix,
    pub merge_messages: MergeMessageParser,
    pub increment_analyzer: IncrementAnalyzer,
    pub next_version: Option<SemanticVersion>,
    pub uncommitted_changes: usize,
    version_tags: Vec<VersionTag>,
    branches: Vec<Branch>,
}

impl<'a> GitVersionContext<'a> {
    /// Build the context. Configuration problems surface here, before any
    /// strategy runs.
    pub fn new(
        repository: &'a dyn Repository,
        config: &Config,
        options: &EvaluationOptions,
    ) -> Result<Self> {
        config.check_branch_types()?;
        let tag_prefix = TagPrefix::new(config.tag_prefix.as_str())?;
        let merge_messages = MergeMessageParser::new(&config.merge_message_formats)?;
        let resolver = BranchConfigResolver::new(config)?;
        let next_version = config.parsed_next_version()?;

        if repository.is_shallow() {
            if !config.ignore_shallow {
                return Err(GitSemverError::missing_history(
                    "The repository is a shallow clone",
                ));
            }
            warn!("evaluating a shallow clone, history may be incomplete");
        }

        let branches = dedupe_branches(repository.branches()?);
        let (current_branch, is_detached_head) =
            select_current_branch(repository, &branches, options)?;
        let current_commit = repository.find_commit(current_branch.tip)?;

        let version_tags: Vec<VersionTag> = repository
            .tags()?
            .into_iter()
            .filter_map(|tag| tag_prefix.version_tag(&tag.name, tag.target))
            .collect();
        let current_commit_tagged_version = version_tags
            .iter()
            .filter(|tag| tag.target == current_commit.id)
            .map(|tag| &tag.version)
            .max_by(|a, b| a.precedence_cmp(b))
            .cloned();

        let configuration = resolver.resolve(current_branch.name_without_remote());
        let increment_analyzer = IncrementAnalyzer::new(&configuration)?;
        let uncommitted_changes = repository.uncommitted_changes()?;

        let mut context = GitVersionContext {
            repository,
            resolver,
            configuration,
            current_branch,
            current_commit,
            is_detached_head,
            current_commit_tagged_version,
            tag_prefix,
            merge_messages,
            increment_analyzer,
            next_version,
            uncommitted_changes,
            version_tags,
            branches,
        };

        if context.configuration.increment == IncrementStrategy::Inherit {
            context.configuration.increment = context.inherited_increment(config.increment)?;
        }

        info!(
            branch = context.branch_name(),
            commit = %context.current_commit.id,
            types = ?context.configuration.branch_types,
            "evaluating"
        );
        Ok(context)
    }

    /// Current branch name without a remote prefix
    pub fn branch_name(&self) -> &str {
        self.current_branch.name_without_remote()
    }

    pub fn is_current_commit_tagged(&self) -> bool {
        self.current_commit_tagged_version.is_some()
    }

    /// Every tag whose name parsed as a version
    pub fn version_tags(&self) -> &[VersionTag] {
        &self.version_tags
    }

    /// Version tags on one commit
    pub fn tags_on(&self, oid: Oid) -> impl Iterator<Item = &VersionTag> + '_ {
        self.version_tags.iter().filter(move |tag| tag.target == oid)
    }

    /// Branches deduplicated by name, local branches first
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Every branch except the current one
    pub fn other_branches(&self) -> impl Iterator<Item = &Branch> + '_ {
        let current = self.branch_name().to_lowercase();
        self.branches
            .iter()
            .filter(move |branch| branch.name_without_remote().to_lowercase() != current)
    }

    /// Other branches classified as release branches
    pub fn release_branches(&self) -> Vec<&Branch> {
        self.other_branches()
            .filter(|branch| self.resolver.is_release_branch(branch.name_without_remote()))
            .collect()
    }

    /// The branch the current branch was created from.
    ///
    /// Only branch types listed in `source-branches` are considered when the
    /// list is non-empty. Of all merge bases the newest one wins.
    pub fn find_branch_point(&self) -> Result<Option<BranchPoint>> {
        let sources = &self.configuration.source_branches;
        let candidates = self.other_branches().filter(|branch| {
            sources.is_empty()
                || self
                    .resolver
                    .matching(branch.name_without_remote())
                    .any(|kind| sources.iter().any(|s| s.eq_ignore_ascii_case(&kind.name)))
        });

        let point = self.newest_merge_base(candidates)?;
        if let Some(point) = &point {
            debug!(branch = %point.branch.name, commit = %point.commit, "found branch point");
        }
        Ok(point)
    }

    /// The mainline branch: the current branch when it is one, else the
    /// mainline branch sharing the newest merge base with the current commit
    pub fn mainline_branch(&self) -> Result<Option<BranchPoint>> {
        if self.configuration.is_mainline {
            return Ok(Some(BranchPoint {
                branch: self.current_branch.clone(),
                commit: self.current_commit.id,
            }));
        }

        let candidates = self
            .other_branches()
            .filter(|branch| self.resolver.is_mainline(branch.name_without_remote()));
        self.newest_merge_base(candidates)
    }

    fn newest_merge_base<'b>(
        &self,
        candidates: impl Iterator<Item = &'b Branch>,
    ) -> Result<Option<BranchPoint>> {
        let mut best: Option<(BranchPoint, i64)> = None;

        for branch in candidates {
            let Some(merge_base) = self
                .repository
                .merge_base(branch.tip, self.current_commit.id)?
            else {
                continue;
            };
            let when = self.repository.find_commit(merge_base)?.when;

            let newer = match &best {
                None => true,
                Some((current, best_when)) => {
                    when > *best_when
                        || (when == *best_when
                            && merge_base != current.commit
                            && self.repository.merge_base(current.commit, merge_base)?
                                == Some(current.commit))
                }
            };
            if newer {
                best = Some((
                    BranchPoint {
                        branch: branch.clone(),
                        commit: merge_base,
                    },
                    when,
                ));
            }
        }

        Ok(best.map(|(point, _)| point))
    }

    fn inherited_increment(&self, global: IncrementStrategy) -> Result<IncrementStrategy> {
        let parent = self.find_branch_point()?;
        let inherited = parent
            .as_ref()
            .map(|point| self.resolver.increment(point.branch.name_without_remote()));

        let resolved = match inherited {
            Some(increment) if increment != IncrementStrategy::Inherit => increment,
            _ if global != IncrementStrategy::Inherit => global,
            _ => IncrementStrategy::Patch,
        };
        debug!(
            parent = parent.as_ref().map(|p| p.branch.name.as_str()),
            increment = ?resolved,
            "resolved inherited increment"
        );
        Ok(resolved)
    }
}

/// Keep one branch per name without remote, preferring local branches
fn dedupe_branches(branches: Vec<Branch>) -> Vec<Branch> {
    let (local, remote): (Vec<Branch>, Vec<Branch>) =
        branches.into_iter().partition(|branch| !branch.is_remote);

    let mut seen = HashSet::new();
    local
        .into_iter()
        .chain(remote)
        .filter(|branch| seen.insert(branch.name_without_remote().to_lowercase()))
        .collect()
}

fn select_current_branch(
    repository: &dyn Repository,
    branches: &[Branch],
    options: &EvaluationOptions,
) -> Result<(Branch, bool)> {
    if let Some(target) = &options.target_branch {
        let wanted = friendly_name(target);
        let branch = branches
            .iter()
            .find(|b| b.name == wanted || b.name_without_remote() == wanted)
            .cloned()
            .ok_or_else(|| GitSemverError::branch(format!("Branch '{}' not found", target)))?;
        return Ok((branch, false));
    }

    match repository.head()? {
        Head::Branch { name, tip } => Ok((Branch::new(name, tip), false)),
        Head::Detached(tip) => {
            let branch = branches
                .iter()
                .find(|b| b.tip == tip)
                .cloned()
                .unwrap_or_else(|| Branch::new(NO_BRANCH_NAME, tip));
            debug!(branch = %branch.name, "HEAD is detached");
            Ok((branch, true))
        }
    }
}
