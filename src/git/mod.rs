//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the read-only git
//! queries the version engine needs, allowing for multiple implementations
//! including real git repositories and in-memory graphs for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory commit graph for tests
//!
//! Nothing in this trait mutates the repository. The engine assumes a
//! consistent snapshot for the duration of one evaluation.
//!
//! # Usage
//!
//! ```rust
//! # use git_semver::git::{CommitFilter, Repository};
//! # fn example(repo: &dyn Repository) -> git_semver::Result<()> {
//! let tip = repo.head()?.tip();
//! let history = repo.commits(&CommitFilter::reachable_from(tip).first_parent_only())?;
//! println!("{} commits on the first-parent chain", history.len());
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use chrono::{DateTime, TimeZone, Utc};
use git2::Oid;

/// Commit information needed by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: Oid,
    /// Parent ids, first parent first
    pub parents: Vec<Oid>,
    pub message: String,
    /// Commit time in seconds since the epoch
    pub when: i64,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn sha(&self) -> String {
        self.id.to_string()
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.when, 0).single()
    }
}

/// A local or remote-tracking branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Friendly name: `main` or `origin/main`
    pub name: String,
    pub tip: Oid,
    pub is_remote: bool,
}

impl Branch {
    pub fn new(name: impl Into<String>, tip: Oid) -> Self {
        Branch {
            name: name.into(),
            tip,
            is_remote: false,
        }
    }

    /// `origin/release/1.0` -> `release/1.0`; local names are returned as is
    pub fn name_without_remote(&self) -> &str {
        if self.is_remote {
            self.name
                .split_once('/')
                .map_or(self.name.as_str(), |(_, rest)| rest)
        } else {
            &self.name
        }
    }
}

/// A tag peeled to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub target: Oid,
    /// Commit time of the target, seconds since the epoch
    pub when: i64,
}

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Branch { name: String, tip: Oid },
    Detached(Oid),
}

impl Head {
    pub fn tip(&self) -> Oid {
        match self {
            Head::Branch { tip, .. } => *tip,
            Head::Detached(tip) => *tip,
        }
    }
}

/// Commit ordering for [Repository::commits]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitSort {
    /// Newest first, children always before their parents
    #[default]
    Topological,
    /// Oldest first, parents always before their children
    ReverseTopological,
}

/// Selects the commits returned by [Repository::commits]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFilter {
    /// Commits reachable from here are included (the commit itself too)
    pub include: Oid,
    /// Commits reachable from here are excluded (the commit itself too)
    pub exclude: Option<Oid>,
    pub sort: CommitSort,
    /// Follow only first parents from `include`
    pub first_parent_only: bool,
}

impl CommitFilter {
    pub fn reachable_from(include: Oid) -> Self {
        CommitFilter {
            include,
            exclude: None,
            sort: CommitSort::Topological,
            first_parent_only: false,
        }
    }

    pub fn excluding(mut self, exclude: Option<Oid>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.sort = CommitSort::ReverseTopological;
        self
    }

    pub fn first_parent_only(mut self) -> Self {
        self.first_parent_only = true;
        self
    }
}

/// Read-only git queries used by the version engine
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map a
/// missing commit (typically a shallow clone) to
/// [crate::error::GitSemverError::RepositoryState] so the caller gets
/// actionable guidance instead of a raw git error.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): real git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): in-memory commit graph
pub trait Repository {
    /// Where HEAD points
    ///
    /// # Returns
    /// * `Ok(Head)` - the checked-out branch and its tip, or the detached commit
    /// * `Err` - if the repository has no commits yet
    fn head(&self) -> Result<Head>;

    /// Look up a single commit
    fn find_commit(&self, oid: Oid) -> Result<Commit>;

    /// Enumerate commits selected by `filter`
    ///
    /// # Example
    /// ```rust
    /// # use git_semver::git::{CommitFilter, Repository};
    /// # use git2::Oid;
    /// # fn example(repo: &dyn Repository, tip: Oid, tag: Oid) -> git_semver::Result<()> {
    /// // Commits since a tag, oldest first
    /// let since_tag = repo.commits(&CommitFilter::reachable_from(tip).excluding(Some(tag)).reversed())?;
    /// for commit in since_tag {
    ///     println!("{}: {}", commit.id, commit.message);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn commits(&self, filter: &CommitFilter) -> Result<Vec<Commit>>;

    /// Best common ancestor of two commits, `None` for unrelated histories
    fn merge_base(&self, one: Oid, two: Oid) -> Result<Option<Oid>>;

    /// All tags, peeled to their target commit. Tags on non-commit objects
    /// are left out.
    fn tags(&self) -> Result<Vec<Tag>>;

    /// All local and remote-tracking branches
    fn branches(&self) -> Result<Vec<Branch>>;

    /// Number of changed or untracked files in the working tree
    fn uncommitted_changes(&self) -> Result<usize>;

    /// True for shallow clones, whose history is incomplete
    fn is_shallow(&self) -> bool;
}
