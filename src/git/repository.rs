use crate::domain::friendly_name;
use crate::error::{GitSemverError, Result};
use crate::git::{Branch, Commit, CommitFilter, CommitSort, Head, Tag};
use git2::{BranchType, ErrorCode, Oid, Repository as Git2Repo, Sort, Status, StatusOptions};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Working directory, `None` for bare repositories
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn to_commit(commit: &git2::Commit<'_>) -> Commit {
        Commit {
            id: commit.id(),
            parents: commit.parent_ids().collect(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            when: commit.time().seconds(),
        }
    }

    fn missing(oid: Oid, e: git2::Error) -> GitSemverError {
        if e.code() == ErrorCode::NotFound {
            GitSemverError::missing_history(format!("Commit {} is not present", oid))
        } else {
            e.into()
        }
    }
}

impl super::Repository for Git2Repository {
    fn head(&self) -> Result<Head> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(GitSemverError::repository_state(
                    "The repository has no commits",
                    "Create at least one commit before calculating a version",
                ))
            }
            Err(e) => return Err(e.into()),
        };

        let tip = head.peel_to_commit()?.id();
        if head.is_branch() {
            let name = head
                .name()
                .map(friendly_name)
                .or_else(|| head.shorthand())
                .unwrap_or("HEAD")
                .to_string();
            Ok(Head::Branch { name, tip })
        } else {
            Ok(Head::Detached(tip))
        }
    }

    fn find_commit(&self, oid: Oid) -> Result<Commit> {
        let commit = self
            .repo
            .find_commit(oid)
            .map_err(|e| Self::missing(oid, e))?;
        Ok(Self::to_commit(&commit))
    }

    fn commits(&self, filter: &CommitFilter) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;

        let mut sorting = Sort::TOPOLOGICAL | Sort::TIME;
        if filter.sort == CommitSort::ReverseTopological {
            sorting |= Sort::REVERSE;
        }
        revwalk.set_sorting(sorting)?;
        if filter.first_parent_only {
            revwalk.simplify_first_parent()?;
        }

        revwalk
            .push(filter.include)
            .map_err(|e| Self::missing(filter.include, e))?;
        if let Some(exclude) = filter.exclude {
            revwalk.hide(exclude).map_err(|e| Self::missing(exclude, e))?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            commits.push(self.find_commit(oid)?);
        }

        Ok(commits)
    }

    fn merge_base(&self, one: Oid, two: Oid) -> Result<Option<Oid>> {
        match self.repo.merge_base(one, two) {
            Ok(oid) => Ok(Some(oid)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let names = self.repo.tag_names(None)?;

        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let reference = match self.repo.find_reference(&format!("refs/tags/{}", name)) {
                Ok(reference) => reference,
                Err(e) => {
                    debug!(tag = name, error = %e, "skipping unreadable tag");
                    continue;
                }
            };

            match reference.peel_to_commit() {
                Ok(commit) => tags.push(Tag {
                    name: name.to_string(),
                    target: commit.id(),
                    when: commit.time().seconds(),
                }),
                Err(_) => debug!(tag = name, "skipping tag that does not point at a commit"),
            }
        }

        Ok(tags)
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        let mut branches = Vec::new();
        for entry in self.repo.branches(None)? {
            let (branch, kind) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if name.ends_with("/HEAD") {
                continue;
            }
            let Ok(commit) = branch.get().peel_to_commit() else {
                continue;
            };

            branches.push(Branch {
                name: name.to_string(),
                tip: commit.id(),
                is_remote: kind == BranchType::Remote,
            });
        }

        Ok(branches)
    }

    fn uncommitted_changes(&self) -> Result<usize> {
        if self.repo.is_bare() {
            return Ok(0);
        }

        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter(|entry| {
                let status = entry.status();
                status != Status::CURRENT && !status.contains(Status::IGNORED)
            })
            .count())
    }

    fn is_shallow(&self) -> bool {
        self.repo.is_shallow()
    }
}
