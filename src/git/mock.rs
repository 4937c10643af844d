use crate::error::{GitSemverError, Result};
use crate::git::{Branch, Commit, CommitFilter, CommitSort, Head, Repository, Tag};
use git2::Oid;
use std::collections::{HashMap, HashSet};

const EPOCH: i64 = 1_700_000_000;

/// In-memory commit graph for testing without actual git operations
///
/// Commits get deterministic ids from a counter and strictly increasing
/// timestamps, so creation order is also topological order.
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    commits: Vec<Commit>,
    index: HashMap<Oid, usize>,
    branches: Vec<Branch>,
    tags: Vec<Tag>,
    head: Option<Head>,
    uncommitted_changes: usize,
    shallow: bool,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit with explicit parents (first parent first)
    pub fn commit(&mut self, message: &str, parents: &[Oid]) -> Oid {
        let sequence = self.commits.len();
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&(sequence as u64 + 1).to_be_bytes());
        let id = Oid::from_bytes(&bytes).expect("20-byte oid");

        self.index.insert(id, sequence);
        self.commits.push(Commit {
            id,
            parents: parents.to_vec(),
            message: message.to_string(),
            when: EPOCH + sequence as i64 * 60,
        });
        id
    }

    /// Commit on top of `branch` and advance it; creates the branch with a
    /// root commit if it does not exist
    pub fn commit_on(&mut self, branch: &str, message: &str) -> Oid {
        let parents: Vec<Oid> = self.branch_tip(branch).into_iter().collect();
        let id = self.commit(message, &parents);
        self.set_branch(branch, id);
        id
    }

    /// Merge `source` into `target` with a merge commit and advance `target`
    pub fn merge(&mut self, source: &str, target: &str, message: &str) -> Oid {
        let parents: Vec<Oid> = [self.branch_tip(target), self.branch_tip(source)]
            .into_iter()
            .flatten()
            .collect();
        let id = self.commit(message, &parents);
        self.set_branch(target, id);
        id
    }

    /// Create `name` at the tip of `from`
    pub fn create_branch(&mut self, name: &str, from: &str) -> Oid {
        let tip = self
            .branch_tip(from)
            .unwrap_or_else(|| panic!("unknown branch {}", from));
        self.set_branch(name, tip);
        tip
    }

    /// Point a local branch at a commit, creating it if needed
    pub fn set_branch(&mut self, name: &str, tip: Oid) {
        self.upsert_branch(name, tip, false);
        if let Some(Head::Branch { name: head, tip: head_tip }) = &mut self.head {
            if head.as_str() == name {
                *head_tip = tip;
            }
        }
    }

    /// Add a remote-tracking branch such as `origin/release/1.0.0`
    pub fn set_remote_branch(&mut self, name: &str, tip: Oid) {
        self.upsert_branch(name, tip, true);
    }

    pub fn branch_tip(&self, name: &str) -> Option<Oid> {
        self.branches
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.tip)
    }

    /// Check out a branch; HEAD follows it as it advances
    pub fn checkout(&mut self, name: &str) {
        let tip = self
            .branch_tip(name)
            .unwrap_or_else(|| panic!("unknown branch {}", name));
        self.head = Some(Head::Branch {
            name: name.to_string(),
            tip,
        });
    }

    /// Detach HEAD at a commit
    pub fn detach(&mut self, oid: Oid) {
        self.head = Some(Head::Detached(oid));
    }

    /// Add a tag pointing to a commit
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        let when = self
            .index
            .get(&oid)
            .map_or(EPOCH, |i| self.commits[*i].when);
        self.tags.push(Tag {
            name: name.into(),
            target: oid,
            when,
        });
    }

    pub fn set_uncommitted_changes(&mut self, count: usize) {
        self.uncommitted_changes = count;
    }

    pub fn set_shallow(&mut self, shallow: bool) {
        self.shallow = shallow;
    }

    fn upsert_branch(&mut self, name: &str, tip: Oid, is_remote: bool) {
        match self.branches.iter_mut().find(|b| b.name == name) {
            Some(branch) => branch.tip = tip,
            None => self.branches.push(Branch {
                name: name.to_string(),
                tip,
                is_remote,
            }),
        }
    }

    fn get(&self, oid: Oid) -> Result<&Commit> {
        self.index
            .get(&oid)
            .map(|i| &self.commits[*i])
            .ok_or_else(|| {
                GitSemverError::missing_history(format!("Commit {} is not present", oid))
            })
    }

    fn ancestors(&self, start: Oid) -> Result<HashSet<Oid>> {
        let mut seen = HashSet::new();
        let mut pending = vec![start];
        while let Some(oid) = pending.pop() {
            if seen.insert(oid) {
                pending.extend(self.get(oid)?.parents.iter().copied());
            }
        }
        Ok(seen)
    }
}

impl Repository for MockRepository {
    fn head(&self) -> Result<Head> {
        match &self.head {
            Some(head) => Ok(head.clone()),
            None => Err(GitSemverError::repository_state(
                "HEAD does not point at a commit",
                "Create at least one commit and check out a branch",
            )),
        }
    }

    fn find_commit(&self, oid: Oid) -> Result<Commit> {
        self.get(oid).cloned()
    }

    fn commits(&self, filter: &CommitFilter) -> Result<Vec<Commit>> {
        let excluded = match filter.exclude {
            Some(exclude) => self.ancestors(exclude)?,
            None => HashSet::new(),
        };

        let mut selected: Vec<&Commit> = if filter.first_parent_only {
            let mut chain = Vec::new();
            let mut cursor = Some(filter.include);
            while let Some(oid) = cursor {
                if excluded.contains(&oid) {
                    break;
                }
                let commit = self.get(oid)?;
                chain.push(commit);
                cursor = commit.parents.first().copied();
            }
            chain
        } else {
            let mut all = Vec::new();
            for oid in self.ancestors(filter.include)? {
                if !excluded.contains(&oid) {
                    all.push(self.get(oid)?);
                }
            }
            all
        };

        selected.sort_by_key(|c| std::cmp::Reverse(self.index[&c.id]));
        if filter.sort == CommitSort::ReverseTopological {
            selected.reverse();
        }
        Ok(selected.into_iter().cloned().collect())
    }

    fn merge_base(&self, one: Oid, two: Oid) -> Result<Option<Oid>> {
        let left = self.ancestors(one)?;
        let right = self.ancestors(two)?;
        Ok(left
            .intersection(&right)
            .max_by_key(|oid| self.index[*oid])
            .copied())
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.clone())
    }

    fn branches(&self) -> Result<Vec<Branch>> {
        Ok(self.branches.clone())
    }

    fn uncommitted_changes(&self) -> Result<usize> {
        Ok(self.uncommitted_changes)
    }

    fn is_shallow(&self) -> bool {
        self.shallow
    }
}
