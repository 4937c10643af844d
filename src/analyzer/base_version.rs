use crate::context::GitVersionContext;
use crate::error::Result;
use crate::strategies::{BaseVersion, BaseVersionStrategy};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Run every strategy in declaration order and concatenate the candidates
pub fn collect_candidates(context: &GitVersionContext<'_>) -> Result<Vec<BaseVersion>> {
    let mut candidates = Vec::new();
    for strategy in BaseVersionStrategy::ALL {
        let versions = strategy.get_versions(context)?;
        for version in &versions {
            debug!(strategy = strategy.name(), candidate = %version, "base version candidate");
        }
        candidates.extend(versions);
    }
    Ok(candidates)
}

/// Position of the candidate with the highest precedence. Ties go to a
/// candidate with a source commit, then to the one discovered first.
pub fn select_base_version(candidates: &[BaseVersion]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let replace = match best.map(|i| &candidates[i]) {
            None => true,
            Some(current) => match candidate
                .semantic_version
                .precedence_cmp(&current.semantic_version)
            {
                Ordering::Greater => true,
                Ordering::Equal => {
                    current.base_version_source.is_none()
                        && candidate.base_version_source.is_some()
                }
                Ordering::Less => false,
            },
        };
        if replace {
            best = Some(index);
        }
    }
    best
}

/// Consolidate the candidates into one base version.
///
/// A winner without a source commit adopts the oldest source commit among
/// the other candidates, so commits are still counted from somewhere.
pub fn calculate_base_version(
    context: &GitVersionContext<'_>,
    candidates: &[BaseVersion],
) -> Result<Option<(usize, BaseVersion)>> {
    let Some(selected) = select_base_version(candidates) else {
        return Ok(None);
    };
    let mut winner = candidates[selected].clone();

    if winner.base_version_source.is_none() {
        let mut oldest = None;
        for oid in candidates.iter().filter_map(|c| c.base_version_source) {
            let when = context.repository.find_commit(oid)?.when;
            if oldest.map_or(true, |(_, oldest_when)| when < oldest_when) {
                oldest = Some((oid, when));
            }
        }
        winner.base_version_source = oldest.map(|(oid, _)| oid);
    }

    info!(base = %winner, "selected base version");
    Ok(Some((selected, winner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SemanticVersion;
    use git2::Oid;

    fn candidate(source: &str, version: &str, commit: Option<u8>) -> BaseVersion {
        BaseVersion::new(
            source,
            false,
            SemanticVersion::parse(version).unwrap(),
            commit.map(|b| Oid::from_bytes(&[b; 20]).unwrap()),
        )
    }

    #[test]
    fn test_highest_precedence_wins() {
        let candidates = vec![
            candidate("a", "1.0.0", Some(1)),
            candidate("b", "2.0.0-beta.1", Some(2)),
            candidate("c", "1.9.9", Some(3)),
        ];
        assert_eq!(select_base_version(&candidates), Some(1));
    }

    #[test]
    fn test_release_beats_pre_release_of_same_core() {
        let candidates = vec![
            candidate("a", "2.0.0-rc.1", Some(1)),
            candidate("b", "2.0.0", Some(2)),
        ];
        assert_eq!(select_base_version(&candidates), Some(1));
    }

    #[test]
    fn test_tie_prefers_source_commit() {
        let candidates = vec![
            candidate("next-version", "2.0.0", None),
            candidate("branch", "2.0.0", Some(1)),
        ];
        assert_eq!(select_base_version(&candidates), Some(1));
    }

    #[test]
    fn test_tie_prefers_first_discovered() {
        let candidates = vec![
            candidate("first", "2.0.0", Some(1)),
            candidate("second", "2.0.0+5", Some(2)),
        ];
        assert_eq!(select_base_version(&candidates), Some(0));
    }

    #[test]
    fn test_identical_candidates_select_the_first() {
        let candidates = vec![
            candidate("Git tag 'v1.0.0'", "1.0.0", Some(1)),
            candidate("Git tag 'v1.0.0'", "1.0.0", Some(1)),
        ];
        assert_eq!(select_base_version(&candidates), Some(0));
    }

    #[test]
    fn test_no_candidates() {
        assert!(select_base_version(&[]).is_none());
    }
}
