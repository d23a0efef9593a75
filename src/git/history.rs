use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use git2::{Diff, DiffFormat, Repository, Sort};
use tracing::debug;

use super::types::CommitInfo;

/// Render a diff the way `git diff` prints a patch.
fn patch_text(diff: &Diff<'_>) -> Result<String> {
    let mut out: Vec<u8> = Vec::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if let '+' | '-' | ' ' = line.origin() {
            out.push(line.origin() as u8);
        }
        out.extend_from_slice(line.content());
        true
    })?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Walk HEAD oldest-first and collect single-parent commits made before `cutoff`.
///
/// Merge commits and the root commit are skipped, as are commits whose
/// patch is empty.
pub fn eligible_commits(repo: &Repository, cutoff: DateTime<Utc>) -> Result<Vec<CommitInfo>> {
    let head = repo
        .head()
        .context("Repository has no HEAD")?
        .peel_to_commit()
        .context("HEAD does not point to a commit")?;

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TIME | Sort::REVERSE)?;
    walk.push(head.id())?;

    let mut commits = Vec::new();
    for oid in walk {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        if commit.parent_count() != 1 {
            continue;
        }

        let time = DateTime::from_timestamp(commit.time().seconds(), 0)
            .with_context(|| format!("Commit {oid} has an out-of-range timestamp"))?;
        if time >= cutoff {
            continue;
        }

        let parent_tree = commit.parent(0)?.tree()?;
        let tree = commit.tree()?;
        let diff = repo.diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)?;
        let patch = patch_text(&diff)?;
        if patch.is_empty() {
            debug!(commit = %oid, "skipping commit with empty patch");
            continue;
        }

        commits.push(CommitInfo {
            sha: oid.to_string(),
            author_name: commit.author().name().unwrap_or_default().to_string(),
            time,
            patch,
        });
    }

    Ok(commits)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::git::testutil::{commit_file, commit_merge, commit_unchanged, init_repo};

    const DAY: i64 = 86_400;

    #[test]
    fn test_filters_root_merge_empty_and_late_commits() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());

        commit_file(&repo, "a.txt", "one\n", "Root", DAY);
        let second = commit_file(&repo, "a.txt", "one\n// TODO: two\n", "Ada", 2 * DAY);
        commit_unchanged(&repo, 3 * DAY);
        let fourth = commit_file(&repo, "b.txt", "hello\n", "Grace", 4 * DAY);
        commit_merge(&repo, 5 * DAY);
        commit_file(&repo, "c.txt", "late\n", "Ada", 10 * DAY);

        let cutoff = Utc.timestamp_opt(6 * DAY, 0).unwrap();
        let commits = eligible_commits(&repo, cutoff).unwrap();

        let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec![second.to_string(), fourth.to_string()]);

        assert_eq!(commits[0].author_name, "Ada");
        assert_eq!(commits[0].iso_time(), "1970-01-03T00:00:00");
        assert!(commits[0].patch.contains("diff --git a/a.txt b/a.txt"));
        assert!(commits[0].patch.contains("+// TODO: two"));
        assert!(commits[1].patch.contains("+hello"));
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "a.txt", "1\n", "Ada", DAY);
        commit_file(&repo, "a.txt", "2\n", "Ada", 2 * DAY);

        let cutoff = Utc.timestamp_opt(2 * DAY, 0).unwrap();
        assert!(eligible_commits(&repo, cutoff).unwrap().is_empty());
    }

    #[test]
    fn test_empty_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let err = eligible_commits(&repo, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("no HEAD"));
    }
}
