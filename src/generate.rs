//! The `generate` pipeline: cloned repositories in, Jest suites out.
//!
//! For every `<owner>/<repo>` clone with a cutoff, each eligible commit
//! becomes one test case. Its patch is written to
//! `<diffs_dir>/<owner>/<repo>/<sha>.diff` and the suite to
//! `<tests_dir>/<owner>/<repo>.test.js`. Repositories are processed on
//! the blocking pool in parallel; cases within a suite keep commit order.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::case::{CaseRecord, CommitCase};
use crate::cutoff::Cutoffs;
use crate::git::{discover_clones, eligible_commits, CloneDir};
use crate::template::TemplateSet;

#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub diffs_dir: PathBuf,
    pub tests_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOutcome {
    pub slug: String,
    pub cases: usize,
    /// `None` when the repository produced no test file.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct GenerateSummary {
    pub repos: Vec<RepoOutcome>,
}

impl GenerateSummary {
    pub fn suites_written(&self) -> usize {
        self.repos.iter().filter(|r| r.output.is_some()).count()
    }

    pub fn total_cases(&self) -> usize {
        self.repos.iter().map(|r| r.cases).sum()
    }
}

fn diff_path(dirs: &OutputDirs, clone: &CloneDir, sha: &str) -> PathBuf {
    dirs.diffs_dir
        .join(&clone.owner)
        .join(&clone.name)
        .join(format!("{sha}.diff"))
}

fn suite_path(dirs: &OutputDirs, clone: &CloneDir) -> PathBuf {
    dirs.tests_dir
        .join(&clone.owner)
        .join(format!("{}.test.js", clone.name))
}

/// Path text as the generated JS sees it, with `/` separators.
fn js_path(path: &Path) -> String {
    let text = path.display().to_string();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text
    }
}

/// Write through a temp file in the same directory, then rename into place.
/// Readers see either the old file or the complete new one.
fn write_file(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create {}", parent.display()))?;

    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    temp.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    temp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Generate the suite for one repository.
///
/// Nothing is written unless the whole suite renders.
pub fn generate_repo(
    clone: &CloneDir,
    cutoff: DateTime<Utc>,
    templates: &TemplateSet,
    dirs: &OutputDirs,
) -> Result<RepoOutcome> {
    let slug = clone.slug();
    let repo = clone.open()?;
    let commits =
        eligible_commits(&repo, cutoff).with_context(|| format!("{slug}: git walk failed"))?;

    if commits.is_empty() {
        debug!(repo = %slug, "no commits before cutoff");
        return Ok(RepoOutcome {
            slug,
            cases: 0,
            output: None,
        });
    }

    let mut diffs = Vec::with_capacity(commits.len());
    let mut cases: Vec<CaseRecord> = Vec::with_capacity(commits.len());
    for commit in &commits {
        debug!(repo = %slug, commit = %commit.sha, time = %commit.iso_time(), "handling commit");
        let path = diff_path(dirs, clone, &commit.sha);
        cases.push(
            CommitCase {
                owner_username: clone.owner.clone(),
                repo_name: clone.name.clone(),
                head_commit_sha: commit.sha.clone(),
                date: commit.iso_time(),
                head_commit_author_username: commit.author_name.clone(),
                diff_filename: js_path(&path),
            }
            .into(),
        );
        diffs.push((path, commit.patch.as_str()));
    }

    let suite = templates
        .render_suite(&cases)
        .with_context(|| format!("{slug}: failed to render test suite"))?;

    for (path, patch) in &diffs {
        write_file(path, patch)?;
    }
    let output = suite_path(dirs, clone);
    write_file(&output, &suite)?;

    info!(repo = %slug, cases = cases.len(), path = %output.display(), "suite written");
    Ok(RepoOutcome {
        slug,
        cases: cases.len(),
        output: Some(output),
    })
}

/// Run the pipeline over every clone under `repos_dir`.
///
/// At most `jobs` repositories are processed at once; results are reported
/// in clone order. After the first failure no further repository starts,
/// and the ones already running finish before the error is returned.
pub async fn generate_all(
    repos_dir: &Path,
    cutoffs: &Cutoffs,
    templates: TemplateSet,
    dirs: OutputDirs,
    jobs: usize,
) -> Result<GenerateSummary> {
    let clones = discover_clones(repos_dir)?;
    info!(clones = clones.len(), with_cutoff = cutoffs.len(), "starting generation");

    let templates = Arc::new(templates);
    let dirs = Arc::new(dirs);
    let permits = Arc::new(Semaphore::new(jobs.max(1)));

    let mut tasks = JoinSet::new();
    for (index, clone) in clones.into_iter().enumerate() {
        let cutoff = cutoffs.get(&clone.slug());
        let templates = Arc::clone(&templates);
        let dirs = Arc::clone(&dirs);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let Some(cutoff) = cutoff else {
                debug!(repo = %clone.slug(), "no bot issues recorded, skipping");
                return Ok::<_, anyhow::Error>((
                    index,
                    RepoOutcome {
                        slug: clone.slug(),
                        cases: 0,
                        output: None,
                    },
                ));
            };
            let _permit = permits.acquire_owned().await?;
            let outcome = tokio::task::spawn_blocking(move || {
                generate_repo(&clone, cutoff, &templates, &dirs)
            })
            .await??;
            Ok((index, outcome))
        });
    }

    let mut repos = Vec::new();
    let mut failure = None;
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(anyhow::Error::from).and_then(|result| result) {
            Ok(entry) => repos.push(entry),
            Err(e) if failure.is_none() => {
                // Queued repositories fail to acquire a permit and bail out
                permits.close();
                failure = Some(e);
            }
            Err(_) => {}
        }
    }
    if let Some(e) = failure {
        return Err(e);
    }

    repos.sort_by_key(|(index, _)| *index);
    Ok(GenerateSummary {
        repos: repos.into_iter().map(|(_, outcome)| outcome).collect(),
    })
}
