//! Per-repository cutoff times.
//!
//! Only commits made before the bot opened its first issue in a repository
//! are turned into test cases. The repository summary file records those
//! issues per `owner/repo`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RepoSummary {
    #[serde(default)]
    issues: Vec<IssueSummary>,
}

#[derive(Debug, Deserialize)]
struct IssueSummary {
    created_at: String,
}

/// Parse a timestamp as UTC. Naive timestamps are assumed to already be UTC.
pub fn parse_utc(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Map of `owner/repo` to the time of its earliest bot issue.
#[derive(Debug, Clone, Default)]
pub struct Cutoffs {
    by_repo: BTreeMap<String, DateTime<Utc>>,
}

impl Cutoffs {
    pub fn from_json(contents: &str) -> Result<Self> {
        let repos: BTreeMap<String, RepoSummary> =
            serde_json::from_str(contents).context("Invalid repository summary JSON")?;

        let mut by_repo = BTreeMap::new();
        for (name, summary) in repos {
            let mut earliest: Option<DateTime<Utc>> = None;
            for issue in &summary.issues {
                let created = parse_utc(&issue.created_at).with_context(|| {
                    format!(
                        "{name}: unrecognised issue timestamp {:?}",
                        issue.created_at
                    )
                })?;
                earliest = Some(earliest.map_or(created, |e| e.min(created)));
            }
            if let Some(cutoff) = earliest {
                by_repo.insert(name, cutoff);
            }
        }
        Ok(Self { by_repo })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn get(&self, repo: &str) -> Option<DateTime<Utc>> {
        self.by_repo.get(repo).copied()
    }

    pub fn len(&self) -> usize {
        self.by_repo.len()
    }
}
