//! CSV log of issues the bot would have created.
//!
//! Each row is `(owner, repo, timestamp, title, body)` with no header, the
//! same shape the generated Jest suites append while they run.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Arguments recorded by the `issues.create` mock.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueCall {
    pub owner: String,
    pub repo: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRow {
    pub owner: String,
    pub repo: String,
    pub timestamp: String,
    pub title: String,
    pub body: String,
}

impl IssueRow {
    pub fn from_call(call: IssueCall, timestamp: &str) -> Self {
        Self {
            owner: call.owner,
            repo: call.repo,
            timestamp: timestamp.to_string(),
            title: call.title,
            body: call.body,
        }
    }
}

/// Shorten `s` to at most `max` chars, marking the cut with `...`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Append-only issue CSV. The file is opened per write and closed afterwards.
#[derive(Debug, Clone)]
pub struct IssueLog {
    path: PathBuf,
}

impl IssueLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, rows: &[IssueRow]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for row in rows {
            writer.serialize(row)?;
            info!(
                "Output issue for {}/{}: {}",
                row.owner,
                row.repo,
                truncate(&row.title, 40)
            );
        }
        writer.flush()?;
        Ok(())
    }
}

/// Load recorded `issues.create` calls from a JSON array.
pub fn load_issue_calls(path: &Path) -> Result<Vec<IssueCall>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid issue calls in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, body: &str) -> IssueRow {
        IssueRow::from_call(
            IssueCall {
                owner: "octo".to_string(),
                repo: "widgets".to_string(),
                title: title.to_string(),
                body: body.to_string(),
            },
            "2020-01-02T03:04:05",
        )
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 40), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("ééééé", 4), "é...");
        assert_eq!(truncate("abc", 2), "...");
    }

    #[test]
    fn test_append_twice_accumulates_rows() {
        let dir = tempfile::tempdir().unwrap();
        let log = IssueLog::new(dir.path().join("out/issues.csv"));

        log.append(&[row("Fix parser", "plain")]).unwrap();
        log.append(&[row("Handle, commas", "line one\nline \"two\"")])
            .unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            contents,
            "octo,widgets,2020-01-02T03:04:05,Fix parser,plain\n\
             octo,widgets,2020-01-02T03:04:05,\"Handle, commas\",\"line one\nline \"\"two\"\"\"\n"
        );
    }

    #[test]
    fn test_append_nothing_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = IssueLog::new(dir.path().join("issues.csv"));
        log.append(&[]).unwrap();
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
    }

    #[test]
    fn test_load_issue_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.json");
        std::fs::write(
            &path,
            r#"[{"owner": "octo", "repo": "widgets", "title": "T", "body": "B", "labels": ["todo"]},
                {"owner": "octo", "repo": "widgets", "title": "No body"}]"#,
        )
        .unwrap();

        let calls = load_issue_calls(&path).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].body, "B");
        assert_eq!(calls[1].body, "");
    }
}
