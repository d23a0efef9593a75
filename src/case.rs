use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Placeholder values for one rendered test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CaseRecord {
    values: BTreeMap<String, String>,
}

impl CaseRecord {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Escape `value` for use between the quotes of a JS string literal.
///
/// Covers both quote styles: JSON escaping handles `"`, `\` and control
/// characters, and `'` is escaped on top.
pub fn js_string_content(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].replace('\'', "\\'")
}

/// One commit turned into a push-event test case.
///
/// Values are raw; converting into a [`CaseRecord`] escapes them for the
/// JS string literals the Jest templates put them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitCase {
    pub owner_username: String,
    pub repo_name: String,
    pub head_commit_sha: String,
    pub date: String,
    pub head_commit_author_username: String,
    pub diff_filename: String,
}

impl From<CommitCase> for CaseRecord {
    fn from(case: CommitCase) -> Self {
        CaseRecord::from_pairs(
            [
                ("OWNER_USERNAME", case.owner_username),
                ("REPO_NAME", case.repo_name),
                ("HEAD_COMMIT_SHA", case.head_commit_sha),
                ("DATE", case.date),
                (
                    "HEAD_COMMIT_AUTHOR_USERNAME",
                    case.head_commit_author_username,
                ),
                ("DIFF_FILENAME", case.diff_filename),
            ]
            .map(|(name, value)| (name, js_string_content(&value))),
        )
    }
}

/// Load case records from a JSON array of string-valued objects.
pub fn load_case_records(path: &Path) -> Result<Vec<CaseRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cases file {}", path.display()))?;
    let records: Vec<CaseRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid cases file {}", path.display()))?;
    Ok(records)
}
