use chrono::{DateTime, Utc};

/// A single-parent commit and the patch it introduced.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub sha: String,
    pub author_name: String,
    pub time: DateTime<Utc>,
    pub patch: String,
}

impl CommitInfo {
    /// Commit time as `YYYY-MM-DDTHH:MM:SS` in UTC.
    pub fn iso_time(&self) -> String {
        self.time.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
