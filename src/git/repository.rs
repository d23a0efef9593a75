use anyhow::{Context, Result};
use git2::Repository;
use std::path::{Path, PathBuf};

/// A cloned repository at `<repos_dir>/<owner>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneDir {
    pub owner: String,
    pub name: String,
    pub path: PathBuf,
}

impl CloneDir {
    /// `owner/name`, the key used by the repository summary file.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn open(&self) -> Result<Repository> {
        Repository::open(&self.path)
            .with_context(|| format!("{} is not a git repository", self.path.display()))
    }
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    dirs.sort();
    Ok(dirs)
}

/// List every `<owner>/<name>` directory under `repos_dir`, sorted by slug.
pub fn discover_clones(repos_dir: &Path) -> Result<Vec<CloneDir>> {
    let mut clones = Vec::new();
    for (owner, owner_path) in sorted_subdirs(repos_dir)? {
        for (name, path) in sorted_subdirs(&owner_path)? {
            clones.push(CloneDir {
                owner: owner.clone(),
                name,
                path,
            });
        }
    }
    Ok(clones)
}
