use std::path::Path;

use git2::{Commit, Oid, Repository, Signature, Time};

pub fn init_repo(path: &Path) -> Repository {
    std::fs::create_dir_all(path).unwrap();
    Repository::init(path).unwrap()
}

fn signature(author: &str, secs: i64) -> Signature<'static> {
    Signature::new(author, "dev@example.com", &Time::new(secs, 0)).unwrap()
}

/// Write `name` and commit it on top of HEAD at `secs` since the epoch.
pub fn commit_file(repo: &Repository, name: &str, content: &str, author: &str, secs: i64) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let parents: Vec<Commit> = repo
        .head()
        .ok()
        .and_then(|h| h.peel_to_commit().ok())
        .into_iter()
        .collect();
    let parent_refs: Vec<&Commit> = parents.iter().collect();

    let sig = signature(author, secs);
    repo.commit(
        Some("HEAD"),
        &sig,
        &sig,
        &format!("update {name}"),
        &tree,
        &parent_refs,
    )
    .unwrap()
}

/// Commit the current HEAD tree again, producing an empty change.
pub fn commit_unchanged(repo: &Repository, secs: i64) -> Oid {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    let tree = head.tree().unwrap();
    let sig = signature("Ada", secs);
    repo.commit(Some("HEAD"), &sig, &sig, "no-op", &tree, &[&head])
        .unwrap()
}

/// Commit HEAD's tree with HEAD and its first parent as parents.
pub fn commit_merge(repo: &Repository, secs: i64) -> Oid {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    let other = head.parent(0).unwrap();
    let tree = head.tree().unwrap();
    let sig = signature("Ada", secs);
    repo.commit(Some("HEAD"), &sig, &sig, "merge", &tree, &[&head, &other])
        .unwrap()
}
