use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::{ErrorCode, ObjectType, Oid, Repository, Sort};

use crate::models::CommitRecord;

/// Walks first-parent history and yields the commits that touch the tracked
/// manifest path, oldest first.
///
/// Merge commits are diffed against their first parent only; side branches
/// merged in are never enumerated, so every change is attributed to exactly
/// one mainline commit. Renames are not tracked: a rename reads as a delete
/// at the old path unless the caller tracks the new path instead.
pub struct HistoryWalker<'repo> {
    repo: &'repo Repository,
    manifest: PathBuf,
}

/// One commit whose tree-diff against its first parent touches the manifest.
///
/// Blob content is loaded lazily through the two accessors, so enumerating
/// the walk does not pull every historical manifest into memory at once.
pub struct TouchingCommit<'repo> {
    repo: &'repo Repository,
    record: CommitRecord,
    before: Option<Oid>,
    after: Option<Oid>,
}

impl<'repo> TouchingCommit<'repo> {
    pub fn record(&self) -> &CommitRecord {
        &self.record
    }

    /// Manifest content at the first parent; `None` for root commits or when
    /// the file did not exist there yet.
    pub fn content_before(&self) -> Option<String> {
        self.before.and_then(|oid| self.read_blob(oid))
    }

    /// Manifest content at this commit; `None` when the commit deleted it.
    pub fn content_after(&self) -> Option<String> {
        self.after.and_then(|oid| self.read_blob(oid))
    }

    fn read_blob(&self, oid: Oid) -> Option<String> {
        let blob = self.repo.find_blob(oid).ok()?;
        Some(String::from_utf8_lossy(blob.content()).into_owned())
    }
}

impl<'repo> HistoryWalker<'repo> {
    pub fn new(repo: &'repo Repository, manifest: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            manifest: manifest.into(),
        }
    }

    /// Enumerate first-parent history oldest → newest, keeping only commits
    /// where the manifest blob differs from the first parent's.
    ///
    /// A repository with no commits, or none touching the manifest, yields an
    /// empty list rather than an error.
    pub fn walk(&self) -> Result<Vec<TouchingCommit<'repo>>, git2::Error> {
        let mut revwalk = self.repo.revwalk()?;
        match revwalk.push_head() {
            Ok(()) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        }
        revwalk.simplify_first_parent()?;
        revwalk.set_sorting(Sort::TIME | Sort::REVERSE)?;

        let mut touching = Vec::new();

        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;

            let after = self.manifest_blob(&commit.tree()?)?;
            let before = match commit.parent(0) {
                Ok(parent) => self.manifest_blob(&parent.tree()?)?,
                Err(_) => None,
            };

            // Same blob on both sides (or absent on both) means this commit
            // did not touch the manifest.
            if before == after {
                continue;
            }

            touching.push(TouchingCommit {
                repo: self.repo,
                record: to_record(&commit),
                before,
                after,
            });
        }

        Ok(touching)
    }

    /// Blob id of the manifest in `tree`, or `None` if absent.
    fn manifest_blob(&self, tree: &git2::Tree<'_>) -> Result<Option<Oid>, git2::Error> {
        match tree.get_path(Path::new(&self.manifest)) {
            Ok(entry) if entry.kind() == Some(ObjectType::Blob) => Ok(Some(entry.id())),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn to_record(commit: &git2::Commit<'_>) -> CommitRecord {
    let author = commit.author();
    CommitRecord {
        hash: commit.id().to_string(),
        author: author.name().unwrap_or("Unknown").to_string(),
        date: DateTime::<Utc>::from_timestamp(commit.time().seconds(), 0).unwrap_or_default(),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{commit, pom, pom_tree};
    use super::*;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_root_commit_has_no_before_content() {
        let (_dir, repo) = init_repo();
        let tree = pom_tree(&repo, Some(&pom(&[("org.x", "lib", "1.0")])));
        commit(&repo, tree, &[], "initial", true);

        let walker = HistoryWalker::new(&repo, "pom.xml");
        let commits = walker.walk().unwrap();
        assert_eq!(commits.len(), 1);
        assert!(commits[0].record().is_root());
        assert!(commits[0].content_before().is_none());
        assert!(commits[0].content_after().is_some());
    }

    #[test]
    fn test_untouched_commits_are_skipped() {
        let (_dir, repo) = init_repo();
        let pom_text = pom(&[("org.x", "lib", "1.0")]);

        let t1 = pom_tree(&repo, Some(&pom_text));
        let c1 = commit(&repo, t1, &[], "add pom", true);

        // Same pom blob plus an unrelated file: does not touch the manifest.
        let mut builder = repo
            .treebuilder(Some(&repo.find_tree(t1).unwrap()))
            .unwrap();
        let readme = repo.blob(b"readme").unwrap();
        builder.insert("README.md", readme, 0o100644).unwrap();
        let t2 = builder.write().unwrap();
        commit(&repo, t2, &[c1], "add readme", true);

        let walker = HistoryWalker::new(&repo, "pom.xml");
        let commits = walker.walk().unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].record().hash, c1.to_string());
    }

    #[test]
    fn test_modification_yields_both_sides_oldest_first() {
        let (_dir, repo) = init_repo();
        let v1 = pom(&[("org.x", "lib", "1.0")]);
        let v2 = pom(&[("org.x", "lib", "2.0")]);

        let c1 = commit(&repo, pom_tree(&repo, Some(&v1)), &[], "v1", true);
        let c2 = commit(&repo, pom_tree(&repo, Some(&v2)), &[c1], "v2", true);

        let walker = HistoryWalker::new(&repo, "pom.xml");
        let commits = walker.walk().unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].record().hash, c1.to_string());
        assert_eq!(commits[1].record().hash, c2.to_string());
        assert_eq!(commits[1].content_before(), Some(v1));
        assert_eq!(commits[1].content_after(), Some(v2));
    }

    #[test]
    fn test_deletion_yields_absent_after() {
        let (_dir, repo) = init_repo();
        let v1 = pom(&[("org.x", "lib", "1.0")]);

        let c1 = commit(&repo, pom_tree(&repo, Some(&v1)), &[], "add", true);
        commit(&repo, pom_tree(&repo, None), &[c1], "delete pom", true);

        let walker = HistoryWalker::new(&repo, "pom.xml");
        let commits = walker.walk().unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[1].content_before(), Some(v1));
        assert!(commits[1].content_after().is_none());
    }

    #[test]
    fn test_merge_diffs_against_first_parent_only() {
        let (_dir, repo) = init_repo();
        let v1 = pom(&[("org.x", "lib", "1.0")]);
        let v2 = pom(&[("org.x", "lib", "2.0")]);
        let v3 = pom(&[("org.x", "lib", "3.0")]);

        let c1 = commit(&repo, pom_tree(&repo, Some(&v1)), &[], "v1", true);
        let c2 = commit(&repo, pom_tree(&repo, Some(&v2)), &[c1], "v2 mainline", true);
        // Side branch off c1, not on HEAD.
        let c3 = commit(&repo, pom_tree(&repo, Some(&v3)), &[c1], "v3 branch", false);
        let merge = commit(&repo, pom_tree(&repo, Some(&v3)), &[c2, c3], "merge", true);

        let walker = HistoryWalker::new(&repo, "pom.xml");
        let commits = walker.walk().unwrap();

        // First-parent walk: c1, c2, merge — the side-branch commit never
        // appears on its own.
        let hashes: Vec<&str> = commits.iter().map(|c| c.record().hash.as_str()).collect();
        assert_eq!(
            hashes,
            vec![c1.to_string(), c2.to_string(), merge.to_string()]
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
        );

        let merge_commit = &commits[2];
        assert!(merge_commit.record().is_merge());
        // Before-side is the first parent (v2), not the merged branch.
        assert_eq!(merge_commit.content_before(), Some(v2));
        assert_eq!(merge_commit.content_after(), Some(v3));
    }

    #[test]
    fn test_empty_repository_yields_empty_walk() {
        let (_dir, repo) = init_repo();
        let walker = HistoryWalker::new(&repo, "pom.xml");
        assert!(walker.walk().unwrap().is_empty());
    }

    #[test]
    fn test_repository_without_manifest_yields_empty_walk() {
        let (_dir, repo) = init_repo();
        let mut builder = repo.treebuilder(None).unwrap();
        let blob = repo.blob(b"# readme").unwrap();
        builder.insert("README.md", blob, 0o100644).unwrap();
        let tree = builder.write().unwrap();
        commit(&repo, tree, &[], "no pom here", true);

        let walker = HistoryWalker::new(&repo, "pom.xml");
        assert!(walker.walk().unwrap().is_empty());
    }
}
