use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a dependency across history: a `(group, artifact)` pair.
///
/// Equality is exact and case-sensitive. A version bump is a change to the
/// value attached to an unchanged key, never a new key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyKey {
    pub group: String,
    pub artifact: String,
}

impl DependencyKey {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }
}

impl std::fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// One dependency declaration as it appeared in a manifest snapshot.
///
/// The version may be a resolved literal, an unresolved `${...}` placeholder
/// carried through verbatim, or empty when the manifest leaves the version to
/// be managed elsewhere. Declarations are immutable; a "change" replaces one
/// declaration with another under the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    pub key: DependencyKey,
    pub version: String,
    pub scope: Option<String>,
}

impl std::fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{} @ {} ({})", self.key, self.version, scope),
            None => write!(f, "{} @ {}", self.key, self.version),
        }
    }
}

/// The full set of declared dependencies at one point in history.
///
/// Each key maps to exactly one declaration; a manifest declaring the same
/// key twice is rejected by the parser, not silently deduplicated here. The
/// map is ordered so snapshots compare and iterate deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestSnapshot {
    declarations: BTreeMap<DependencyKey, DependencyDeclaration>,
}

impl ManifestSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declaration; returns the previous declaration if the key was
    /// already present (the caller decides whether that is an error).
    pub fn insert(&mut self, decl: DependencyDeclaration) -> Option<DependencyDeclaration> {
        self.declarations.insert(decl.key.clone(), decl)
    }

    pub fn get(&self, key: &DependencyKey) -> Option<&DependencyDeclaration> {
        self.declarations.get(key)
    }

    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.declarations.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations in key order.
    pub fn iter(&self) -> impl Iterator<Item = &DependencyDeclaration> {
        self.declarations.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &DependencyKey> {
        self.declarations.keys()
    }
}

impl FromIterator<DependencyDeclaration> for ManifestSnapshot {
    fn from_iter<I: IntoIterator<Item = DependencyDeclaration>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for decl in iter {
            snapshot.insert(decl);
        }
        snapshot
    }
}

/// One commit in the mined history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author: String,
    pub date: DateTime<Utc>,
    /// Parent hashes in order; index 0 is the primary parent used for diffing.
    pub parents: Vec<String>,
}

impl CommitRecord {
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(8)]
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// What happened to one dependency key in one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChangeKind {
    Added { version: String },
    Removed { version: String },
    Changed { old: String, new: String },
}

/// One structured fact: a key plus the kind of change, always attributed to
/// exactly one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyChangeEvent {
    pub key: DependencyKey,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

impl DependencyChangeEvent {
    /// Human-readable descriptor used by the CSV and terminal sinks.
    pub fn describe(&self) -> String {
        match &self.kind {
            ChangeKind::Added { .. } => "added".to_string(),
            ChangeKind::Removed { .. } => "removed".to_string(),
            ChangeKind::Changed { old, new } => format!("changed from {} to {}", old, new),
        }
    }
}

impl std::fmt::Display for DependencyChangeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.describe())
    }
}

/// A commit together with the dependency changes it introduced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitChanges {
    pub commit: CommitRecord,
    pub events: Vec<DependencyChangeEvent>,
}

/// A commit whose manifest could not be parsed on one side of the diff.
/// The commit stays in the report as a warning instead of aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCommit {
    pub commit: CommitRecord,
    pub reason: String,
}

/// The final mining output: commits with at least one change event, in
/// chronological order, plus any commits skipped with a warning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiningReport {
    pub commits: Vec<CommitChanges>,
    pub skipped: Vec<SkippedCommit>,
    /// Set once per run when the manifest uses a shape the parser does not
    /// support (e.g. multi-module aggregation).
    pub unsupported: Option<String>,
}

impl MiningReport {
    pub fn total_commits_with_changes(&self) -> usize {
        self.commits.len()
    }

    pub fn total_events(&self) -> usize {
        self.commits.iter().map(|c| c.events.len()).sum()
    }
}
