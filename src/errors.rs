use thiserror::Error;

use crate::models::DependencyKey;

/// A single manifest snapshot failed to parse.
///
/// Local failure: the owning commit is skipped with a warning and the walk
/// continues. Never escapes the miner boundary as a fatal error.
#[derive(Debug, Error)]
pub enum MalformedManifest {
    #[error("invalid XML: {0}")]
    Xml(String),

    #[error("dependency declaration #{index} is missing its <{field}> element")]
    MissingField { index: usize, field: &'static str },

    #[error("duplicate declaration of {key}: '{first}' and '{second}'")]
    DuplicateKey {
        key: DependencyKey,
        first: String,
        second: String,
    },
}

/// The manifest uses a structural feature the parser does not recognize.
///
/// Reported once per run, not once per commit.
#[derive(Debug, Error)]
pub enum UnsupportedManifestShape {
    #[error("multi-module aggregator manifest (modules: {})", modules.join(", "))]
    ModuleAggregation { modules: Vec<String> },
}

/// Any failure while parsing one manifest snapshot.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error(transparent)]
    Malformed(#[from] MalformedManifest),

    #[error("unsupported manifest shape: {0}")]
    Unsupported(#[from] UnsupportedManifestShape),
}

/// The repository cannot be reached, cloned, or read.
///
/// Fatal: aborts the run with a non-zero exit and no partial report.
#[derive(Debug, Error)]
#[error("cannot access repository '{repo}': {reason}")]
pub struct RepositoryAccessError {
    pub repo: String,
    pub reason: String,
}

impl RepositoryAccessError {
    pub fn new(repo: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            reason: reason.into(),
        }
    }
}
