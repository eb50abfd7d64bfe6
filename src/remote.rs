use std::path::Path;
use std::time::Duration;

use git2::Repository;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tempfile::TempDir;

use crate::errors::RepositoryAccessError;

/// Subset of the GitHub repository object we need for cloning.
#[derive(Debug, Deserialize)]
struct RepoInfo {
    clone_url: String,
    default_branch: String,
}

/// A repository cloned into a temporary working directory.
///
/// The directory lives as long as this value; dropping it removes the clone.
pub struct FetchedRepository {
    pub repository: Repository,
    pub default_branch: String,
    _workdir: TempDir,
}

fn api_url(owner: &str, name: &str) -> String {
    format!("https://api.github.com/repos/{}/{}", owner, name)
}

/// Resolve `owner/name` through the GitHub API and clone it into a temp dir.
///
/// The API preflight turns "no such repository" into a precise error instead
/// of an opaque clone failure. Any failure here is fatal to the run.
pub async fn fetch(owner: &str, name: &str) -> Result<FetchedRepository, RepositoryAccessError> {
    let label = format!("{}/{}", owner, name);

    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| RepositoryAccessError::new(&label, e.to_string()))?;

    let response = client
        .get(api_url(owner, name))
        .header("User-Agent", "dep-miner/0.1.0")
        .send()
        .await
        .map_err(|e| RepositoryAccessError::new(&label, e.to_string()))?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(RepositoryAccessError::new(
            &label,
            "repository not found on GitHub",
        ));
    }
    if !response.status().is_success() {
        return Err(RepositoryAccessError::new(
            &label,
            format!("GitHub API returned HTTP {}", response.status()),
        ));
    }

    let info: RepoInfo = response
        .json()
        .await
        .map_err(|e| RepositoryAccessError::new(&label, e.to_string()))?;

    let workdir = TempDir::new()
        .map_err(|e| RepositoryAccessError::new(&label, e.to_string()))?;
    let repository = Repository::clone(&info.clone_url, workdir.path())
        .map_err(|e| RepositoryAccessError::new(&label, e.message().to_string()))?;

    Ok(FetchedRepository {
        repository,
        default_branch: info.default_branch,
        _workdir: workdir,
    })
}

/// Open an already-cloned repository on disk.
pub fn open_local(path: &Path) -> Result<Repository, RepositoryAccessError> {
    Repository::open(path)
        .map_err(|e| RepositoryAccessError::new(path.display().to_string(), e.message().to_string()))
}
