use git2::Repository;
use indicatif::{ProgressBar, ProgressStyle};

use crate::diff::diff;
use crate::errors::{ManifestError, RepositoryAccessError};
use crate::manifest::{self, ParseOptions};
use crate::models::{CommitChanges, ManifestSnapshot, MiningReport, SkippedCommit};
use crate::walker::HistoryWalker;

/// Settings for one mining run.
#[derive(Debug, Clone)]
pub struct MineOptions {
    /// Tracked manifest path inside the repository.
    pub manifest: String,
    pub parse: ParseOptions,
    /// Suppress the progress bar.
    pub quiet: bool,
}

impl Default for MineOptions {
    fn default() -> Self {
        Self {
            manifest: "pom.xml".to_string(),
            parse: ParseOptions::default(),
            quiet: false,
        }
    }
}

/// Walk every commit touching the manifest, diff the before/after snapshots,
/// and fold the results into a [`MiningReport`].
///
/// Parse failures are local: the owning commit lands in the report as
/// skipped-with-warning and the walk continues. An unsupported manifest shape
/// is recorded once per run. Only repository access failures are fatal.
pub fn mine(
    repo: &Repository,
    repo_label: &str,
    opts: &MineOptions,
) -> Result<MiningReport, RepositoryAccessError> {
    let walker = HistoryWalker::new(repo, opts.manifest.as_str());
    let commits = walker
        .walk()
        .map_err(|e| RepositoryAccessError::new(repo_label, e.message().to_string()))?;

    let pb = if !opts.quiet {
        let pb = ProgressBar::new(commits.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} commits {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut report = MiningReport::default();

    for touching in &commits {
        let before = parse_side(touching.content_before(), opts.parse);
        let after = parse_side(touching.content_after(), opts.parse);

        match (before, after) {
            (Ok(before), Ok(after)) => {
                let events = diff(&before, &after);
                if !events.is_empty() {
                    report.commits.push(CommitChanges {
                        commit: touching.record().clone(),
                        events,
                    });
                }
            }
            (Err(e), _) | (_, Err(e)) => match e {
                ManifestError::Malformed(m) => {
                    report.skipped.push(SkippedCommit {
                        commit: touching.record().clone(),
                        reason: m.to_string(),
                    });
                }
                // Reported once per run, not once per commit.
                ManifestError::Unsupported(u) => {
                    if report.unsupported.is_none() {
                        report.unsupported = Some(u.to_string());
                    }
                }
            },
        }

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(report)
}

/// An absent manifest (root commit, or deleted) is the empty snapshot.
fn parse_side(
    content: Option<String>,
    opts: ParseOptions,
) -> Result<ManifestSnapshot, ManifestError> {
    match content {
        Some(text) => manifest::parse_with(&text, opts),
        None => Ok(ManifestSnapshot::new()),
    }
}
