//! `dep-miner` — mine commit history for dependency declaration changes.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load mining config ([`config::load_config`]).
//! 3. Resolve the repository: GitHub fetch or local open ([`remote`]).
//! 4. Walk history, parse and diff manifests ([`miner`], [`walker`],
//!    [`manifest`], [`diff`]).
//! 5. Write the CSV report and render the console summary ([`report`]).
//! 6. Exit `0` on success (including zero changes), `1` on a fatal
//!    repository access failure.

mod cli;
mod config;
mod diff;
mod errors;
mod manifest;
mod miner;
mod models;
mod remote;
mod report;
mod walker;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use git2::Repository;

use cli::{Cli, ReportFormat};
use config::load_config;
use manifest::ParseOptions;
use miner::MineOptions;
use remote::FetchedRepository;

/// Keeps the temp clone directory alive for as long as the handle is used.
enum RepoSource {
    Local(Repository),
    Fetched(FetchedRepository),
}

impl RepoSource {
    fn repository(&self) -> &Repository {
        match self {
            RepoSource::Local(repo) => repo,
            RepoSource::Fetched(fetched) => &fetched.repository,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let label = format!("{}/{}", cli.owner, cli.repo);

    let config = load_config(cli.config.as_deref())?;

    // CLI flags override config values.
    let manifest = cli.manifest.clone().unwrap_or(config.mining.manifest);
    let output = cli.output.clone().unwrap_or(config.mining.output);
    let include_management = cli.include_management || config.mining.include_management;

    if !cli.quiet {
        eprintln!("Analyzing repository: {}", label);
        eprintln!("Tracked manifest: {}", manifest);
    }

    let source = match &cli.path {
        Some(path) => RepoSource::Local(remote::open_local(path)?),
        None => {
            if !cli.quiet {
                eprintln!("Cloning https://github.com/{} ...", label);
            }
            RepoSource::Fetched(remote::fetch(&cli.owner, &cli.repo).await?)
        }
    };

    let opts = MineOptions {
        manifest,
        parse: ParseOptions { include_management },
        quiet: cli.quiet,
    };
    let mining_report = miner::mine(source.repository(), &label, &opts)?;

    report::csv::render(&mining_report, &output)?;

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&mining_report, &label, cli.verbose, cli.quiet)?;
            if !cli.quiet {
                println!(" Report saved to: {}", output.display().to_string().cyan());
            }
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&mining_report)?);
        }
    }

    Ok(())
}
