use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "dep-miner",
    about = "Mine a repository's commit history for dependency declaration changes",
    version
)]
pub struct Cli {
    /// Repository owner (e.g. 'pac4j')
    pub owner: String,

    /// Repository name (e.g. 'dropwizard-pac4j')
    pub repo: String,

    /// Mine an already-cloned local repository instead of fetching from GitHub
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Manifest path to track [default from config: pom.xml]
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<String>,

    /// CSV output path [default from config: dependency-changes.csv]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Console report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Config file [default: ./.dep-miner/config.toml, fallback ~/.config/dep-miner/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also count dependencyManagement entries as declarations
    #[arg(long)]
    pub include_management: bool,

    /// List every change event instead of per-commit counts
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
