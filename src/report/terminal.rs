use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{ChangeKind, CommitChanges, MiningReport};

/// Render the console summary and, unless quiet, the change tables.
pub fn render(report: &MiningReport, repo_label: &str, verbose: bool, quiet: bool) -> Result<()> {
    if quiet {
        println!(
            "Repository: {}  Commits with changes: {}  Events: {}  Skipped: {}",
            repo_label,
            report.total_commits_with_changes(),
            report.total_events(),
            report.skipped.len(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "dep-miner".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Repository: {}\n", repo_label);
    println!(
        " Commits with dependency changes: {}",
        report.total_commits_with_changes().to_string().bold()
    );
    println!(" Change events: {}", report.total_events());

    if let Some(shape) = &report.unsupported {
        println!(
            " {} unsupported manifest shape encountered: {}",
            "⚠".yellow(),
            shape
        );
    }

    if !report.skipped.is_empty() {
        println!(
            " {} {} commit(s) skipped (manifest failed to parse):",
            "⚠".yellow(),
            report.skipped.len()
        );
        for skipped in &report.skipped {
            println!(
                "   {} {}",
                skipped.commit.short_hash().dimmed(),
                skipped.reason.yellow()
            );
        }
    }
    println!();

    if report.commits.is_empty() {
        return Ok(());
    }

    if verbose {
        render_events(report);
    } else {
        render_commits(report);
    }

    Ok(())
}

/// One row per commit with change counts.
fn render_commits(report: &MiningReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Commit").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Author").add_attribute(Attribute::Bold),
            Cell::new("Added").add_attribute(Attribute::Bold),
            Cell::new("Removed").add_attribute(Attribute::Bold),
            Cell::new("Changed").add_attribute(Attribute::Bold),
        ]);

    for entry in &report.commits {
        let added = count_kind(entry, |k| matches!(k, ChangeKind::Added { .. }));
        let removed = count_kind(entry, |k| matches!(k, ChangeKind::Removed { .. }));
        let changed = count_kind(entry, |k| matches!(k, ChangeKind::Changed { .. }));

        table.add_row(vec![
            Cell::new(entry.commit.short_hash()),
            Cell::new(entry.commit.date.format("%Y-%m-%d").to_string()),
            Cell::new(&entry.commit.author),
            Cell::new(added).fg(Color::Green),
            Cell::new(removed).fg(Color::Red),
            Cell::new(changed).fg(Color::Yellow),
        ]);
    }

    println!("{}", table);
}

/// One row per change event.
fn render_events(report: &MiningReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Commit").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Dependency").add_attribute(Attribute::Bold),
            Cell::new("Change").add_attribute(Attribute::Bold),
        ]);

    for entry in &report.commits {
        for event in &entry.events {
            let color = match event.kind {
                ChangeKind::Added { .. } => Color::Green,
                ChangeKind::Removed { .. } => Color::Red,
                ChangeKind::Changed { .. } => Color::Yellow,
            };
            table.add_row(vec![
                Cell::new(entry.commit.short_hash()),
                Cell::new(entry.commit.date.format("%Y-%m-%d").to_string()),
                Cell::new(event.key.to_string()),
                Cell::new(event.describe()).fg(color),
            ]);
        }
    }

    println!("{}", table);
}

fn count_kind(entry: &CommitChanges, pred: impl Fn(&ChangeKind) -> bool) -> usize {
    entry.events.iter().filter(|e| pred(&e.kind)).count()
}
