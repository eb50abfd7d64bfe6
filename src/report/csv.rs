use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::models::MiningReport;

/// Write the report as CSV: one row per change event, commits in
/// chronological order.
pub fn render(report: &MiningReport, output: &Path) -> Result<()> {
    let file = std::fs::File::create(output)?;
    write_rows(report, file)
}

fn write_rows<W: Write>(report: &MiningReport, sink: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(["hash", "date", "author", "dependency", "change"])?;

    for entry in &report.commits {
        let date = entry.commit.date.to_rfc3339();
        for event in &entry.events {
            let dependency = event.key.to_string();
            let change = event.describe();
            writer.write_record([
                entry.commit.hash.as_str(),
                date.as_str(),
                entry.commit.author.as_str(),
                dependency.as_str(),
                change.as_str(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ChangeKind, CommitChanges, CommitRecord, DependencyChangeEvent, DependencyKey,
    };
    use chrono::{TimeZone, Utc};

    fn sample_report() -> MiningReport {
        let commit = CommitRecord {
            hash: "a1b2c3d4e5".to_string(),
            author: "Alice".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            parents: vec![],
        };
        MiningReport {
            commits: vec![CommitChanges {
                commit,
                events: vec![
                    DependencyChangeEvent {
                        key: DependencyKey::new("org.x", "lib"),
                        kind: ChangeKind::Changed {
                            old: "1.0".to_string(),
                            new: "2.0".to_string(),
                        },
                    },
                    DependencyChangeEvent {
                        key: DependencyKey::new("org.y", "util"),
                        kind: ChangeKind::Added {
                            version: "0.5".to_string(),
                        },
                    },
                ],
            }],
            skipped: vec![],
            unsupported: None,
        }
    }

    #[test]
    fn test_one_row_per_change_event() {
        let mut buf = Vec::new();
        write_rows(&sample_report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "hash,date,author,dependency,change");
        assert!(lines[1].starts_with("a1b2c3d4e5,"));
        assert!(lines[1].contains("org.x:lib,changed from 1.0 to 2.0"));
        assert!(lines[2].contains("org.y:util,added"));
    }

    #[test]
    fn test_empty_report_writes_header_only() {
        let mut buf = Vec::new();
        write_rows(&MiningReport::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
