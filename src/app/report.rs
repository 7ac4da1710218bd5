// wspscan - app/report.rs
//
// Plain-text run report. Pure string rendering over a FolderAnalysis;
// printing (and where it goes) is the binary's job.

use crate::core::model::{FileStatus, FolderAnalysis};
use crate::util::constants;
use std::fmt::Write as _;

/// Render the run report for one analysed folder.
pub fn render(analysis: &FolderAnalysis) -> String {
    let banner = "=".repeat(constants::REPORT_WIDTH);
    let rule = "-".repeat(constants::REPORT_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{banner}");
    let _ = writeln!(out, "{:^width$}", "DATA PROCESSING REPORT", width = constants::REPORT_WIDTH);
    let _ = writeln!(out, "{banner}");
    let _ = writeln!(out, "Folder:    {}", analysis.root.display());
    let _ = writeln!(
        out,
        "Generated: {}",
        analysis.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "Error listing (ECL): {}",
        dataset_status(analysis.has_ecl_data(), analysis.ecl.row_count())
    );
    let _ = writeln!(
        out,
        "Dump log (DMP):      {}",
        dataset_status(analysis.has_dmp_data(), analysis.dmp.row_count())
    );

    if !analysis.frequencies.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "ERROR FREQUENCY");
        let _ = writeln!(out, "{rule}");
        for entry in &analysis.frequencies {
            let _ = writeln!(
                out,
                "  {:<6} {:<40} {:>6}",
                entry.code, entry.description, entry.frequency
            );
        }
    }

    if !analysis.groups.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "ERROR GROUPS");
        let _ = writeln!(out, "{rule}");
        for (name, entries) in &analysis.groups {
            let total: u64 = entries.iter().map(|e| e.frequency).sum();
            let _ = writeln!(
                out,
                "  {:<24} {:>3} distinct {:>6} total",
                name,
                entries.len(),
                total
            );
        }
    }

    for table in &analysis.summaries {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "SUMMARY: {}", table.name);
        let _ = writeln!(out, "{rule}");
        let mut header = format!("  {:<24}", "");
        for column in &table.columns {
            let _ = write!(header, " {column:>8}");
        }
        let _ = writeln!(out, "{header}");
        for row in &table.rows {
            let mut line = format!("  {:<24}", row.label);
            for value in &row.values {
                let _ = write!(line, " {value:>8}");
            }
            let _ = writeln!(out, "{line}");
        }
    }

    if !analysis.channel_activity.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "CHANNEL ACTIVITY");
        let _ = writeln!(out, "{rule}");
        for activity in &analysis.channel_activity {
            let _ = writeln!(out, "  {:<24} {:>10}", activity.column, activity.total);
        }
    }

    if !analysis.events.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "FILL/VENT EVENTS");
        let _ = writeln!(out, "{rule}");
        for (key, events) in &analysis.events {
            let _ = writeln!(out, "  {:<24} {:>3} events", key, events.len());
        }
    }

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "FILES");
    let _ = writeln!(out, "{rule}");
    for outcome in &analysis.outcomes {
        match &outcome.status {
            FileStatus::Merged { class, rows } => {
                let _ = writeln!(
                    out,
                    "  MERGED  [{class}] {:>5} rows  {}",
                    rows,
                    outcome.path.display()
                );
            }
            FileStatus::Skipped { reason } => {
                let _ = writeln!(out, "  SKIPPED ({reason})  {}", outcome.path.display());
            }
        }
    }

    if !analysis.warnings.is_empty() {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "WARNINGS ({})", analysis.warnings.len());
        let _ = writeln!(out, "{rule}");
        for warning in &analysis.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }

    let _ = writeln!(out, "{banner}");
    out
}

fn dataset_status(present: bool, rows: usize) -> String {
    if present {
        format!("SUCCESS - {rows} rows")
    } else {
        "FAIL - no data".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{
        CanonicalTable, ContentClass, ErrorFrequencyEntry, FileOutcome, FolderAnalysis,
    };
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn empty_analysis() -> FolderAnalysis {
        FolderAnalysis {
            root: PathBuf::from("/data/exports"),
            generated_at: Utc::now(),
            ecl: CanonicalTable::default(),
            dmp: CanonicalTable::default(),
            dmp_filtered: CanonicalTable::default(),
            channel_activity: Vec::new(),
            frequencies: Vec::new(),
            groups: BTreeMap::new(),
            group_details: BTreeMap::new(),
            summaries: Vec::new(),
            events: BTreeMap::new(),
            outcomes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_empty_run_reports_fail() {
        let report = render(&empty_analysis());
        assert!(report.contains("DATA PROCESSING REPORT"));
        assert!(report.contains("Error listing (ECL): FAIL"));
        assert!(report.contains("Dump log (DMP):      FAIL"));
        assert!(report.contains("/data/exports"));
    }

    #[test]
    fn test_populated_run_reports_success_and_frequencies() {
        let mut analysis = empty_analysis();
        analysis.ecl = CanonicalTable::new(
            vec!["Description".to_string()],
            vec![vec!["E_SENS_FR1".to_string()]],
        );
        analysis.frequencies = vec![ErrorFrequencyEntry {
            code: "1A".to_string(),
            description: "E_SENS_FR1".to_string(),
            frequency: 4,
        }];

        let report = render(&analysis);
        assert!(report.contains("Error listing (ECL): SUCCESS - 1 rows"));
        assert!(report.contains("ERROR FREQUENCY"));
        assert!(report.contains("E_SENS_FR1"));
    }

    #[test]
    fn test_outcomes_and_warnings_listed() {
        let mut analysis = empty_analysis();
        analysis.outcomes = vec![
            FileOutcome {
                path: PathBuf::from("a.csv"),
                status: FileStatus::Merged {
                    class: ContentClass::ErrorListing,
                    rows: 3,
                },
            },
            FileOutcome {
                path: PathBuf::from("b.csv"),
                status: FileStatus::Skipped {
                    reason: "no delimited section found in 7 lines".to_string(),
                },
            },
        ];
        analysis.warnings = vec!["'b.csv': no delimited section found".to_string()];

        let report = render(&analysis);
        assert!(report.contains("MERGED  [ECL]"));
        assert!(report.contains("SKIPPED (no delimited section found in 7 lines)"));
        assert!(report.contains("WARNINGS (1)"));
    }

    #[test]
    fn test_event_counts_listed() {
        let mut analysis = empty_analysis();
        analysis.events.insert("FILL_1_VENT_1".to_string(), Vec::new());

        let report = render(&analysis);
        assert!(report.contains("FILL/VENT EVENTS"));
        assert!(report.contains("FILL_1_VENT_1"));
    }
}
