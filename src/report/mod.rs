//! Reporting utilities: formatted terminal output for a matching run.
//!
//! We keep formatting code in one place so:
//! - the matching code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use chrono::NaiveDate;

use crate::domain::{Classification, SelectionRecord};
use crate::error::AppError;
use crate::io::ingest::{IngestedPoints, IngestedTable, RowError};

/// Format the run header (dataset sizes + run date).
pub fn format_run_summary(
    train: &IngestedTable,
    ideal: &IngestedTable,
    test: &IngestedPoints,
    run_date: NaiveDate,
) -> String {
    let mut out = String::new();

    out.push_str("=== cmatch - Curve Matching ===\n");
    out.push_str(&format!("Run date: {run_date}\n"));
    out.push_str(&format!(
        "Training: {} curves x {} samples ({} rows read, {} used)\n",
        train.table.n_series(),
        train.table.n_samples(),
        train.rows_read,
        train.rows_used,
    ));
    out.push_str(&format!(
        "Ideal   : {} curves x {} samples ({} rows read, {} used)\n",
        ideal.table.n_series(),
        ideal.table.n_samples(),
        ideal.rows_read,
        ideal.rows_used,
    ));
    out.push_str(&format!(
        "Test    : {} points ({} rows read, {} used)\n",
        test.points.len(),
        test.rows_read,
        test.rows_used,
    ));

    out
}

/// Format the selection table: one row per training curve.
pub fn format_selection_table(selections: &[SelectionRecord]) -> String {
    let mut out = String::new();

    out.push_str("Best-fit selections:\n");
    out.push_str(&format!(
        "{:<12} {:<12} {:>18}\n",
        "training", "ideal", "sum_squared_error"
    ));
    out.push_str(&format!("{:-<12} {:-<12} {:-<18}\n", "", "", ""));

    for record in selections {
        out.push_str(&format!(
            "{:<12} {:<12} {:>18.6}\n",
            truncate(&record.training, 12),
            truncate(&record.ideal, 12),
            record.sum_squared_error,
        ));
    }

    out
}

/// Format the classification outcome: per-bucket counts plus detail rows.
///
/// Detail tables are truncated to `top_n` rows per bucket; the counts always
/// cover everything.
pub fn format_classification(classification: &Classification, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str("Assignments per ideal curve:\n");
    if classification.assigned.is_empty() {
        out.push_str("  (none)\n");
    }
    for (ideal, bucket) in &classification.assigned {
        let max_dev = bucket.iter().map(|a| a.deviation).fold(0.0, f64::max);
        out.push_str(&format!(
            "- {} : {} points (max deviation {:.4})\n",
            ideal,
            bucket.len(),
            max_dev
        ));

        for assignment in bucket.iter().take(top_n) {
            out.push_str(&format!(
                "    x={:>10.4} y={:>10.4} deviation={:>8.4}\n",
                assignment.x, assignment.y, assignment.deviation
            ));
        }
        if bucket.len() > top_n {
            out.push_str(&format!("    ... {} more\n", bucket.len() - top_n));
        }
    }

    out.push_str(&format!("\nUnassigned: {} points\n", classification.unassigned.len()));
    for obs in classification.unassigned.iter().take(top_n) {
        out.push_str(&format!("    x={:>10.4} y={:>10.4}\n", obs.x, obs.y));
    }
    if classification.unassigned.len() > top_n {
        out.push_str(&format!(
            "    ... {} more\n",
            classification.unassigned.len() - top_n
        ));
    }

    if !classification.missed.is_empty() {
        out.push_str(&format!(
            "\nSkipped lookups (no sample at x): {}\n",
            classification.missed.len()
        ));
    }

    out
}

/// Format ingest row errors for stderr.
pub fn format_row_errors(label: &str, errors: &[RowError]) -> String {
    let mut out = String::new();
    for e in errors {
        out.push_str(&format!("warning: {label} CSV line {}: {}\n", e.line, e.message));
    }
    out
}

/// Sanity check the partition invariant before reporting.
///
/// Every test observation must land in exactly one output set; a count
/// mismatch here means a classifier bug, so surface it loudly rather than
/// printing misleading tables.
pub fn check_partition(classification: &Classification, test_count: usize) -> Result<(), AppError> {
    let total = classification.assigned_count() + classification.unassigned.len();
    if total != test_count {
        return Err(AppError::new(
            4,
            format!("Partition violation: {total} classified points vs {test_count} test points."),
        ));
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Assignment, Observation};
    use std::collections::BTreeMap;

    fn classification() -> Classification {
        let mut assigned = BTreeMap::new();
        assigned.insert(
            "y3".to_string(),
            vec![
                Assignment { x: 1.0, y: 4.0, deviation: 0.1, ideal: "y3".to_string() },
                Assignment { x: 2.0, y: 5.0, deviation: 0.7, ideal: "y3".to_string() },
            ],
        );
        Classification {
            assigned,
            unassigned: vec![Observation { x: 3.0, y: 9.0 }],
            missed: vec![],
        }
    }

    #[test]
    fn selection_table_lists_each_record() {
        let selections = vec![
            SelectionRecord {
                training: "y1".to_string(),
                ideal: "y17".to_string(),
                sum_squared_error: 0.04,
            },
            SelectionRecord {
                training: "y2".to_string(),
                ideal: "y5".to_string(),
                sum_squared_error: 1.25,
            },
        ];

        let table = format_selection_table(&selections);
        assert!(table.contains("y17"));
        assert!(table.contains("y5"));
        assert!(table.lines().count() >= 4);
    }

    #[test]
    fn classification_report_shows_counts_and_truncation() {
        let report = format_classification(&classification(), 1);
        assert!(report.contains("y3 : 2 points"));
        assert!(report.contains("... 1 more"));
        assert!(report.contains("Unassigned: 1 points"));
    }

    #[test]
    fn check_partition_accepts_exact_cover() {
        assert!(check_partition(&classification(), 3).is_ok());
    }

    #[test]
    fn check_partition_rejects_mismatch() {
        let err = check_partition(&classification(), 5).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
