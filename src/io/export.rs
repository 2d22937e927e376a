//! Export matching results and datasets to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; values are written with Rust's shortest round-trip float
//! formatting so re-ingesting them is lossless.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Classification, CurveTable, Observation, SelectionRecord};
use crate::error::AppError;

/// Write the selection table: one row per training curve.
pub fn write_selections_csv(path: &Path, selections: &[SelectionRecord]) -> Result<(), AppError> {
    let mut file = create(path, "selections CSV")?;

    writeln!(file, "training,ideal,sum_squared_error")
        .map_err(|e| AppError::new(4, format!("Failed to write selections CSV header: {e}")))?;

    for record in selections {
        writeln!(
            file,
            "{},{},{}",
            record.training, record.ideal, record.sum_squared_error
        )
        .map_err(|e| AppError::new(4, format!("Failed to write selections CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the assignment table: buckets flattened to one row per assigned point.
pub fn write_assignments_csv(path: &Path, classification: &Classification) -> Result<(), AppError> {
    let mut file = create(path, "assignments CSV")?;

    writeln!(file, "x,y,deviation,ideal")
        .map_err(|e| AppError::new(4, format!("Failed to write assignments CSV header: {e}")))?;

    for assignment in classification.assigned.values().flatten() {
        writeln!(
            file,
            "{},{},{},{}",
            assignment.x, assignment.y, assignment.deviation, assignment.ideal
        )
        .map_err(|e| AppError::new(4, format!("Failed to write assignments CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the unassigned observations, in original test order.
pub fn write_unassigned_csv(path: &Path, unassigned: &[Observation]) -> Result<(), AppError> {
    let mut file = create(path, "unassigned CSV")?;

    writeln!(file, "x,y")
        .map_err(|e| AppError::new(4, format!("Failed to write unassigned CSV header: {e}")))?;

    for obs in unassigned {
        writeln!(file, "{},{}", obs.x, obs.y)
            .map_err(|e| AppError::new(4, format!("Failed to write unassigned CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a curve table back out as CSV (used by the sample generator).
pub fn write_curve_table_csv(path: &Path, table: &CurveTable) -> Result<(), AppError> {
    let mut file = create(path, "curve CSV")?;

    let mut header = String::from("x");
    for series in &table.series {
        header.push(',');
        header.push_str(&series.name);
    }
    writeln!(file, "{header}")
        .map_err(|e| AppError::new(4, format!("Failed to write curve CSV header: {e}")))?;

    for (i, &x) in table.xs.iter().enumerate() {
        let mut row = format!("{x}");
        for series in &table.series {
            row.push(',');
            row.push_str(&series.ys[i].to_string());
        }
        writeln!(file, "{row}")
            .map_err(|e| AppError::new(4, format!("Failed to write curve CSV row: {e}")))?;
    }

    Ok(())
}

/// Write test observations as CSV (used by the sample generator).
pub fn write_test_points_csv(path: &Path, points: &[Observation]) -> Result<(), AppError> {
    let mut file = create(path, "test CSV")?;

    writeln!(file, "x,y")
        .map_err(|e| AppError::new(4, format!("Failed to write test CSV header: {e}")))?;

    for obs in points {
        writeln!(file, "{},{}", obs.x, obs.y)
            .map_err(|e| AppError::new(4, format!("Failed to write test CSV row: {e}")))?;
    }

    Ok(())
}

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create {what} '{}': {e}", path.display())))
}
