//! Write run summary JSON files.
//!
//! The summary JSON is the "portable" representation of a full matching run:
//! - dataset sizes
//! - the selection table (training curve → chosen ideal + error)
//! - assignment buckets and the unassigned list
//! - run metadata (tool name, run date)

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Assignment, Classification, Observation, SelectionRecord};
use crate::error::AppError;

/// Schema of the run summary JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryFile {
    pub tool: String,
    pub run_date: NaiveDate,

    pub training_curves: usize,
    pub ideal_curves: usize,
    pub test_points: usize,

    pub selections: Vec<SelectionRecord>,
    pub assigned: BTreeMap<String, Vec<Assignment>>,
    pub unassigned: Vec<Observation>,
    pub missed_samples: usize,
}

/// Write a run summary JSON file.
pub fn write_summary_json(
    path: &Path,
    selections: &[SelectionRecord],
    classification: &Classification,
    training_curves: usize,
    ideal_curves: usize,
    test_points: usize,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display()))
    })?;

    let summary = SummaryFile {
        tool: "cmatch".to_string(),
        run_date: chrono::Local::now().date_naive(),
        training_curves,
        ideal_curves,
        test_points,
        selections: selections.to_vec(),
        assigned: classification.assigned.clone(),
        unassigned: classification.unassigned.clone(),
        missed_samples: classification.missed.len(),
    };

    serde_json::to_writer_pretty(file, &summary)
        .map_err(|e| AppError::new(4, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}
