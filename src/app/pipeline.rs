//! Shared "matching pipeline" logic used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> best-fit selection -> test point classification
//!
//! The CLI can then focus on presentation (printing, exports, charts).

use crate::domain::{Classification, RunConfig, SelectionRecord};
use crate::error::AppError;
use crate::io::ingest::{read_curve_table, read_test_points, IngestedPoints, IngestedTable};

/// All computed outputs of a single `cmatch run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub train: IngestedTable,
    pub ideal: IngestedTable,
    pub test: IngestedPoints,
    pub selections: Vec<SelectionRecord>,
    pub classification: Classification,
}

/// Execute the full matching pipeline and return the computed outputs.
pub fn run_match(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Ingest the three datasets.
    let train = read_curve_table(&config.train_path, "training")?;
    let ideal = read_curve_table(&config.ideal_path, "ideal")?;
    let test = read_test_points(&config.test_path)?;

    // 2) Match each training curve to its least-squares-best ideal curve.
    let selections = crate::fit::selection::select_best_fits(&train.table, &ideal.table)?;

    // 3) Classify test observations against the selected curves.
    let classification =
        crate::fit::classify::classify(&test.points, &ideal.table, &selections)?;

    crate::report::check_partition(&classification, test.points.len())?;

    Ok(RunOutput {
        train,
        ideal,
        test,
        selections,
        classification,
    })
}
