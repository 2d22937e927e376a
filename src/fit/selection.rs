//! Best-fit selection between training curves and the ideal catalog.
//!
//! For each training curve we scan every candidate curve and keep the one with
//! the minimum sum-of-squared-error over the shared x grid.
//!
//! Selection rules:
//! 1. Training curves are processed in table column order.
//! 2. Candidates are scanned in table column order with a strict `<`
//!    comparison, so the first candidate encountered wins ties. This
//!    tie-break is deliberate and keeps results reproducible.
//! 3. No partial output: a length disagreement anywhere aborts the whole call.

use rayon::prelude::*;

use crate::domain::{CurveTable, SelectionRecord, Series};
use crate::error::AppError;
use crate::math::sum_squared_error;

/// Match every training curve to its least-squares-best candidate.
///
/// Returns one `SelectionRecord` per training curve, in training column order.
/// An empty training or candidate table yields an empty result, not an error.
///
/// The scan for each training curve is independent of the others, so we fan
/// out per training curve; collection restores column order, keeping the
/// output bit-identical to a sequential scan.
pub fn select_best_fits(
    training: &CurveTable,
    candidates: &CurveTable,
) -> Result<Vec<SelectionRecord>, AppError> {
    if training.series.is_empty() || candidates.series.is_empty() {
        return Ok(Vec::new());
    }

    training
        .series
        .par_iter()
        .map(|train| best_candidate_for(train, candidates))
        .collect()
}

/// Scan all candidates for one training curve.
fn best_candidate_for(train: &Series, candidates: &CurveTable) -> Result<SelectionRecord, AppError> {
    let mut best: Option<(&Series, f64)> = None;

    for candidate in &candidates.series {
        let sse = sum_squared_error(&train.ys, &candidate.ys).map_err(|e| {
            AppError::new(
                e.exit_code(),
                format!("Comparing training '{}' vs ideal '{}': {e}", train.name, candidate.name),
            )
        })?;

        // Strict `<`: the first candidate at a given error level stays chosen.
        match best {
            Some((_, best_sse)) if sse >= best_sse => {}
            _ => best = Some((candidate, sse)),
        }
    }

    let Some((candidate, sse)) = best else {
        return Err(AppError::new(4, "No candidate curves to scan."));
    };

    Ok(SelectionRecord {
        training: train.name.clone(),
        ideal: candidate.name.clone(),
        sum_squared_error: sse,
    })
}
