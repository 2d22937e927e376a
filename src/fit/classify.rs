//! Test point classification against the selected ideal curves.
//!
//! Every test observation is checked independently against the curves chosen
//! by best-fit selection (not the full catalog). The observation is assigned
//! to the closest curve whose deviation stays within `MAX_DEVIATION`;
//! otherwise it joins the unassigned set.
//!
//! Classification rules:
//! 1. Candidates are scanned in selections order with a strict `<`
//!    comparison, so the first candidate at a given deviation wins ties
//!    (same policy as best-fit selection).
//! 2. A deviation above `MAX_DEVIATION` is never admitted, even when it is
//!    the minimum among candidates.
//! 3. A candidate with no sample at the observation's x is skipped for that
//!    observation and recorded as a `MissedSample` (recoverable, not fatal).
//! 4. Assignments plus unassigned observations partition the input exactly:
//!    no observation is dropped or duplicated.

use std::collections::BTreeMap;

use crate::domain::{Assignment, Classification, CurveTable, MissedSample, Observation, SelectionRecord, Series};
use crate::error::AppError;

/// Acceptance radius around a candidate curve's value at a given x.
///
/// Fixed by design, not configurable.
pub const MAX_DEVIATION: f64 = std::f64::consts::SQRT_2;

/// Assign each test observation to the nearest selected ideal curve within
/// tolerance, or to the unassigned set.
///
/// Empty `test_points` yields empty outputs; empty `selections` sends every
/// observation to the unassigned set. A selection naming a curve that is
/// absent from the candidate table is a wiring error and aborts the call.
pub fn classify(
    test_points: &[Observation],
    candidates: &CurveTable,
    selections: &[SelectionRecord],
) -> Result<Classification, AppError> {
    let selected = resolve_selections(candidates, selections)?;
    let index = candidates.sample_index();

    let mut assigned: BTreeMap<String, Vec<Assignment>> = BTreeMap::new();
    let mut unassigned = Vec::new();
    let mut missed = Vec::new();

    for obs in test_points {
        let mut best: Option<(&Series, f64)> = None;

        for &series in &selected {
            let Some(pos) = index.position(obs.x) else {
                missed.push(MissedSample {
                    x: obs.x,
                    ideal: series.name.clone(),
                });
                continue;
            };
            let Some(&y_ref) = series.ys.get(pos) else {
                return Err(AppError::new(
                    4,
                    format!(
                        "Ideal '{}' has {} samples but the x column has {}.",
                        series.name,
                        series.ys.len(),
                        candidates.xs.len()
                    ),
                ));
            };

            let deviation = (obs.y - y_ref).abs();
            if deviation > MAX_DEVIATION {
                continue;
            }

            // Strict `<`: the first candidate at a given deviation stays chosen.
            match best {
                Some((_, best_dev)) if deviation >= best_dev => {}
                _ => best = Some((series, deviation)),
            }
        }

        match best {
            Some((series, deviation)) => assigned
                .entry(series.name.clone())
                .or_default()
                .push(Assignment {
                    x: obs.x,
                    y: obs.y,
                    deviation,
                    ideal: series.name.clone(),
                }),
            None => unassigned.push(*obs),
        }
    }

    Ok(Classification {
        assigned,
        unassigned,
        missed,
    })
}

/// Resolve each selected ideal name to its series, in selections order.
///
/// Two training curves may legitimately select the same ideal; the duplicate
/// is scanned twice, which the strict `<` comparison makes harmless.
fn resolve_selections<'a>(
    candidates: &'a CurveTable,
    selections: &[SelectionRecord],
) -> Result<Vec<&'a Series>, AppError> {
    let mut selected = Vec::with_capacity(selections.len());
    for record in selections {
        let series = candidates.series(&record.ideal).ok_or_else(|| {
            AppError::new(
                4,
                format!("Selected ideal '{}' is not present in the candidate table.", record.ideal),
            )
        })?;
        selected.push(series);
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(xs: &[f64], columns: &[(&str, &[f64])]) -> CurveTable {
        CurveTable {
            xs: xs.to_vec(),
            series: columns
                .iter()
                .map(|(name, ys)| Series {
                    name: (*name).to_string(),
                    ys: ys.to_vec(),
                })
                .collect(),
        }
    }

    fn selection(training: &str, ideal: &str) -> SelectionRecord {
        SelectionRecord {
            training: training.to_string(),
            ideal: ideal.to_string(),
            sum_squared_error: 0.0,
        }
    }

    fn points(pairs: &[(f64, f64)]) -> Vec<Observation> {
        pairs.iter().map(|&(x, y)| Observation { x, y }).collect()
    }

    #[test]
    fn all_points_on_curve_are_assigned_with_zero_deviation() {
        let candidates = table(&[1.0, 2.0, 3.0], &[("y1", &[4.0, 5.0, 6.0])]);
        let test = points(&[(1.0, 4.0), (2.0, 5.0), (3.0, 6.0)]);

        let out = classify(&test, &candidates, &[selection("y1", "y1")]).unwrap();

        assert_eq!(out.assigned_count(), 3);
        assert!(out.unassigned.is_empty());
        let bucket = &out.assigned["y1"];
        assert_eq!(bucket.len(), 3);
        assert!(bucket.iter().all(|a| a.deviation == 0.0));
        // Bucket keeps observation order.
        assert_eq!(bucket[0].x, 1.0);
        assert_eq!(bucket[2].x, 3.0);
    }

    #[test]
    fn point_off_grid_becomes_unassigned_and_is_recorded() {
        // Grid only covers x in {1, 2}; the x=3 point cannot be looked up.
        let candidates = table(&[1.0, 2.0], &[("y1", &[4.0, 5.0])]);
        let test = points(&[(1.0, 4.0), (2.0, 5.0), (3.0, 6.0)]);

        let out = classify(&test, &candidates, &[selection("y1", "y1")]).unwrap();

        assert_eq!(out.assigned_count(), 2);
        assert_eq!(out.unassigned, vec![Observation { x: 3.0, y: 6.0 }]);
        assert_eq!(out.missed.len(), 1);
        assert_eq!(out.missed[0].x, 3.0);
        assert_eq!(out.missed[0].ideal, "y1");
    }

    #[test]
    fn inadmissible_candidate_does_not_block_a_later_admissible_one() {
        let candidates = table(&[1.0, 7.0], &[("a", &[0.0, 10.0]), ("b", &[0.0, 6.5])]);
        let test = points(&[(7.0, 6.0)]);

        let out = classify(
            &test,
            &candidates,
            &[selection("t1", "a"), selection("t2", "b")],
        )
        .unwrap();

        // "a" is 4.0 away (outside the bound), "b" is 0.5 away.
        assert_eq!(out.assigned_count(), 1);
        assert_eq!(out.assigned["b"][0].deviation, 0.5);
        assert!(out.unassigned.is_empty());
    }

    #[test]
    fn off_grid_x_records_one_miss_per_selected_candidate() {
        let candidates = table(&[1.0], &[("a", &[0.0]), ("b", &[1.0])]);
        let test = points(&[(7.0, 0.5)]);

        let out = classify(
            &test,
            &candidates,
            &[selection("t1", "a"), selection("t2", "b")],
        )
        .unwrap();

        assert_eq!(out.unassigned.len(), 1);
        assert_eq!(out.missed.len(), 2);
        assert_eq!(out.missed[0].ideal, "a");
        assert_eq!(out.missed[1].ideal, "b");
    }

    #[test]
    fn deviation_above_bound_is_never_admitted() {
        let candidates = table(&[0.0], &[("y1", &[0.0])]);
        // 1.5 > sqrt(2): inadmissible even though it is the minimum.
        let test = points(&[(0.0, 1.5)]);

        let out = classify(&test, &candidates, &[selection("t", "y1")]).unwrap();
        assert_eq!(out.assigned_count(), 0);
        assert_eq!(out.unassigned.len(), 1);
    }

    #[test]
    fn deviation_exactly_at_bound_is_admitted() {
        let candidates = table(&[0.0], &[("y1", &[0.0])]);
        let test = points(&[(0.0, MAX_DEVIATION)]);

        let out = classify(&test, &candidates, &[selection("t", "y1")]).unwrap();
        assert_eq!(out.assigned_count(), 1);
        assert!(out.assigned["y1"][0].deviation <= MAX_DEVIATION);
    }

    #[test]
    fn first_selection_wins_ties() {
        // Both curves sit exactly 0.5 away from the test point.
        let candidates = table(&[0.0], &[("a", &[0.5]), ("b", &[1.5])]);
        let test = points(&[(0.0, 1.0)]);

        let out = classify(
            &test,
            &candidates,
            &[selection("t1", "a"), selection("t2", "b")],
        )
        .unwrap();
        assert_eq!(out.assigned_count(), 1);
        assert!(out.assigned.contains_key("a"));
        assert!(!out.assigned.contains_key("b"));
    }

    #[test]
    fn assignments_and_unassigned_partition_the_test_set() {
        let candidates = table(
            &[0.0, 1.0, 2.0, 3.0],
            &[("a", &[0.0, 1.0, 2.0, 3.0]), ("b", &[5.0, 5.0, 5.0, 5.0])],
        );
        let test = points(&[
            (0.0, 0.3),  // close to a
            (1.0, 5.2),  // close to b
            (2.0, 9.0),  // far from both
            (2.5, 2.5),  // off-grid
            (3.0, 3.0),  // exactly on a
        ]);

        let out = classify(
            &test,
            &candidates,
            &[selection("t1", "a"), selection("t2", "b")],
        )
        .unwrap();

        assert_eq!(out.assigned_count() + out.unassigned.len(), test.len());

        // No (x, y) pair appears in both sets.
        let assigned_pairs: Vec<(f64, f64)> = out
            .assigned
            .values()
            .flatten()
            .map(|a| (a.x, a.y))
            .collect();
        for obs in &out.unassigned {
            assert!(!assigned_pairs.contains(&(obs.x, obs.y)));
        }
    }

    #[test]
    fn empty_test_set_yields_empty_outputs() {
        let candidates = table(&[0.0], &[("y1", &[0.0])]);
        let out = classify(&[], &candidates, &[selection("t", "y1")]).unwrap();
        assert!(out.assigned.is_empty());
        assert!(out.unassigned.is_empty());
    }

    #[test]
    fn empty_selections_leave_everything_unassigned() {
        let candidates = table(&[0.0], &[("y1", &[0.0])]);
        let test = points(&[(0.0, 0.0), (0.0, 1.0)]);

        let out = classify(&test, &candidates, &[]).unwrap();
        assert!(out.assigned.is_empty());
        assert_eq!(out.unassigned.len(), 2);
    }

    #[test]
    fn unknown_selection_name_is_a_wiring_error() {
        let candidates = table(&[0.0], &[("y1", &[0.0])]);
        let err = classify(&[], &candidates, &[selection("t", "nope")]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn bucket_only_exists_when_it_received_an_assignment() {
        let candidates = table(&[0.0], &[("a", &[0.0]), ("b", &[100.0])]);
        let test = points(&[(0.0, 0.1)]);

        let out = classify(
            &test,
            &candidates,
            &[selection("t1", "a"), selection("t2", "b")],
        )
        .unwrap();
        assert!(out.assigned.contains_key("a"));
        assert!(!out.assigned.contains_key("b"));
    }
}
