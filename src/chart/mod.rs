//! SVG chart exports for a matching run.
//!
//! Two charts mirror the two pipeline stages:
//!
//! - **best fit**: each training curve with its chosen ideal curve overlaid
//!   in the same color (ideal drawn translucent)
//! - **mapping**: the selected ideal curves plus every test point: assigned
//!   points as filled circles in their curve's color, unassigned points as
//!   black crosses
//!
//! Rendering is file-only; nothing here feeds back into the matching logic.

use std::collections::HashMap;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::{Classification, CurveTable, SelectionRecord};
use crate::error::AppError;

/// Fixed series palette; curves cycle through it in selection order.
pub const SERIES_PALETTE: [RGBColor; 6] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x17, 0xbe, 0xcf),
];

const CHART_SIZE: (u32, u32) = (1024, 768);

/// Color for the i-th selection.
fn series_color(i: usize) -> RGBColor {
    SERIES_PALETTE[i % SERIES_PALETTE.len()]
}

/// Render the best-fit overlay chart.
pub fn write_best_fit_svg(
    path: &Path,
    train: &CurveTable,
    ideal: &CurveTable,
    selections: &[SelectionRecord],
) -> Result<(), AppError> {
    let mut y_values = Vec::new();
    let mut pairs = Vec::new();
    for (i, record) in selections.iter().enumerate() {
        let train_series = train.series(&record.training).ok_or_else(|| {
            AppError::new(4, format!("Training curve '{}' missing from table.", record.training))
        })?;
        let ideal_series = ideal.series(&record.ideal).ok_or_else(|| {
            AppError::new(4, format!("Ideal curve '{}' missing from table.", record.ideal))
        })?;
        y_values.extend_from_slice(&train_series.ys);
        y_values.extend_from_slice(&ideal_series.ys);
        pairs.push((i, record, train_series, ideal_series));
    }

    let (x_min, x_max) = padded_range(train.xs.iter().copied());
    let (y_min, y_max) = padded_range(y_values.iter().copied());

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Best fit functions", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(32)
        .y_label_area_size(48)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .draw()
        .map_err(chart_err)?;

    for (i, record, train_series, ideal_series) in pairs {
        let color = series_color(i);

        let train_points: Vec<(f64, f64)> = train
            .xs
            .iter()
            .copied()
            .zip(train_series.ys.iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(train_points, color.stroke_width(2)))
            .map_err(chart_err)?
            .label(format!("{} (train)", record.training))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        let faded = color.mix(0.45);
        let ideal_points: Vec<(f64, f64)> = ideal
            .xs
            .iter()
            .copied()
            .zip(ideal_series.ys.iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(ideal_points, faded.stroke_width(3)))
            .map_err(chart_err)?
            .label(format!("{} (ideal)", record.ideal))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], faded.stroke_width(3)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Render the test-point mapping chart.
pub fn write_mapping_svg(
    path: &Path,
    ideal: &CurveTable,
    selections: &[SelectionRecord],
    classification: &Classification,
) -> Result<(), AppError> {
    // Color each selected ideal by its first occurrence in selections order;
    // duplicates (two training curves choosing one ideal) share a color.
    let mut colors: HashMap<&str, RGBColor> = HashMap::new();
    let mut curves: Vec<(&str, &crate::domain::Series, RGBColor)> = Vec::new();
    for (i, record) in selections.iter().enumerate() {
        if colors.contains_key(record.ideal.as_str()) {
            continue;
        }
        let series = ideal.series(&record.ideal).ok_or_else(|| {
            AppError::new(4, format!("Ideal curve '{}' missing from table.", record.ideal))
        })?;
        let color = series_color(i);
        colors.insert(record.ideal.as_str(), color);
        curves.push((record.ideal.as_str(), series, color));
    }

    let mut y_values: Vec<f64> = Vec::new();
    for (_, series, _) in &curves {
        y_values.extend_from_slice(&series.ys);
    }
    y_values.extend(classification.assigned.values().flatten().map(|a| a.y));
    y_values.extend(classification.unassigned.iter().map(|o| o.y));

    let mut x_values: Vec<f64> = ideal.xs.clone();
    x_values.extend(classification.unassigned.iter().map(|o| o.x));

    let (x_min, x_max) = padded_range(x_values.iter().copied());
    let (y_min, y_max) = padded_range(y_values.iter().copied());

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Test point mapping", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(32)
        .y_label_area_size(48)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .draw()
        .map_err(chart_err)?;

    for (name, series, color) in &curves {
        let faded = color.mix(0.4);
        let points: Vec<(f64, f64)> = ideal
            .xs
            .iter()
            .copied()
            .zip(series.ys.iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(points, faded.stroke_width(2)))
            .map_err(chart_err)?
            .label((*name).to_string())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], faded.stroke_width(2)));
    }

    for (ideal_name, bucket) in &classification.assigned {
        let color = colors.get(ideal_name.as_str()).copied().unwrap_or(BLACK);
        chart
            .draw_series(
                bucket
                    .iter()
                    .map(|a| Circle::new((a.x, a.y), 3, color.filled())),
            )
            .map_err(chart_err)?
            .label(format!("{ideal_name} (assigned)"))
            .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled()));
    }

    if !classification.unassigned.is_empty() {
        chart
            .draw_series(
                classification
                    .unassigned
                    .iter()
                    .map(|o| Cross::new((o.x, o.y), 4, BLACK.stroke_width(1))),
            )
            .map_err(chart_err)?
            .label("unassigned")
            .legend(|(x, y)| Cross::new((x + 10, y), 4, BLACK.stroke_width(1)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Pad a value range by 5% on each side; degenerate input falls back to a
/// unit range so the axes stay drawable.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if (max - min).abs() < 1e-12 {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn chart_err(e: impl std::fmt::Display) -> AppError {
    AppError::new(4, format!("Chart rendering failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_pads_both_sides() {
        let (lo, hi) = padded_range([0.0, 10.0].into_iter());
        assert!(lo < 0.0 && hi > 10.0);
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = padded_range([2.0].into_iter());
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(series_color(0), series_color(SERIES_PALETTE.len()));
    }
}
