//! CSV ingest and normalization.
//!
//! This module turns the three input CSVs (training, ideal, test) into clean
//! in-memory tables that are safe to match.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (column order preserved, no hidden state)
//! - **Separation of concerns**: no matching logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{CurveTable, Observation, Series};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output for a curve table: data + row errors + counters.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: CurveTable,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Ingest output for the test dataset.
#[derive(Debug, Clone)]
pub struct IngestedPoints {
    pub points: Vec<Observation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a curve table CSV (shared `x` column + one or more y columns).
///
/// `label` names the dataset in error messages ("training", "ideal").
pub fn read_curve_table(path: &Path, label: &str) -> Result<IngestedTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open {label} CSV '{}': {e}", path.display()))
    })?;
    parse_curve_table(file, label)
}

/// Parse a curve table from any reader. Split out from [`read_curve_table`]
/// so tests can feed byte slices instead of temp files.
pub fn parse_curve_table(rdr: impl Read, label: &str) -> Result<IngestedTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read {label} CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);

    let Some(&x_idx) = header_map.get("x") else {
        return Err(AppError::new(2, format!("{label} CSV is missing the required `x` column.")));
    };

    // Every non-x column is a named curve, kept in header order.
    let mut y_columns: Vec<(String, usize)> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        let name = normalize_header_name(name);
        if idx != x_idx && !name.is_empty() {
            y_columns.push((name, idx));
        }
    }
    if y_columns.is_empty() {
        return Err(AppError::new(
            2,
            format!("{label} CSV needs at least one y column besides `x`."),
        ));
    }

    let mut xs = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); y_columns.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header row and CSV line
        // numbers are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_curve_row(&record, x_idx, &y_columns) {
            Ok((x, ys)) => {
                xs.push(x);
                for (col, y) in columns.iter_mut().zip(ys) {
                    col.push(y);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = xs.len();
    if rows_used == 0 {
        return Err(AppError::new(3, format!("{label} CSV has no usable data rows.")));
    }

    let series = y_columns
        .into_iter()
        .zip(columns)
        .map(|((name, _), ys)| Series { name, ys })
        .collect();

    Ok(IngestedTable {
        table: CurveTable { xs, series },
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Load the test dataset CSV (`x`, `y` columns).
pub fn read_test_points(path: &Path) -> Result<IngestedPoints, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open test CSV '{}': {e}", path.display()))
    })?;
    parse_test_points(file)
}

/// Parse the test dataset from any reader.
pub fn parse_test_points(rdr: impl Read) -> Result<IngestedPoints, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read test CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);

    let Some(&x_idx) = header_map.get("x") else {
        return Err(AppError::new(2, "test CSV is missing the required `x` column."));
    };
    let Some(&y_idx) = header_map.get("y") else {
        return Err(AppError::new(2, "test CSV is missing the required `y` column."));
    };

    let mut points = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let x = parse_f64(&record, x_idx, "x");
        let y = parse_f64(&record, y_idx, "y");
        match (x, y) {
            (Ok(x), Ok(y)) => points.push(Observation { x, y }),
            (Err(message), _) | (_, Err(message)) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = points.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "test CSV has no usable data rows."));
    }

    Ok(IngestedPoints {
        points,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn parse_curve_row(
    record: &StringRecord,
    x_idx: usize,
    y_columns: &[(String, usize)],
) -> Result<(f64, Vec<f64>), String> {
    let x = parse_f64(record, x_idx, "x")?;

    let mut ys = Vec::with_capacity(y_columns.len());
    for (name, idx) in y_columns {
        ys.push(parse_f64(record, *idx, name)?);
    }
    Ok((x, ys))
}

fn parse_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` value."))?;

    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `{name}` value '{raw}'."));
    }
    Ok(v)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿x"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}
