//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during selection and classification
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One named y column, aligned positionally to its table's x column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub ys: Vec<f64>,
}

/// A column-oriented curve dataset: a shared x column plus one or more named
/// y-series, kept in source column order.
///
/// Training and ideal tables are expected to share the same x grid. That is a
/// caller precondition; we only validate as far as the matching operations
/// require (length checks, exact-x lookups).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveTable {
    pub xs: Vec<f64>,
    pub series: Vec<Series>,
}

impl CurveTable {
    /// Number of samples per curve (length of the x column).
    pub fn n_samples(&self) -> usize {
        self.xs.len()
    }

    /// Number of named curves in the table.
    pub fn n_series(&self) -> usize {
        self.series.len()
    }

    /// Look up a series by name.
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Build an exact-x lookup over this table's x column.
    pub fn sample_index(&self) -> SampleIndex {
        SampleIndex::build(&self.xs)
    }
}

/// Quantization grid for x-value keys (1e-6).
///
/// Two x values that agree to within half a quantum map to the same key, so
/// lookups survive the tiny representation noise that CSV round-trips and
/// arithmetic introduce. Raw f64 equality would not.
const X_KEY_SCALE: f64 = 1e6;

fn x_key(x: f64) -> i64 {
    (x * X_KEY_SCALE).round() as i64
}

/// Maps an x value to its sample position via a quantized integer key.
#[derive(Debug, Clone)]
pub struct SampleIndex {
    positions: HashMap<i64, usize>,
}

impl SampleIndex {
    pub fn build(xs: &[f64]) -> Self {
        let positions = xs.iter().enumerate().map(|(i, &x)| (x_key(x), i)).collect();
        Self { positions }
    }

    /// Position of the sample at `x`, or `None` if the grid has no such x.
    pub fn position(&self, x: f64) -> Option<usize> {
        self.positions.get(&x_key(x)).copied()
    }
}

/// The chosen ideal curve for one training curve.
///
/// Produced once by best-fit selection, immutable afterward, consumed by the
/// point classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub training: String,
    pub ideal: String,
    pub sum_squared_error: f64,
}

/// One test data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
}

/// A test point bound to the ideal curve it sits closest to, within tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub x: f64,
    pub y: f64,
    pub deviation: f64,
    pub ideal: String,
}

/// A skipped exact-x lookup: the named ideal curve had no sample at `x`.
///
/// Recoverable data quality condition, recorded and reported rather than
/// raised as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedSample {
    pub x: f64,
    pub ideal: String,
}

/// Classifier output.
///
/// `assigned` and `unassigned` together partition the input test set: every
/// observation lands in exactly one of the two. Buckets exist only for ideal
/// curves that received at least one assignment; within a bucket, assignments
/// keep the original observation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub assigned: BTreeMap<String, Vec<Assignment>>,
    pub unassigned: Vec<Observation>,
    pub missed: Vec<MissedSample>,
}

impl Classification {
    /// Total number of assigned test points across all buckets.
    pub fn assigned_count(&self) -> usize {
        self.assigned.values().map(Vec::len).sum()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub train_path: PathBuf,
    pub ideal_path: PathBuf,
    pub test_path: PathBuf,

    /// Table truncation for terminal output.
    pub top_n: usize,

    pub export_selections: Option<PathBuf>,
    pub export_assignments: Option<PathBuf>,
    pub export_unassigned: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,

    /// Directory for the best-fit and mapping SVG charts.
    pub chart_dir: Option<PathBuf>,
}

/// Configuration for synthetic dataset generation.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub out_dir: PathBuf,
    pub seed: u64,
    pub train_count: usize,
    pub ideal_count: usize,
    pub grid_points: usize,
    pub test_count: usize,
    /// Std dev of the Gaussian noise applied to training curves.
    pub noise_sigma: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_index_finds_exact_positions() {
        let xs = vec![-5.0, 0.0, 5.0];
        let index = SampleIndex::build(&xs);
        assert_eq!(index.position(-5.0), Some(0));
        assert_eq!(index.position(0.0), Some(1));
        assert_eq!(index.position(5.0), Some(2));
        assert_eq!(index.position(7.0), None);
    }

    #[test]
    fn sample_index_tolerates_representation_noise() {
        // 0.1 + 0.2 != 0.3 in f64, but both land on the same quantized key.
        let xs = vec![0.3];
        let index = SampleIndex::build(&xs);
        assert_eq!(index.position(0.1 + 0.2), Some(0));
    }

    #[test]
    fn sample_index_distinguishes_neighboring_grid_points() {
        let xs = vec![0.1, 0.2];
        let index = SampleIndex::build(&xs);
        assert_eq!(index.position(0.1), Some(0));
        assert_eq!(index.position(0.2), Some(1));
    }

    #[test]
    fn series_lookup_by_name() {
        let table = CurveTable {
            xs: vec![0.0, 1.0],
            series: vec![
                Series { name: "y1".to_string(), ys: vec![1.0, 2.0] },
                Series { name: "y2".to_string(), ys: vec![3.0, 4.0] },
            ],
        };
        assert_eq!(table.series("y2").map(|s| s.ys[0]), Some(3.0));
        assert!(table.series("y9").is_none());
        assert_eq!(table.n_samples(), 2);
        assert_eq!(table.n_series(), 2);
    }
}
