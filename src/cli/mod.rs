//! Command-line parsing for the curve matcher.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the matching/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cmatch", version, about = "Least-squares curve matching and test point classification")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: select best fits, classify test points, report,
    /// and optionally export results/charts.
    Run(RunArgs),
    /// Run best-fit selection only and print the selection table.
    Select(SelectArgs),
    /// Generate seeded synthetic training/ideal/test CSVs.
    Sample(SampleArgs),
}

/// Options for the full matching pipeline.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Training curves CSV (shared `x` column + one y column per curve).
    #[arg(long)]
    pub train: PathBuf,

    /// Ideal/candidate curves CSV (same x grid as the training CSV).
    #[arg(long)]
    pub ideal: PathBuf,

    /// Test observations CSV (`x`, `y` columns).
    #[arg(long)]
    pub test: PathBuf,

    /// Maximum detail rows printed per table.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export the selection table to CSV.
    #[arg(long = "export-selections")]
    pub export_selections: Option<PathBuf>,

    /// Export the assignment table to CSV.
    #[arg(long = "export-assignments")]
    pub export_assignments: Option<PathBuf>,

    /// Export the unassigned observations to CSV.
    #[arg(long = "export-unassigned")]
    pub export_unassigned: Option<PathBuf>,

    /// Export the full run summary to JSON.
    #[arg(long = "export-summary")]
    pub export_summary: Option<PathBuf>,

    /// Write best-fit and mapping SVG charts into this directory.
    #[arg(long = "chart-dir")]
    pub chart_dir: Option<PathBuf>,
}

/// Options for selection-only runs.
#[derive(Debug, Parser)]
pub struct SelectArgs {
    /// Training curves CSV.
    #[arg(long)]
    pub train: PathBuf,

    /// Ideal/candidate curves CSV.
    #[arg(long)]
    pub ideal: PathBuf,

    /// Export the selection table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for synthetic dataset generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output directory for train.csv / ideal.csv / test.csv.
    #[arg(long, default_value = "data")]
    pub out_dir: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of training curves.
    #[arg(long = "train-count", default_value_t = 4)]
    pub train_count: usize,

    /// Number of ideal curves in the catalog.
    #[arg(long = "ideal-count", default_value_t = 50)]
    pub ideal_count: usize,

    /// Number of samples on the shared x grid.
    #[arg(long = "grid-points", default_value_t = 400)]
    pub grid_points: usize,

    /// Number of test observations.
    #[arg(long = "test-count", default_value_t = 100)]
    pub test_count: usize,

    /// Std dev of the Gaussian noise applied to training curves.
    #[arg(long, default_value_t = 0.3)]
    pub noise: f64,
}
