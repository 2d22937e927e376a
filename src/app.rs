//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs ingestion, best-fit selection, and classification
//! - prints reports
//! - writes optional exports and charts

use std::fs::create_dir_all;

use clap::Parser;

use crate::cli::{Command, RunArgs, SampleArgs, SelectArgs};
use crate::domain::{RunConfig, SampleConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cmatch` binary.
pub fn run() -> Result<(), AppError> {
    // We want `cmatch --train a.csv ...` to behave like `cmatch run ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the short UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Select(args) => handle_select(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_match(&config)?;

    print_ingest_warnings(&run);

    let run_date = chrono::Local::now().date_naive();
    println!(
        "{}",
        crate::report::format_run_summary(&run.train, &run.ideal, &run.test, run_date)
    );
    println!("{}", crate::report::format_selection_table(&run.selections));
    println!(
        "{}",
        crate::report::format_classification(&run.classification, config.top_n)
    );

    // Optional exports.
    if let Some(path) = &config.export_selections {
        crate::io::export::write_selections_csv(path, &run.selections)?;
    }
    if let Some(path) = &config.export_assignments {
        crate::io::export::write_assignments_csv(path, &run.classification)?;
    }
    if let Some(path) = &config.export_unassigned {
        crate::io::export::write_unassigned_csv(path, &run.classification.unassigned)?;
    }
    if let Some(path) = &config.export_summary {
        crate::io::summary::write_summary_json(
            path,
            &run.selections,
            &run.classification,
            run.train.table.n_series(),
            run.ideal.table.n_series(),
            run.test.points.len(),
        )?;
    }

    if let Some(dir) = &config.chart_dir {
        create_dir_all(dir)
            .map_err(|e| AppError::new(2, format!("Failed to create chart dir '{}': {e}", dir.display())))?;
        crate::chart::write_best_fit_svg(
            &dir.join("best_fit.svg"),
            &run.train.table,
            &run.ideal.table,
            &run.selections,
        )?;
        crate::chart::write_mapping_svg(
            &dir.join("mapping.svg"),
            &run.ideal.table,
            &run.selections,
            &run.classification,
        )?;
    }

    Ok(())
}

fn handle_select(args: SelectArgs) -> Result<(), AppError> {
    let train = crate::io::ingest::read_curve_table(&args.train, "training")?;
    let ideal = crate::io::ingest::read_curve_table(&args.ideal, "ideal")?;

    eprint!("{}", crate::report::format_row_errors("training", &train.row_errors));
    eprint!("{}", crate::report::format_row_errors("ideal", &ideal.row_errors));

    let selections = crate::fit::selection::select_best_fits(&train.table, &ideal.table)?;
    println!("{}", crate::report::format_selection_table(&selections));

    if let Some(path) = &args.export {
        crate::io::export::write_selections_csv(path, &selections)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args);
    let data = crate::data::sample::generate_datasets(&config)?;

    create_dir_all(&config.out_dir).map_err(|e| {
        AppError::new(2, format!("Failed to create output dir '{}': {e}", config.out_dir.display()))
    })?;

    let train_path = config.out_dir.join("train.csv");
    let ideal_path = config.out_dir.join("ideal.csv");
    let test_path = config.out_dir.join("test.csv");

    crate::io::export::write_curve_table_csv(&train_path, &data.train)?;
    crate::io::export::write_curve_table_csv(&ideal_path, &data.ideal)?;
    crate::io::export::write_test_points_csv(&test_path, &data.test)?;

    println!(
        "Wrote {} training curves, {} ideal curves, {} test points (seed {}) to '{}'.",
        data.train.n_series(),
        data.ideal.n_series(),
        data.test.len(),
        config.seed,
        config.out_dir.display()
    );

    Ok(())
}

fn print_ingest_warnings(run: &pipeline::RunOutput) {
    eprint!("{}", crate::report::format_row_errors("training", &run.train.row_errors));
    eprint!("{}", crate::report::format_row_errors("ideal", &run.ideal.row_errors));
    eprint!("{}", crate::report::format_row_errors("test", &run.test.row_errors));

    for miss in &run.classification.missed {
        eprintln!(
            "warning: ideal '{}' has no sample at x={} (candidate skipped)",
            miss.ideal, miss.x
        );
    }
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        train_path: args.train.clone(),
        ideal_path: args.ideal.clone(),
        test_path: args.test.clone(),
        top_n: args.top,
        export_selections: args.export_selections.clone(),
        export_assignments: args.export_assignments.clone(),
        export_unassigned: args.export_unassigned.clone(),
        export_summary: args.export_summary.clone(),
        chart_dir: args.chart_dir.clone(),
    }
}

pub fn sample_config_from_args(args: &SampleArgs) -> SampleConfig {
    SampleConfig {
        out_dir: args.out_dir.clone(),
        seed: args.seed,
        train_count: args.train_count,
        ideal_count: args.ideal_count,
        grid_points: args.grid_points,
        test_count: args.test_count,
        noise_sigma: args.noise,
    }
}

/// Rewrite argv so `cmatch --train ...` defaults to `cmatch run --train ...`.
///
/// Rules:
/// - `cmatch`                     -> unchanged (clap prints the help text)
/// - `cmatch --train a.csv ...`   -> `cmatch run --train a.csv ...`
/// - `cmatch --help/--version`    -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "select" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_flags_get_the_run_subcommand() {
        let out = rewrite_args(argv(&["cmatch", "--train", "a.csv"]));
        assert_eq!(out, argv(&["cmatch", "run", "--train", "a.csv"]));
    }

    #[test]
    fn explicit_subcommands_pass_through() {
        let out = rewrite_args(argv(&["cmatch", "sample", "--seed", "7"]));
        assert_eq!(out, argv(&["cmatch", "sample", "--seed", "7"]));
    }

    #[test]
    fn help_and_version_pass_through() {
        assert_eq!(rewrite_args(argv(&["cmatch", "--help"])), argv(&["cmatch", "--help"]));
        assert_eq!(rewrite_args(argv(&["cmatch", "-V"])), argv(&["cmatch", "-V"]));
    }
}
