//! Seeded synthetic training/ideal/test dataset generation.
//!
//! The generator produces the three CSV inputs the matching pipeline expects:
//!
//! - an ideal catalog drawn from a fixed family of analytic shapes with
//!   seeded parameter jitter
//! - training curves that are noisy copies of distinct ideal curves
//! - test points scattered around the training curves' underlying ideals,
//!   with a fraction of far outliers so the unassigned set is non-trivial
//!
//! Output is deterministic per seed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CurveTable, Observation, SampleConfig, Series};
use crate::error::AppError;

/// Shared x grid bounds for generated tables.
const X_MIN: f64 = -10.0;
const X_MAX: f64 = 10.0;

/// Std dev of the noise applied to admissible test points.
///
/// Roughly 99.5% of draws stay inside the sqrt(2) acceptance radius, so a
/// generated test set classifies mostly-assigned without being trivial.
const TEST_NOISE_SIGMA: f64 = 0.5;

/// Fraction of test points pushed far off their curve.
const OUTLIER_PROB: f64 = 0.15;

/// Offset range for outlier test points (applied with a random sign).
const OUTLIER_MIN: f64 = 3.0;
const OUTLIER_MAX: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub train: CurveTable,
    pub ideal: CurveTable,
    pub test: Vec<Observation>,
}

/// Generate the three datasets for one seed.
pub fn generate_datasets(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.ideal_count == 0 || config.train_count == 0 {
        return Err(AppError::new(2, "Curve counts must be > 0."));
    }
    if config.train_count > config.ideal_count {
        return Err(AppError::new(
            2,
            "Training curve count cannot exceed the ideal curve count.",
        ));
    }
    if config.grid_points < 2 {
        return Err(AppError::new(2, "Grid must have at least 2 points."));
    }
    if !(config.noise_sigma.is_finite() && config.noise_sigma >= 0.0) {
        return Err(AppError::new(2, "Invalid training noise sigma."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let train_noise = Normal::new(0.0, config.noise_sigma)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let test_noise = Normal::new(0.0, TEST_NOISE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let xs: Vec<f64> = (0..config.grid_points)
        .map(|i| X_MIN + (X_MAX - X_MIN) * i as f64 / (config.grid_points - 1) as f64)
        .collect();

    // Ideal catalog: one analytic shape per curve, parameters jittered.
    let mut ideal_series = Vec::with_capacity(config.ideal_count);
    for k in 0..config.ideal_count {
        let shape = sample_shape(k, &mut rng);
        ideal_series.push(Series {
            name: format!("y{}", k + 1),
            ys: xs.iter().map(|&x| shape.eval(x)).collect(),
        });
    }
    let ideal = CurveTable {
        xs: xs.clone(),
        series: ideal_series,
    };

    // Training curves: noisy copies of distinct ideal curves.
    let chosen = rand::seq::index::sample(&mut rng, config.ideal_count, config.train_count);
    let mut train_series = Vec::with_capacity(config.train_count);
    for (t, ideal_idx) in chosen.iter().enumerate() {
        let ys = ideal.series[ideal_idx]
            .ys
            .iter()
            .map(|&y| y + train_noise.sample(&mut rng))
            .collect();
        train_series.push(Series {
            name: format!("y{}", t + 1),
            ys,
        });
    }
    let train = CurveTable {
        xs: xs.clone(),
        series: train_series,
    };

    // Test points: noise around the chosen ideals, plus far outliers.
    let chosen_indices: Vec<usize> = chosen.iter().collect();
    let mut test = Vec::with_capacity(config.test_count);
    for _ in 0..config.test_count {
        let grid_pos = rng.gen_range(0..config.grid_points);
        let ideal_idx = chosen_indices[rng.gen_range(0..chosen_indices.len())];
        let base = ideal.series[ideal_idx].ys[grid_pos];

        let mut y = base + test_noise.sample(&mut rng);
        if rng.gen_bool(OUTLIER_PROB) {
            let offset = rng.gen_range(OUTLIER_MIN..OUTLIER_MAX);
            y += if rng.gen_bool(0.5) { offset } else { -offset };
        }

        test.push(Observation { x: xs[grid_pos], y });
    }

    Ok(SampleData { train, ideal, test })
}

/// One analytic curve shape with concrete parameters.
enum Shape {
    Linear { a: f64, b: f64 },
    Quadratic { a: f64, b: f64 },
    Cubic { a: f64, b: f64 },
    Sine { amp: f64, freq: f64 },
    Cosine { amp: f64, freq: f64, offset: f64 },
    Bump { amp: f64, width: f64 },
}

impl Shape {
    fn eval(&self, x: f64) -> f64 {
        match *self {
            Shape::Linear { a, b } => a * x + b,
            Shape::Quadratic { a, b } => a * x * x / 10.0 + b,
            Shape::Cubic { a, b } => a * x * x * x / 100.0 + b,
            Shape::Sine { amp, freq } => amp * (freq * x).sin(),
            Shape::Cosine { amp, freq, offset } => amp * (freq * x).cos() + offset,
            Shape::Bump { amp, width } => amp * (-x * x / (2.0 * width * width)).exp(),
        }
    }
}

/// Pick the k-th catalog shape: families rotate, parameters jitter.
fn sample_shape(k: usize, rng: &mut StdRng) -> Shape {
    match k % 6 {
        0 => Shape::Linear {
            a: rng.gen_range(-2.0..2.0),
            b: rng.gen_range(-5.0..5.0),
        },
        1 => Shape::Quadratic {
            a: rng.gen_range(-3.0..3.0),
            b: rng.gen_range(-5.0..5.0),
        },
        2 => Shape::Cubic {
            a: rng.gen_range(-2.0..2.0),
            b: rng.gen_range(-3.0..3.0),
        },
        3 => Shape::Sine {
            amp: rng.gen_range(1.0..6.0),
            freq: rng.gen_range(0.2..1.5),
        },
        4 => Shape::Cosine {
            amp: rng.gen_range(1.0..6.0),
            freq: rng.gen_range(0.2..1.5),
            offset: rng.gen_range(-3.0..3.0),
        },
        _ => Shape::Bump {
            amp: rng.gen_range(2.0..8.0),
            width: rng.gen_range(1.0..4.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(seed: u64) -> SampleConfig {
        SampleConfig {
            out_dir: PathBuf::from("data"),
            seed,
            train_count: 4,
            ideal_count: 50,
            grid_points: 100,
            test_count: 80,
            noise_sigma: 0.3,
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = generate_datasets(&config(7)).unwrap();
        let b = generate_datasets(&config(7)).unwrap();
        assert_eq!(a.train, b.train);
        assert_eq!(a.ideal, b.ideal);
        assert_eq!(a.test, b.test);
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate_datasets(&config(1)).unwrap();
        let b = generate_datasets(&config(2)).unwrap();
        assert_ne!(a.ideal, b.ideal);
    }

    #[test]
    fn shapes_and_sizes_are_consistent() {
        let data = generate_datasets(&config(42)).unwrap();

        assert_eq!(data.ideal.n_series(), 50);
        assert_eq!(data.train.n_series(), 4);
        assert_eq!(data.train.xs, data.ideal.xs);
        assert_eq!(data.test.len(), 80);
        for series in data.train.series.iter().chain(data.ideal.series.iter()) {
            assert_eq!(series.ys.len(), 100);
        }

        // Test x values always come from the shared grid.
        let index = data.ideal.sample_index();
        assert!(data.test.iter().all(|obs| index.position(obs.x).is_some()));
    }

    #[test]
    fn train_count_above_ideal_count_is_rejected() {
        let mut cfg = config(1);
        cfg.train_count = 51;
        let err = generate_datasets(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
