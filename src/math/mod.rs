//! Mathematical utilities: the least-squares fit metric.
//!
//! The fit-quality metric between two aligned sample vectors is the
//! sum-of-squared-error `Σ_i (a_i - b_i)^2`. The comparison is strictly
//! positional: both vectors must sample the same x grid in the same order.

use nalgebra::DVector;

use crate::error::AppError;

/// Sum-of-squared-error between two positionally aligned sample vectors.
///
/// Length disagreement is a caller precondition violation and aborts the
/// comparison with an error (exit code 4) rather than silently truncating.
pub fn sum_squared_error(observed: &[f64], reference: &[f64]) -> Result<f64, AppError> {
    if observed.len() != reference.len() {
        return Err(AppError::new(
            4,
            format!(
                "Dimension mismatch: {} samples vs {} samples.",
                observed.len(),
                reference.len()
            ),
        ));
    }

    let o = DVector::from_column_slice(observed);
    let r = DVector::from_column_slice(reference);
    Ok((o - r).norm_squared())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_basic() {
        let sse = sum_squared_error(&[1.0, 2.0, 3.0], &[1.0, 3.0, 3.0]).unwrap();
        assert!((sse - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sse_zero_for_identical_vectors() {
        let sse = sum_squared_error(&[4.0, 5.0, 6.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(sse, 0.0);
    }

    #[test]
    fn sse_of_empty_vectors_is_zero() {
        let sse = sum_squared_error(&[], &[]).unwrap();
        assert_eq!(sse, 0.0);
    }

    #[test]
    fn sse_rejects_length_mismatch() {
        let err = sum_squared_error(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
