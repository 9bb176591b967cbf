//! Ordinary least squares solver.
//!
//! We solve one regression problem per process lifetime:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD so that tall, short and rank-deficient design matrices all solve.
//!   (Nalgebra's `QR::solve` is intended for square systems.)
//! - Singular values are cut relative to the largest one, so a column that is
//!   constant or collinear contributes nothing instead of blowing up.

use nalgebra::{DMatrix, DVector};

/// Relative singular-value cutoffs, tried strictest first.
const RELATIVE_TOLERANCES: [f64; 3] = [1e-12, 1e-10, 1e-8];

/// Solve a least squares problem using SVD (minimum-norm solution).
///
/// Returns `None` if no finite solution is found.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    if !max_sv.is_finite() {
        return None;
    }

    for &rel in &RELATIVE_TOLERANCES {
        if let Ok(beta) = svd.solve(y, max_sv * rel) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Build a design matrix with a leading intercept column.
pub fn design_matrix<const K: usize>(rows: &[[f64; K]]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), K + 1, |i, j| if j == 0 { 1.0 } else { rows[i][j - 1] })
}
