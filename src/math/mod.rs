// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.
//!
//! The systems solved in this crate are small (one row per hyper-parameter
//! sample, or one per retained basis coefficient), so plain dense
//! factorisations are all that's needed.


use ndarray::prelude::*;
use thiserror::Error;

use crate::ErrorKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Expected a square matrix, but got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Matrix is singular (zero pivot in column {0})")]
    Singular(usize),

    #[error("Matrix is not positive definite (failed at row {0})")]
    NotPositiveDefinite(usize),
}

impl LinalgError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinalgError::NotSquare { .. } => ErrorKind::DimensionMismatch,
            LinalgError::Singular(_) | LinalgError::NotPositiveDefinite(_) => ErrorKind::Numerical,
        }
    }
}

/// An LU factorisation with partial pivoting. Factorise once, then solve
/// against as many right-hand sides as needed.
#[derive(Debug, Clone)]
pub(crate) struct LuFactors {
    /// Unit-lower and upper triangles packed together.
    lu: Array2<f64>,

    /// `pivots[i]` is the row of the original matrix now at row `i`.
    pivots: Vec<usize>,
}

impl LuFactors {
    pub(crate) fn new(a: ArrayView2<f64>) -> Result<LuFactors, LinalgError> {
        let (rows, cols) = a.dim();
        if rows != cols {
            return Err(LinalgError::NotSquare { rows, cols });
        }
        let n = rows;
        let mut lu = a.to_owned();
        let mut pivots: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let (pivot_row, pivot_mag) = (k..n)
                .map(|i| (i, lu[[i, k]].abs()))
                .fold((k, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
            if !(pivot_mag > 0.0) || !pivot_mag.is_finite() {
                return Err(LinalgError::Singular(k));
            }
            if pivot_row != k {
                for j in 0..n {
                    lu.swap([k, j], [pivot_row, j]);
                }
                pivots.swap(k, pivot_row);
            }

            let diag = lu[[k, k]];
            for i in k + 1..n {
                let factor = lu[[i, k]] / diag;
                lu[[i, k]] = factor;
                for j in k + 1..n {
                    lu[[i, j]] -= factor * lu[[k, j]];
                }
            }
        }

        Ok(LuFactors { lu, pivots })
    }

    pub(crate) fn dim(&self) -> usize {
        self.pivots.len()
    }

    /// Solve `A x = b`, overwriting `b` with `x`. `b` must have the same
    /// length as `A` has rows.
    pub(crate) fn solve_in_place(&self, mut b: ArrayViewMut1<f64>) {
        let n = self.dim();
        debug_assert_eq!(b.len(), n);
        let mut x: Vec<f64> = self.pivots.iter().map(|&p| b[p]).collect();

        // Forward substitution (unit diagonal).
        for i in 0..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum;
        }
        // Back substitution.
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in i + 1..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum / self.lu[[i, i]];
        }

        b.iter_mut().zip(x).for_each(|(b, x)| *b = x);
    }
}

/// Get the lower-triangular Cholesky factor `L` of a symmetric positive
/// definite matrix, such that `A = L L^T`. Only the lower triangle of `a` is
/// read.
pub(crate) fn cholesky(a: ArrayView2<f64>) -> Result<Array2<f64>, LinalgError> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    let n = rows;
    let mut l = Array2::zeros((n, n));
    for j in 0..n {
        let mut d = a[[j, j]];
        for k in 0..j {
            d -= l[[j, k]] * l[[j, k]];
        }
        // This also catches NaNs.
        if !(d > 0.0) {
            return Err(LinalgError::NotPositiveDefinite(j));
        }
        let d = d.sqrt();
        l[[j, j]] = d;

        for i in j + 1..n {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = sum / d;
        }
    }
    Ok(l)
}

/// Solve `A x = b` given the Cholesky factor `L` of `A`.
pub(crate) fn cholesky_solve(l: ArrayView2<f64>, b: ArrayView1<f64>) -> Array1<f64> {
    let n = l.nrows();
    let mut y = b.to_owned();
    for i in 0..n {
        let mut sum = y[i];
        for k in 0..i {
            sum -= l[[i, k]] * y[k];
        }
        y[i] = sum / l[[i, i]];
    }
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in i + 1..n {
            sum -= l[[k, i]] * y[k];
        }
        y[i] = sum / l[[i, i]];
    }
    y
}

/// The Moore-Penrose pseudo-inverse of a tall matrix with full column rank,
/// `(A^T A)^-1 A^T`. The result has the transposed shape of `a`.
pub(crate) fn pseudo_inverse(a: ArrayView2<f64>) -> Result<Array2<f64>, LinalgError> {
    let gram = a.t().dot(&a);
    let l = cholesky(gram.view())?;
    let mut inverse = Array2::zeros((a.ncols(), a.nrows()));
    for (mut inv_col, a_row) in inverse.axis_iter_mut(Axis(1)).zip(a.outer_iter()) {
        inv_col.assign(&cholesky_solve(l.view(), a_row));
    }
    Ok(inverse)
}

/// The coefficient of determination (R²) of predictions against truths,
/// averaged uniformly over outputs (columns). An output that is constant in
/// the truths scores 1 if it is predicted perfectly, otherwise 0.
pub(crate) fn r2_score(truths: ArrayView2<f64>, predictions: ArrayView2<f64>) -> f64 {
    let num_outputs = truths.ncols();
    if num_outputs == 0 {
        return 1.0;
    }

    let total: f64 = truths
        .axis_iter(Axis(1))
        .zip(predictions.axis_iter(Axis(1)))
        .map(|(t, p)| {
            let mean = t.mean().unwrap_or(0.0);
            let residual: f64 = t.iter().zip(p).map(|(t, p)| (t - p).powi(2)).sum();
            let spread: f64 = t.iter().map(|t| (t - mean).powi(2)).sum();
            if spread != 0.0 {
                1.0 - residual / spread
            } else if residual == 0.0 {
                1.0
            } else {
                0.0
            }
        })
        .sum();
    total / num_outputs as f64
}
