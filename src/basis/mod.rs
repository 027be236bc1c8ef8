// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The linear map from spherical-basis coefficients to above-horizon pixels.
//!
//! A basis matrix is `[num_pixels, num_coeffs]`; multiplying it by a
//! coefficient vector gives the beam at every above-horizon pixel. If a
//! coefficient order `K` is set, only the first `K` columns of the basis (and
//! the first `K` values of any coefficient vector) are used.

mod error;

pub use error::BasisError;

use log::debug;
use ndarray::prelude::*;

use crate::{math::pseudo_inverse, Memo};

#[derive(Debug, Clone)]
pub struct BasisTransform {
    /// The basis, truncated to the coefficient order. `[num_pixels, K]`.
    forward: Array2<f64>,

    /// The number of coefficients in the untruncated basis (`L`).
    num_coeffs: usize,

    /// The least-squares inverse of `forward`; `[K, num_pixels]`. Only
    /// computed if asked for.
    inverse: Memo<Array2<f64>>,
}

impl BasisTransform {
    /// Make a transform from a `[num_pixels, num_coeffs]` basis. If
    /// `coefficient_order` is `Some(K)`, only the first `K` coefficients are
    /// used; `K` must not be bigger than the number of coefficients.
    pub fn new(
        basis: Array2<f64>,
        coefficient_order: Option<usize>,
    ) -> Result<BasisTransform, BasisError> {
        let (num_pixels, num_coeffs) = basis.dim();
        if num_pixels == 0 {
            return Err(BasisError::NoPixels);
        }

        let forward = match coefficient_order {
            Some(order) if order == 0 || order > num_coeffs => {
                return Err(BasisError::BadCoefficientOrder { order, num_coeffs })
            }
            Some(order) if order < num_coeffs => {
                debug!("Truncating the basis from {num_coeffs} to {order} coefficients");
                basis.slice_move(s![.., ..order])
            }
            _ => basis,
        };

        Ok(BasisTransform {
            forward,
            num_coeffs,
            inverse: Memo::new(),
        })
    }

    /// The number of coefficients actually used (`K`, or `L` without
    /// truncation).
    pub fn coefficient_order(&self) -> usize {
        self.forward.ncols()
    }

    /// The number of coefficients in the untruncated basis.
    pub fn num_coeffs(&self) -> usize {
        self.num_coeffs
    }

    pub fn num_pixels(&self) -> usize {
        self.forward.nrows()
    }

    /// The (truncated) basis matrix.
    pub fn forward(&self) -> ArrayView2<f64> {
        self.forward.view()
    }

    /// Truncate an untruncated coefficient vector (length `L`) to the
    /// coefficient order.
    pub fn truncate<'a>(
        &self,
        coefficients: ArrayView1<'a, f64>,
    ) -> Result<ArrayView1<'a, f64>, BasisError> {
        if coefficients.len() != self.num_coeffs {
            return Err(BasisError::Length {
                got: coefficients.len(),
                expected: self.num_coeffs,
            });
        }
        Ok(coefficients.slice_move(s![..self.coefficient_order()]))
    }

    /// Project an already-truncated coefficient vector (length `K`) to pixels.
    pub fn apply(&self, coefficients: ArrayView1<f64>) -> Result<Array1<f64>, BasisError> {
        if coefficients.len() != self.coefficient_order() {
            return Err(BasisError::Length {
                got: coefficients.len(),
                expected: self.coefficient_order(),
            });
        }
        Ok(self.forward.dot(&coefficients))
    }

    /// Truncate and project the untruncated coefficients of every frequency.
    /// `coefficients` is `[num_freqs, L]`; the result is
    /// `[num_freqs, num_pixels]`.
    pub fn project(&self, coefficients: ArrayView2<f64>) -> Result<Array2<f64>, BasisError> {
        if coefficients.ncols() != self.num_coeffs {
            return Err(BasisError::Length {
                got: coefficients.ncols(),
                expected: self.num_coeffs,
            });
        }
        let truncated = coefficients.slice(s![.., ..self.coefficient_order()]);
        Ok(truncated.dot(&self.forward.t()))
    }

    /// The least-squares inverse of the (truncated) basis, computed on first
    /// use. This fails if the truncated basis is rank deficient.
    pub fn inverse(&self) -> Result<ArrayView2<f64>, BasisError> {
        let inverse = self.inverse.get_or_try_init(|| {
            debug!("Computing the pseudo-inverse of the basis");
            pseudo_inverse(self.forward.view())
        })?;
        Ok(inverse.view())
    }

    /// Project pixel values (length `num_pixels`) back to (truncated)
    /// coefficients, in the least-squares sense.
    pub fn to_coefficients(&self, pixels: ArrayView1<f64>) -> Result<Array1<f64>, BasisError> {
        if pixels.len() != self.num_pixels() {
            return Err(BasisError::Length {
                got: pixels.len(),
                expected: self.num_pixels(),
            });
        }
        Ok(self.inverse()?.dot(&pixels))
    }
}
