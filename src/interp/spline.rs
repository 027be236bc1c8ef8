// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interpolating B-splines over one or more hyper-parameter axes.
//!
//! On each axis, the knots are chosen so that the spline passes through every
//! sample: odd orders use "not-a-knot" knots and order 2 uses the midpoints
//! between samples (dropping the first and last). With more than one axis, the
//! tensor product of the per-axis splines is used; the coefficients are found
//! by solving the collocation system along one axis at a time.
//!
//! Evaluation outside the grid uses the polynomial piece at the nearest end.
//! Nothing is clamped, so don't expect accuracy there.

use log::{debug, trace};
use ndarray::{prelude::*, Zip};

use super::{
    validate_query, validate_tensor_shape, InterpError, InterpolationStrategy, Interpolator,
    ModelDiagnostics,
};
use crate::{
    grid::{monotonicity, HyperparameterGrid, Monotonicity},
    math::{r2_score, LuFactors},
};

/// The knots of a spline on one hyper-parameter axis.
#[derive(Debug, Clone)]
struct SplineAxis {
    knots: Vec<f64>,
    order: usize,

    /// The number of B-spline basis functions (= the number of samples).
    num_basis: usize,
}

impl SplineAxis {
    /// `x` must be strictly increasing and longer than `order`.
    fn new(x: ArrayView1<f64>, order: usize) -> SplineAxis {
        let n = x.len();
        let k = order;
        let first = x[0];
        let last = x[n - 1];

        let mut knots = Vec::with_capacity(n + k + 1);
        knots.extend(std::iter::repeat(first).take(k + 1));
        if k % 2 == 1 {
            let m = (k - 1) / 2;
            knots.extend(x.iter().skip(m + 1).take(n - k - 1));
        } else {
            // Midpoints, without the first and last.
            knots.extend(
                x.windows(2)
                    .into_iter()
                    .map(|w| (w[0] + w[1]) / 2.0)
                    .skip(1)
                    .take(n - k - 1),
            );
        }
        knots.extend(std::iter::repeat(last).take(k + 1));
        debug_assert_eq!(knots.len(), n + k + 1);

        SplineAxis {
            knots,
            order,
            num_basis: n,
        }
    }

    /// Find the knot span `mu` (`order <= mu < num_basis`) to use for `x`.
    /// Values outside the base interval use the first or last span.
    fn find_span(&self, x: f64) -> usize {
        let k = self.order;
        let n = self.num_basis;
        if x >= self.knots[n] {
            return n - 1;
        }
        if x <= self.knots[k] {
            return k;
        }
        // At least one knot in this slice is <= x.
        k + self.knots[k..n].partition_point(|&t| t <= x) - 1
    }

    /// Evaluate the `order + 1` B-spline basis functions that are non-zero on
    /// the span containing `x`. Returns the index of the first of them and their
    /// values.
    fn basis_functions(&self, x: f64) -> (usize, Vec<f64>) {
        let k = self.order;
        let t = &self.knots;
        let mu = self.find_span(x);

        let mut values = vec![0.0; k + 1];
        let mut left = vec![0.0; k + 1];
        let mut right = vec![0.0; k + 1];
        values[0] = 1.0;
        for j in 1..=k {
            left[j] = x - t[mu + 1 - j];
            right[j] = t[mu + j] - x;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = values[r] / (right[r + 1] + left[j - r]);
                values[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            values[j] = saved;
        }

        (mu - k, values)
    }

    /// The square matrix of every basis function evaluated at every sample.
    fn collocation_matrix(&self, x: ArrayView1<f64>) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.num_basis, self.num_basis));
        for (mut row, &x) in matrix.outer_iter_mut().zip(x) {
            let (start, values) = self.basis_functions(x);
            for (offset, v) in values.into_iter().enumerate() {
                row[start + offset] = v;
            }
        }
        matrix
    }
}

/// A fitted tensor-product interpolating spline.
#[derive(Debug, Clone)]
pub struct SplineInterpolator {
    axes: Vec<SplineAxis>,

    /// B-spline coefficients, with the same shape as the training tensor
    /// (`[H_1, ..., H_n, num_freqs, num_coeffs]`).
    coefficients: ArrayD<f64>,

    diagnostics: ModelDiagnostics,
}

impl SplineInterpolator {
    /// Fit a spline of order `order` on every axis. The grid's axes must be
    /// strictly monotonic and `coefficients` must be shaped
    /// `[H_1, ..., H_n, num_freqs, num_coeffs]`.
    pub fn fit(
        grid: &HyperparameterGrid,
        coefficients: ArrayViewD<f64>,
        order: usize,
    ) -> Result<SplineInterpolator, InterpError> {
        validate_tensor_shape(grid, coefficients.shape())?;
        InterpolationStrategy::Spline { order }.validate(grid)?;

        let mut spline_coeffs = coefficients.to_owned();
        let mut axes = Vec::with_capacity(grid.num_axes());

        for (i_axis, x) in grid.axes().iter().enumerate() {
            // Splines are built on increasing values. A decreasing axis is
            // flipped here (with its data), and queries need no special
            // treatment.
            let mut x = x.view();
            if let Some(Monotonicity::Decreasing) = monotonicity(x) {
                debug!("Hyper-parameter axis {i_axis} is decreasing; reversing it");
                x.invert_axis(Axis(0));
                spline_coeffs.invert_axis(Axis(i_axis));
            }

            let axis = SplineAxis::new(x, order);
            trace!("Spline knots on axis {i_axis}: {:?}", axis.knots);
            let lu = LuFactors::new(axis.collocation_matrix(x).view())?;
            Zip::from(spline_coeffs.lanes_mut(Axis(i_axis)))
                .par_for_each(|lane| lu.solve_in_place(lane));
            axes.push(axis);
        }

        let mut model = SplineInterpolator {
            axes,
            coefficients: spline_coeffs,
            diagnostics: ModelDiagnostics::Spline {
                score_of_training_set: f64::NAN,
            },
        };

        // Re-evaluate at the training nodes and compare against the training
        // data.
        let num_nodes = grid.num_nodes();
        let num_outputs = coefficients.len() / num_nodes;
        let truths = coefficients.to_shape((num_nodes, num_outputs))?;
        let mut predictions = Array2::zeros((num_nodes, num_outputs));
        for (mut row, node) in predictions.outer_iter_mut().zip(grid.nodes()) {
            let prediction = model.evaluate(&node)?;
            let flat = prediction.to_shape(num_outputs)?;
            row.assign(&flat);
        }
        model.diagnostics = ModelDiagnostics::Spline {
            score_of_training_set: r2_score(truths.view(), predictions.view()),
        };

        Ok(model)
    }

    pub fn order(&self) -> usize {
        self.axes[0].order
    }

    fn evaluate(&self, point: &[f64]) -> Result<Array2<f64>, InterpError> {
        validate_query(point, self.axes.len())?;

        // Contract the leading (hyper-parameter) axis with its basis function
        // values, one axis at a time, until only [freq, coeff] remains.
        let mut current: Option<ArrayD<f64>> = None;
        for (axis, &x) in self.axes.iter().zip(point) {
            let (start, weights) = axis.basis_functions(x);
            let view = match &current {
                Some(c) => c.view(),
                None => self.coefficients.view(),
            };
            let mut contracted = ArrayD::zeros(IxDyn(&view.shape()[1..]));
            for (offset, w) in weights.into_iter().enumerate() {
                contracted.scaled_add(w, &view.index_axis(Axis(0), start + offset));
            }
            current = Some(contracted);
        }

        let current = current.unwrap_or_else(|| self.coefficients.clone());
        Ok(current.into_dimensionality::<Ix2>()?)
    }
}

impl Interpolator for SplineInterpolator {
    fn predict(&self, point: &[f64]) -> Result<Array2<f64>, InterpError> {
        self.evaluate(point)
    }

    fn diagnostics(&self) -> &ModelDiagnostics {
        &self.diagnostics
    }
}
