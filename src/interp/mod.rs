// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to interpolate coefficients across hyper-parameters.
//!
//! [`Interpolator`] is a trait detailing how a fitted model predicts a
//! `[num_freqs, num_coeffs]` coefficient slice at a hyper-parameter point. By
//! making this trait, we can neatly abstract over multiple interpolation
//! strategies: a piecewise-polynomial spline ([`spline`]) and Gaussian-process
//! regression ([`gpr`]). Which one is used is decided by an
//! [`InterpolationStrategy`].
//!
//! [`HyperparameterInterpolator`] owns the training data and fits its model
//! exactly once, on demand.

mod error;
pub mod gpr;
pub mod spline;
#[cfg(test)]
mod tests;

pub use error::InterpError;
pub use gpr::{EstimatorDiagnostics, GprConfig};
pub use spline::SplineInterpolator;

use log::{debug, info};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    constants::DEFAULT_SPLINE_ORDER,
    grid::{monotonicity, HyperparameterGrid},
    Memo,
};

/// A trait abstracting fitted interpolation models. Fitted models are
/// immutable.
pub trait Interpolator: Sync + Send {
    /// Predict the coefficient slice (`[num_freqs, num_coeffs]`) at a point in
    /// hyper-parameter space. `point` must have one value per grid axis.
    fn predict(&self, point: &[f64]) -> Result<Array2<f64>, InterpError>;

    /// Goodness-of-fit information gathered when the model was fitted.
    fn diagnostics(&self) -> &ModelDiagnostics;
}

/// Check that a query point has one finite value per grid axis.
pub(crate) fn validate_query(point: &[f64], num_axes: usize) -> Result<(), InterpError> {
    if point.len() != num_axes {
        return Err(InterpError::BadQueryDimension {
            got: point.len(),
            expected: num_axes,
        });
    }
    match point.iter().position(|v| !v.is_finite()) {
        Some(axis) => Err(InterpError::NonFiniteQuery {
            axis,
            value: point[axis],
        }),
        None => Ok(()),
    }
}

/// Supported interpolation strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum InterpolationStrategy {
    /// An interpolating B-spline of the given order on every axis.
    Spline {
        #[serde(default = "default_spline_order")]
        order: usize,
    },

    /// Gaussian-process regression. Only one hyper-parameter axis is supported.
    GaussianProcess(GprConfig),
}

fn default_spline_order() -> usize {
    DEFAULT_SPLINE_ORDER
}

impl Default for InterpolationStrategy {
    fn default() -> Self {
        InterpolationStrategy::Spline {
            order: DEFAULT_SPLINE_ORDER,
        }
    }
}

impl InterpolationStrategy {
    /// Check that this strategy can be used with the given grid. Nothing is
    /// fitted.
    pub fn validate(&self, grid: &HyperparameterGrid) -> Result<(), InterpError> {
        match self {
            InterpolationStrategy::Spline { order } => {
                let order = *order;
                for (i_axis, axis) in grid.axes().iter().enumerate() {
                    if order == 0 || order >= axis.len() {
                        return Err(InterpError::BadSplineOrder {
                            order,
                            axis: i_axis,
                            num_points: axis.len(),
                        });
                    }
                    if monotonicity(axis.view()).is_none() {
                        return Err(InterpError::NonMonotonicGrid { axis: i_axis });
                    }
                }
                if order % 2 == 0 && order != 2 {
                    return Err(InterpError::UnsupportedSplineOrder(order));
                }
            }

            InterpolationStrategy::GaussianProcess(_) => {
                if !cfg!(feature = "gpr") {
                    return Err(InterpError::GprUnavailable);
                }
                if grid.num_axes() != 1 {
                    return Err(InterpError::MultiAxisGpr(grid.num_axes()));
                }
            }
        }

        Ok(())
    }
}

/// Goodness-of-fit information about a fitted model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelDiagnostics {
    Spline {
        /// R² of the re-evaluated training nodes against the training
        /// coefficients (averaged over all outputs).
        score_of_training_set: f64,
    },

    GaussianProcess {
        /// One entry per estimator (i.e. per flattened frequency-coefficient
        /// output), in flattening order.
        estimators: Vec<EstimatorDiagnostics>,

        /// R² of the training-set predictions against the training
        /// coefficients (averaged over all outputs).
        score_of_training_set: f64,
    },
}

impl ModelDiagnostics {
    pub fn score_of_training_set(&self) -> f64 {
        match self {
            ModelDiagnostics::Spline {
                score_of_training_set,
            }
            | ModelDiagnostics::GaussianProcess {
                score_of_training_set,
                ..
            } => *score_of_training_set,
        }
    }
}

/// Fits and queries an [`InterpolationStrategy`] over a hyper-parameter grid.
/// The fitted model is computed once (by [`HyperparameterInterpolator::fit`])
/// and then shared read-only.
#[derive(Debug)]
pub struct HyperparameterInterpolator {
    strategy: InterpolationStrategy,
    grid: HyperparameterGrid,

    /// Shape `[H_1, ..., H_n, num_freqs, num_coeffs]`.
    coefficients: ArrayD<f64>,

    model: Memo<Box<dyn Interpolator>>,
}

impl std::fmt::Debug for dyn Interpolator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpolator")
            .field("diagnostics", self.diagnostics())
            .finish()
    }
}

impl HyperparameterInterpolator {
    /// Validate the strategy against the grid and the coefficient tensor's
    /// shape. Nothing is fitted until [`HyperparameterInterpolator::fit`] is
    /// called.
    pub fn new(
        strategy: InterpolationStrategy,
        grid: HyperparameterGrid,
        coefficients: ArrayD<f64>,
    ) -> Result<HyperparameterInterpolator, InterpError> {
        validate_tensor_shape(&grid, coefficients.shape())?;
        strategy.validate(&grid)?;
        debug!(
            "Interpolator: {strategy:?} over hyper-parameter grid {:?}",
            grid.shape()
        );

        Ok(HyperparameterInterpolator {
            strategy,
            grid,
            coefficients,
            model: Memo::new(),
        })
    }

    /// Make a new interpolator over the same data, but with a different
    /// strategy. The new interpolator is not fitted.
    pub fn with_strategy(
        &self,
        strategy: InterpolationStrategy,
    ) -> Result<HyperparameterInterpolator, InterpError> {
        Self::new(strategy, self.grid.clone(), self.coefficients.clone())
    }

    /// Fit the model, if that hasn't already happened, and return it.
    /// Concurrent callers wait for a single fit.
    pub fn fit(&self) -> Result<&dyn Interpolator, InterpError> {
        let model = self.model.get_or_try_init(|| {
            create_interpolator(&self.strategy, &self.grid, self.coefficients.view())
        })?;
        Ok(&**model)
    }

    /// Get the fitted model, without fitting it.
    pub fn model(&self) -> Result<&dyn Interpolator, InterpError> {
        match self.model.get() {
            Some(model) => Ok(&**model),
            None => Err(InterpError::NotFitted),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_ready()
    }

    /// Predict the `[num_freqs, num_coeffs]` coefficient slice at `point`. The
    /// model must already be fitted.
    pub fn predict(&self, point: &[f64]) -> Result<Array2<f64>, InterpError> {
        self.model()?.predict(point)
    }

    pub fn strategy(&self) -> &InterpolationStrategy {
        &self.strategy
    }

    pub fn grid(&self) -> &HyperparameterGrid {
        &self.grid
    }

    pub fn coefficients(&self) -> ArrayViewD<f64> {
        self.coefficients.view()
    }
}

/// Check that a coefficient tensor is `[H_1, ..., H_n, F, L]` for the grid.
fn validate_tensor_shape(grid: &HyperparameterGrid, shape: &[usize]) -> Result<(), InterpError> {
    let num_axes = grid.num_axes();
    if shape.len() != num_axes + 2 {
        return Err(InterpError::BadTensorRank {
            got: shape.len(),
            expected: num_axes + 2,
        });
    }
    for (i_axis, (&got, expected)) in shape.iter().zip(grid.shape()).enumerate() {
        if got != expected {
            return Err(InterpError::TensorGridMismatch {
                axis: i_axis,
                got,
                expected,
            });
        }
    }
    Ok(())
}

/// Fit a model for the given strategy.
pub fn create_interpolator(
    strategy: &InterpolationStrategy,
    grid: &HyperparameterGrid,
    coefficients: ArrayViewD<f64>,
) -> Result<Box<dyn Interpolator>, InterpError> {
    validate_tensor_shape(grid, coefficients.shape())?;
    strategy.validate(grid)?;

    match strategy {
        InterpolationStrategy::Spline { order } => {
            info!("Using splines for interpolation");
            let model = SplineInterpolator::fit(grid, coefficients, *order)?;
            debug!(
                "Spline score of training set: {}",
                model.diagnostics().score_of_training_set()
            );
            Ok(Box::new(model))
        }

        InterpolationStrategy::GaussianProcess(config) => {
            info!("Using Gaussian process regression for interpolation");
            create_gpr_interpolator(config, grid, coefficients)
        }
    }
}

#[cfg(feature = "gpr")]
fn create_gpr_interpolator(
    config: &GprConfig,
    grid: &HyperparameterGrid,
    coefficients: ArrayViewD<f64>,
) -> Result<Box<dyn Interpolator>, InterpError> {
    let model = gpr::GaussianProcessInterpolator::fit(config, grid, coefficients)?;
    debug!(
        "GPR score of training set: {}",
        model.diagnostics().score_of_training_set()
    );
    Ok(Box::new(model))
}

#[cfg(not(feature = "gpr"))]
fn create_gpr_interpolator(
    _config: &GprConfig,
    _grid: &HyperparameterGrid,
    _coefficients: ArrayViewD<f64>,
) -> Result<Box<dyn Interpolator>, InterpError> {
    Err(InterpError::GprUnavailable)
}
