// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with coefficient interpolation.

use thiserror::Error;

use super::gpr::{KERNEL_TYPES_COMMA_SEPARATED, REGRESSOR_MODES_COMMA_SEPARATED};
use crate::{ErrorKind, LinalgError};

#[derive(Error, Debug)]
pub enum InterpError {
    #[error("Spline order must satisfy 1 <= k < {num_points} (the number of points on hyper-parameter axis {axis}), but got k = {order}")]
    BadSplineOrder {
        order: usize,
        axis: usize,
        num_points: usize,
    },

    #[error("Only odd spline orders and order 2 are supported, but got k = {0}")]
    UnsupportedSplineOrder(usize),

    #[error("Hyper-parameter axis {axis} is not strictly monotonic; spline interpolation needs strictly increasing or decreasing values")]
    NonMonotonicGrid { axis: usize },

    #[error("Gaussian-process interpolation supports exactly one hyper-parameter axis, but the grid has {0}")]
    MultiAxisGpr(usize),

    #[error("Unknown Gaussian-process kernel '{0}'. Supported kernels: {}", *KERNEL_TYPES_COMMA_SEPARATED)]
    UnknownKernel(String),

    #[error("Unknown Gaussian-process regressor '{0}'. Supported regressors: {}", *REGRESSOR_MODES_COMMA_SEPARATED)]
    UnknownRegressor(String),

    #[error("Gaussian-process interpolation was requested, but this build of beam_emulator was compiled without the \"gpr\" feature")]
    GprUnavailable,

    #[error("The interpolation model was used before it was fitted")]
    NotFitted,

    #[error("The query point has {got} hyper-parameter values, but the grid has {expected} axes")]
    BadQueryDimension { got: usize, expected: usize },

    #[error("Hyper-parameter {axis} of the query point is not finite ({value})")]
    NonFiniteQuery { axis: usize, value: f64 },

    #[error("The coefficient tensor has {got} dimensions, but {expected} were expected (one per hyper-parameter axis, then frequencies and coefficients)")]
    BadTensorRank { got: usize, expected: usize },

    #[error("Coefficient tensor axis {axis} has length {got}, but the matching hyper-parameter axis has {expected} values")]
    TensorGridMismatch {
        axis: usize,
        got: usize,
        expected: usize,
    },

    #[error("None of the kernel optimiser's starts for output {output} produced a positive-definite kernel matrix")]
    OptimisationFailed { output: usize },

    #[error("Couldn't build the Gaussian-process worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Linalg(#[from] LinalgError),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl InterpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InterpError::BadSplineOrder { .. }
            | InterpError::UnsupportedSplineOrder(_)
            | InterpError::NonMonotonicGrid { .. }
            | InterpError::MultiAxisGpr(_)
            | InterpError::UnknownKernel(_)
            | InterpError::UnknownRegressor(_)
            | InterpError::ThreadPool(_) => ErrorKind::Configuration,
            InterpError::GprUnavailable => ErrorKind::MissingDependency,
            InterpError::NotFitted => ErrorKind::ModelNotReady,
            InterpError::BadQueryDimension { .. }
            | InterpError::NonFiniteQuery { .. }
            | InterpError::BadTensorRank { .. }
            | InterpError::TensorGridMismatch { .. }
            | InterpError::Shape(_) => ErrorKind::DimensionMismatch,
            InterpError::OptimisationFailed { .. } => ErrorKind::Numerical,
            InterpError::Linalg(e) => e.kind(),
        }
    }
}
