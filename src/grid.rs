// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The hyper-parameter values at which beam coefficients were precomputed.

use itertools::Itertools;
use ndarray::prelude::*;
use thiserror::Error;
use vec1::Vec1;

use crate::ErrorKind;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("A hyper-parameter grid needs at least one axis")]
    NoAxes,

    #[error("Hyper-parameter axis {0} has no values")]
    EmptyAxis(usize),

    #[error("Hyper-parameter axis {axis} contains a non-finite value ({value})")]
    NonFinite { axis: usize, value: f64 },
}

impl GridError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::DimensionMismatch
    }
}

/// The direction of a strictly monotonic axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Monotonicity {
    Increasing,
    Decreasing,
}

/// Hyper-parameter sample points; one axis per kind of hyper-parameter (e.g.
/// dipole height, soil dielectric). The coefficient tensor's leading axes
/// follow the order of these axes.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperparameterGrid {
    axes: Vec1<Array1<f64>>,
}

impl HyperparameterGrid {
    pub fn new(axes: Vec<Array1<f64>>) -> Result<HyperparameterGrid, GridError> {
        let axes = Vec1::try_from_vec(axes).map_err(|_| GridError::NoAxes)?;
        for (i_axis, axis) in axes.iter().enumerate() {
            if axis.is_empty() {
                return Err(GridError::EmptyAxis(i_axis));
            }
            if let Some(&value) = axis.iter().find(|v| !v.is_finite()) {
                return Err(GridError::NonFinite {
                    axis: i_axis,
                    value,
                });
            }
        }
        Ok(HyperparameterGrid { axes })
    }

    /// A grid with a single hyper-parameter axis.
    pub fn single(axis: Array1<f64>) -> Result<HyperparameterGrid, GridError> {
        Self::new(vec![axis])
    }

    pub fn num_axes(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[Array1<f64>] {
        self.axes.as_slice()
    }

    /// The number of samples on each axis.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.len()).collect()
    }

    /// The total number of grid nodes.
    pub fn num_nodes(&self) -> usize {
        self.axes.iter().map(|a| a.len()).product()
    }

    /// Every grid node, with the last axis varying fastest (the same order as
    /// a row-major flattening of the coefficient tensor's leading axes).
    pub fn nodes(&self) -> Vec<Vec<f64>> {
        self.axes
            .iter()
            .map(|a| a.iter().copied())
            .multi_cartesian_product()
            .collect()
    }

    /// Is `point` inside the hull of the grid on every axis?
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.num_axes()
            && self.axes.iter().zip(point).all(|(axis, &p)| {
                let (lo, hi) = axis
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                (lo..=hi).contains(&p)
            })
    }
}

/// Is the axis strictly monotonic, and if so, which way? A single value counts
/// as increasing.
pub(crate) fn monotonicity(axis: ArrayView1<f64>) -> Option<Monotonicity> {
    let diffs = || axis.iter().tuple_windows().map(|(a, b)| b - a);
    if diffs().all(|d| d > 0.0) {
        Some(Monotonicity::Increasing)
    } else if diffs().all(|d| d < 0.0) {
        Some(Monotonicity::Decreasing)
    } else {
        None
    }
}
