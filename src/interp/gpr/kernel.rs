// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gaussian-process covariance functions.
//!
//! Every kernel is a stationary, isotropic function of the Euclidean distance
//! `r` between two inputs, scaled by a constant factor `c`:
//!
//! - RBF: `c exp(-r²/2ℓ²)`
//! - Matérn ν=3/2: `c (1 + √3 r/ℓ) exp(-√3 r/ℓ)`
//! - Matérn ν=5/2: `c (1 + √5 r/ℓ + 5r²/3ℓ²) exp(-√5 r/ℓ)`
//! - Rational quadratic: `c (1 + r²/2αℓ²)^-α`

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::RATIONAL_QUADRATIC_ALPHA;

/// Supported kernel families. The names are those accepted in configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum KernelType {
    #[default]
    #[strum(serialize = "RBF")]
    #[serde(rename = "RBF")]
    Rbf,

    #[strum(serialize = "Matern_2_5")]
    #[serde(rename = "Matern_2_5")]
    Matern52,

    #[strum(serialize = "Matern_1_5")]
    #[serde(rename = "Matern_1_5")]
    Matern32,

    #[strum(serialize = "RQ")]
    #[serde(rename = "RQ")]
    RationalQuadratic,
}

impl KernelType {
    /// The number of tunable hyper-parameters.
    pub(crate) fn num_hyperparameters(self) -> usize {
        match self {
            KernelType::RationalQuadratic => 3,
            _ => 2,
        }
    }

    /// The starting point of the optimiser, in log space.
    pub(crate) fn initial_log_theta(self) -> Vec<f64> {
        let mut theta = vec![1.0_f64.ln(), 1.0_f64.ln()];
        if let KernelType::RationalQuadratic = self {
            theta.push(RATIONAL_QUADRATIC_ALPHA.ln());
        }
        theta
    }
}

/// The hyper-parameters of a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelHyperparameters {
    /// The constant factor scaling the kernel.
    pub constant: f64,

    pub length_scale: f64,

    /// The scale mixture of a rational-quadratic kernel; `None` for the others.
    pub alpha: Option<f64>,
}

/// A kernel family with concrete hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Kernel {
    pub(crate) kernel_type: KernelType,
    pub(crate) params: KernelHyperparameters,
}

impl Kernel {
    /// Make a kernel from log-space hyper-parameters (as used by the
    /// optimiser). `log_theta` is `[ln c, ln ℓ]`, plus `ln α` for the
    /// rational-quadratic kernel.
    pub(crate) fn from_log_theta(kernel_type: KernelType, log_theta: &[f64]) -> Kernel {
        let params = KernelHyperparameters {
            constant: log_theta[0].exp(),
            length_scale: log_theta[1].exp(),
            alpha: match kernel_type {
                KernelType::RationalQuadratic => Some(log_theta[2].exp()),
                _ => None,
            },
        };
        Kernel {
            kernel_type,
            params,
        }
    }

    /// Evaluate the kernel given the squared distance between two inputs.
    pub(crate) fn eval_sq_dist(&self, sq_dist: f64) -> f64 {
        let KernelHyperparameters {
            constant: c,
            length_scale: l,
            alpha,
        } = self.params;
        match self.kernel_type {
            KernelType::Rbf => c * (-0.5 * sq_dist / (l * l)).exp(),
            KernelType::Matern32 => {
                let a = 3.0_f64.sqrt() * sq_dist.sqrt() / l;
                c * (1.0 + a) * (-a).exp()
            }
            KernelType::Matern52 => {
                let a = 5.0_f64.sqrt() * sq_dist.sqrt() / l;
                c * (1.0 + a + a * a / 3.0) * (-a).exp()
            }
            KernelType::RationalQuadratic => {
                let alpha = alpha.unwrap_or(RATIONAL_QUADRATIC_ALPHA);
                c * (1.0 + sq_dist / (2.0 * alpha * l * l)).powf(-alpha)
            }
        }
    }

    pub(crate) fn eval(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        let sq_dist = a.iter().zip(b).map(|(a, b)| (a - b).powi(2)).sum();
        self.eval_sq_dist(sq_dist)
    }

    /// The kernel matrix of every pair of rows of `x`.
    pub(crate) fn gram(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let v = self.eval(x.row(i), x.row(j));
                k[[i, j]] = v;
                k[[j, i]] = v;
            }
        }
        k
    }

    /// The kernel between every row of `x` and `x_star`.
    pub(crate) fn cross(&self, x: ArrayView2<f64>, x_star: ArrayView1<f64>) -> Array1<f64> {
        x.outer_iter().map(|row| self.eval(row, x_star)).collect()
    }
}
