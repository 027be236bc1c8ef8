// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A single-output Gaussian-process regressor.

use std::f64::consts::TAU;

use log::trace;
use ndarray::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{
    kernel::{Kernel, KernelType},
    optimise::minimise,
    EstimatorDiagnostics,
};
use crate::{
    constants::{
        GPR_JITTER, GPR_OPTIMISER_RESTARTS, KERNEL_HYPERPARAMETER_MAX,
        KERNEL_HYPERPARAMETER_MIN, OPTIMISER_MAX_ITERATIONS, OPTIMISER_TOLERANCE,
    },
    math::{cholesky, cholesky_solve},
    InterpError,
};

/// The parts of a kernel matrix's factorisation needed to predict.
struct Factorisation {
    /// `(K + σ²I)^-1 y`.
    alpha: Array1<f64>,
    log_marginal_likelihood: f64,
}

/// Factorise the kernel matrix of `x` and get the log marginal likelihood of
/// `y`. `None` if the kernel matrix isn't positive definite.
fn factorise(kernel: &Kernel, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Option<Factorisation> {
    let mut k = kernel.gram(x);
    k.diag_mut().iter_mut().for_each(|d| *d += GPR_JITTER);
    let l = cholesky(k.view()).ok()?;
    let alpha = cholesky_solve(l.view(), y);

    let n = y.len() as f64;
    let log_det_term: f64 = l.diag().iter().map(|d| d.ln()).sum();
    let log_marginal_likelihood = -0.5 * y.dot(&alpha) - log_det_term - 0.5 * n * TAU.ln();
    Some(Factorisation {
        alpha,
        log_marginal_likelihood,
    })
}

/// A fitted Gaussian-process regressor for one output.
#[derive(Debug, Clone)]
pub(crate) struct GaussianProcess {
    kernel: Kernel,

    /// `[num_samples, num_input_dims]`.
    x_train: Array2<f64>,

    alpha: Array1<f64>,
    y_mean: f64,
    y_std: f64,
    log_marginal_likelihood: f64,
}

impl GaussianProcess {
    /// Fit a regressor by maximising the log marginal likelihood over the
    /// kernel's hyper-parameters. The optimiser starts from the kernel's
    /// initial hyper-parameters, then restarts a fixed number of times from
    /// random (seeded) points.
    pub(crate) fn fit(
        kernel_type: KernelType,
        x_train: Array2<f64>,
        y: ArrayView1<f64>,
        normalize_y: bool,
        seed: u64,
        output: usize,
    ) -> Result<GaussianProcess, InterpError> {
        let (y_mean, y_std) = if normalize_y {
            let mean = y.mean().unwrap_or(0.0);
            let std = y.std(0.0);
            (mean, if std == 0.0 { 1.0 } else { std })
        } else {
            (0.0, 1.0)
        };
        let y_norm = y.mapv(|v| (v - y_mean) / y_std);

        let objective = |log_theta: &[f64]| {
            let kernel = Kernel::from_log_theta(kernel_type, log_theta);
            match factorise(&kernel, x_train.view(), y_norm.view()) {
                Some(f) => -f.log_marginal_likelihood,
                None => f64::INFINITY,
            }
        };

        let lower = KERNEL_HYPERPARAMETER_MIN.ln();
        let upper = KERNEL_HYPERPARAMETER_MAX.ln();
        let mut rng = StdRng::seed_from_u64(seed);
        let num_params = kernel_type.num_hyperparameters();
        let starts = std::iter::once(kernel_type.initial_log_theta()).chain(
            (0..GPR_OPTIMISER_RESTARTS)
                .map(|_| (0..num_params).map(|_| rng.gen_range(lower..upper)).collect()),
        );

        let mut best: Option<(Vec<f64>, f64)> = None;
        for (i_start, start) in starts.enumerate() {
            let (theta, value) = minimise(
                &objective,
                &start,
                lower,
                upper,
                OPTIMISER_MAX_ITERATIONS,
                OPTIMISER_TOLERANCE,
            );
            trace!("Output {output}, optimiser start {i_start}: -LML = {value}");
            if value.is_finite() && best.as_ref().map_or(true, |(_, b)| value < *b) {
                best = Some((theta, value));
            }
        }

        let (theta, _) = best.ok_or(InterpError::OptimisationFailed { output })?;
        let kernel = Kernel::from_log_theta(kernel_type, &theta);
        let Factorisation {
            alpha,
            log_marginal_likelihood,
        } = factorise(&kernel, x_train.view(), y_norm.view())
            .ok_or(InterpError::OptimisationFailed { output })?;

        Ok(GaussianProcess {
            kernel,
            x_train,
            alpha,
            y_mean,
            y_std,
            log_marginal_likelihood,
        })
    }

    /// The posterior mean at `x_star`.
    pub(crate) fn predict(&self, x_star: ArrayView1<f64>) -> f64 {
        let k_star = self.kernel.cross(self.x_train.view(), x_star);
        k_star.dot(&self.alpha) * self.y_std + self.y_mean
    }

    pub(crate) fn diagnostics(&self) -> EstimatorDiagnostics {
        EstimatorDiagnostics {
            kernel: self.kernel.params,
            log_marginal_likelihood: self.log_marginal_likelihood,
        }
    }
}
