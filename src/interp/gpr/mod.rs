// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gaussian-process regression over a single hyper-parameter axis.
//!
//! The coefficient tensor `[H, F, L]` is flattened to `[H, F·L]`, i.e. one
//! regression output per (frequency, coefficient) pair, and one estimator is
//! fitted per output. Estimators are either independent (and fitted in
//! parallel), or chained, where each estimator also sees the outputs before
//! it.
//!
//! The configuration types here are always available so that configurations
//! can be read and validated; the regression itself needs the "gpr" feature.

#[cfg_attr(not(feature = "gpr"), allow(dead_code))]
pub(crate) mod kernel;
#[cfg(feature = "gpr")]
mod optimise;
#[cfg(feature = "gpr")]
mod regressor;

pub use kernel::{KernelHyperparameters, KernelType};

use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use super::InterpError;

#[cfg(feature = "gpr")]
use log::{debug, warn};
#[cfg(feature = "gpr")]
use ndarray::{aview1, prelude::*};
#[cfg(feature = "gpr")]
use rayon::prelude::*;

#[cfg(feature = "gpr")]
use crate::{math::r2_score, HyperparameterGrid, Interpolator, ModelDiagnostics};
#[cfg(feature = "gpr")]
use regressor::GaussianProcess;
#[cfg(feature = "gpr")]
use super::validate_query;

lazy_static::lazy_static! {
    pub(crate) static ref KERNEL_TYPES_COMMA_SEPARATED: String = KernelType::iter().join(", ");

    pub(crate) static ref REGRESSOR_MODES_COMMA_SEPARATED: String = RegressorMode::iter().join(", ");
}

/// How estimators are arranged across the flattened outputs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum RegressorMode {
    /// One estimator per output, each fitted on its own. Fits run in parallel.
    #[default]
    #[strum(to_string = "MultiOutput", serialize = "independent")]
    #[serde(rename = "MultiOutput", alias = "independent")]
    Independent,

    /// Estimator `j` is fitted on the hyper-parameter *and* outputs `0..j`,
    /// and predicts using the predictions of the estimators before it. This is
    /// order dependent and experimental.
    #[strum(to_string = "RegressorChain", serialize = "chained")]
    #[serde(rename = "RegressorChain", alias = "chained")]
    Chained,
}

/// Gaussian-process options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GprConfig {
    #[serde(default)]
    pub kernel: KernelType,

    /// Standardise each output before fitting. In most cases this should be
    /// true.
    #[serde(default = "default_normalize_y")]
    pub normalize_y: bool,

    #[serde(default)]
    pub regressor: RegressorMode,

    /// Seeds the optimiser's random restarts.
    #[serde(default)]
    pub random_seed: u64,

    /// The number of threads used to fit independent estimators. If not
    /// given, rayon's global pool is used. Chained estimators are fitted one
    /// after another, so this is ignored (with a warning) in chained mode.
    #[serde(default)]
    pub num_jobs: Option<usize>,
}

fn default_normalize_y() -> bool {
    true
}

impl Default for GprConfig {
    fn default() -> Self {
        GprConfig {
            kernel: KernelType::default(),
            normalize_y: default_normalize_y(),
            regressor: RegressorMode::default(),
            random_seed: 0,
            num_jobs: None,
        }
    }
}

impl GprConfig {
    /// Make a configuration from kernel and regressor names (e.g. "Matern_2_5"
    /// and "MultiOutput").
    pub fn new(kernel: &str, normalize_y: bool, regressor: &str) -> Result<GprConfig, InterpError> {
        let kernel =
            KernelType::from_str(kernel).map_err(|_| InterpError::UnknownKernel(kernel.to_string()))?;
        let regressor = RegressorMode::from_str(regressor)
            .map_err(|_| InterpError::UnknownRegressor(regressor.to_string()))?;
        Ok(GprConfig {
            kernel,
            normalize_y,
            regressor,
            ..Default::default()
        })
    }
}

/// Fitted information about one estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorDiagnostics {
    /// The optimised kernel hyper-parameters.
    pub kernel: KernelHyperparameters,

    pub log_marginal_likelihood: f64,
}

/// A fitted set of Gaussian-process estimators, one per flattened output.
#[cfg(feature = "gpr")]
#[derive(Debug, Clone)]
pub struct GaussianProcessInterpolator {
    mode: RegressorMode,
    estimators: Vec<GaussianProcess>,
    num_freqs: usize,
    num_coeffs: usize,
    diagnostics: ModelDiagnostics,
}

#[cfg(feature = "gpr")]
impl GaussianProcessInterpolator {
    pub fn fit(
        config: &GprConfig,
        grid: &HyperparameterGrid,
        coefficients: ArrayViewD<f64>,
    ) -> Result<GaussianProcessInterpolator, InterpError> {
        if grid.num_axes() != 1 {
            return Err(InterpError::MultiAxisGpr(grid.num_axes()));
        }
        let shape = coefficients.shape();
        if shape.len() != 3 {
            return Err(InterpError::BadTensorRank {
                got: shape.len(),
                expected: 3,
            });
        }
        let (num_samples, num_freqs, num_coeffs) = (shape[0], shape[1], shape[2]);
        let hyperparameters = &grid.axes()[0];
        if hyperparameters.len() != num_samples {
            return Err(InterpError::TensorGridMismatch {
                axis: 0,
                got: num_samples,
                expected: hyperparameters.len(),
            });
        }

        let num_outputs = num_freqs * num_coeffs;
        let targets = coefficients.to_shape((num_samples, num_outputs))?;
        let x = hyperparameters.view().insert_axis(Axis(1));
        debug!(
            "Fitting {num_outputs} {} Gaussian-process estimators with a {} kernel",
            config.regressor, config.kernel
        );

        let estimators = match config.regressor {
            RegressorMode::Independent => fit_independent(config, x, targets.view())?,
            RegressorMode::Chained => {
                warn!("The chained Gaussian-process regressor is experimental; results depend on output order");
                if let Some(num_jobs) = config.num_jobs {
                    warn!("num_jobs = {num_jobs} is ignored; chained estimators are fitted one at a time");
                }
                fit_chained(config, x, targets.view())?
            }
        };

        let mut model = GaussianProcessInterpolator {
            mode: config.regressor,
            estimators,
            num_freqs,
            num_coeffs,
            diagnostics: ModelDiagnostics::GaussianProcess {
                estimators: vec![],
                score_of_training_set: f64::NAN,
            },
        };

        let mut predictions = Array2::zeros((num_samples, num_outputs));
        for (mut row, &h) in predictions.outer_iter_mut().zip(hyperparameters) {
            row.assign(&model.predict_flat(h));
        }
        model.diagnostics = ModelDiagnostics::GaussianProcess {
            estimators: model.estimators.iter().map(|e| e.diagnostics()).collect(),
            score_of_training_set: r2_score(targets.view(), predictions.view()),
        };

        Ok(model)
    }

    pub fn mode(&self) -> RegressorMode {
        self.mode
    }

    /// Predict all `F·L` flattened outputs at hyper-parameter `h`.
    fn predict_flat(&self, h: f64) -> Array1<f64> {
        match self.mode {
            RegressorMode::Independent => {
                let x = [h];
                self.estimators.iter().map(|e| e.predict(aview1(&x))).collect()
            }

            RegressorMode::Chained => {
                let mut input = Vec::with_capacity(self.estimators.len() + 1);
                input.push(h);
                for e in &self.estimators {
                    let y = e.predict(aview1(&input));
                    input.push(y);
                }
                Array1::from(input.split_off(1))
            }
        }
    }
}

#[cfg(feature = "gpr")]
impl Interpolator for GaussianProcessInterpolator {
    fn predict(&self, point: &[f64]) -> Result<Array2<f64>, InterpError> {
        validate_query(point, 1)?;
        let h = point[0];
        Ok(self
            .predict_flat(h)
            .into_shape_with_order((self.num_freqs, self.num_coeffs))?)
    }

    fn diagnostics(&self) -> &ModelDiagnostics {
        &self.diagnostics
    }
}

#[cfg(feature = "gpr")]
fn fit_independent(
    config: &GprConfig,
    x: ArrayView2<f64>,
    targets: ArrayView2<f64>,
) -> Result<Vec<GaussianProcess>, InterpError> {
    let fit_all = || {
        (0..targets.ncols())
            .into_par_iter()
            .map(|output| {
                GaussianProcess::fit(
                    config.kernel,
                    x.to_owned(),
                    targets.column(output),
                    config.normalize_y,
                    config.random_seed,
                    output,
                )
            })
            .collect::<Result<Vec<_>, _>>()
    };

    match config.num_jobs {
        Some(num_jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_jobs)
                .build()?;
            pool.install(fit_all)
        }
        None => fit_all(),
    }
}

#[cfg(feature = "gpr")]
fn fit_chained<'a>(
    config: &GprConfig,
    x: ArrayView2<'a, f64>,
    targets: ArrayView2<'a, f64>,
) -> Result<Vec<GaussianProcess>, InterpError> {
    (0..targets.ncols())
        .map(|output| {
            // The chain is trained on the true values of the outputs before
            // this one.
            let inputs =
                ndarray::concatenate(Axis(1), &[x, targets.slice_move(s![.., ..output])])?;
            GaussianProcess::fit(
                config.kernel,
                inputs,
                targets.column(output),
                config.normalize_y,
                config.random_seed,
                output,
            )
        })
        .collect()
}
