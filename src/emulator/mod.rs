// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The beam emulator.
//!
//! A [`BeamEmulator`] is built from precomputed basis coefficients sampled on
//! a hyper-parameter grid. Querying it interpolates the coefficients at a new
//! hyper-parameter point, projects them through the basis, and places the
//! resulting above-horizon pixels on the sky. The interpolation model is
//! fitted once, on the first query (or an explicit [`BeamEmulator::fit`]).


use log::{debug, warn};
use ndarray::prelude::*;

use crate::{
    constants::MAX_NSIDE, BasisTransform, EmulatorConfig, EmulatorError, EstimatorDiagnostics,
    HyperparameterGrid, HyperparameterInterpolator, InterpolationStrategy, KernelHyperparameters,
    ModelDiagnostics,
};

/// The number of pixels covering the whole sky for a HEALPix-style
/// resolution parameter. `nside` must not exceed [`MAX_NSIDE`].
pub fn nside_to_npix(nside: u32) -> usize {
    12 * (nside as usize).pow(2)
}

/// The data an emulator is built from. Everything here must already be
/// decoded from whatever files it came from.
#[derive(Debug, Clone)]
pub struct EmulatorInputs {
    /// The frequencies the coefficients were computed at. Only their count is
    /// used, but they are kept for the caller.
    pub frequencies: Array1<f64>,

    /// The pixelisation resolution parameter. The full sky has `12 nside²`
    /// pixels.
    pub nside: u32,

    /// `[num_unmasked_pixels, num_coeffs]`.
    pub basis: Array2<f64>,

    /// `[H_1, ..., H_n, num_freqs, num_coeffs]`.
    pub coefficients: ArrayD<f64>,

    pub hyperparameters: HyperparameterGrid,

    /// The full-sky index of each row of the basis, i.e. the above-horizon
    /// pixels. Whether these are one-based is set by the config.
    pub unmasked_indices: Vec<usize>,
}

#[derive(Debug)]
pub struct BeamEmulator {
    freqs: Array1<f64>,
    nside: u32,

    /// Zero-based full-sky indices of the basis's pixels.
    unmasked_indices: Vec<usize>,

    interpolator: HyperparameterInterpolator,
    basis: BasisTransform,
    config: EmulatorConfig,
}

impl BeamEmulator {
    /// Validate the inputs against each other and the config. Nothing is
    /// fitted yet.
    pub fn new(
        inputs: EmulatorInputs,
        config: EmulatorConfig,
    ) -> Result<BeamEmulator, EmulatorError> {
        let EmulatorInputs {
            frequencies,
            nside,
            basis,
            coefficients,
            hyperparameters,
            unmasked_indices,
        } = inputs;

        if frequencies.is_empty() {
            return Err(EmulatorError::NoFrequencies);
        }
        if nside == 0 || nside > MAX_NSIDE {
            return Err(EmulatorError::BadNside(nside));
        }

        let basis = BasisTransform::new(basis, config.coefficient_order)?;
        if unmasked_indices.len() != basis.num_pixels() {
            return Err(EmulatorError::MaskBasisMismatch {
                mask: unmasked_indices.len(),
                pixels: basis.num_pixels(),
            });
        }

        let interpolator = HyperparameterInterpolator::new(
            config.interpolation.clone(),
            hyperparameters,
            coefficients,
        )?;
        // The interpolator has checked that the tensor ends with frequency and
        // coefficient axes.
        let shape = interpolator.coefficients().shape().to_vec();
        let (tensor_freqs, tensor_coeffs) = (shape[shape.len() - 2], shape[shape.len() - 1]);
        if tensor_coeffs != basis.num_coeffs() {
            return Err(EmulatorError::CoefficientCountMismatch {
                basis: basis.num_coeffs(),
                tensor: tensor_coeffs,
            });
        }
        if tensor_freqs != frequencies.len() {
            return Err(EmulatorError::FrequencyMismatch {
                tensor: tensor_freqs,
                freqs: frequencies.len(),
            });
        }

        let unmasked_indices =
            normalise_mask(unmasked_indices, config.one_based_indices, nside)?;

        debug!(
            "Emulator: {} frequencies, {} hyper-parameter axes {:?}, {} of {} coefficients, {} unmasked of {} pixels",
            frequencies.len(),
            interpolator.grid().num_axes(),
            interpolator.grid().shape(),
            basis.coefficient_order(),
            basis.num_coeffs(),
            unmasked_indices.len(),
            nside_to_npix(nside),
        );

        Ok(BeamEmulator {
            freqs: frequencies,
            nside,
            unmasked_indices,
            interpolator,
            basis,
            config,
        })
    }

    /// Fit the interpolation model now, rather than on the first query. This
    /// does nothing if the model is already fitted.
    pub fn fit(&self) -> Result<(), EmulatorError> {
        self.interpolator.fit()?;
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.interpolator.is_fitted()
    }

    /// Make a new emulator with the same data, but a different interpolation
    /// strategy. The new model is fitted before it's returned; this emulator
    /// is unaffected.
    pub fn refit(&self, strategy: InterpolationStrategy) -> Result<BeamEmulator, EmulatorError> {
        let interpolator = self.interpolator.with_strategy(strategy.clone())?;
        interpolator.fit()?;
        Ok(BeamEmulator {
            freqs: self.freqs.clone(),
            nside: self.nside,
            unmasked_indices: self.unmasked_indices.clone(),
            interpolator,
            basis: self.basis.clone(),
            config: EmulatorConfig {
                interpolation: strategy,
                ..self.config.clone()
            },
        })
    }

    /// The interpolated, untruncated coefficients (`[num_freqs, num_coeffs]`)
    /// at a hyper-parameter point. The model is fitted if necessary.
    pub fn predict_coefficients(&self, point: &[f64]) -> Result<Array2<f64>, EmulatorError> {
        let model = self.interpolator.fit()?;
        let grid = self.interpolator.grid();
        if point.len() == grid.num_axes()
            && point.iter().all(|v| v.is_finite())
            && !grid.contains(point)
        {
            warn!("Hyper-parameters {point:?} are outside the training grid; the emulated beam may be inaccurate");
        }
        Ok(model.predict(point)?)
    }

    /// Emulate the beam at a hyper-parameter point. The result has one row per
    /// frequency; the columns are either the above-horizon pixels (in basis
    /// order) or the full sky, depending on `return_beam_above_horizon`. On the
    /// full sky, pixels below the horizon are zero.
    pub fn query(&self, point: &[f64]) -> Result<Array2<f64>, EmulatorError> {
        let coeffs = self.predict_coefficients(point)?;
        let beam = self.basis.project(coeffs.view())?;
        if self.config.return_beam_above_horizon {
            return Ok(beam);
        }

        let mut full_sky = Array2::zeros((self.freqs.len(), self.num_pixels()));
        for (mut full_sky, beam) in full_sky.outer_iter_mut().zip(beam.outer_iter()) {
            for (&i_pixel, &value) in self.unmasked_indices.iter().zip(beam) {
                full_sky[i_pixel] = value;
            }
        }
        Ok(full_sky)
    }

    /// Goodness-of-fit information from the fitted model.
    pub fn diagnostics(&self) -> Result<&ModelDiagnostics, EmulatorError> {
        Ok(self.interpolator.model()?.diagnostics())
    }

    /// The R² of the spline re-evaluated at the training nodes.
    pub fn spline_score_of_training_set(&self) -> Result<f64, EmulatorError> {
        match self.diagnostics()? {
            ModelDiagnostics::Spline {
                score_of_training_set,
            } => Ok(*score_of_training_set),
            ModelDiagnostics::GaussianProcess { .. } => {
                Err(EmulatorError::DiagnosticUnavailable {
                    diagnostic: "spline_score_of_training_set",
                })
            }
        }
    }

    /// The R² of the Gaussian-process predictions at the training nodes.
    pub fn gpr_score_of_training_set(&self) -> Result<f64, EmulatorError> {
        self.gpr_diagnostics("gpr_score_of_training_set")
            .map(|(_, score)| score)
    }

    /// The log marginal likelihood of each estimator (one per frequency and
    /// coefficient, frequency-major).
    pub fn estimator_log_marginal_likelihoods(&self) -> Result<Vec<f64>, EmulatorError> {
        self.gpr_diagnostics("estimator_log_marginal_likelihoods")
            .map(|(estimators, _)| {
                estimators
                    .iter()
                    .map(|e| e.log_marginal_likelihood)
                    .collect()
            })
    }

    /// The optimised kernel hyper-parameters of each estimator.
    pub fn estimator_hyper_parameters(&self) -> Result<Vec<KernelHyperparameters>, EmulatorError> {
        self.gpr_diagnostics("estimator_hyper_parameters")
            .map(|(estimators, _)| estimators.iter().map(|e| e.kernel).collect())
    }

    fn gpr_diagnostics(
        &self,
        diagnostic: &'static str,
    ) -> Result<(&[EstimatorDiagnostics], f64), EmulatorError> {
        match self.diagnostics()? {
            ModelDiagnostics::GaussianProcess {
                estimators,
                score_of_training_set,
            } => Ok((estimators, *score_of_training_set)),
            ModelDiagnostics::Spline { .. } => {
                Err(EmulatorError::DiagnosticUnavailable { diagnostic })
            }
        }
    }

    pub fn freqs(&self) -> ArrayView1<f64> {
        self.freqs.view()
    }

    pub fn nside(&self) -> u32 {
        self.nside
    }

    /// The number of pixels on the full sky.
    pub fn num_pixels(&self) -> usize {
        nside_to_npix(self.nside)
    }

    /// The zero-based full-sky indices of the above-horizon pixels.
    pub fn unmasked_indices(&self) -> &[usize] {
        &self.unmasked_indices
    }

    pub fn basis(&self) -> &BasisTransform {
        &self.basis
    }

    pub fn interpolator(&self) -> &HyperparameterInterpolator {
        &self.interpolator
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }
}

/// Make pixel indices zero-based (if necessary) and check that they're on the
/// sky.
pub(crate) fn normalise_mask(
    mut indices: Vec<usize>,
    one_based: bool,
    nside: u32,
) -> Result<Vec<usize>, EmulatorError> {
    if one_based {
        debug!("Shifting one-based pixel indices to zero-based");
        for (position, index) in indices.iter_mut().enumerate() {
            *index = index
                .checked_sub(1)
                .ok_or(EmulatorError::ZeroOneBasedIndex { position })?;
        }
    }

    let num_pixels = nside_to_npix(nside);
    if let Some(&index) = indices.iter().find(|&&i| i >= num_pixels) {
        return Err(EmulatorError::MaskIndexOutOfRange {
            index,
            nside,
            num_pixels,
        });
    }
    Ok(indices)
}
