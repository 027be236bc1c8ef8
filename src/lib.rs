// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Emulate antenna beam patterns at arbitrary hyper-parameters.

A sparse set of basis coefficients, precomputed at discrete hyper-parameter
values (e.g. dipole height, soil dielectric), is interpolated to a query
hyper-parameter and projected through a fixed linear basis into the pixels
of a spherical (HEALPix-like) pixelisation, one row per frequency.
 */

pub mod basis;
pub mod config;
pub mod constants;
pub mod emulator;
mod error;
pub mod grid;
pub mod interp;
pub(crate) mod math;
pub mod memo;

// Re-exports.
pub use basis::{BasisError, BasisTransform};
pub use config::{read_config_file, ConfigError, EmulatorConfig};
pub use emulator::{nside_to_npix, BeamEmulator, EmulatorInputs};
pub use error::{EmulatorError, ErrorKind};
pub use grid::{GridError, HyperparameterGrid};
pub use interp::{
    gpr::{GprConfig, KernelHyperparameters, KernelType, RegressorMode},
    EstimatorDiagnostics, HyperparameterInterpolator, InterpError, InterpolationStrategy,
    Interpolator, ModelDiagnostics,
};
pub use math::LinalgError;
pub use memo::Memo;
