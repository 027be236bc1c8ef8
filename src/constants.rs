// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

/// The largest supported pixelisation resolution parameter.
pub const MAX_NSIDE: u32 = 1 << 29;

/// The spline order used when none is specified (cubic).
pub const DEFAULT_SPLINE_ORDER: usize = 3;

/// The number of times the Gaussian-process kernel optimiser is restarted
/// from random initial hyper-parameters (in addition to the initial guess).
pub const GPR_OPTIMISER_RESTARTS: usize = 20;

/// Added to the diagonal of every Gaussian-process kernel matrix.
pub const GPR_JITTER: f64 = 1e-10;

/// The lower bound of every kernel hyper-parameter.
pub const KERNEL_HYPERPARAMETER_MIN: f64 = 1e-5;

/// The upper bound of every kernel hyper-parameter.
pub const KERNEL_HYPERPARAMETER_MAX: f64 = 1e5;

/// The initial value of the rational-quadratic kernel's scale mixture.
pub const RATIONAL_QUADRATIC_ALPHA: f64 = 1.5;

/// The maximum number of simplex iterations per optimiser start.
pub const OPTIMISER_MAX_ITERATIONS: usize = 400;

/// The optimiser stops when the simplex's objective values agree to within
/// this (relative) tolerance.
pub const OPTIMISER_TOLERANCE: f64 = 1e-10;
