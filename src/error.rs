// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all emulator-related errors. This should be the *only*
//! error enum a caller needs to handle; module errors convert into it.

use thiserror::Error;

use crate::{BasisError, ConfigError, GridError, InterpError};

/// The broad category of an error. Detailed messages live in the error enums
/// themselves; this is what callers should branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An unknown name, an invalid option or an option that doesn't make sense
    /// for the supplied data.
    Configuration,

    /// Inconsistent lengths or shapes among the inputs.
    DimensionMismatch,

    /// A requested backend wasn't compiled in.
    MissingDependency,

    /// Something was read before the interpolation model was fitted.
    ModelNotReady,

    /// A linear-algebra failure (e.g. a singular matrix).
    Numerical,

    /// A file couldn't be read.
    Io,
}

#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("The pixel mask has {mask} indices, but the basis has {pixels} pixels")]
    MaskBasisMismatch { mask: usize, pixels: usize },

    #[error("The basis has {basis} coefficients, but the coefficient tensor has {tensor}")]
    CoefficientCountMismatch { basis: usize, tensor: usize },

    #[error("The coefficient tensor has {tensor} frequencies, but {freqs} frequencies were supplied")]
    FrequencyMismatch { tensor: usize, freqs: usize },

    #[error("No frequencies were supplied")]
    NoFrequencies,

    #[error("nside must be between 1 and {}, but got {0}", crate::constants::MAX_NSIDE)]
    BadNside(u32),

    #[error("Unmasked pixel index at position {position} is 0, but the indices were declared to be one-based")]
    ZeroOneBasedIndex { position: usize },

    #[error("Unmasked pixel index {index} is out of range; nside {nside} has only {num_pixels} pixels")]
    MaskIndexOutOfRange {
        index: usize,
        nside: u32,
        num_pixels: usize,
    },

    #[error("{diagnostic} is not available for the fitted interpolation strategy")]
    DiagnosticUnavailable { diagnostic: &'static str },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Interp(#[from] InterpError),

    #[error(transparent)]
    Basis(#[from] BasisError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EmulatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EmulatorError::MaskBasisMismatch { .. }
            | EmulatorError::CoefficientCountMismatch { .. }
            | EmulatorError::FrequencyMismatch { .. }
            | EmulatorError::NoFrequencies
            | EmulatorError::ZeroOneBasedIndex { .. }
            | EmulatorError::MaskIndexOutOfRange { .. } => ErrorKind::DimensionMismatch,
            EmulatorError::BadNside(_) | EmulatorError::DiagnosticUnavailable { .. } => {
                ErrorKind::Configuration
            }
            EmulatorError::Grid(e) => e.kind(),
            EmulatorError::Interp(e) => e.kind(),
            EmulatorError::Basis(e) => e.kind(),
            EmulatorError::Config(e) => e.kind(),
        }
    }
}
