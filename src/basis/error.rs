// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with basis projections.

use thiserror::Error;

use crate::{ErrorKind, LinalgError};

#[derive(Error, Debug)]
pub enum BasisError {
    #[error("The coefficient order must satisfy 1 <= K <= {num_coeffs} (the number of basis coefficients), but got K = {order}")]
    BadCoefficientOrder { order: usize, num_coeffs: usize },

    #[error("Expected {expected} values, but got {got}")]
    Length { got: usize, expected: usize },

    #[error("The basis has no pixels")]
    NoPixels,

    #[error("Couldn't invert the basis: {0}")]
    Linalg(#[from] LinalgError),
}

impl BasisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BasisError::BadCoefficientOrder { .. }
            | BasisError::Length { .. }
            | BasisError::NoPixels => ErrorKind::DimensionMismatch,
            BasisError::Linalg(e) => e.kind(),
        }
    }
}
