// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod config_files;
mod emulate;

use ndarray::prelude::*;

use beam_emulator::{EmulatorInputs, HyperparameterGrid};

/// Synthetic emulator inputs: `num_freqs` frequencies, dipole heights of 1, 2
/// and 3 m, 4 coefficients and 6 above-horizon pixels (given one-based) on an
/// nside-2 sky.
fn get_inputs(num_freqs: usize) -> EmulatorInputs {
    let heights = array![1.0, 2.0, 3.0];
    let coefficients = Array3::from_shape_fn((heights.len(), num_freqs, 4), |(i, j, k)| {
        let h = heights[i];
        (1.0 + 0.1 * j as f64) * (h * (k + 1) as f64).cos() + k as f64
    })
    .into_dyn();
    let basis = Array2::from_shape_fn((6, 4), |(p, l)| {
        if p % 4 == l {
            1.0
        } else {
            0.25 * (p as f64 - l as f64)
        }
    });

    EmulatorInputs {
        frequencies: Array1::linspace(50e6, 50e6 + (num_freqs - 1) as f64 * 1e6, num_freqs),
        nside: 2,
        basis,
        coefficients,
        hyperparameters: HyperparameterGrid::single(heights).unwrap(),
        unmasked_indices: vec![1, 2, 3, 4, 5, 6],
    }
}
