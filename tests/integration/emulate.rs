// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the public emulator API.

use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::get_inputs;
use beam_emulator::{
    BeamEmulator, EmulatorConfig, ErrorKind, HyperparameterGrid, InterpolationStrategy,
};

#[test]
fn test_two_frequency_example() {
    let inputs = get_inputs(2);
    let coeffs = inputs.coefficients.clone();
    let basis = inputs.basis.clone();
    let config = EmulatorConfig {
        return_beam_above_horizon: true,
        interpolation: InterpolationStrategy::Spline { order: 1 },
        ..Default::default()
    };
    let emulator = BeamEmulator::new(inputs, config).unwrap();

    let beam = emulator.query(&[2.0]).unwrap();
    assert_eq!(beam.dim(), (2, 6));
    for (i_freq, beam) in beam.outer_iter().enumerate() {
        let expected = basis.dot(&coeffs.slice(s![1, i_freq, ..]));
        assert_abs_diff_eq!(beam, expected, epsilon = 1e-12);
    }
}

#[test]
fn test_full_sky_is_zero_below_the_horizon() {
    let config = EmulatorConfig {
        interpolation: InterpolationStrategy::Spline { order: 2 },
        ..Default::default()
    };
    let emulator = BeamEmulator::new(get_inputs(3), config.clone()).unwrap();
    assert_eq!(emulator.unmasked_indices(), &[0, 1, 2, 3, 4, 5]);

    let beam = emulator.query(&[1.7]).unwrap();
    assert_eq!(beam.dim(), (3, 48));
    assert!(beam.slice(s![.., 6..]).iter().all(|&v| v == 0.0));
    assert!(beam.slice(s![.., ..6]).iter().any(|&v| v != 0.0));

    // The above-horizon part matches an above-horizon query.
    let above = BeamEmulator::new(
        get_inputs(3),
        EmulatorConfig {
            return_beam_above_horizon: true,
            ..config
        },
    )
    .unwrap()
    .query(&[1.7])
    .unwrap();
    assert_abs_diff_eq!(beam.slice(s![.., ..6]), above, epsilon = 1e-14);
}

#[test]
fn test_cubic_spline_reproduces_nodes() {
    // Cubic splines need at least 4 samples.
    let mut inputs = get_inputs(1);
    let err = BeamEmulator::new(inputs.clone(), EmulatorConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    inputs.hyperparameters =
        HyperparameterGrid::single(array![1.0, 2.0, 3.0, 4.0]).unwrap();
    let coeffs = Array3::from_shape_fn((4, 1, 4), |(i, _, k)| ((i + 1) * (k + 2)) as f64 % 7.0);
    inputs.coefficients = coeffs.clone().into_dyn();
    let emulator = BeamEmulator::new(inputs, EmulatorConfig::default()).unwrap();
    for (i, &h) in [1.0, 2.0, 3.0, 4.0].iter().enumerate() {
        let predicted = emulator.predict_coefficients(&[h]).unwrap();
        assert_abs_diff_eq!(predicted, coeffs.index_axis(Axis(0), i), epsilon = 1e-10);
    }
}

#[cfg(feature = "gpr")]
#[test]
fn test_gpr_emulator() {
    use beam_emulator::{GprConfig, KernelType};

    let config = EmulatorConfig {
        return_beam_above_horizon: true,
        interpolation: InterpolationStrategy::GaussianProcess(GprConfig {
            kernel: KernelType::Matern32,
            ..Default::default()
        }),
        ..Default::default()
    };
    let emulator = BeamEmulator::new(get_inputs(2), config).unwrap();
    let spline = emulator
        .refit(InterpolationStrategy::Spline { order: 1 })
        .unwrap();

    // Both interpolate the training data.
    assert_abs_diff_eq!(
        emulator.query(&[3.0]).unwrap(),
        spline.query(&[3.0]).unwrap(),
        epsilon = 1e-3
    );
    assert_eq!(emulator.estimator_log_marginal_likelihoods().unwrap().len(), 8);
    let params = emulator.estimator_hyper_parameters().unwrap();
    assert!(params.iter().all(|p| p.alpha.is_none()));
}
