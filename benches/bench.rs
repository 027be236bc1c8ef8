// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::*;
use ndarray::prelude::*;

use beam_emulator::{
    BeamEmulator, EmulatorConfig, EmulatorInputs, HyperparameterGrid, InterpolationStrategy,
};

/// 10 dipole heights, 32 frequencies, 64 coefficients and 1000 above-horizon
/// pixels on an nside-16 sky.
fn get_inputs() -> EmulatorInputs {
    let heights = Array1::linspace(1.0, 2.0, 10);
    let coefficients = Array3::from_shape_fn((10, 32, 64), |(i, j, k)| {
        (heights[i] * (1.0 + 0.01 * j as f64) * (k + 1) as f64).sin()
    })
    .into_dyn();
    let basis = Array2::from_shape_fn((1000, 64), |(p, l)| ((p * 31 + l * 17) % 101) as f64 / 101.0);
    EmulatorInputs {
        frequencies: Array1::linspace(100e6, 131e6, 32),
        nside: 16,
        basis,
        coefficients,
        hyperparameters: HyperparameterGrid::single(heights).unwrap(),
        unmasked_indices: (0..1000).collect(),
    }
}

fn spline(c: &mut Criterion) {
    let config = EmulatorConfig {
        one_based_indices: false,
        ..Default::default()
    };

    c.bench_function("cubic spline fit", |b| {
        b.iter_batched(
            || BeamEmulator::new(get_inputs(), config.clone()).unwrap(),
            |emulator| emulator.fit().unwrap(),
            BatchSize::SmallInput,
        )
    });

    let emulator = BeamEmulator::new(get_inputs(), config.clone()).unwrap();
    emulator.fit().unwrap();
    c.bench_function("cubic spline full-sky query", |b| {
        b.iter(|| emulator.query(black_box(&[1.37])).unwrap())
    });

    let emulator = BeamEmulator::new(
        get_inputs(),
        EmulatorConfig {
            coefficient_order: Some(16),
            return_beam_above_horizon: true,
            interpolation: InterpolationStrategy::Spline { order: 1 },
            ..config
        },
    )
    .unwrap();
    emulator.fit().unwrap();
    c.bench_function("truncated linear spline query", |b| {
        b.iter(|| emulator.query(black_box(&[1.37])).unwrap())
    });
}

criterion_group!(benches, spline);
criterion_main!(benches);
