// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use ndarray::prelude::*;

use super::*;
use crate::ErrorKind;

/// A `[H, 2, 3]` tensor whose every entry is `f(h)` scaled by a different
/// constant, so that all outputs are exercised.
fn tensor_1d(hs: &Array1<f64>, f: impl Fn(f64) -> f64) -> ArrayD<f64> {
    Array3::from_shape_fn((hs.len(), 2, 3), |(i, j, k)| {
        f(hs[i]) * (1.0 + j as f64) * (1.0 + 0.5 * k as f64)
    })
    .into_dyn()
}

fn fitted_spline(hs: Array1<f64>, f: impl Fn(f64) -> f64, order: usize) -> HyperparameterInterpolator {
    let coeffs = tensor_1d(&hs, f);
    let grid = HyperparameterGrid::single(hs).unwrap();
    let interp =
        HyperparameterInterpolator::new(InterpolationStrategy::Spline { order }, grid, coeffs)
            .unwrap();
    interp.fit().unwrap();
    interp
}

fn expected_slice(value: f64) -> Array2<f64> {
    Array2::from_shape_fn((2, 3), |(j, k)| {
        value * (1.0 + j as f64) * (1.0 + 0.5 * k as f64)
    })
}

#[test]
fn test_cubic_spline_reproduces_cubics() {
    let f = |h: f64| h.powi(3) - 2.0 * h + 1.0;
    let interp = fitted_spline(array![0.0, 0.5, 1.0, 1.5, 2.0, 3.0], f, 3);
    for h in [0.25, 0.75, 1.2, 2.5, 2.99] {
        let result = interp.predict(&[h]).unwrap();
        assert_abs_diff_eq!(result, expected_slice(f(h)), epsilon = 1e-10);
    }
}

#[test]
fn test_spline_is_exact_at_nodes() {
    let hs = array![1.0, 1.3, 2.0, 2.2, 3.1, 4.0, 5.5];
    let f = |h: f64| (2.0 * h).sin() + 0.1 * h;
    let interp = fitted_spline(hs.clone(), f, 3);
    for &h in &hs {
        let result = interp.predict(&[h]).unwrap();
        assert_abs_diff_eq!(result, expected_slice(f(h)), epsilon = 1e-8);
    }
    assert_abs_diff_eq!(
        interp.model().unwrap().diagnostics().score_of_training_set(),
        1.0,
        epsilon = 1e-10
    );
}

#[test]
fn test_linear_spline_midpoint() {
    let hs = array![0.0, 1.0, 2.0];
    let interp = fitted_spline(hs, |h| if h < 0.5 { 2.0 } else { 4.0 }, 1);
    let result = interp.predict(&[0.5]).unwrap();
    assert_abs_diff_eq!(result, expected_slice(3.0), epsilon = 1e-12);
}

#[test]
fn test_quadratic_spline_reproduces_quadratics() {
    let f = |h: f64| h * h;
    let interp = fitted_spline(array![0.0, 1.0, 2.0, 3.0, 4.0], f, 2);
    for h in [0.5, 1.7, 3.25] {
        let result = interp.predict(&[h]).unwrap();
        assert_abs_diff_eq!(result, expected_slice(f(h)), epsilon = 1e-10);
    }
}

#[test]
fn test_decreasing_axis() {
    let f = |h: f64| 2.0 * h + 1.0;
    let interp = fitted_spline(array![3.0, 2.0, 1.0, 0.0], f, 1);
    let result = interp.predict(&[1.5]).unwrap();
    assert_abs_diff_eq!(result, expected_slice(4.0), epsilon = 1e-12);
    let result = interp.predict(&[3.0]).unwrap();
    assert_abs_diff_eq!(result, expected_slice(7.0), epsilon = 1e-12);
}

#[test]
fn test_bilinear_spline() {
    let a = array![0.0, 1.0, 2.0];
    let b = array![0.0, 10.0];
    let f = |a: f64, b: f64| a * b + a;
    let coeffs = Array4::from_shape_fn((3, 2, 1, 2), |(i, j, _, l)| {
        f(a[i], b[j]) + l as f64
    })
    .into_dyn();
    let grid = HyperparameterGrid::new(vec![a, b]).unwrap();
    let interp =
        HyperparameterInterpolator::new(InterpolationStrategy::Spline { order: 1 }, grid, coeffs)
            .unwrap();
    interp.fit().unwrap();

    let result = interp.predict(&[0.5, 5.0]).unwrap();
    assert_eq!(result.dim(), (1, 2));
    assert_abs_diff_eq!(result, array![[3.0, 4.0]], epsilon = 1e-12);

    // The wrong number of hyper-parameters.
    let result = interp.predict(&[0.5]);
    assert!(matches!(
        result,
        Err(InterpError::BadQueryDimension {
            got: 1,
            expected: 2
        })
    ));
}

#[test]
fn test_non_monotonic_grid_is_rejected() {
    let hs = array![0.0, 2.0, 1.0, 3.0];
    let coeffs = tensor_1d(&hs, |h| h);
    let grid = HyperparameterGrid::single(hs).unwrap();
    let result = HyperparameterInterpolator::new(InterpolationStrategy::default(), grid, coeffs);
    match result {
        Err(e @ InterpError::NonMonotonicGrid { axis: 0 }) => {
            assert_eq!(e.kind(), ErrorKind::Configuration)
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_bad_spline_orders_are_rejected() {
    let hs = array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let coeffs = tensor_1d(&hs, |h| h);
    let grid = HyperparameterGrid::single(hs).unwrap();

    for order in [0, 6, 7] {
        let result = InterpolationStrategy::Spline { order }.validate(&grid);
        match result {
            Err(e @ InterpError::BadSplineOrder { .. }) => {
                assert_eq!(e.kind(), ErrorKind::Configuration)
            }
            other => panic!("unexpected result for order {order}: {other:?}"),
        }
    }

    let result = HyperparameterInterpolator::new(
        InterpolationStrategy::Spline { order: 4 },
        grid,
        coeffs,
    );
    match result {
        Err(e @ InterpError::UnsupportedSplineOrder(4)) => {
            assert_eq!(e.kind(), ErrorKind::Configuration)
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_non_finite_queries_are_rejected() {
    for order in [1, 2, 3] {
        let interp = fitted_spline(array![0.0, 1.0, 2.0, 3.0], |h| h, order);
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            match interp.predict(&[bad]) {
                Err(e @ InterpError::NonFiniteQuery { axis: 0, .. }) => {
                    assert_eq!(e.kind(), ErrorKind::DimensionMismatch)
                }
                other => panic!("unexpected result for {bad}: {other:?}"),
            }
        }
    }

    let grid = HyperparameterGrid::new(vec![array![0.0, 1.0], array![0.0, 1.0]]).unwrap();
    let coeffs = Array4::<f64>::zeros((2, 2, 1, 1)).into_dyn();
    let interp =
        HyperparameterInterpolator::new(InterpolationStrategy::Spline { order: 1 }, grid, coeffs)
            .unwrap();
    interp.fit().unwrap();
    let result = interp.predict(&[0.5, f64::NAN]);
    assert!(matches!(
        result,
        Err(InterpError::NonFiniteQuery { axis: 1, .. })
    ));
}

#[test]
fn test_predict_before_fit() {
    let hs = array![0.0, 1.0, 2.0, 3.0];
    let coeffs = tensor_1d(&hs, |h| h);
    let grid = HyperparameterGrid::single(hs).unwrap();
    let interp =
        HyperparameterInterpolator::new(InterpolationStrategy::default(), grid, coeffs).unwrap();
    assert!(!interp.is_fitted());

    let err = interp.predict(&[1.5]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelNotReady);
    assert!(interp.model().is_err());

    interp.fit().unwrap();
    assert!(interp.is_fitted());
    assert!(interp.predict(&[1.5]).is_ok());
}

#[test]
fn test_tensor_shape_mismatch() {
    let hs = array![0.0, 1.0, 2.0, 3.0];
    let grid = HyperparameterGrid::single(hs.clone()).unwrap();

    // Missing the coefficient axis.
    let coeffs = Array2::<f64>::zeros((4, 2)).into_dyn();
    match HyperparameterInterpolator::new(InterpolationStrategy::default(), grid.clone(), coeffs) {
        Err(e @ InterpError::BadTensorRank { got: 2, expected: 3 }) => {
            assert_eq!(e.kind(), ErrorKind::DimensionMismatch)
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // One hyper-parameter sample too many.
    let coeffs = Array3::<f64>::zeros((5, 2, 3)).into_dyn();
    match HyperparameterInterpolator::new(InterpolationStrategy::default(), grid, coeffs) {
        Err(e @ InterpError::TensorGridMismatch { .. }) => {
            assert_eq!(e.kind(), ErrorKind::DimensionMismatch)
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_multi_axis_gpr_is_rejected() {
    let grid = HyperparameterGrid::new(vec![array![0.0, 1.0, 2.0], array![0.0, 1.0]]).unwrap();
    let result = InterpolationStrategy::GaussianProcess(GprConfig::default()).validate(&grid);
    let err = result.unwrap_err();
    if cfg!(feature = "gpr") {
        assert!(matches!(err, InterpError::MultiAxisGpr(2)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    } else {
        assert_eq!(err.kind(), ErrorKind::MissingDependency);
    }
}

#[test]
fn test_with_strategy_is_unfitted() {
    let interp = fitted_spline(array![0.0, 1.0, 2.0, 3.0], |h| h * h, 3);
    let other = interp
        .with_strategy(InterpolationStrategy::Spline { order: 1 })
        .unwrap();
    assert!(interp.is_fitted());
    assert!(!other.is_fitted());
    assert_eq!(other.strategy(), &InterpolationStrategy::Spline { order: 1 });
    assert_eq!(other.coefficients(), interp.coefficients());
}

#[test]
fn test_strategy_serde() {
    let strategy: InterpolationStrategy = serde_json::from_str(r#"{"method": "spline"}"#).unwrap();
    assert_eq!(strategy, InterpolationStrategy::Spline { order: 3 });

    let strategy: InterpolationStrategy = serde_json::from_str(
        r#"{"method": "gaussian_process", "kernel": "Matern_1_5", "regressor": "RegressorChain"}"#,
    )
    .unwrap();
    match strategy {
        InterpolationStrategy::GaussianProcess(config) => {
            assert_eq!(config.kernel, gpr::KernelType::Matern32);
            assert_eq!(config.regressor, gpr::RegressorMode::Chained);
            assert!(config.normalize_y);
            assert_eq!(config.num_jobs, None);
        }
        other => panic!("unexpected strategy: {other:?}"),
    }

    let result: Result<InterpolationStrategy, _> =
        serde_json::from_str(r#"{"method": "gaussian_process", "kernel": "Cauchy"}"#);
    assert!(result.is_err());
}
