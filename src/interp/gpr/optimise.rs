// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A bounded Nelder-Mead simplex minimiser. Kernel objectives are cheap to
//! evaluate but their gradients are not worth deriving per kernel, so a
//! derivative-free method is used.

/// Minimise `f` starting from `x0`, keeping every coordinate within
/// `[lower, upper]`. Non-finite objective values are treated as infinitely
/// bad. Returns the best point found and its objective value.
pub(crate) fn minimise<F>(
    f: F,
    x0: &[f64],
    lower: f64,
    upper: f64,
    max_iterations: usize,
    tolerance: f64,
) -> (Vec<f64>, f64)
where
    F: Fn(&[f64]) -> f64,
{
    let clamp = |x: &mut Vec<f64>| x.iter_mut().for_each(|v| *v = v.clamp(lower, upper));
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let n = x0.len();
    let mut start = x0.to_vec();
    clamp(&mut start);

    // The initial simplex steps away from the start along each coordinate,
    // towards the interior if the start is near the upper bound.
    let step = 0.05 * (upper - lower);
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((start.clone(), eval(&start)));
    for i in 0..n {
        let mut x = start.clone();
        x[i] = if x[i] + step <= upper {
            x[i] + step
        } else {
            x[i] - step
        };
        let v = eval(&x);
        simplex.push((x, v));
    }

    for _ in 0..max_iterations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let best = simplex[0].1;
        let worst = simplex[n].1;
        if best.is_finite() && (worst - best).abs() <= tolerance * (1.0 + best.abs()) {
            break;
        }

        // Centroid of all but the worst point.
        let mut centroid = vec![0.0; n];
        for (x, _) in &simplex[..n] {
            centroid.iter_mut().zip(x).for_each(|(c, x)| *c += x / n as f64);
        }
        let along = |scale: f64| {
            let mut x: Vec<f64> = centroid
                .iter()
                .zip(&simplex[n].0)
                .map(|(c, w)| c + scale * (w - c))
                .collect();
            clamp(&mut x);
            x
        };

        let reflected = along(-1.0);
        let f_reflected = eval(&reflected);
        if f_reflected < best {
            let expanded = along(-2.0);
            let f_expanded = eval(&expanded);
            simplex[n] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }
        if f_reflected < simplex[n - 1].1 {
            simplex[n] = (reflected, f_reflected);
            continue;
        }

        let contracted = if f_reflected < worst {
            along(-0.5)
        } else {
            along(0.5)
        };
        let f_contracted = eval(&contracted);
        if f_contracted < worst.min(f_reflected) {
            simplex[n] = (contracted, f_contracted);
            continue;
        }

        // Shrink everything towards the best point.
        let best_x = simplex[0].0.clone();
        for (x, v) in simplex.iter_mut().skip(1) {
            x.iter_mut()
                .zip(&best_x)
                .for_each(|(x, b)| *x = b + 0.5 * (*x - b));
            *v = eval(x);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    simplex.swap_remove(0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_minimise_quadratic() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2);
        let (x, v) = minimise(f, &[0.0, 0.0], -10.0, 10.0, 1000, 1e-14);
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(x[1], -2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(v, 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_minimise_respects_bounds() {
        // The unconstrained minimum is at x = 5.
        let f = |x: &[f64]| (x[0] - 5.0).powi(2);
        let (x, _) = minimise(f, &[0.0], -1.0, 1.0, 500, 1e-14);
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_minimise_survives_infinite_regions() {
        let f = |x: &[f64]| {
            if x[0] < 0.0 {
                f64::NAN
            } else {
                (x[0] - 2.0).powi(2)
            }
        };
        let (x, v) = minimise(f, &[0.5], -5.0, 5.0, 500, 1e-14);
        assert!(v.is_finite());
        assert_abs_diff_eq!(x[0], 2.0, epsilon = 1e-4);
    }
}
