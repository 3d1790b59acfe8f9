//! Locally weighted linear regression (LOESS) in the Cleveland formulation.
//!
//! Each smoothed value is the prediction of a weighted straight-line fit over
//! the `bandwidth * n` nearest control points, weighted with the tricube
//! kernel. Robustness passes down-weight points with large residuals using
//! bisquare weights scaled by six times the median absolute residual.

use ordered_float::OrderedFloat;

use crate::error::{ChromError, Result};

#[derive(Clone, Copy, Debug)]
pub struct Loess {
    pub bandwidth: f64,
    pub robustness_iterations: usize,
    pub accuracy: f64,
}

impl Default for Loess {
    fn default() -> Self {
        Loess {
            bandwidth: 0.3,
            robustness_iterations: 2,
            accuracy: 1e-12,
        }
    }
}

#[inline(always)]
fn tricube(x: f64) -> f64 {
    let abs_x = x.abs();
    if abs_x >= 1.0 {
        return 0.0;
    }
    let tmp = 1.0 - abs_x * abs_x * abs_x;
    tmp * tmp * tmp
}

impl Loess {
    pub fn new(bandwidth: f64, robustness_iterations: usize, accuracy: f64) -> Self {
        Loess { bandwidth, robustness_iterations, accuracy }
    }

    /// Smooth `y` over the strictly increasing abscissa `x`.
    pub fn smooth(&self, x: &[f64], y: &[f64]) -> Result<Vec<f64>> {
        let n = x.len();
        if n != y.len() {
            return Err(ChromError::FitFailure(format!(
                "abscissa and ordinate differ in length ({} vs. {})",
                n,
                y.len()
            )));
        }
        if n == 0 {
            return Err(ChromError::FitFailure("no control points".into()));
        }
        if !(self.bandwidth > 0.0 && self.bandwidth <= 1.0) {
            return Err(ChromError::FitFailure(format!(
                "bandwidth {} not in (0, 1]",
                self.bandwidth
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ChromError::FitFailure("non-finite control point".into()));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ChromError::FitFailure("abscissa is not strictly increasing".into()));
        }

        if n <= 2 {
            return Ok(y.to_vec());
        }

        let bandwidth_in_points = (self.bandwidth * n as f64) as usize;
        if bandwidth_in_points < 2 {
            return Err(ChromError::FitFailure(format!(
                "bandwidth {} covers {} of {} points, at least 2 are required",
                self.bandwidth, bandwidth_in_points, n
            )));
        }

        let mut smoothed = vec![0.0; n];
        let mut residuals = vec![0.0; n];
        let mut robustness_weights = vec![1.0; n];

        for iteration in 0..=self.robustness_iterations {
            // [left, right] always spans `bandwidth_in_points` neighbours of i
            let mut left = 0usize;
            let mut right = bandwidth_in_points - 1;

            for i in 0..n {
                let xi = x[i];
                if i > 0 && right + 1 < n && x[right + 1] - xi < xi - x[left] {
                    left += 1;
                    right += 1;
                }

                let edge = if xi - x[left] > x[right] - xi { left } else { right };
                let denom = (1.0 / (x[edge] - xi)).abs();

                let mut sum_weights = 0.0;
                let mut sum_x = 0.0;
                let mut sum_x_squared = 0.0;
                let mut sum_y = 0.0;
                let mut sum_xy = 0.0;

                for k in left..=right {
                    let dist = (x[k] - xi).abs();
                    let w = tricube(dist * denom) * robustness_weights[k];
                    let xkw = x[k] * w;
                    sum_weights += w;
                    sum_x += xkw;
                    sum_x_squared += x[k] * xkw;
                    sum_y += y[k] * w;
                    sum_xy += y[k] * xkw;
                }

                if sum_weights <= 0.0 {
                    // every neighbour was rejected as an outlier, keep the observation
                    smoothed[i] = y[i];
                    residuals[i] = 0.0;
                    continue;
                }

                let mean_x = sum_x / sum_weights;
                let mean_y = sum_y / sum_weights;
                let mean_xy = sum_xy / sum_weights;
                let mean_x_squared = sum_x_squared / sum_weights;

                let variance = mean_x_squared - mean_x * mean_x;
                let beta = if variance.abs().sqrt() < self.accuracy {
                    0.0
                } else {
                    (mean_xy - mean_x * mean_y) / variance
                };
                let alpha = mean_y - beta * mean_x;

                smoothed[i] = beta * xi + alpha;
                residuals[i] = (y[i] - smoothed[i]).abs();
            }

            if iteration == self.robustness_iterations {
                break;
            }

            let mut sorted: Vec<OrderedFloat<f64>> =
                residuals.iter().copied().map(OrderedFloat).collect();
            sorted.sort_unstable();
            let median_residual = sorted[n / 2].into_inner();

            if median_residual.abs() < self.accuracy {
                break;
            }

            for i in 0..n {
                let arg = residuals[i] / (6.0 * median_residual);
                robustness_weights[i] = if arg >= 1.0 {
                    0.0
                } else {
                    let w = 1.0 - arg * arg;
                    w * w
                };
            }
        }

        if smoothed.iter().any(|v| !v.is_finite()) {
            return Err(ChromError::FitFailure("smoothing produced non-finite values".into()));
        }
        Ok(smoothed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_data_is_reproduced() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let smoothed = Loess::new(0.5, 2, 1e-12).smooth(&x, &y).unwrap();
        for (s, t) in smoothed.iter().zip(y.iter()) {
            assert!((s - t).abs() < 1e-9, "{} vs {}", s, t);
        }
    }

    #[test]
    fn test_outlier_is_down_weighted() {
        let x: Vec<f64> = (0..30).map(|i| i as f64).collect();
        // small alternating noise keeps the median residual above zero
        let mut y: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 10.1 } else { 9.9 }).collect();
        y[15] = 1000.0;
        let smoothed = Loess::new(0.4, 4, 1e-12).smooth(&x, &y).unwrap();
        assert!((smoothed[15] - 10.0).abs() < 1.0, "smoothed outlier {}", smoothed[15]);
        assert!((smoothed[0] - 10.0).abs() < 0.5);
    }

    #[test]
    fn test_too_narrow_bandwidth_fails() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![1.0, 2.0, 1.0, 2.0];
        let result = Loess::new(0.3, 2, 1e-12).smooth(&x, &y);
        assert!(matches!(result, Err(ChromError::FitFailure(_))));
    }

    #[test]
    fn test_unsorted_abscissa_fails() {
        let x = vec![0.0, 2.0, 1.0];
        let y = vec![1.0, 2.0, 3.0];
        assert!(Loess::default().smooth(&x, &y).is_err());
    }

    #[test]
    fn test_two_points_pass_through() {
        let smoothed = Loess::default().smooth(&[0.0, 1.0], &[3.0, 4.0]).unwrap();
        assert_eq!(smoothed, vec![3.0, 4.0]);
    }
}
