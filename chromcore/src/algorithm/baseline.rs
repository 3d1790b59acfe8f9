use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::algorithm::extrema::find_minima;
use crate::algorithm::loess::Loess;
use crate::algorithm::spline::CubicSpline;
use crate::config::BaselineEstimatorConfig;
use crate::error::{ChromError, Result};

/// Smooth background curve over `[min_x, max_x]` of its control points.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaselineFunction {
    pub control_indices: Vec<usize>,
    pub control_x: Vec<f64>,
    pub control_y: Vec<f64>,
    pub smoothed_y: Vec<f64>,
    spline: CubicSpline,
}

impl BaselineFunction {
    pub fn min_x(&self) -> f64 {
        self.spline.min_x()
    }

    pub fn max_x(&self) -> f64 {
        self.spline.max_x()
    }

    /// Baseline at `x`; outside the control point span this is a
    /// `DomainEvaluation` error.
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        self.spline.evaluate(x)
    }
}

/// Fits a LOESS curve through local minima of a signal.
#[derive(Clone, Debug)]
pub struct BaselineEstimator {
    pub config: BaselineEstimatorConfig,
}

impl BaselineEstimator {
    pub fn new(config: BaselineEstimatorConfig) -> Self {
        BaselineEstimator { config }
    }

    /// Ascending, deduplicated minimum indices, always containing the first
    /// and the last index of the signal.
    pub fn control_indices(&self, signal: &[f64]) -> Vec<usize> {
        if signal.is_empty() {
            return Vec::new();
        }
        let last = signal.len() - 1;
        find_minima(signal, self.config.minima_window)
            .into_iter()
            .chain([0, last])
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Fit the baseline of `signal` sampled at `domain` (time or index).
    pub fn estimate(&self, domain: &[f64], signal: &[f64]) -> Result<BaselineFunction> {
        if domain.len() != signal.len() {
            return Err(ChromError::LengthMismatch { signal: signal.len(), time: domain.len() });
        }

        let control_indices = self.control_indices(signal);
        if control_indices.len() < 2 {
            return Err(ChromError::FitFailure(format!(
                "at least 2 control points are required, got {}",
                control_indices.len()
            )));
        }

        let control_x: Vec<f64> = control_indices.iter().map(|&i| domain[i]).collect();
        let control_y: Vec<f64> = control_indices.iter().map(|&i| signal[i]).collect();

        let loess = Loess::new(
            self.config.bandwidth,
            self.config.robustness_iterations,
            self.config.accuracy,
        );
        let smoothed_y = loess.smooth(&control_x, &control_y)?;
        let spline = CubicSpline::natural(&control_x, &smoothed_y)?;

        Ok(BaselineFunction {
            control_indices,
            control_x,
            control_y,
            smoothed_y,
            spline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(minima_window: usize) -> BaselineEstimator {
        BaselineEstimator::new(BaselineEstimatorConfig {
            minima_window,
            ..BaselineEstimatorConfig::default()
        })
    }

    #[test]
    fn test_control_points_cover_both_ends() {
        // ends are neither minima nor zero
        let signal = vec![9.0, 5.0, 1.0, 5.0, 9.0, 5.0, 2.0, 5.0, 9.0];
        let indices = estimator(2).control_indices(&signal);
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.last(), Some(&(signal.len() - 1)));
        assert!(indices.contains(&2));
        assert!(indices.contains(&6));
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_zero_samples_are_control_points() {
        let signal = vec![-3.0, 4.0, 0.0, 4.0, 4.0, 4.0, 4.0];
        let indices = estimator(10).control_indices(&signal);
        assert_eq!(indices, vec![0, 2, 6]);
    }

    #[test]
    fn test_linear_background_is_recovered() {
        let n = 400;
        let domain: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
        // slow ramp with a ripple so that every trough becomes a control point
        let mut signal: Vec<f64> = domain
            .iter()
            .enumerate()
            .map(|(i, t)| 100.0 + 0.5 * t + 2.0 * (i as f64 * 0.3).sin())
            .collect();
        for i in 180..220 {
            let d = (i as f64 - 200.0).abs();
            signal[i] += 1000.0 * (1.0 - d / 20.0).max(0.0);
        }
        let baseline = estimator(5).estimate(&domain, &signal).unwrap();
        assert!(baseline.control_indices.len() > 10);
        assert!((baseline.min_x() - 0.0).abs() < 1e-12);
        assert!((baseline.max_x() - domain[n - 1]).abs() < 1e-12);

        for &t in &[10.0, 50.0, 150.0] {
            let expected = 100.0 + 0.5 * t;
            assert!((baseline.evaluate(t).unwrap() - expected).abs() < 3.0);
        }
        // under the peak the curve follows the background, not the peak
        assert!((baseline.evaluate(100.0).unwrap() - 150.0).abs() < 5.0);
        assert!(matches!(
            baseline.evaluate(domain[n - 1] + 1.0),
            Err(ChromError::DomainEvaluation { .. })
        ));
    }

    #[test]
    fn test_single_sample_has_no_baseline() {
        let result = estimator(3).estimate(&[0.0], &[1.0]);
        assert!(matches!(result, Err(ChromError::FitFailure(_))));
    }

    #[test]
    fn test_non_monotonic_domain_has_no_baseline() {
        let domain = vec![0.0, 1.0, 1.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let signal = vec![0.0; 10];
        assert!(estimator(1).estimate(&domain, &signal).is_err());
    }
}
