use serde::{Deserialize, Serialize};

use crate::error::{ChromError, Result};

/// Piecewise cubic polynomial through a set of knots, natural boundary
/// conditions (zero curvature at both ends).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CubicSpline {
    knots: Vec<f64>,
    // per segment: value, slope, curvature/2, third/6
    coefficients: Vec<[f64; 4]>,
}

impl CubicSpline {
    /// Interpolate `y` over the strictly increasing knots `x`. Two knots
    /// give a straight line.
    pub fn natural(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(ChromError::FitFailure(format!(
                "spline knots and values differ in length ({} vs. {})",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(ChromError::FitFailure(format!(
                "spline needs at least 2 knots, got {}",
                x.len()
            )));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ChromError::FitFailure("spline knots are not strictly increasing".into()));
        }

        let n = x.len() - 1;
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        let mut mu = vec![0.0; n];
        let mut z = vec![0.0; n + 1];
        for i in 1..n {
            let g = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / g;
            z[i] = (3.0 * (y[i + 1] * h[i - 1] - y[i] * (x[i + 1] - x[i - 1]) + y[i - 1] * h[i])
                / (h[i - 1] * h[i])
                - h[i - 1] * z[i - 1])
                / g;
        }

        let mut c = vec![0.0; n + 1];
        let mut coefficients = vec![[0.0; 4]; n];
        for j in (0..n).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            let b = (y[j + 1] - y[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            let d = (c[j + 1] - c[j]) / (3.0 * h[j]);
            coefficients[j] = [y[j], b, c[j], d];
        }

        Ok(CubicSpline { knots: x.to_vec(), coefficients })
    }

    pub fn min_x(&self) -> f64 {
        self.knots[0]
    }

    pub fn max_x(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    /// Value at `x`, failing outside `[min_x, max_x]`.
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        let (min, max) = (self.min_x(), self.max_x());
        if !(x >= min && x <= max) {
            return Err(ChromError::DomainEvaluation { x, min, max });
        }
        // last knot <= x, clamped onto the final segment
        let segment = self
            .knots
            .partition_point(|&k| k <= x)
            .saturating_sub(1)
            .min(self.coefficients.len() - 1);
        let t = x - self.knots[segment];
        let [a, b, c, d] = self.coefficients[segment];
        Ok(a + t * (b + t * (c + t * d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spline_hits_knots() {
        let x = vec![0.0, 1.0, 2.5, 4.0, 5.0];
        let y = vec![1.0, 3.0, -2.0, 0.5, 4.0];
        let spline = CubicSpline::natural(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert!((spline.evaluate(*xi).unwrap() - yi).abs() < 1e-9);
        }
    }

    #[test]
    fn test_spline_reproduces_line() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![0.0, 2.0, 4.0, 6.0];
        let spline = CubicSpline::natural(&x, &y).unwrap();
        assert!((spline.evaluate(1.5).unwrap() - 3.0).abs() < 1e-9);
        assert!((spline.evaluate(2.75).unwrap() - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_two_knots_are_linear() {
        let spline = CubicSpline::natural(&[0.0, 10.0], &[0.0, 5.0]).unwrap();
        assert!((spline.evaluate(4.0).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_domain() {
        let spline = CubicSpline::natural(&[0.0, 1.0, 2.0], &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(
            spline.evaluate(2.5),
            Err(ChromError::DomainEvaluation { x: 2.5, min: 0.0, max: 2.0 })
        );
        assert!(spline.evaluate(-0.1).is_err());
        assert!(spline.evaluate(f64::NAN).is_err());
    }

    #[test]
    fn test_single_knot_fails() {
        assert!(matches!(CubicSpline::natural(&[1.0], &[1.0]), Err(ChromError::FitFailure(_))));
    }
}
