use crate::algorithm::baseline::BaselineFunction;
use crate::algorithm::boundary::PeakBounds;

/// Initial value of the area accumulator. Existing results were produced
/// with this offset, so it stays.
pub const AREA_ACCUMULATOR_SEED: f64 = -1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakArea {
    pub area: f64,
    pub apex_intensity: f64,
}

/// Sums intensities between resolved peak bounds.
#[derive(Clone, Copy, Debug)]
pub struct PeakIntegrator<'a> {
    signal: &'a [f64],
}

impl<'a> PeakIntegrator<'a> {
    pub fn new(signal: &'a [f64]) -> Self {
        PeakIntegrator { signal }
    }

    /// `sum(signal[start..=stop]) - 1`
    pub fn integrate(&self, bounds: &PeakBounds) -> PeakArea {
        let area = self.signal[bounds.start..=bounds.stop]
            .iter()
            .fold(AREA_ACCUMULATOR_SEED, |acc, v| acc + v);
        PeakArea {
            area,
            apex_intensity: self.signal[bounds.apex],
        }
    }
}

/// Signal minus baseline, floored at 0. Samples where the baseline is not
/// defined are treated as sitting on a zero baseline.
pub fn subtract_baseline(
    signal: &[f64],
    domain: &[f64],
    baseline: &BaselineFunction,
    log_target: &str,
) -> Vec<f64> {
    signal
        .iter()
        .zip(domain.iter())
        .map(|(&s, &x)| {
            let b = baseline.evaluate(x).unwrap_or_else(|e| {
                log::debug!(target: log_target, "baseline subtraction: {}", e);
                0.0
            });
            (s - b).max(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::baseline::BaselineEstimator;
    use crate::config::BaselineEstimatorConfig;

    #[test]
    fn test_flat_top_pulse_area() {
        let signal = vec![0.0, 0.0, 5.0, 5.0, 5.0, 0.0, 0.0];
        let integrator = PeakIntegrator::new(&signal);
        let result = integrator.integrate(&PeakBounds { start: 2, apex: 3, stop: 4 });
        assert_eq!(result.area, 14.0);
        assert_eq!(result.apex_intensity, 5.0);
    }

    #[test]
    fn test_area_bias_for_any_pulse() {
        for &(h, l) in &[(1.0, 1usize), (2.5, 4), (10.0, 9)] {
            let mut signal = vec![0.0; l + 4];
            for v in &mut signal[2..2 + l] {
                *v = h;
            }
            let bounds = PeakBounds { start: 2, apex: 2, stop: 1 + l };
            let area = PeakIntegrator::new(&signal).integrate(&bounds).area;
            assert!((area - (h * l as f64 - 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_subtract_baseline_floors_at_zero() {
        let domain: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let baseline = BaselineEstimator::new(BaselineEstimatorConfig {
            minima_window: 2,
            ..BaselineEstimatorConfig::default()
        })
        .estimate(&domain, &vec![4.0; 10])
        .unwrap();

        let signal = vec![3.0, 4.0, 10.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0];
        let corrected = subtract_baseline(&signal, &domain, &baseline, "test");
        assert!(corrected[0].abs() < 1e-9);
        assert!((corrected[2] - 6.0).abs() < 1e-9);
        assert!(corrected.iter().all(|&v| v >= 0.0));
    }
}
