use serde::{Deserialize, Serialize};

use crate::error::{ChromError, Result};
use crate::filter::chain::SignalFilter;

/// Strategy used to turn the filtered signal into a per-sample SNR in dB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnrStrategy {
    /// `20 * log10(signal / baseline)`
    BaselineRatio,
    /// `20 * log10((P_hi - P_lo) / P_lo)` over a trailing window
    PercentileWindow,
}

impl Default for SnrStrategy {
    fn default() -> Self {
        SnrStrategy::BaselineRatio
    }
}

/// Abscissa the baseline curve is fitted against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaselineDomain {
    Time,
    Index,
}

impl Default for BaselineDomain {
    fn default() -> Self {
        BaselineDomain::Time
    }
}

/// Parameters of the LOESS baseline fit and its control point selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaselineEstimatorConfig {
    /// Fraction of control points used for every local fit (0, 1]
    pub bandwidth: f64,
    /// Convergence tolerance on the median residual
    pub accuracy: f64,
    /// Number of outlier down-weighting passes
    pub robustness_iterations: usize,
    /// Half-width of the local minimum window
    pub minima_window: usize,
}

impl Default for BaselineEstimatorConfig {
    fn default() -> Self {
        BaselineEstimatorConfig {
            bandwidth: 0.3,
            accuracy: 1e-12,
            robustness_iterations: 2,
            minima_window: 1000,
        }
    }
}

/// Configuration for the TIC peak finder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeakFinderConfig {
    /// Minimum SNR (dB) for a peak candidate (default: 75.0)
    pub peak_snr_threshold: f64,
    /// Half-width of the apex dominance window (default: 10)
    pub peak_separation_window: usize,
    /// Half-width of the median pre-filter for baseline estimation, 0 disables (default: 500)
    pub baseline_filter_window: usize,
    /// Half-width of the minimum window for control points (default: 1000)
    pub baseline_estimation_minima_window: usize,
    /// Trailing window length of the percentile SNR strategy (default: 100)
    pub mean_estimation_window: usize,
    pub lower_percentile: usize,
    pub upper_percentile: usize,
    pub bandwidth: f64,
    pub accuracy: f64,
    pub robustness_iterations: usize,
    /// Resolve boundaries and emit peak records
    pub integrate_peaks: bool,
    /// Integrate peak area on the TIC
    #[serde(rename = "integrateTICPeaks")]
    pub integrate_tic_peaks: bool,
    pub subtract_baseline: bool,
    /// Recognized but disabled: overlaps are reported, never removed
    pub remove_overlapping_peaks: bool,
    pub snr_strategy: SnrStrategy,
    pub baseline_domain: BaselineDomain,
    /// Ordered filter chain applied to the raw signal
    pub filters: Vec<SignalFilter>,
}

impl Default for PeakFinderConfig {
    fn default() -> Self {
        PeakFinderConfig {
            peak_snr_threshold: 75.0,
            peak_separation_window: 10,
            baseline_filter_window: 500,
            baseline_estimation_minima_window: 1000,
            mean_estimation_window: 100,
            lower_percentile: 5,
            upper_percentile: 95,
            bandwidth: 0.3,
            accuracy: 1e-12,
            robustness_iterations: 2,
            integrate_peaks: true,
            integrate_tic_peaks: true,
            subtract_baseline: false,
            remove_overlapping_peaks: false,
            snr_strategy: SnrStrategy::default(),
            baseline_domain: BaselineDomain::default(),
            filters: Vec::new(),
        }
    }
}

impl PeakFinderConfig {
    pub fn baseline_estimator_config(&self) -> BaselineEstimatorConfig {
        BaselineEstimatorConfig {
            bandwidth: self.bandwidth,
            accuracy: self.accuracy,
            robustness_iterations: self.robustness_iterations,
            minima_window: self.baseline_estimation_minima_window,
        }
    }

    /// Check option ranges before a run.
    pub fn validate(&self) -> Result<()> {
        if self.peak_separation_window == 0 {
            return Err(ChromError::InvalidConfig("peakSeparationWindow must be > 0".into()));
        }
        if self.baseline_estimation_minima_window == 0 {
            return Err(ChromError::InvalidConfig(
                "baselineEstimationMinimaWindow must be > 0".into(),
            ));
        }
        if self.mean_estimation_window == 0 {
            return Err(ChromError::InvalidConfig("meanEstimationWindow must be > 0".into()));
        }
        if !(self.bandwidth > 0.0 && self.bandwidth <= 1.0) {
            return Err(ChromError::InvalidConfig(format!(
                "bandwidth must be in (0, 1], got {}",
                self.bandwidth
            )));
        }
        if !self.accuracy.is_finite() || self.accuracy < 0.0 {
            return Err(ChromError::InvalidConfig(format!(
                "accuracy must be finite and non-negative, got {}",
                self.accuracy
            )));
        }
        if self.lower_percentile == 0
            || self.upper_percentile > 100
            || self.lower_percentile >= self.upper_percentile
        {
            return Err(ChromError::InvalidConfig(format!(
                "percentiles must satisfy 0 < lower < upper <= 100, got {}/{}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        for filter in &self.filters {
            filter.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PeakFinderConfig::default();
        assert!(config.peak_snr_threshold == 75.0);
        assert_eq!(config.peak_separation_window, 10);
        assert_eq!(config.baseline_filter_window, 500);
        assert_eq!(config.baseline_estimation_minima_window, 1000);
        assert_eq!(config.mean_estimation_window, 100);
        assert_eq!((config.lower_percentile, config.upper_percentile), (5, 95));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_option_names() {
        let json = r#"{
            "peakSnrThreshold": 12.5,
            "peakSeparationWindow": 4,
            "integrateTICPeaks": false,
            "snrStrategy": "percentileWindow",
            "filters": [{"movingAverage": {"window": 2}}]
        }"#;
        let config: PeakFinderConfig = serde_json::from_str(json).unwrap();
        assert!((config.peak_snr_threshold - 12.5).abs() < 1e-12);
        assert_eq!(config.peak_separation_window, 4);
        assert!(!config.integrate_tic_peaks);
        assert!(config.integrate_peaks);
        assert_eq!(config.snr_strategy, SnrStrategy::PercentileWindow);
        assert_eq!(config.filters, vec![SignalFilter::MovingAverage { window: 2 }]);
        // untouched options keep their defaults
        assert_eq!(config.mean_estimation_window, 100);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = PeakFinderConfig::default();
        config.bandwidth = 1.5;
        assert!(matches!(config.validate(), Err(ChromError::InvalidConfig(_))));

        let mut config = PeakFinderConfig::default();
        config.lower_percentile = 95;
        config.upper_percentile = 5;
        assert!(config.validate().is_err());

        let mut config = PeakFinderConfig::default();
        config.peak_separation_window = 0;
        assert!(config.validate().is_err());
    }
}
