use std::collections::VecDeque;

use statrs::statistics::{Data, OrderStatistics};

use crate::algorithm::baseline::BaselineFunction;
use crate::error::ChromError;

/// `20 * log10(ratio)` with infinite and NaN results mapped to 0.
#[inline]
pub fn decibel(ratio: f64) -> f64 {
    let db = 20.0 * ratio.log10();
    if db.is_finite() { db } else { 0.0 }
}

/// Per-sample signal-to-noise in dB, index aligned with the signal.
#[derive(Clone, Debug)]
pub enum SnrEvaluator<'a> {
    /// Ratio of the signal to the baseline evaluated at the sample's abscissa.
    BaselineRatio {
        baseline: &'a BaselineFunction,
        domain: &'a [f64],
    },
    /// Percentile spread over the trailing `window` samples.
    PercentileWindow {
        window: usize,
        lower_percentile: usize,
        upper_percentile: usize,
    },
}

impl SnrEvaluator<'_> {
    pub fn evaluate(&self, signal: &[f64], log_target: &str) -> Vec<f64> {
        match self {
            SnrEvaluator::BaselineRatio { baseline, domain } => {
                baseline_ratio_snr(signal, domain, baseline, log_target)
            }
            SnrEvaluator::PercentileWindow { window, lower_percentile, upper_percentile } => {
                percentile_window_snr(signal, *window, *lower_percentile, *upper_percentile)
            }
        }
    }
}

pub fn baseline_ratio_snr(
    signal: &[f64],
    domain: &[f64],
    baseline: &BaselineFunction,
    log_target: &str,
) -> Vec<f64> {
    let mut domain_failures = 0usize;
    let snr = signal
        .iter()
        .zip(domain.iter())
        .map(|(&s, &x)| match baseline.evaluate(x) {
            Ok(b) => decibel(s / b),
            Err(ChromError::DomainEvaluation { x, min, max }) => {
                domain_failures += 1;
                log::trace!(
                    target: log_target,
                    "baseline undefined at {} (domain [{}, {}])",
                    x,
                    min,
                    max
                );
                0.0
            }
            Err(e) => {
                log::warn!(target: log_target, "baseline evaluation failed: {}", e);
                0.0
            }
        })
        .collect();

    if domain_failures > 0 {
        log::warn!(
            target: log_target,
            "{} samples outside of the baseline domain, their SNR was set to 0",
            domain_failures
        );
    }
    snr
}

pub fn percentile_window_snr(
    signal: &[f64],
    window: usize,
    lower_percentile: usize,
    upper_percentile: usize,
) -> Vec<f64> {
    let window = window.max(1);
    let mut recent: VecDeque<f64> = VecDeque::with_capacity(window);
    let mut snr = Vec::with_capacity(signal.len());

    for &s in signal {
        if recent.len() == window {
            recent.pop_front();
        }
        recent.push_back(s);

        let mut data = Data::new(recent.iter().copied().collect::<Vec<f64>>());
        let p_hi = data.percentile(upper_percentile);
        let p_lo = data.percentile(lower_percentile);
        snr.push(decibel((p_hi - p_lo) / p_lo));
    }
    snr
}
