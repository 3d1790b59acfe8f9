use std::borrow::Cow;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::baseline::{BaselineEstimator, BaselineFunction};
use crate::algorithm::boundary::PeakBoundaryResolver;
use crate::algorithm::extrema::find_peak_candidates;
use crate::algorithm::integration::{subtract_baseline, PeakIntegrator};
use crate::algorithm::overlap::{annotate_overlaps, OverlapPair};
use crate::algorithm::snr::SnrEvaluator;
use crate::config::{BaselineDomain, PeakFinderConfig, SnrStrategy};
use crate::data::chromatogram::Chromatogram;
use crate::data::peak::{PeakRecord, PeakSet};
use crate::error::{ChromError, Result};
use crate::filter::chain::{apply_filters, moving_median};
use crate::filter::derivative::derivatives;

pub const DEFAULT_LOG_TARGET: &str = "chromcore::worker";

/// Everything one run produces for a single chromatogram.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakFinderResult {
    pub corrected_signal: Vec<f64>,
    pub candidate_indices: Vec<usize>,
    pub snr_values: Vec<f64>,
    /// `None` when the baseline fit failed or had too few control points
    pub baseline_function: Option<BaselineFunction>,
    pub peaks: PeakSet,
    pub overlaps: Vec<OverlapPair>,
}

/// Runs filter, baseline, SNR, candidate search, boundary resolution,
/// integration and overlap annotation for one chromatogram at a time.
#[derive(Clone, Debug)]
pub struct PeakFinderWorker {
    config: PeakFinderConfig,
    log_target: String,
}

impl PeakFinderWorker {
    pub fn new(config: PeakFinderConfig) -> Self {
        PeakFinderWorker {
            config,
            log_target: DEFAULT_LOG_TARGET.to_string(),
        }
    }

    /// Route this worker's log records to `target`.
    pub fn with_log_target(mut self, target: impl Into<String>) -> Self {
        self.log_target = target.into();
        self
    }

    pub fn config(&self) -> &PeakFinderConfig {
        &self.config
    }

    pub fn log_target(&self) -> &str {
        &self.log_target
    }

    pub fn run(&self, chromatogram: &Chromatogram) -> Result<PeakFinderResult> {
        self.config.validate()?;
        if chromatogram.intensities.len() != chromatogram.times.len() {
            return Err(ChromError::LengthMismatch {
                signal: chromatogram.intensities.len(),
                time: chromatogram.times.len(),
            });
        }

        let target = self.log_target.as_str();
        if chromatogram.is_empty() {
            log::debug!(target: target, "empty chromatogram, nothing to do");
            return Ok(PeakFinderResult::default());
        }

        // 1) filter chain
        let corrected = apply_filters(&chromatogram.intensities, &self.config.filters);

        // 2) baseline
        let domain = match self.config.baseline_domain {
            BaselineDomain::Time => chromatogram.times.clone(),
            BaselineDomain::Index => chromatogram.index_axis(),
        };
        let baseline = self.estimate_baseline(&domain, &corrected);

        // 3) snr
        let snr = self.evaluate_snr(&domain, &corrected, baseline.as_ref());

        // 4) candidates
        let candidates = find_peak_candidates(
            &corrected,
            Some(&snr),
            self.config.peak_separation_window,
            self.config.peak_snr_threshold,
        );
        log::debug!(
            target: target,
            "{} peak candidates at >= {} dB",
            candidates.len(),
            self.config.peak_snr_threshold
        );

        // 5) boundaries and integration
        let peaks = if self.config.integrate_peaks {
            self.resolve_peaks(
                chromatogram,
                &domain,
                &corrected,
                &snr,
                &candidates,
                baseline.as_ref(),
            )
        } else {
            self.candidate_peaks(chromatogram, &corrected, &snr, &candidates)
        };

        // 6) overlap annotation
        let overlaps = annotate_overlaps(peaks.as_slice());
        if !overlaps.is_empty() {
            log::info!(target: target, "{} overlapping peak pairs", overlaps.len());
            if self.config.remove_overlapping_peaks {
                log::warn!(
                    target: target,
                    "removal of overlapping peaks is disabled, all {} peaks are kept",
                    peaks.len()
                );
            }
        }

        Ok(PeakFinderResult {
            corrected_signal: corrected,
            candidate_indices: candidates,
            snr_values: snr,
            baseline_function: baseline,
            peaks,
            overlaps,
        })
    }

    fn estimate_baseline(&self, domain: &[f64], corrected: &[f64]) -> Option<BaselineFunction> {
        let target = self.log_target.as_str();
        let input: Cow<[f64]> = if self.config.baseline_filter_window > 0 {
            Cow::Owned(moving_median(corrected, self.config.baseline_filter_window))
        } else {
            Cow::Borrowed(corrected)
        };

        let estimator = BaselineEstimator::new(self.config.baseline_estimator_config());
        match estimator.estimate(domain, &input) {
            Ok(baseline) => {
                log::debug!(
                    target: target,
                    "baseline fitted through {} control points on [{}, {}]",
                    baseline.control_indices.len(),
                    baseline.min_x(),
                    baseline.max_x()
                );
                Some(baseline)
            }
            Err(e) => {
                log::warn!(target: target, "no baseline available: {}", e);
                None
            }
        }
    }

    fn evaluate_snr(
        &self,
        domain: &[f64],
        corrected: &[f64],
        baseline: Option<&BaselineFunction>,
    ) -> Vec<f64> {
        let percentile = SnrEvaluator::PercentileWindow {
            window: self.config.mean_estimation_window,
            lower_percentile: self.config.lower_percentile,
            upper_percentile: self.config.upper_percentile,
        };
        let evaluator = match (self.config.snr_strategy, baseline) {
            (SnrStrategy::BaselineRatio, Some(baseline)) => {
                SnrEvaluator::BaselineRatio { baseline, domain }
            }
            (SnrStrategy::BaselineRatio, None) => {
                log::warn!(
                    target: self.log_target.as_str(),
                    "baseline ratio SNR needs a baseline, using the percentile window instead"
                );
                percentile
            }
            (SnrStrategy::PercentileWindow, _) => percentile,
        };
        evaluator.evaluate(corrected, &self.log_target)
    }

    fn resolve_peaks(
        &self,
        chromatogram: &Chromatogram,
        domain: &[f64],
        corrected: &[f64],
        snr: &[f64],
        candidates: &[usize],
        baseline: Option<&BaselineFunction>,
    ) -> PeakSet {
        let target = self.log_target.as_str();
        let times = &chromatogram.times;

        let d = derivatives(corrected);
        let resolver = PeakBoundaryResolver::new(corrected, &d);

        let integration_signal: Cow<[f64]> = match (self.config.subtract_baseline, baseline) {
            (true, Some(baseline)) => {
                Cow::Owned(subtract_baseline(corrected, domain, baseline, target))
            }
            (true, None) => {
                log::warn!(target: target, "baseline subtraction skipped, no baseline available");
                Cow::Borrowed(corrected)
            }
            (false, _) => Cow::Borrowed(corrected),
        };
        let integrator = PeakIntegrator::new(&integration_signal);

        let baseline_at = |i: usize| -> f64 {
            match baseline {
                Some(b) => b.evaluate(domain[i]).unwrap_or_else(|e| {
                    log::debug!(target: target, "peak boundary baseline: {}", e);
                    0.0
                }),
                None => 0.0,
            }
        };

        let mut peaks = PeakSet::new();
        for &apex in candidates {
            let bounds = resolver.resolve(apex);
            if !bounds.is_consistent() {
                log::debug!(
                    target: target,
                    "dropping candidate {} with inverted bounds {:?}",
                    apex,
                    bounds
                );
                continue;
            }

            let (area, apex_intensity) = if self.config.integrate_tic_peaks {
                let integrated = integrator.integrate(&bounds);
                if integrated.area <= 0.0 {
                    log::debug!(
                        target: target,
                        "dropping peak at {} with non-positive area {}",
                        apex,
                        integrated.area
                    );
                    continue;
                }
                (integrated.area, integrated.apex_intensity)
            } else {
                (0.0, integration_signal[apex])
            };

            peaks.push(PeakRecord {
                apex_index: apex,
                start_index: bounds.start as i64,
                stop_index: bounds.stop as i64,
                apex_time: times[apex],
                start_time: times[bounds.start],
                stop_time: times[bounds.stop],
                baseline_start_value: baseline_at(bounds.start),
                baseline_stop_value: baseline_at(bounds.stop),
                snr: snr[apex],
                area,
                apex_intensity,
            });
        }
        log::debug!(
            target: target,
            "{} of {} candidates resolved to peaks",
            peaks.len(),
            candidates.len()
        );
        peaks
    }

    fn candidate_peaks(
        &self,
        chromatogram: &Chromatogram,
        corrected: &[f64],
        snr: &[f64],
        candidates: &[usize],
    ) -> PeakSet {
        let mut peaks = PeakSet::new();
        for &apex in candidates {
            peaks.push(PeakRecord {
                apex_index: apex,
                apex_time: chromatogram.times[apex],
                snr: snr[apex],
                apex_intensity: corrected[apex],
                ..PeakRecord::default()
            });
        }
        peaks
    }
}

/// Process many chromatograms in parallel, one worker per chromatogram.
/// Results come back in input order.
pub fn process_batch(
    chromatograms: &[Chromatogram],
    config: &PeakFinderConfig,
) -> Vec<Result<PeakFinderResult>> {
    chromatograms
        .par_iter()
        .enumerate()
        .map(|(i, chromatogram)| {
            PeakFinderWorker::new(config.clone())
                .with_log_target(format!("{}[{}]", DEFAULT_LOG_TARGET, i))
                .run(chromatogram)
        })
        .collect()
}
