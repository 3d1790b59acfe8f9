use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::algorithm::extrema::{window_max, window_min};
use crate::error::{ChromError, Result};

/// One step of the ordered filter chain applied to the raw intensities.
/// Window sizes are half-widths, windows are clipped at the array edges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalFilter {
    MovingAverage { window: usize },
    MovingMedian { window: usize },
    /// Gaussian smoothing, `sigma` in samples, kernel cut at `truncate * sigma`
    Gaussian { sigma: f64, truncate: f64 },
    Multiply { factor: f64 },
    /// Signal minus its grey opening: removes background wider than the window
    TopHat { window: usize },
}

impl SignalFilter {
    pub fn validate(&self) -> Result<()> {
        match *self {
            SignalFilter::Gaussian { sigma, truncate } => {
                if !(sigma > 0.0 && sigma.is_finite())
                    || !(truncate >= 0.0 && truncate.is_finite())
                {
                    return Err(ChromError::InvalidConfig(format!(
                        "gaussian filter needs sigma > 0 and truncate >= 0, got {} / {}",
                        sigma, truncate
                    )));
                }
            }
            SignalFilter::Multiply { factor } => {
                if !factor.is_finite() {
                    return Err(ChromError::InvalidConfig(format!(
                        "multiplication factor must be finite, got {}",
                        factor
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        match *self {
            SignalFilter::MovingAverage { window } => moving_average(values, window),
            SignalFilter::MovingMedian { window } => moving_median(values, window),
            SignalFilter::Gaussian { sigma, truncate } => smooth_gaussian(values, sigma, truncate),
            SignalFilter::Multiply { factor } => values.iter().map(|v| v * factor).collect(),
            SignalFilter::TopHat { window } => top_hat(values, window),
        }
    }
}

/// Run `values` through every filter in order.
pub fn apply_filters(values: &[f64], filters: &[SignalFilter]) -> Vec<f64> {
    filters
        .iter()
        .fold(values.to_vec(), |current, filter| filter.apply(&current))
}

pub fn moving_average(values: &[f64], half_width: usize) -> Vec<f64> {
    let n = values.len();
    // prefix sums, prefix[i] = sum of values[..i]
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for v in values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v);
    }
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half_width);
            let hi = i.saturating_add(half_width).min(n - 1);
            (prefix[hi + 1] - prefix[lo]) / (hi + 1 - lo) as f64
        })
        .collect()
}

pub fn moving_median(values: &[f64], half_width: usize) -> Vec<f64> {
    let n = values.len();
    let mut buffer: Vec<OrderedFloat<f64>> = Vec::with_capacity(2 * half_width.min(n) + 1);
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half_width);
            let hi = i.saturating_add(half_width).min(n - 1);
            buffer.clear();
            buffer.extend(values[lo..=hi].iter().copied().map(OrderedFloat));
            buffer.sort_unstable();
            let m = buffer.len();
            if m % 2 == 1 {
                buffer[m / 2].into_inner()
            } else {
                0.5 * (buffer[m / 2 - 1].into_inner() + buffer[m / 2].into_inner())
            }
        })
        .collect()
}

/// Build a normalized 1D Gaussian kernel.
/// `sigma`: stddev in samples, `truncate`: cutoff in sigmas
fn gaussian_kernel_1d(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma).ceil() as i64;
    let two_sigma2 = 2.0 * sigma * sigma;
    let mut w: Vec<f64> = (-radius..=radius)
        .map(|dx| {
            let x = dx as f64;
            (-x * x / two_sigma2).exp()
        })
        .collect();
    let sum: f64 = w.iter().sum();
    for v in &mut w {
        *v /= sum;
    }
    w
}

/// Reflect boundary helper: maps an out of range index back into [0, len)
#[inline(always)]
fn reflect_index(idx: isize, len: usize) -> usize {
    // reflect around edges like ... 2 1 | 0 1 2 3 ... 3 2 |
    let len_i = len as isize;
    let mut x = idx;
    if x < 0 || x >= len_i {
        x = x.rem_euclid(2 * len_i);
        if x >= len_i {
            x = 2 * len_i - 1 - x;
        }
    }
    x as usize
}

pub fn smooth_gaussian(values: &[f64], sigma: f64, truncate: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let w = gaussian_kernel_1d(sigma, truncate);
    let radius = (w.len() as isize - 1) / 2;
    (0..n)
        .map(|t| {
            w.iter()
                .enumerate()
                .map(|(k, wk)| wk * values[reflect_index(t as isize + k as isize - radius, n)])
                .sum()
        })
        .collect()
}

/// White top-hat: `x - dilate(erode(x))`.
pub fn top_hat(values: &[f64], half_width: usize) -> Vec<f64> {
    let opened = window_max(&window_min(values, half_width), half_width);
    values.iter().zip(opened.iter()).map(|(v, o)| v - o).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_clips_at_edges() {
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 1);
        assert_eq!(out, vec![1.5, 2.0, 3.0, 4.0, 4.5]);
    }

    #[test]
    fn test_moving_median_removes_spike() {
        let out = moving_median(&[1.0, 1.0, 50.0, 1.0, 1.0], 1);
        assert_eq!(out, vec![1.0, 1.0, 1.0, 1.0, 1.0]);
        // even sized window at the edge averages the two middle values
        assert_eq!(moving_median(&[2.0, 4.0, 9.0], 1)[0], 3.0);
    }

    #[test]
    fn test_gaussian_preserves_mass_and_constants() {
        let flat = smooth_gaussian(&vec![3.0; 20], 1.5, 3.0);
        assert!(flat.iter().all(|v| (v - 3.0).abs() < 1e-12));

        let mut spike = vec![0.0; 41];
        spike[20] = 1.0;
        let smoothed = smooth_gaussian(&spike, 2.0, 4.0);
        let total: f64 = smoothed.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(smoothed[20] < 1.0 && smoothed[20] > smoothed[18]);
    }

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 5), 0);
        assert_eq!(reflect_index(-2, 5), 1);
        assert_eq!(reflect_index(5, 5), 4);
        assert_eq!(reflect_index(6, 5), 3);
        assert_eq!(reflect_index(3, 5), 3);
    }

    #[test]
    fn test_top_hat_removes_wide_background() {
        // narrow peak on a broad plateau
        let mut values = vec![10.0; 30];
        values[15] = 25.0;
        let out = top_hat(&values, 3);
        assert!(out[0].abs() < 1e-12);
        assert!((out[15] - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_filter_chain_order() {
        let filters = vec![
            SignalFilter::Multiply { factor: 2.0 },
            SignalFilter::MovingAverage { window: 1 },
        ];
        let out = apply_filters(&[0.0, 3.0, 0.0], &filters);
        assert_eq!(out, vec![3.0, 2.0, 3.0]);
        assert_eq!(apply_filters(&[1.0, 2.0], &[]), vec![1.0, 2.0]);
    }

    #[test]
    fn test_filter_validation() {
        assert!(SignalFilter::Gaussian { sigma: 0.0, truncate: 3.0 }.validate().is_err());
        assert!(SignalFilter::Multiply { factor: f64::NAN }.validate().is_err());
        assert!(SignalFilter::TopHat { window: 5 }.validate().is_ok());
    }
}
