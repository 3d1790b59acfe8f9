use std::collections::VecDeque;

/// Sliding extreme over the clipped window `[i - half_width, i + half_width]`.
/// `dominates(a, b)` decides whether `a` evicts `b` from the candidate queue.
fn sliding_extreme<F>(values: &[f64], half_width: usize, dominates: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> bool,
{
    let n = values.len();
    let mut out = Vec::with_capacity(n);
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut next = 0usize;

    for i in 0..n {
        let hi = i.saturating_add(half_width).min(n - 1);
        while next <= hi {
            while let Some(&back) = queue.back() {
                if dominates(values[next], values[back]) {
                    queue.pop_back();
                } else {
                    break;
                }
            }
            queue.push_back(next);
            next += 1;
        }

        let lo = i.saturating_sub(half_width);
        while let Some(&front) = queue.front() {
            if front < lo {
                queue.pop_front();
            } else {
                break;
            }
        }

        // queue holds at least index i at this point
        out.push(queue.front().map(|&k| values[k]).unwrap_or(values[i]));
    }
    out
}

/// Maximum of every clipped window of half-width `half_width`.
pub fn window_max(values: &[f64], half_width: usize) -> Vec<f64> {
    sliding_extreme(values, half_width, |a, b| a >= b)
}

/// Minimum of every clipped window of half-width `half_width`.
pub fn window_min(values: &[f64], half_width: usize) -> Vec<f64> {
    sliding_extreme(values, half_width, |a, b| a <= b)
}

/// Peak candidates in ascending order.
///
/// Index `i` qualifies iff `values[i] > 0`, `snr[i] >= threshold` (when an
/// SNR trace is given) and `values[i]` equals the maximum of its clipped
/// window. Every sample of a flat maximum qualifies on its own.
pub fn find_peak_candidates(
    values: &[f64],
    snr: Option<&[f64]>,
    separation_window: usize,
    snr_threshold: f64,
) -> Vec<usize> {
    let maxima = window_max(values, separation_window);
    let mut candidates = Vec::new();
    for (i, (&v, &m)) in values.iter().zip(maxima.iter()).enumerate() {
        if v <= 0.0 {
            continue;
        }
        if let Some(snr) = snr {
            if !(snr[i] >= snr_threshold) {
                continue;
            }
        }
        if v == m {
            candidates.push(i);
        }
    }
    candidates
}

/// Local minima in ascending order: `values[i]` equals the minimum of its
/// clipped window, or `values[i]` is exactly zero.
pub fn find_minima(values: &[f64], window: usize) -> Vec<usize> {
    let minima = window_min(values, window);
    values
        .iter()
        .zip(minima.iter())
        .enumerate()
        .filter(|(_, (&v, &m))| v == 0.0 || v == m)
        .map(|(i, _)| i)
        .collect()
}
