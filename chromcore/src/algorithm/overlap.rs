use serde::{Deserialize, Serialize};

use crate::data::peak::PeakRecord;

/// Two neighbouring peaks whose index spans intersect, touch or nest.
/// Positions refer to the peak set the pair was computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapPair {
    pub previous: usize,
    pub current: usize,
    pub previous_apex: usize,
    pub current_apex: usize,
}

/// Closed rectangle `[start, stop] x [0, 1]` of a peak span.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SpanRect {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

impl SpanRect {
    fn new(start: i64, stop: i64) -> Self {
        SpanRect { x0: start as f64, x1: stop as f64, y0: 0.0, y1: 1.0 }
    }

    /// Closed intersection, shared edges count.
    fn intersects(&self, other: &SpanRect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }
}

/// `true` iff the closed spans `[a_start, a_stop]` and `[b_start, b_stop]` share a point.
pub fn spans_overlap(a: (i64, i64), b: (i64, i64)) -> bool {
    SpanRect::new(a.0, a.1).intersects(&SpanRect::new(b.0, b.1))
}

/// Compare every resolved peak with its resolved predecessor in apex order.
/// Peaks are only reported, never removed.
pub fn annotate_overlaps(peaks: &[PeakRecord]) -> Vec<OverlapPair> {
    let resolved: Vec<(usize, &PeakRecord)> = peaks
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_resolved())
        .collect();

    resolved
        .windows(2)
        .filter(|w| {
            let (_, a) = w[0];
            let (_, b) = w[1];
            spans_overlap((a.start_index, a.stop_index), (b.start_index, b.stop_index))
        })
        .map(|w| OverlapPair {
            previous: w[0].0,
            current: w[1].0,
            previous_apex: w[0].1.apex_index,
            current_apex: w[1].1.apex_index,
        })
        .collect()
}
