use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Index of a boundary that was never resolved.
pub const UNRESOLVED: i64 = -1;

/// A single TIC peak.
///
/// # Description
///
/// When both boundaries are resolved `start_index <= apex_index <= stop_index`
/// holds. Unresolved boundaries carry [`UNRESOLVED`] and `NaN` times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakRecord {
    pub apex_index: usize,
    pub start_index: i64,
    pub stop_index: i64,
    pub apex_time: f64,
    pub start_time: f64,
    pub stop_time: f64,
    pub baseline_start_value: f64,
    pub baseline_stop_value: f64,
    pub snr: f64,
    pub area: f64,
    pub apex_intensity: f64,
}

impl Default for PeakRecord {
    fn default() -> Self {
        PeakRecord {
            apex_index: 0,
            start_index: UNRESOLVED,
            stop_index: UNRESOLVED,
            apex_time: 0.0,
            start_time: f64::NAN,
            stop_time: f64::NAN,
            baseline_start_value: 0.0,
            baseline_stop_value: 0.0,
            snr: 0.0,
            area: 0.0,
            apex_intensity: 0.0,
        }
    }
}

impl PeakRecord {
    pub fn is_resolved(&self) -> bool {
        self.start_index != UNRESOLVED && self.stop_index != UNRESOLVED
    }

    /// Number of samples between start and stop, both inclusive.
    pub fn width(&self) -> Option<usize> {
        if self.is_resolved() && self.stop_index >= self.start_index {
            Some((self.stop_index - self.start_index + 1) as usize)
        } else {
            None
        }
    }
}

impl Display for PeakRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Peak(apex: {} @ {:.3}, bounds: [{}, {}], snr: {:.2}, area: {:.2})",
            self.apex_index, self.apex_time, self.start_index, self.stop_index, self.snr, self.area
        )
    }
}

/// Peaks in ascending apex order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakSet {
    peaks: Vec<PeakRecord>,
}

impl PeakSet {
    pub fn new() -> Self {
        PeakSet { peaks: Vec::new() }
    }

    /// Appends a peak; apexes must arrive in ascending order.
    pub fn push(&mut self, peak: PeakRecord) {
        debug_assert!(
            self.peaks.last().map_or(true, |last| last.apex_index < peak.apex_index),
            "peaks must be pushed in ascending apex order"
        );
        self.peaks.push(peak);
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeakRecord> {
        self.peaks.iter()
    }

    pub fn as_slice(&self) -> &[PeakRecord] {
        &self.peaks
    }

    pub fn apex_indices(&self) -> Vec<usize> {
        self.peaks.iter().map(|p| p.apex_index).collect()
    }
}

impl<'a> IntoIterator for &'a PeakSet {
    type Item = &'a PeakRecord;
    type IntoIter = std::slice::Iter<'a, PeakRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.peaks.iter()
    }
}

impl IntoIterator for PeakSet {
    type Item = PeakRecord;
    type IntoIter = std::vec::IntoIter<PeakRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.peaks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_peak_is_unresolved() {
        let peak = PeakRecord::default();
        assert!(!peak.is_resolved());
        assert_eq!(peak.width(), None);
    }

    #[test]
    fn test_peak_width() {
        let peak =
            PeakRecord { apex_index: 5, start_index: 2, stop_index: 9, ..PeakRecord::default() };
        assert_eq!(peak.width(), Some(8));
    }

    #[test]
    fn test_peak_set_keeps_order() {
        let mut set = PeakSet::new();
        set.push(PeakRecord { apex_index: 3, ..PeakRecord::default() });
        set.push(PeakRecord { apex_index: 10, ..PeakRecord::default() });
        assert_eq!(set.apex_indices(), vec![3, 10]);
        assert_eq!(set.iter().count(), 2);
    }
}
