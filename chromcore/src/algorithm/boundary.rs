use crate::filter::derivative::Derivatives;

/// Fixed capacity ring of the three most recent samples of a scan.
#[derive(Clone, Copy, Debug)]
struct RollingHistory {
    slots: [f64; 3],
    // next slot to overwrite, which is also the oldest one
    cursor: usize,
}

impl RollingHistory {
    fn seeded(oldest: f64, previous: f64, current: f64) -> Self {
        RollingHistory { slots: [oldest, previous, current], cursor: 0 }
    }

    #[inline]
    fn push(&mut self, value: f64) {
        self.slots[self.cursor] = value;
        self.cursor = (self.cursor + 1) % 3;
    }

    #[inline]
    fn ordered(&self) -> [f64; 3] {
        [
            self.slots[self.cursor],
            self.slots[(self.cursor + 1) % 3],
            self.slots[(self.cursor + 2) % 3],
        ]
    }

    /// Middle sample strictly below both neighbours, or exactly zero.
    #[inline]
    fn is_minimum(&self) -> bool {
        let [oldest, previous, current] = self.ordered();
        (previous < oldest && previous < current) || previous == 0.0
    }
}

/// Start and stop index of a peak; either side may fall back to an array edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeakBounds {
    pub start: usize,
    pub apex: usize,
    pub stop: usize,
}

impl PeakBounds {
    /// `start <= apex <= stop`
    pub fn is_consistent(&self) -> bool {
        self.start <= self.apex && self.apex <= self.stop
    }
}

/// Walks outward from an apex over the filtered signal and its derivatives.
#[derive(Clone, Copy, Debug)]
pub struct PeakBoundaryResolver<'a> {
    signal: &'a [f64],
    derivatives: &'a Derivatives,
}

impl<'a> PeakBoundaryResolver<'a> {
    pub fn new(signal: &'a [f64], derivatives: &'a Derivatives) -> Self {
        debug_assert_eq!(signal.len(), derivatives.first.len());
        PeakBoundaryResolver { signal, derivatives }
    }

    pub fn resolve(&self, apex: usize) -> PeakBounds {
        PeakBounds {
            start: self.resolve_start(apex),
            apex,
            stop: self.resolve_stop(apex),
        }
    }

    /// Rightward scan. Stops at the first strict local minimum of the
    /// history or at the first inflection with
    /// `d3 >= 0 && d2 <= 0 && d1 >= 0`.
    pub fn resolve_stop(&self, apex: usize) -> usize {
        let s = self.signal;
        let d = self.derivatives;
        let last = s.len() - 1;

        let mut history = RollingHistory::seeded(
            s[apex.min(last)],
            s[(apex + 1).min(last)],
            s[(apex + 2).min(last)],
        );

        // an exhausted scan ends on the last seeded sample
        let mut stop = (apex + 2).min(last);
        // next sample to enter the history, the middle one sits at pos - 2
        let mut pos = apex + 3;
        loop {
            if history.is_minimum() {
                stop = pos - 2;
                break;
            }
            if pos > last {
                break;
            }
            if d.third[pos] >= 0.0 && d.second[pos] <= 0.0 && d.first[pos] >= 0.0 {
                stop = pos - 1;
                break;
            }
            history.push(s[pos]);
            stop = pos;
            pos += 1;
        }
        stop.min(last)
    }

    /// Leftward scan, the mirror image of [`resolve_stop`](Self::resolve_stop)
    /// with the inflection test `d3 < 0 && d2 > 0 && d1 < 0`.
    pub fn resolve_start(&self, apex: usize) -> usize {
        let s = self.signal;
        let d = self.derivatives;

        let mut history = RollingHistory::seeded(
            s[apex],
            s[apex.saturating_sub(1)],
            s[apex.saturating_sub(2)],
        );

        let mut start = (apex as isize - 2).max(0);
        // next sample to enter the history, the middle one sits at pos + 2
        let mut pos = apex as isize - 3;
        loop {
            if history.is_minimum() {
                start = pos + 2;
                break;
            }
            if pos < 0 {
                break;
            }
            let p = pos as usize;
            if d.third[p] < 0.0 && d.second[p] > 0.0 && d.first[p] < 0.0 {
                start = pos + 1;
                break;
            }
            history.push(s[p]);
            start = pos;
            pos -= 1;
        }
        start.max(0) as usize
    }
}
