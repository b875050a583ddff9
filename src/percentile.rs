//! Percentile calculation with linear interpolation between closest ranks
//!
//! For `n` sorted values the p-th percentile sits at rank `p/100 * (n - 1)`;
//! fractional ranks interpolate between the two neighbouring samples. This is
//! the "linear" method used by most dataframe libraries, so `p = 50` is the
//! conventional median.

/// Samples sorted once, ready for repeated percentile queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedSamples {
    values: Vec<f64>,
}

impl SortedSamples {
    /// Sort a copy of `values` using the IEEE total order
    pub fn new(values: &[f64]) -> Self {
        let mut values = values.to_vec();
        values.sort_by(f64::total_cmp);
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn min(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// p-th percentile, `None` when there are no samples
    ///
    /// `p` is clamped to `[0, 100]`.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        let n = self.values.len();
        if n == 0 {
            return None;
        }
        if n == 1 {
            return Some(self.values[0]);
        }

        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;

        if lower == upper {
            Some(self.values[lower])
        } else {
            let weight = rank - lower as f64;
            let (lo, hi) = (self.values[lower], self.values[upper]);
            // rounding must not carry the result past its neighbours
            Some((lo + (hi - lo) * weight).clamp(lo, hi))
        }
    }

    pub fn median(&self) -> Option<f64> {
        self.percentile(50.0)
    }
}

/// p-th percentile of an unsorted slice
///
/// Returns `None` for an empty slice; callers decide what an empty group reports.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    SortedSamples::new(values).percentile(p)
}
