use std::collections::HashMap;

use ndarray::ArrayView2;

pub const DEFAULT_DEPTH_SCALE: f32 = 0.001;
pub const DEFAULT_HISTORY: usize = 4;

/// Largest depth samples seen for one pothole, kept in descending order.
#[derive(Debug, Clone)]
pub struct DepthHistory {
    capacity: usize,
    samples: Vec<f32>,
}

impl DepthHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: Vec::with_capacity(capacity + 1),
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn push(&mut self, sample: f32) {
        self.samples.push(sample);
        self.samples.sort_by(|a, b| b.total_cmp(a));
        self.samples.truncate(self.capacity);
    }

    pub fn mean(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }

        Some(self.samples.iter().sum::<f32>() / self.samples.len() as f32)
    }

    #[inline]
    pub fn top(&self) -> Option<f32> {
        self.samples.first().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.samples.len()
    }
}

/// Deepest valid cell of a depth region, scaled. `None` when nothing is `> 0`.
pub fn max_valid_depth(region: ArrayView2<'_, f32>, scale: f32) -> Option<f32> {
    region
        .iter()
        .copied()
        .filter(|&v| v > 0.0)
        .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |m| m.max(v))))
        .map(|max| max * scale)
}

/// Per-pothole depth smoothing for the current segment.
///
/// Each sample is the deepest valid point inside the pothole box. Keeping only the
/// few largest samples and averaging them tracks the true bottom as more of the
/// pothole comes into view while damping single-frame spikes.
#[derive(Debug, Clone)]
pub struct DepthAggregator {
    scale: f32,
    capacity: usize,
    histories: HashMap<u32, DepthHistory>,
}

impl Default for DepthAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH_SCALE, DEFAULT_HISTORY)
    }
}

impl DepthAggregator {
    pub fn new(scale: f32, capacity: usize) -> Self {
        Self {
            scale,
            capacity: capacity.max(1),
            histories: HashMap::new(),
        }
    }

    /// Adds a sample from `region` and returns the current stable depth for `id`.
    ///
    /// A region without valid cells reports `0.0` and leaves the history as is.
    pub fn record_sample(&mut self, id: u32, region: ArrayView2<'_, f32>) -> f32 {
        let sample = match max_valid_depth(region, self.scale) {
            Some(sample) => sample,
            None => return 0.0,
        };

        let capacity = self.capacity;
        let history = self
            .histories
            .entry(id)
            .or_insert_with(|| DepthHistory::new(capacity));

        history.push(sample);
        history.mean().unwrap_or(0.0)
    }

    #[inline]
    pub fn history(&self, id: u32) -> Option<&DepthHistory> {
        self.histories.get(&id)
    }

    pub fn reset(&mut self) {
        self.histories.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn filled(value: f32) -> Array2<f32> {
        Array2::from_elem((3, 3), value)
    }

    #[test]
    fn max_of_valid_cells_is_scaled() {
        let region = array![[0.0, 200.0], [-5.0, 500.0]];
        let mut agg = DepthAggregator::default();

        assert_abs_diff_eq!(agg.record_sample(1, region.view()), 0.5, epsilon = 1e-6);
        assert_eq!(agg.history(1).unwrap().num_points(), 1);
    }

    #[test]
    fn empty_region_reports_zero_without_touching_history() {
        let mut agg = DepthAggregator::default();
        agg.record_sample(7, filled(300.0).view());

        let invalid = array![[0.0, -1.0], [0.0, 0.0]];
        assert_eq!(agg.record_sample(7, invalid.view()), 0.0);
        let history = agg.history(7).unwrap();
        assert_eq!(history.num_points(), 1);
        assert_abs_diff_eq!(history.top().unwrap(), 0.3, epsilon = 1e-6);

        let nothing = Array2::<f32>::zeros((0, 0));
        assert_eq!(agg.record_sample(8, nothing.view()), 0.0);
        assert!(agg.history(8).is_none());
    }

    #[test]
    fn keeps_four_largest_descending() {
        let mut agg = DepthAggregator::default();
        let inputs = [100.0, 700.0, 300.0, 200.0, 600.0, 50.0];
        let mut last = 0.0;

        for v in inputs {
            last = agg.record_sample(3, filled(v).view());
            let history = agg.history(3).unwrap();
            assert!(history.num_points() <= 4);
            assert!(history.as_slice().windows(2).all(|w| w[0] >= w[1]));
        }

        let history = agg.history(3).unwrap();
        assert_eq!(history.num_points(), 4);
        assert_abs_diff_eq!(history.top().unwrap(), 0.7, epsilon = 1e-6);
        assert_abs_diff_eq!(last, (0.7 + 0.6 + 0.3 + 0.2) / 4.0, epsilon = 1e-6);
    }

    #[test]
    fn mean_stays_within_retained_samples() {
        let mut agg = DepthAggregator::default();

        for (i, v) in [420.0, 180.0, 960.0, 510.0, 75.0, 330.0, 880.0]
            .into_iter()
            .enumerate()
        {
            let mean = agg.record_sample(9, filled(v).view());
            let samples = agg.history(9).unwrap().as_slice();
            let min = samples.iter().copied().fold(f32::INFINITY, f32::min);
            let max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);

            assert!(samples.len() == (i + 1).min(4));
            assert!(mean >= min - 1e-6 && mean <= max + 1e-6);
        }
    }

    #[test]
    fn ids_are_independent_and_reset_clears() {
        let mut agg = DepthAggregator::default();
        agg.record_sample(1, filled(100.0).view());
        agg.record_sample(2, filled(900.0).view());

        assert_abs_diff_eq!(agg.history(1).unwrap().mean().unwrap(), 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(agg.history(2).unwrap().mean().unwrap(), 0.9, epsilon = 1e-6);

        agg.reset();
        assert!(agg.is_empty());
    }
}
