use std::collections::{btree_map, BTreeMap};

use serde_derive::{Deserialize, Serialize};

use crate::measurement::{Measurement, MeasurementCache};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub count: usize,
    pub length: f32,
    pub breadth: f32,
    pub depth: f32,
    pub volume: f32,
}

/// Lifetime record of every pothole measured in a session.
///
/// Records are only ever added. The first segment to report an id wins.
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    records: BTreeMap<u32, Measurement>,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a finished segment in, returns how many records were new.
    pub fn merge(&mut self, segment: &MeasurementCache) -> usize {
        let mut added = 0;

        for (&id, m) in segment {
            if let btree_map::Entry::Vacant(e) = self.records.entry(id) {
                e.insert(*m);
                added += 1;
            }
        }

        added
    }

    pub fn totals(&self) -> Totals {
        self.records.values().fold(
            Totals {
                count: self.records.len(),
                ..Totals::default()
            },
            |mut t, m| {
                t.length += m.length;
                t.breadth += m.breadth;
                t.depth += m.depth;
                t.volume += m.volume();
                t
            },
        )
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&Measurement> {
        self.records.get(&id)
    }

    #[inline]
    pub fn records(&self) -> &BTreeMap<u32, Measurement> {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::depth::DepthAggregator;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    fn segment(entries: &[(u32, f32, f32, f32)]) -> MeasurementCache {
        let mut cache = MeasurementCache::new();
        let mut depths = DepthAggregator::new(1.0, 4);

        for &(id, w, h, d) in entries {
            let map = Array2::from_elem((200, 200), d);
            cache.get_or_compute(id, &BBox::ltwh(0.0, 0.0, w, h), map.view(), &mut depths, 1.0);
        }

        cache
    }

    #[test]
    fn first_writer_wins() {
        let mut session = SessionAggregator::new();

        assert_eq!(session.merge(&segment(&[(1, 10.0, 20.0, 3.0), (2, 4.0, 4.0, 1.0)])), 2);
        assert_eq!(session.merge(&segment(&[(2, 99.0, 99.0, 9.0), (3, 5.0, 6.0, 2.0)])), 1);

        assert_eq!(session.len(), 3);
        assert_eq!(session.get(2), Some(&Measurement::new(4.0, 4.0, 1.0)));
    }

    #[test]
    fn totals_sum_every_record() {
        let mut session = SessionAggregator::new();
        assert_eq!(session.totals(), Totals::default());

        session.merge(&segment(&[(1, 10.0, 20.0, 3.0), (2, 4.0, 5.0, 1.0)]));
        let t = session.totals();

        assert_eq!(t.count, 2);
        assert_abs_diff_eq!(t.length, 14.0);
        assert_abs_diff_eq!(t.breadth, 25.0);
        assert_abs_diff_eq!(t.depth, 4.0);
        assert_abs_diff_eq!(t.volume, 600.0 + 20.0);
    }

    #[test]
    fn count_never_decreases() {
        let mut session = SessionAggregator::new();
        let mut last = 0;

        for seg in [
            segment(&[(1, 1.0, 1.0, 1.0)]),
            segment(&[]),
            segment(&[(1, 2.0, 2.0, 2.0)]),
            segment(&[(4, 1.0, 1.0, 1.0), (5, 1.0, 1.0, 1.0)]),
        ] {
            session.merge(&seg);
            assert!(session.totals().count >= last);
            last = session.totals().count;
        }

        assert_eq!(last, 3);
    }
}
