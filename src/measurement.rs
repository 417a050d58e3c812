use std::collections::{btree_map, BTreeMap};

use ndarray::{s, ArrayView2};
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltwh, PixelRect};
use crate::depth::DepthAggregator;
use crate::units::pixels_to_cm;

/// Physical size of one pothole, in centimetres.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    pub length: f32,
    pub breadth: f32,
    pub depth: f32,
}

impl Measurement {
    pub fn new(length: f32, breadth: f32, depth: f32) -> Self {
        Self {
            length,
            breadth,
            depth,
        }
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        self.length * self.breadth * self.depth
    }
}

/// Crops the part of `depth_map` covered by `rect`.
pub fn depth_region<'a>(depth_map: ArrayView2<'a, f32>, rect: &PixelRect) -> ArrayView2<'a, f32> {
    let (rows, cols) = depth_map.dim();
    let (ys, xs) = rect.clip(rows, cols);

    depth_map.slice_move(s![ys, xs])
}

/// Write-once measurements for the current segment.
///
/// The first sighting of a pothole is canonical for the rest of the segment, later
/// frames only read it back so the displayed values stay put.
#[derive(Debug, Clone, Default)]
pub struct MeasurementCache {
    entries: BTreeMap<u32, Measurement>,
}

impl MeasurementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        global_id: u32,
        bbox: &BBox<Ltwh>,
        depth_map: ArrayView2<'_, f32>,
        depths: &mut DepthAggregator,
        factor: f32,
    ) -> Measurement {
        if let Some(m) = self.entries.get(&global_id) {
            return *m;
        }

        let px = bbox.pixels();
        let depth = depths.record_sample(global_id, depth_region(depth_map, &px));
        let m = Measurement::new(
            pixels_to_cm(px.width as f32, factor),
            pixels_to_cm(px.height as f32, factor),
            depth,
        );

        log::debug!(
            "pothole {} measured: L {:.2} B {:.2} D {:.2}",
            global_id,
            m.length,
            m.breadth,
            m.depth
        );

        self.entries.insert(global_id, m);
        m
    }

    #[inline]
    pub fn get(&self, global_id: u32) -> Option<&Measurement> {
        self.entries.get(&global_id)
    }

    #[inline]
    pub fn iter(&self) -> btree_map::Iter<'_, u32, Measurement> {
        self.entries.iter()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a MeasurementCache {
    type Item = (&'a u32, &'a Measurement);
    type IntoIter = btree_map::Iter<'a, u32, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
