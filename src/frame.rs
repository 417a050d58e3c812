use crate::bbox::{BBox, Ltwh};
use crate::measurement::Measurement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Normal,
    /// No detections: the current segment was closed and nothing was drawn
    Boundary,
}

/// One confirmed pothole as seen on a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub global_id: u32,
    pub bbox: BBox<Ltwh>,
    pub measurement: Measurement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub index: u64,
    pub kind: FrameKind,
    pub observations: Vec<Observation>,
}

impl FrameReport {
    pub fn boundary(index: u64) -> Self {
        Self {
            index,
            kind: FrameKind::Boundary,
            observations: Vec::new(),
        }
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.kind == FrameKind::Boundary
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
