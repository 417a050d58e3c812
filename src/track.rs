use crate::bbox::{BBox, Ltwh};

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Tracker-local id, only meaningful inside the current segment
    pub track_id: u64,
    pub confirmed: bool,
    pub confidence: f32,
    pub bbox: BBox<Ltwh>,
}

impl Track {
    pub fn confirmed(track_id: u64, bbox: BBox<Ltwh>) -> Self {
        Self {
            track_id,
            confirmed: true,
            confidence: 1.0,
            bbox,
        }
    }

    pub fn tentative(track_id: u64, bbox: BBox<Ltwh>) -> Self {
        Self {
            confirmed: false,
            ..Self::confirmed(track_id, bbox)
        }
    }
}
