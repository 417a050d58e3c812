use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltwh};

pub const POTHOLE_CLASS: i32 = 0;

/// Contains (x,y) of the left top corner and (width,height) of bbox, in pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c", default)]
    pub class: i32,
}

impl Detection {
    pub fn new(bbox: BBox<Ltwh>, confidence: f32) -> Self {
        Self {
            x: bbox.left(),
            y: bbox.top(),
            w: bbox.width(),
            h: bbox.height(),
            confidence,
            class: POTHOLE_CLASS,
        }
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltwh> {
        BBox::ltwh(self.x, self.y, self.w, self.h)
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        match self.class {
            POTHOLE_CLASS => "pothole",
            _ => "unknown",
        }
    }
}
