pub mod bbox;
pub mod config;
pub mod depth;
pub mod detection;
pub mod error;
pub mod frame;
pub mod identity;
pub mod measurement;
pub mod pipeline;
pub mod report;
pub mod scene;
pub mod session;
pub mod shared;
pub mod source;
pub mod still;
pub mod units;

mod track;

pub use config::PipelineConfig;
pub use detection::Detection;
pub use error::{Error, Result};
pub use frame::{FrameKind, FrameReport, Observation};
pub use measurement::Measurement;
pub use pipeline::{Pipeline, PipelineState};
pub use report::{AnalysisReport, PotholeRecord, SessionSummary};
pub use shared::{SessionSnapshot, SharedSession, StopHandle};
pub use track::Track;

/// Dense per-pixel depth, indexed `[row, col]` (y, x). Values `<= 0` carry no estimate.
pub type DepthMap = ndarray::Array2<f32>;

pub trait Detector<F> {
    /// May return nothing, which closes the current segment.
    fn detect(&mut self, frame: &F) -> anyhow::Result<Vec<Detection>>;
}

pub trait DepthEstimator<F> {
    /// Must match the frame's spatial dimensions.
    fn estimate(&mut self, frame: &F) -> anyhow::Result<DepthMap>;
}

/// Opaque multi-object tracker. Association and confirmation are its business.
pub trait Tracker<F> {
    fn update(&mut self, detections: &[Detection], frame: &F) -> anyhow::Result<Vec<Track>>;

    /// Forget every local id, as if freshly created.
    fn reset(&mut self);
}

/// Lazy, finite, non-restartable stream of frames.
pub trait FrameSource {
    type Frame;

    fn name(&self) -> &str;

    fn is_opened(&self) -> bool;

    /// `None` on end of stream or on a failed read.
    fn read(&mut self) -> Option<Self::Frame>;
}

impl<F, T: Detector<F> + ?Sized> Detector<F> for Box<T> {
    #[inline]
    fn detect(&mut self, frame: &F) -> anyhow::Result<Vec<Detection>> {
        (**self).detect(frame)
    }
}

impl<F, T: DepthEstimator<F> + ?Sized> DepthEstimator<F> for Box<T> {
    #[inline]
    fn estimate(&mut self, frame: &F) -> anyhow::Result<DepthMap> {
        (**self).estimate(frame)
    }
}

impl<F, T: Tracker<F> + ?Sized> Tracker<F> for Box<T> {
    #[inline]
    fn update(&mut self, detections: &[Detection], frame: &F) -> anyhow::Result<Vec<Track>> {
        (**self).update(detections, frame)
    }

    #[inline]
    fn reset(&mut self) {
        (**self).reset()
    }
}
