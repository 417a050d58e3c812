use crate::config::PipelineConfig;
use crate::depth::max_valid_depth;
use crate::error::{Error, Result, Stage};
use crate::measurement::{depth_region, Measurement};
use crate::pipeline::retry;
use crate::report::PotholeRecord;
use crate::units::pixels_to_cm;
use crate::{DepthEstimator, Detector, FrameSource};

/// Measures every detection of a single image.
///
/// There is no tracker and no history here: ids follow detection order starting
/// at 1, and depth is the deepest valid point of the box on this one frame.
pub fn measure_still<S, D, E>(
    mut source: S,
    detector: &mut D,
    depth: &mut E,
    config: &PipelineConfig,
) -> Result<Vec<PotholeRecord>>
where
    S: FrameSource,
    D: Detector<S::Frame>,
    E: DepthEstimator<S::Frame>,
{
    config.validate()?;

    let frame = match source.read() {
        Some(frame) if source.is_opened() => frame,
        _ => return Err(Error::SourceUnavailable(source.name().to_string())),
    };

    let retries = config.max_frame_retries;
    let detections = retry(Stage::Detector, retries, || detector.detect(&frame))?;
    let depth_map = retry(Stage::DepthEstimator, retries, || depth.estimate(&frame))?;

    let records = detections
        .iter()
        .enumerate()
        .map(|(idx, det)| {
            let px = det.bbox().as_ltrb().pixels();
            let d = max_valid_depth(depth_region(depth_map.view(), &px), config.depth_scale)
                .unwrap_or(0.0);
            let m = Measurement::new(
                pixels_to_cm(px.width as f32, config.conversion_factor),
                pixels_to_cm(px.height as f32, config.conversion_factor),
                d,
            );

            PotholeRecord {
                confidence: Some(det.confidence),
                bbox: Some([px.left, px.top, px.left + px.width, px.top + px.height]),
                ..PotholeRecord::new(idx as u32 + 1, &m)
            }
        })
        .collect::<Vec<_>>();

    log::info!("{}: {} potholes", source.name(), records.len());

    Ok(records)
}
