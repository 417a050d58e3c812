use ndarray::ArrayView2;

use crate::config::PipelineConfig;
use crate::depth::DepthAggregator;
use crate::frame::Observation;
use crate::identity::IdentityRegistry;
use crate::measurement::MeasurementCache;
use crate::session::SessionAggregator;
use crate::{Detection, Track};

/// A frame without detections separates two segments (a blackout between clips).
#[inline]
pub fn is_boundary(detections: &[Detection]) -> bool {
    detections.is_empty()
}

/// Everything that lives for one segment, plus the session-wide id counter.
#[derive(Debug, Clone)]
pub struct Scene {
    identities: IdentityRegistry,
    depths: DepthAggregator,
    measurements: MeasurementCache,
    conversion_factor: f32,
    segments_closed: u32,
}

impl Scene {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            identities: IdentityRegistry::new(),
            depths: DepthAggregator::new(config.depth_scale, config.depth_history),
            measurements: MeasurementCache::new(),
            conversion_factor: config.conversion_factor,
            segments_closed: 0,
        }
    }

    /// Measures every confirmed track, computing only for potholes new to this segment.
    pub fn update(&mut self, tracks: &[Track], depth_map: ArrayView2<'_, f32>) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(tracks.len());

        for track in tracks.iter().filter(|t| t.confirmed) {
            let global_id = self.identities.resolve(track.track_id);
            let measurement = self.measurements.get_or_compute(
                global_id,
                &track.bbox,
                depth_map,
                &mut self.depths,
                self.conversion_factor,
            );

            observations.push(Observation {
                global_id,
                bbox: track.bbox,
                measurement,
            });
        }

        observations
    }

    /// Hands the segment's measurements to `session` and starts a fresh segment.
    ///
    /// Returns the number of records the session did not have yet.
    pub fn close_segment(&mut self, session: &mut SessionAggregator) -> usize {
        let added = session.merge(&self.measurements);

        self.identities.reset();
        self.depths.reset();
        self.measurements.reset();
        self.segments_closed += 1;

        added
    }

    #[inline]
    pub fn measurements(&self) -> &MeasurementCache {
        &self.measurements
    }

    #[inline]
    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    #[inline]
    pub fn depths(&self) -> &DepthAggregator {
        &self.depths
    }

    #[inline]
    pub fn segments_closed(&self) -> u32 {
        self.segments_closed
    }
}
