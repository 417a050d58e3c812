use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::frame::FrameReport;
use crate::measurement::{Measurement, MeasurementCache};
use crate::session::{SessionAggregator, Totals};

/// Consistent copy of a running session, as seen by a status or query surface.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub processing_active: bool,
    pub latest_frame: Option<FrameReport>,
    /// Measurements of the segment in progress
    pub latest_potholes: BTreeMap<u32, Measurement>,
    /// Everything merged into the session so far
    pub records: BTreeMap<u32, Measurement>,
    pub totals: Totals,
}

/// Session state shared between the frame loop and concurrent readers.
///
/// A single lock guards every field; readers only ever get cloned snapshots.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<SessionSnapshot>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().clone()
    }

    pub fn totals(&self) -> Totals {
        self.inner.lock().totals
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().processing_active
    }

    pub fn latest_frame(&self) -> Option<FrameReport> {
        self.inner.lock().latest_frame.clone()
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.inner.lock().processing_active = active;
    }

    pub(crate) fn publish_frame(&self, report: &FrameReport, segment: &MeasurementCache) {
        let mut state = self.inner.lock();

        state.latest_frame = Some(report.clone());
        state.latest_potholes = collect(segment);
    }

    pub(crate) fn publish_session(&self, session: &SessionAggregator, segment: &MeasurementCache) {
        let mut state = self.inner.lock();

        state.records = session.records().clone();
        state.totals = session.totals();
        state.latest_potholes = collect(segment);
    }

    /// Publishes a blackout frame together with the merge it caused, under one lock.
    pub(crate) fn publish_boundary(
        &self,
        report: &FrameReport,
        session: &SessionAggregator,
        segment: &MeasurementCache,
    ) {
        let mut state = self.inner.lock();

        state.latest_frame = Some(report.clone());
        state.records = session.records().clone();
        state.totals = session.totals();
        state.latest_potholes = collect(segment);
    }
}

fn collect(segment: &MeasurementCache) -> BTreeMap<u32, Measurement> {
    segment.iter().map(|(&id, &m)| (id, m)).collect()
}

/// External stop request for a running pipeline, checked before every frame read.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::depth::DepthAggregator;
    use crate::frame::FrameKind;
    use ndarray::Array2;

    #[test]
    fn snapshot_reflects_published_session() {
        let shared = SharedSession::new();
        assert!(!shared.is_active());
        assert_eq!(shared.totals().count, 0);

        let map = Array2::from_elem((10, 10), 1.0);
        let mut cache = MeasurementCache::new();
        let mut depths = DepthAggregator::new(1.0, 4);
        cache.get_or_compute(1, &BBox::ltwh(0.0, 0.0, 2.0, 3.0), map.view(), &mut depths, 1.0);

        let mut session = SessionAggregator::new();
        shared.set_active(true);
        shared.publish_session(&session, &cache);

        let snap = shared.snapshot();
        assert!(snap.processing_active);
        assert_eq!(snap.latest_potholes.len(), 1);
        assert!(snap.records.is_empty());

        session.merge(&cache);
        shared.publish_session(&session, &MeasurementCache::new());

        let snap = shared.snapshot();
        assert_eq!(snap.totals.count, 1);
        assert_eq!(snap.records.get(&1), Some(&Measurement::new(2.0, 3.0, 1.0)));
        assert!(snap.latest_potholes.is_empty());
    }

    #[test]
    fn readers_on_other_threads_see_whole_updates() {
        let shared = SharedSession::new();
        let reader = shared.clone();

        let handle = std::thread::spawn(move || {
            for _ in 0..1000 {
                let snap = reader.snapshot();
                assert_eq!(snap.totals.count, snap.records.len());
            }
        });

        let map = Array2::from_elem((10, 10), 1.0);
        let mut session = SessionAggregator::new();
        let mut depths = DepthAggregator::new(1.0, 4);
        for id in 1..200 {
            let mut cache = MeasurementCache::new();
            cache.get_or_compute(id, &BBox::ltwh(0.0, 0.0, 1.0, 1.0), map.view(), &mut depths, 1.0);
            session.merge(&cache);
            shared.publish_session(&session, &cache);
        }

        handle.join().unwrap();
        assert_eq!(shared.totals().count, 199);
    }

    #[test]
    fn boundary_publishes_frame_and_merge_together() {
        let shared = SharedSession::new();
        let reader = shared.clone();

        let handle = std::thread::spawn(move || {
            for _ in 0..1000 {
                let snap = reader.snapshot();
                if let Some(frame) = &snap.latest_frame {
                    assert_eq!(frame.is_boundary(), snap.latest_potholes.is_empty());
                    assert_eq!((frame.index as usize + 1) / 2, snap.records.len());
                }
            }
        });

        let map = Array2::from_elem((10, 10), 1.0);
        let mut session = SessionAggregator::new();
        let mut depths = DepthAggregator::new(1.0, 4);
        for id in 1..=200u32 {
            let index = 2 * (id as u64 - 1);
            let mut cache = MeasurementCache::new();
            cache.get_or_compute(id, &BBox::ltwh(0.0, 0.0, 1.0, 1.0), map.view(), &mut depths, 1.0);

            let normal = FrameReport {
                index,
                kind: FrameKind::Normal,
                observations: Vec::new(),
            };
            shared.publish_frame(&normal, &cache);

            session.merge(&cache);
            cache.reset();
            shared.publish_boundary(&FrameReport::boundary(index + 1), &session, &cache);
        }

        handle.join().unwrap();

        let snap = shared.snapshot();
        assert_eq!(snap.records.len(), 200);
        assert!(snap.latest_frame.unwrap().is_boundary());
    }

    #[test]
    fn stop_handle_is_shared_between_clones() {
        let stop = StopHandle::new();
        let other = stop.clone();
        assert!(!other.is_stopped());

        stop.stop();
        assert!(other.is_stopped());
    }
}
