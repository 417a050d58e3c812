use crate::config::PipelineConfig;
use crate::error::{Error, Result, Stage};
use crate::frame::{FrameKind, FrameReport};
use crate::report::SessionSummary;
use crate::scene::{self, Scene};
use crate::session::SessionAggregator;
use crate::shared::{SharedSession, StopHandle};
use crate::{DepthEstimator, Detector, FrameSource, Tracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Ended,
}

/// Calls a model, giving the same frame `retries` more chances before giving up.
pub(crate) fn retry<R>(
    stage: Stage,
    retries: u32,
    mut call: impl FnMut() -> anyhow::Result<R>,
) -> Result<R> {
    let mut attempts = 0;

    loop {
        attempts += 1;

        match call() {
            Ok(value) => return Ok(value),
            Err(err) if attempts <= retries => {
                log::warn!("{} failed (attempt {}): {:#}", stage, attempts, err);
            }
            Err(err) => return Err(Error::model(stage, attempts, &err)),
        }
    }
}

/// Drives one stream: detector, depth estimator and tracker per frame, then
/// identity resolution, measurement and segment bookkeeping.
pub struct Pipeline<D, E, T> {
    detector: D,
    depth: E,
    tracker: T,
    config: PipelineConfig,
    scene: Scene,
    session: SessionAggregator,
    state: PipelineState,
    frames: u64,
    blackouts: u32,
    stopped: bool,
    shared: SharedSession,
    stop: StopHandle,
}

impl<D, E, T> Pipeline<D, E, T> {
    pub fn new(detector: D, depth: E, tracker: T, config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            detector,
            depth,
            tracker,
            scene: Scene::new(&config),
            config,
            session: SessionAggregator::new(),
            state: PipelineState::Idle,
            frames: 0,
            blackouts: 0,
            stopped: false,
            shared: SharedSession::new(),
            stop: StopHandle::new(),
        })
    }

    /// Publish progress into an existing shared session instead of a private one.
    pub fn with_shared(mut self, shared: SharedSession) -> Self {
        self.shared = shared;
        self
    }

    pub fn with_stop(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    #[inline]
    pub fn shared(&self) -> &SharedSession {
        &self.shared
    }

    #[inline]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[inline]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn session(&self) -> &SessionAggregator {
        &self.session
    }

    #[inline]
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    fn start(&mut self) {
        if self.state == PipelineState::Idle {
            self.state = PipelineState::Running;
            self.shared.set_active(true);
        }
    }

    fn abort(&mut self, err: &Error) {
        log::error!("session aborted at frame {}: {}", self.frames, err);

        self.state = PipelineState::Ended;
        self.shared.set_active(false);
    }

    /// Merges the open segment, ends the session and returns what it measured.
    ///
    /// Calling it again, or after an aborted session, only reports.
    pub fn finish(&mut self) -> SessionSummary {
        if self.state != PipelineState::Ended {
            let added = self.session.merge(self.scene.measurements());
            self.state = PipelineState::Ended;

            log::info!(
                "session ended after {} frames: {} potholes ({} from last segment)",
                self.frames,
                self.session.len(),
                added
            );
        }

        self.shared
            .publish_session(&self.session, self.scene.measurements());
        self.shared.set_active(false);

        SessionSummary {
            records: self.session.records().clone(),
            totals: self.session.totals(),
            frames: self.frames,
            blackouts: self.blackouts,
            stopped: self.stopped,
        }
    }

    /// Runs one frame through the models and the segment state.
    ///
    /// A model failure that survives the retries ends the session; what was
    /// already merged stays available through [`Pipeline::session`] and the shared state.
    pub fn process_frame<F>(&mut self, frame: &F) -> Result<FrameReport>
    where
        D: Detector<F>,
        E: DepthEstimator<F>,
        T: Tracker<F>,
    {
        if self.state == PipelineState::Ended {
            return Err(Error::InvalidState("session already ended"));
        }

        self.start();

        match self.step(frame) {
            Ok(report) => Ok(report),
            Err(err) => {
                self.abort(&err);
                Err(err)
            }
        }
    }

    fn step<F>(&mut self, frame: &F) -> Result<FrameReport>
    where
        D: Detector<F>,
        E: DepthEstimator<F>,
        T: Tracker<F>,
    {
        let index = self.frames;
        self.frames += 1;

        let retries = self.config.max_frame_retries;
        let detector = &mut self.detector;
        let detections = retry(Stage::Detector, retries, || detector.detect(frame))?;

        if scene::is_boundary(&detections) {
            let added = self.scene.close_segment(&mut self.session);
            self.tracker.reset();
            self.blackouts += 1;

            log::debug!(
                "blackout at frame {}: {} potholes merged, session holds {}",
                index,
                added,
                self.session.len()
            );

            let report = FrameReport::boundary(index);
            self.shared
                .publish_boundary(&report, &self.session, self.scene.measurements());

            return Ok(report);
        }

        let depth = &mut self.depth;
        let depth_map = retry(Stage::DepthEstimator, retries, || depth.estimate(frame))?;

        let tracker = &mut self.tracker;
        let tracks = retry(Stage::Tracker, retries, || tracker.update(&detections, frame))?;

        let report = FrameReport {
            index,
            kind: FrameKind::Normal,
            observations: self.scene.update(&tracks, depth_map.view()),
        };

        self.shared.publish_frame(&report, self.scene.measurements());

        Ok(report)
    }

    /// Processes `source` to the end, a read failure, or a stop request.
    pub fn run<S>(&mut self, source: S) -> Result<SessionSummary>
    where
        S: FrameSource,
        D: Detector<S::Frame>,
        E: DepthEstimator<S::Frame>,
        T: Tracker<S::Frame>,
    {
        self.run_with(source, |_| {})
    }

    /// Like [`Pipeline::run`], handing every frame report to `on_frame` for rendering or streaming.
    pub fn run_with<S, C>(&mut self, mut source: S, mut on_frame: C) -> Result<SessionSummary>
    where
        S: FrameSource,
        D: Detector<S::Frame>,
        E: DepthEstimator<S::Frame>,
        T: Tracker<S::Frame>,
        C: FnMut(&FrameReport),
    {
        if self.state == PipelineState::Ended {
            return Err(Error::InvalidState("session already ended"));
        }

        if !source.is_opened() {
            log::error!("could not open {}", source.name());
            return Err(Error::SourceUnavailable(source.name().to_string()));
        }

        log::info!("processing {}", source.name());
        self.start();

        loop {
            if self.stop.is_stopped() {
                log::info!("stop requested after {} frames", self.frames);
                self.stopped = true;
                break;
            }

            let frame = match source.read() {
                Some(frame) => frame,
                None => break,
            };

            let report = self.process_frame(&frame)?;
            on_frame(&report);
        }

        Ok(self.finish())
    }
}
