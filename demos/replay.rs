use std::io::BufRead;

use pothole_meter::bbox::BBox;
use pothole_meter::source::FrameIter;
use pothole_meter::{
    DepthEstimator, DepthMap, Detection, Detector, Pipeline, PipelineConfig, Track, Tracker,
};
use serde_derive::Deserialize;

#[derive(Deserialize, Debug, Clone)]
struct RecordedTrack {
    id: u64,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    #[serde(default = "confirmed_by_default")]
    confirmed: bool,
}

fn confirmed_by_default() -> bool {
    true
}

/// One line of a recording: `<timestamp>: {"dets": [...], "tracks": [...], "depth": 500}`
#[derive(Deserialize, Debug, Clone)]
struct RecordedFrame {
    #[serde(default)]
    dets: Vec<Detection>,
    #[serde(default)]
    tracks: Vec<RecordedTrack>,
    #[serde(default)]
    depth: f32,
}

struct Replay;

impl Detector<RecordedFrame> for Replay {
    fn detect(&mut self, frame: &RecordedFrame) -> anyhow::Result<Vec<Detection>> {
        Ok(frame.dets.clone())
    }
}

impl DepthEstimator<RecordedFrame> for Replay {
    fn estimate(&mut self, frame: &RecordedFrame) -> anyhow::Result<DepthMap> {
        let (w, h) = frame.dets.iter().fold((1, 1), |(w, h), d| {
            (w.max((d.x + d.w).ceil() as usize), h.max((d.y + d.h).ceil() as usize))
        });

        Ok(DepthMap::from_elem((h, w), frame.depth))
    }
}

impl Tracker<RecordedFrame> for Replay {
    fn update(&mut self, _: &[Detection], frame: &RecordedFrame) -> anyhow::Result<Vec<Track>> {
        Ok(frame
            .tracks
            .iter()
            .map(|t| Track {
                track_id: t.id,
                confirmed: t.confirmed,
                confidence: 1.0,
                bbox: BBox::ltwh(t.x, t.y, t.w, t.h),
            })
            .collect())
    }

    fn reset(&mut self) {}
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let mut args = std::env::args();
    let _ = args.next();
    let in_file_name = args.next().expect("expected recording file name");
    let config = match args.next() {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let file = std::fs::File::open(&in_file_name)?;
    let frames = std::io::BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| {
            let idx = match line.find(':') {
                Some(idx) => idx,
                None => {
                    eprintln!("wrong file format: expected `:`");
                    return None;
                }
            };

            match serde_json::from_str::<RecordedFrame>(&line[idx + 1..]) {
                Ok(frame) => Some(frame),
                Err(err) => {
                    eprintln!("wrong file format: {}", err);
                    None
                }
            }
        });

    let mut pipeline = Pipeline::new(Replay, Replay, Replay, config)?;
    let summary = pipeline.run_with(FrameIter::new(&in_file_name, frames), |report| {
        for o in report.iter() {
            println!(
                "{} ID: {} | L: {:.2} cm, B: {:.2} cm, D: {:.2} cm",
                report.index,
                o.global_id,
                o.measurement.length,
                o.measurement.breadth,
                o.measurement.depth
            );
        }
    })?;

    println!("\n{}", summary);
    println!("{}", summary.report().to_json()?);

    Ok(())
}
