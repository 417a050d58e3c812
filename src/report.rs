use std::collections::BTreeMap;
use std::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::error::Result;
use crate::measurement::Measurement;
use crate::session::Totals;

/// One pothole as handed to persistence and API consumers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PotholeRecord {
    pub id: u32,
    pub length: f32,
    pub breadth: f32,
    pub depth: f32,
    pub volume: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Left, top, right, bottom in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[i64; 4]>,
}

impl PotholeRecord {
    pub fn new(id: u32, m: &Measurement) -> Self {
        Self {
            id,
            length: m.length,
            breadth: m.breadth,
            depth: m.depth,
            volume: m.volume(),
            confidence: None,
            bbox: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub total_potholes: usize,
    pub total_volume: f32,
    pub potholes: Vec<PotholeRecord>,
}

impl AnalysisReport {
    pub fn from_records(potholes: Vec<PotholeRecord>) -> Self {
        Self {
            total_potholes: potholes.len(),
            total_volume: potholes.iter().map(|p| p.volume).sum(),
            potholes,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// What a finished session measured.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub records: BTreeMap<u32, Measurement>,
    pub totals: Totals,
    pub frames: u64,
    pub blackouts: u32,
    /// Ended by a stop request rather than by the stream running out
    pub stopped: bool,
}

impl SessionSummary {
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport::from_records(
            self.records
                .iter()
                .map(|(&id, m)| PotholeRecord::new(id, m))
                .collect(),
        )
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID | Length (cm) | Breadth (cm) | Depth (cm)")?;
        writeln!(f, "----------------------------------------")?;

        for (id, m) in &self.records {
            writeln!(
                f,
                "{:<3}| {:<12.2}| {:<13.2}| {:.2}",
                id, m.length, m.breadth, m.depth
            )?;
        }

        writeln!(f, "----------------------------------------")?;
        writeln!(
            f,
            "Total | {:.2} | {:.2} | {:.2}",
            self.totals.length, self.totals.breadth, self.totals.depth
        )?;
        write!(f, "Total potholes detected: {}", self.totals.count)
    }
}
