use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::depth::{DEFAULT_DEPTH_SCALE, DEFAULT_HISTORY};
use crate::error::{Error, Result};
use crate::units::DEFAULT_CONVERSION_FACTOR;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Centimetres per pixel
    pub conversion_factor: f32,
    /// Multiplier applied to raw depth-map values
    pub depth_scale: f32,
    /// Depth samples kept per pothole
    pub depth_history: usize,
    /// Extra attempts on the same frame when a model call fails
    pub max_frame_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            conversion_factor: DEFAULT_CONVERSION_FACTOR,
            depth_scale: DEFAULT_DEPTH_SCALE,
            depth_history: DEFAULT_HISTORY,
            max_frame_retries: 2,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(src: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;

        Self::from_json(&src)
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth_history == 0 {
            return Err(Error::InvalidConfig(
                "depth_history must keep at least one sample".into(),
            ));
        }

        if !self.conversion_factor.is_finite() || !self.depth_scale.is_finite() {
            return Err(Error::InvalidConfig("scale factors must be finite".into()));
        }

        Ok(())
    }
}
