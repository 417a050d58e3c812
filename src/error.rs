use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which external collaborator failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Detector,
    DepthEstimator,
    Tracker,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Detector => f.write_str("detector"),
            Stage::DepthEstimator => f.write_str("depth estimator"),
            Stage::Tracker => f.write_str("tracker"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("{stage} failed after {attempts} attempt(s): {reason}")]
    ModelFailure {
        stage: Stage,
        attempts: u32,
        reason: String,
    },

    #[error("Invalid pipeline state: {0}")]
    InvalidState(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn model(stage: Stage, attempts: u32, err: &anyhow::Error) -> Self {
        Self::ModelFailure {
            stage,
            attempts,
            reason: format!("{:#}", err),
        }
    }

    #[inline]
    pub fn is_model_failure(&self) -> bool {
        matches!(self, Error::ModelFailure { .. })
    }
}
