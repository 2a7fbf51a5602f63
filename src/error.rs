//! Error handling

use thiserror::Error;

use crate::logic::features::layout::LayoutMismatchError;

pub type DecoderResult<T> = Result<T, DecoderError>;

/// Invalid generator parameters. Never clamped, always surfaced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must lie in [0, 1], got {value}")]
    RatioOutOfRange { field: &'static str, value: f64 },

    #[error("base_firing_rate must be a positive finite rate, got {0}")]
    NonPositiveRate(f64),

    #[error("trial_duration must be a positive finite duration, got {0}")]
    NonPositiveDuration(f64),

    #[error("trial_duration {value}s exceeds the {max}s limit")]
    DurationTooLong { value: f64, max: f64 },

    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
}

/// A training attempt failed. Fatal for that attempt only; retry with another
/// seed or a larger dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("need at least {min} trials per class, got {got}")]
    TooFewTrials { min: usize, got: usize },

    #[error("every feature column has zero variance")]
    DegenerateFeatures,

    #[error("{family} fit failed: {reason}")]
    FitFailed { family: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("decoder has no trained model")]
    NotTrained,

    #[error("dataset contains no trials")]
    EmptyDataset,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("stored model is malformed: {0}")]
    InvalidModel(String),

    #[error("model storage I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("model serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
