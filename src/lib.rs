//! Spike Decoder Core
//!
//! Synthetic multi-neuron spike trains for five firing-pattern classes, a
//! versioned feature extractor, and a decoder that picks the best of several
//! classifier families by cross-validation.

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{ConfigError, DecoderError, DecoderResult, TrainingError};
pub use logic::decoder::{Decoder, TrainedModel, TrainingConfig, TrainingResult};
pub use logic::features::{extract, FeatureVector};
pub use logic::generator::{generate, ClassLabel, CodingType, Dataset, PatternConfig, SpikeTrain, Trial};
pub use logic::model::PredictionResult;
