//! Decoder Module - Pattern Classification Engine
//!
//! Trains on synthetic labeled trials, keeps the best fitted model and
//! classifies new trials with a full class-probability distribution.
//!
//! # Architecture
//! - `types.rs`: `TrainingConfig`, `TrainingResult`, `TrainedModel`
//! - `training.rs`: dataset assembly, cross-validation, model selection
//! - `storage.rs`: persistent storage with layout validation
//!
//! # State
//! Untrained until the first successful `train` or `load`. A model is only
//! published once training has completed; readers keep the previous one
//! until then. The model and the report that produced it are swapped
//! together, so a reader never pairs one run's model with another's report.

pub mod types;
pub mod training;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{DecoderError, DecoderResult, TrainingError};
use crate::logic::features::layout::LayoutMismatchError;
use crate::logic::features::{self, FeatureVector};
use crate::logic::generator::{Dataset, Trial};
use crate::logic::model::inference::predict_vector;
use crate::logic::model::PredictionResult;

pub use types::{TrainedModel, TrainingConfig, TrainingResult};

// ============================================================================
// INPUT
// ============================================================================

/// What `Decoder::predict` accepts
#[derive(Debug, Clone, Copy)]
pub enum Sample<'a> {
    Trial(&'a Trial),
    /// Only the first trial is analysed
    Dataset(&'a Dataset),
}

impl<'a> From<&'a Trial> for Sample<'a> {
    fn from(trial: &'a Trial) -> Self {
        Sample::Trial(trial)
    }
}

impl<'a> From<&'a Dataset> for Sample<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        Sample::Dataset(dataset)
    }
}

// ============================================================================
// DECODER
// ============================================================================

/// Model plus the training report behind it; no report for loaded models
#[derive(Debug, Clone)]
struct Published {
    model: Arc<TrainedModel>,
    result: Option<TrainingResult>,
}

#[derive(Debug, Default)]
pub struct Decoder {
    config: TrainingConfig,
    state: RwLock<Option<Published>>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrainingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Training
    // ------------------------------------------------------------------------

    /// Train on `n_trials_per_class` synthetic trials per class.
    ///
    /// On failure the previous model (if any) stays published.
    pub fn train(
        &self,
        n_trials_per_class: usize,
        seed: u64,
        verbose: bool,
    ) -> Result<TrainingResult, TrainingError> {
        let (result, model) = training::train(&self.config, n_trials_per_class, seed, verbose)?;
        self.publish(model, Some(result.clone()));
        Ok(result)
    }

    fn publish(&self, model: TrainedModel, result: Option<TrainingResult>) {
        *self.state.write() = Some(Published {
            model: Arc::new(model),
            result,
        });
    }

    pub fn is_trained(&self) -> bool {
        self.state.read().is_some()
    }

    /// Snapshot of the published model
    pub fn model(&self) -> Option<Arc<TrainedModel>> {
        self.state.read().as_ref().map(|p| Arc::clone(&p.model))
    }

    /// Report of the run behind the published model; `None` once a stored
    /// model has been loaded
    pub fn last_training_result(&self) -> Option<TrainingResult> {
        self.state.read().as_ref().and_then(|p| p.result.clone())
    }

    /// Back to Untrained
    pub fn reset(&self) {
        *self.state.write() = None;
        log::info!("Decoder reset");
    }

    // ------------------------------------------------------------------------
    // Prediction
    // ------------------------------------------------------------------------

    pub fn predict<'a>(&self, sample: impl Into<Sample<'a>>) -> DecoderResult<PredictionResult> {
        match sample.into() {
            Sample::Trial(trial) => self.predict_trial(trial),
            Sample::Dataset(dataset) => self.predict_dataset(dataset),
        }
    }

    pub fn predict_trial(&self, trial: &Trial) -> DecoderResult<PredictionResult> {
        let model = self.model().ok_or(DecoderError::NotTrained)?;
        predict_with(&model, &features::extract(trial))
    }

    /// Classify the first trial of `dataset`
    pub fn predict_dataset(&self, dataset: &Dataset) -> DecoderResult<PredictionResult> {
        let model = self.model().ok_or(DecoderError::NotTrained)?;
        let trial = dataset.first().ok_or(DecoderError::EmptyDataset)?;
        predict_with(&model, &features::extract(trial))
    }

    /// Classify a precomputed feature vector
    pub fn predict_features(&self, vector: &FeatureVector) -> DecoderResult<PredictionResult> {
        let model = self.model().ok_or(DecoderError::NotTrained)?;
        predict_with(&model, vector)
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    pub fn save(&self, path: &Path) -> DecoderResult<()> {
        let model = self.model().ok_or(DecoderError::NotTrained)?;
        storage::save_model(&model, path)
    }

    /// Load and publish a stored model. The current model stays on failure.
    pub fn load(&self, path: &Path) -> DecoderResult<()> {
        let model = storage::load_model(path)?;
        self.publish(model, None);
        Ok(())
    }
}

/// Vector must carry the layout the model was trained on
fn check_layout(model: &TrainedModel, vector: &FeatureVector) -> Result<(), LayoutMismatchError> {
    if vector.version != model.feature_version || vector.layout_hash != model.layout_hash {
        return Err(LayoutMismatchError {
            expected_version: model.feature_version,
            expected_hash: model.layout_hash,
            actual_version: vector.version,
            actual_hash: vector.layout_hash,
        });
    }
    Ok(())
}

fn predict_with(model: &TrainedModel, vector: &FeatureVector) -> DecoderResult<PredictionResult> {
    storage::validate_model(model)?;
    check_layout(model, vector)?;
    Ok(predict_vector(&model.pipeline, vector))
}
