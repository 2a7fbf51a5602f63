use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;
use crate::error::ConfigError;
use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};
use crate::logic::generator::config::check_trial_duration;
use crate::logic::generator::DEFAULT_BASE_FIRING_RATE;
use crate::logic::model::crossval::HOLDOUT_FRACTION;
use crate::logic::model::{ClassifierFamily, CvScore, FittedPipeline};

// ============================================================================
// TRAINING CONFIG
// ============================================================================

/// Shape of the synthetic training set and evaluation knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub n_neurons: usize,
    pub trial_duration: f64,
    pub n_stimuli: usize,
    pub base_firing_rate: f64,
    /// Upper bound on k; the effective k is `min(max_folds, n_trials_per_class)`
    pub max_folds: usize,
    pub holdout_fraction: f64,
    /// Evaluate families on the rayon pool
    pub parallel: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_neurons: constants::DEFAULT_N_NEURONS,
            trial_duration: constants::DEFAULT_TRIAL_DURATION,
            n_stimuli: constants::DEFAULT_N_STIMULI,
            base_firing_rate: DEFAULT_BASE_FIRING_RATE,
            max_folds: constants::DEFAULT_CV_FOLDS,
            holdout_fraction: HOLDOUT_FRACTION,
            parallel: true,
        }
    }
}

impl TrainingConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self {
            max_folds: constants::get_cv_folds(),
            parallel: constants::is_parallel_enabled(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_neurons == 0 {
            return Err(ConfigError::ZeroCount { field: "n_neurons" });
        }
        if self.n_stimuli == 0 {
            return Err(ConfigError::ZeroCount { field: "n_stimuli" });
        }
        check_trial_duration(self.trial_duration)?;
        if !(self.base_firing_rate.is_finite() && self.base_firing_rate > 0.0) {
            return Err(ConfigError::NonPositiveRate(self.base_firing_rate));
        }
        if !(self.holdout_fraction > 0.0 && self.holdout_fraction < 1.0) {
            return Err(ConfigError::RatioOutOfRange {
                field: "holdout_fraction",
                value: self.holdout_fraction,
            });
        }
        Ok(())
    }
}

// ============================================================================
// TRAINING RESULT
// ============================================================================

/// Outcome of one `train` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub best_classifier: String,
    /// Held-out accuracy of the winning family
    pub final_accuracy: f64,
    /// Cross-validation scores keyed by family name
    pub per_classifier: BTreeMap<String, CvScore>,
    pub n_trials_per_class: usize,
    pub n_folds: usize,
    pub seed: u64,
}

impl TrainingResult {
    pub fn best_score(&self) -> Option<&CvScore> {
        self.per_classifier.get(&self.best_classifier)
    }
}

// ============================================================================
// TRAINED MODEL
// ============================================================================

/// Fitted winner plus everything needed to validate its inputs later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub family: ClassifierFamily,
    pub pipeline: FittedPipeline,
    pub cv_mean: f64,
    pub holdout_accuracy: f64,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub config: TrainingConfig,
    pub seed: u64,
}

impl TrainedModel {
    pub fn new(
        pipeline: FittedPipeline,
        cv_mean: f64,
        holdout_accuracy: f64,
        config: TrainingConfig,
        seed: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            family: pipeline.family(),
            pipeline,
            cv_mean,
            holdout_accuracy,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            config,
            seed,
        }
    }
}
