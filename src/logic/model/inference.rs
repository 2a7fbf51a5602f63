//! Inference - Prediction Output
//!
//! Turns raw class scores from a fitted pipeline into a normalised
//! `PredictionResult` keyed by class label.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;
use crate::logic::generator::{ClassLabel, CLASS_COUNT};
use super::classifier::argmax;
use super::pipeline::FittedPipeline;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_class: ClassLabel,
    /// Probability of `predicted_class`
    pub confidence: f64,
    /// One entry per class, summing to 1
    pub probabilities: BTreeMap<ClassLabel, f64>,
    /// Family of the model that produced this prediction
    pub classifier: String,
    pub inference_time_us: u64,
}

impl PredictionResult {
    /// Build from raw per-class scores.
    ///
    /// Negative or non-finite entries count as 0; an all-zero vector becomes
    /// uniform. Ties resolve to the earliest class label.
    pub fn from_scores(scores: [f64; CLASS_COUNT], classifier: &str) -> Self {
        let probabilities = normalize(scores);
        let best = argmax(&probabilities);
        let predicted_class = ClassLabel::ALL[best];

        Self {
            predicted_class,
            confidence: probabilities[best],
            probabilities: ClassLabel::ALL.into_iter().zip(probabilities).collect(),
            classifier: classifier.to_string(),
            inference_time_us: 0,
        }
    }

    pub fn probability(&self, label: ClassLabel) -> f64 {
        self.probabilities.get(&label).copied().unwrap_or(0.0)
    }
}

/// Clamp to non-negative finite values and rescale to sum 1
pub fn normalize(scores: [f64; CLASS_COUNT]) -> [f64; CLASS_COUNT] {
    let cleaned = scores.map(|s| if s.is_finite() && s > 0.0 { s } else { 0.0 });
    let total: f64 = cleaned.iter().sum();
    if total <= 0.0 {
        return [1.0 / CLASS_COUNT as f64; CLASS_COUNT];
    }
    cleaned.map(|s| s / total)
}

// ============================================================================
// INFERENCE
// ============================================================================

/// Run a fitted pipeline on one feature vector
pub fn predict_vector(pipeline: &FittedPipeline, features: &FeatureVector) -> PredictionResult {
    let start = Instant::now();

    let row = ndarray::ArrayView1::from(features.as_slice());
    let scores = pipeline.predict_proba(row);

    let mut result = PredictionResult::from_scores(scores, pipeline.family().name());
    result.inference_time_us = start.elapsed().as_micros() as u64;

    log::debug!(
        "Predicted {} ({:.3}) with {} in {}us",
        result.predicted_class,
        result.confidence,
        result.classifier,
        result.inference_time_us
    );
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("Features: {}", features.to_log_entry());
    }
    result
}
