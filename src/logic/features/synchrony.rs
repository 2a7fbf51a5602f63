//! Synchrony Feature Extraction
//!
//! Variance-to-mean ratio of the binned population spike count. Independent
//! Poisson neurons sit near 1, coincident firing pushes it well above.

use crate::logic::generator::Trial;
use super::stats::{mean, population_counts, ratio, variance};
use super::vector::{FeatureExtractor, FeatureVector};

/// Coincidence window (5 ms)
pub const SYNCHRONY_BIN: f64 = 0.005;

#[derive(Debug, Clone, Default)]
pub struct SynchronyFeatures {
    pub synchrony_index: f64,
}

impl SynchronyFeatures {
    pub fn from_trial(trial: &Trial) -> Self {
        let counts = population_counts(trial, SYNCHRONY_BIN);
        Self {
            synchrony_index: ratio(variance(&counts), mean(&counts)),
        }
    }
}

impl FeatureExtractor for SynchronyFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(5, self.synchrony_index); // synchrony_index
    }
}
