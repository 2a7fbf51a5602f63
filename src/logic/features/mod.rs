//! Features Module - Feature Extraction Engine
//!
//! Turns a multi-neuron trial into the fixed-length `FeatureVector` shared by
//! training and prediction. Each statistic group lives in its own file and
//! fills its own slots through `FeatureExtractor`.

pub mod layout;
pub mod vector;
pub mod stats;
pub mod rate;
pub mod isi;
pub mod synchrony;
pub mod spectral;
pub mod burst;
pub mod population;

#[cfg(test)]
mod tests;

use ndarray::Array2;

use crate::logic::generator::Trial;

// Re-export common types
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::{FeatureExtractor, FeatureVector};
pub use population::{ActivityPattern, PopulationActivity};

/// Extract the full feature vector of one trial. Pure, never fails.
pub fn extract(trial: &Trial) -> FeatureVector {
    let mut vector = FeatureVector::new();

    rate::RateFeatures::from_trial(trial).extract(&mut vector);
    isi::IsiFeatures::from_trial(trial).extract(&mut vector);
    synchrony::SynchronyFeatures::from_trial(trial).extract(&mut vector);
    spectral::SpectralFeatures::from_trial(trial).extract(&mut vector);
    burst::BurstFeatures::from_trial(trial).extract(&mut vector);
    PopulationActivity::from_trial(trial).extract(&mut vector);

    vector
}

/// Feature matrix, one row per trial in input order
pub fn extract_matrix(trials: &[Trial]) -> Array2<f64> {
    let mut matrix = Array2::zeros((trials.len(), FEATURE_COUNT));
    for (mut row, trial) in matrix.rows_mut().into_iter().zip(trials) {
        for (cell, value) in row.iter_mut().zip(extract(trial).values) {
            *cell = value;
        }
    }
    matrix
}
