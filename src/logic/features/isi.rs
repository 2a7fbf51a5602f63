//! ISI Feature Extraction
//!
//! Coefficient of variation of inter-spike intervals. Low CV means regular
//! firing, CV near 1 means Poisson-like firing.

use crate::logic::generator::{SpikeTrain, Trial};
use super::stats::{mean, ratio, std_dev};
use super::vector::{FeatureExtractor, FeatureVector};

/// CV used for neurons with too few spikes to measure one
pub const ISI_CV_FALLBACK: f64 = 0.0;

/// Minimum intervals needed for a CV
const MIN_INTERVALS: usize = 2;

/// ISI variability of one trial
#[derive(Debug, Clone, Default)]
pub struct IsiFeatures {
    pub cvs: Vec<f64>,
    pub cv_mean: f64,
    pub cv_std: f64,
}

impl IsiFeatures {
    pub fn from_trial(trial: &Trial) -> Self {
        let cvs: Vec<f64> = trial.spike_trains.iter().map(isi_cv).collect();
        Self {
            cv_mean: mean(&cvs),
            cv_std: std_dev(&cvs),
            cvs,
        }
    }
}

/// ISI CV of one train, or the fallback
pub fn isi_cv(train: &SpikeTrain) -> f64 {
    let intervals: Vec<f64> = train.intervals().collect();
    if intervals.len() < MIN_INTERVALS {
        return ISI_CV_FALLBACK;
    }
    ratio(std_dev(&intervals), mean(&intervals))
}

impl FeatureExtractor for IsiFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(3, self.cv_mean); // isi_cv_mean
        vector.set(4, self.cv_std);  // isi_cv_std
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_train_has_zero_cv() {
        let train = SpikeTrain::from_times((0..10).map(|i| 0.1 * i as f64 + 0.05).collect(), 2.0);
        assert!(isi_cv(&train) < 1e-9);
    }

    #[test]
    fn test_short_trains_use_fallback() {
        assert_eq!(isi_cv(&SpikeTrain::new()), ISI_CV_FALLBACK);
        assert_eq!(isi_cv(&SpikeTrain::from_times(vec![0.1, 0.4], 1.0)), ISI_CV_FALLBACK);
    }

    #[test]
    fn test_irregular_train_has_positive_cv() {
        let train = SpikeTrain::from_times(vec![0.1, 0.11, 0.5, 0.52, 1.3], 2.0);
        assert!(isi_cv(&train) > 0.5);
    }
}
