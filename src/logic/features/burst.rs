//! Burst Feature Extraction
//!
//! A burst is a run of at least `MIN_BURST_SPIKES` spikes whose consecutive
//! intervals are all below `BURST_ISI_THRESHOLD`.

use crate::logic::generator::{SpikeTrain, Trial};
use super::stats::ratio;
use super::vector::{FeatureExtractor, FeatureVector};

/// Maximum ISI inside a burst (10 ms)
pub const BURST_ISI_THRESHOLD: f64 = 0.010;

/// Minimum spikes for a run to count as a burst
pub const MIN_BURST_SPIKES: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct BurstFeatures {
    pub burst_spikes: usize,
    pub total_spikes: usize,
    pub burst_count: usize,
    pub burst_index: f64,
}

impl BurstFeatures {
    pub fn from_trial(trial: &Trial) -> Self {
        let mut features = Self::default();
        for train in &trial.spike_trains {
            let (spikes, bursts) = detect_bursts(train);
            features.burst_spikes += spikes;
            features.burst_count += bursts;
            features.total_spikes += train.len();
        }
        features.burst_index = ratio(features.burst_spikes as f64, features.total_spikes as f64);
        features
    }
}

/// (spikes inside bursts, number of bursts) for one train
pub fn detect_bursts(train: &SpikeTrain) -> (usize, usize) {
    let mut in_bursts = 0;
    let mut bursts = 0;
    let mut run = 1;

    for interval in train.intervals() {
        if interval < BURST_ISI_THRESHOLD {
            run += 1;
        } else {
            if run >= MIN_BURST_SPIKES {
                in_bursts += run;
                bursts += 1;
            }
            run = 1;
        }
    }
    if run >= MIN_BURST_SPIKES {
        in_bursts += run;
        bursts += 1;
    }

    (in_bursts, bursts)
}

impl FeatureExtractor for BurstFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(7, self.burst_index); // burst_index
    }
}
