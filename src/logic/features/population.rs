//! Population Activity Summary
//!
//! Aggregate activity over 20 ms bins plus a coarse description of its shape.
//! Feeds `population_peak_ratio` and is also what a display layer would chart.

use serde::{Deserialize, Serialize};

use crate::logic::generator::Trial;
use super::stats::{mean, population_counts, ratio, std_dev};
use super::rate::RateFeatures;
use super::vector::{FeatureExtractor, FeatureVector};

/// Population activity bin (20 ms)
pub const ACTIVITY_BIN: f64 = 0.02;

/// Peak above this multiple of the mean reads as synchronized bursting
const BURSTING_PEAK_FACTOR: f64 = 3.0;

/// Std below this fraction of the mean reads as steady firing
const REGULAR_STD_FACTOR: f64 = 0.5;

/// Qualitative shape of the population activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityPattern {
    /// High isolated peaks
    SynchronizedBursting,
    /// Steady activity
    Regular,
    /// Anything in between
    Mixed,
    /// No spikes at all
    Silent,
}

impl ActivityPattern {
    pub fn description(&self) -> &'static str {
        match self {
            ActivityPattern::SynchronizedBursting => "High peaks indicate synchronized bursting",
            ActivityPattern::Regular => "Steady activity indicates regular firing",
            ActivityPattern::Mixed => "Variable activity indicates mixed patterns",
            ActivityPattern::Silent => "No spikes recorded",
        }
    }
}

/// Binned population activity of one trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationActivity {
    pub bin_size: f64,
    /// Population spike count per bin
    pub counts: Vec<f64>,
    /// Per-neuron firing rates (Hz)
    pub firing_rates: Vec<f64>,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub pattern: ActivityPattern,
}

impl PopulationActivity {
    pub fn from_trial(trial: &Trial) -> Self {
        let counts = population_counts(trial, ACTIVITY_BIN);
        let max = counts.iter().copied().fold(0.0, f64::max);
        let mean_count = mean(&counts);
        let std = std_dev(&counts);

        let pattern = if trial.is_silent() || mean_count == 0.0 {
            ActivityPattern::Silent
        } else if max > BURSTING_PEAK_FACTOR * mean_count {
            ActivityPattern::SynchronizedBursting
        } else if std < REGULAR_STD_FACTOR * mean_count {
            ActivityPattern::Regular
        } else {
            ActivityPattern::Mixed
        };

        Self {
            bin_size: ACTIVITY_BIN,
            firing_rates: RateFeatures::from_trial(trial).rates,
            counts,
            max,
            mean: mean_count,
            std,
            pattern,
        }
    }

    /// Peak over mean activity, 0 for a silent trial
    pub fn peak_ratio(&self) -> f64 {
        ratio(self.max, self.mean)
    }
}

impl FeatureExtractor for PopulationActivity {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(8, self.peak_ratio()); // population_peak_ratio
    }
}
