//! Rate Feature Extraction
//!
//! Per-neuron firing rates and their spread across the population.

use crate::logic::generator::Trial;
use super::stats::{mean, ratio, usable_duration, variance};
use super::vector::{FeatureExtractor, FeatureVector};

/// Rate statistics of one trial
#[derive(Debug, Clone, Default)]
pub struct RateFeatures {
    /// Spikes per second, one per neuron
    pub rates: Vec<f64>,
    pub mean_rate: f64,
    pub rate_variance: f64,
    pub fano_factor: f64,
    pub silent_fraction: f64,
}

impl RateFeatures {
    pub fn from_trial(trial: &Trial) -> Self {
        let duration = usable_duration(trial);
        let counts: Vec<f64> = trial.spike_trains.iter().map(|t| t.len() as f64).collect();
        let rates: Vec<f64> = counts.iter().map(|&c| ratio(c, duration)).collect();

        let silent = counts.iter().filter(|&&c| c == 0.0).count();

        Self {
            mean_rate: mean(&rates),
            rate_variance: variance(&rates),
            fano_factor: ratio(variance(&counts), mean(&counts)),
            silent_fraction: ratio(silent as f64, counts.len() as f64),
            rates,
        }
    }
}

impl FeatureExtractor for RateFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(0, self.mean_rate);        // mean_rate
        vector.set(1, self.rate_variance);    // rate_variance
        vector.set(2, self.fano_factor);      // fano_factor
        vector.set(9, self.silent_fraction);  // silent_fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::generator::SpikeTrain;

    #[test]
    fn test_rate_features() {
        let trial = Trial {
            spike_trains: vec![
                SpikeTrain::from_times(vec![0.1, 0.2, 0.3, 0.4], 2.0),
                SpikeTrain::from_times(vec![0.5, 1.5], 2.0),
                SpikeTrain::new(),
            ],
            stimulus: 0,
            label: None,
            duration: 2.0,
        };
        let rates = RateFeatures::from_trial(&trial);

        assert_eq!(rates.rates, vec![2.0, 1.0, 0.0]);
        assert_eq!(rates.mean_rate, 1.0);
        assert!((rates.rate_variance - 2.0 / 3.0).abs() < 1e-12);
        // counts 4,2,0: var 8/3, mean 2
        assert!((rates.fano_factor - 4.0 / 3.0).abs() < 1e-12);
        assert!((rates.silent_fraction - 1.0 / 3.0).abs() < 1e-12);
    }
}
