//! Generator Module - Synthetic Spike Trains
//!
//! Produces labeled multi-neuron trials with controllable rate, synchrony,
//! oscillation, regularity and bursting statistics.
//!
//! ## Structure
//! - `types`: `SpikeTrain`, `Trial`, `Dataset`, `ClassLabel`
//! - `config`: `PatternConfig` and the five class presets
//! - `process`: point-process sampling
//!
//! ## Usage
//! ```ignore
//! use crate::logic::generator::{generate, ClassLabel};
//!
//! let dataset = generate(&ClassLabel::Epileptiform.preset(), 20, 2.0, 5, 1, 42)?;
//! ```

pub mod types;
pub mod config;
pub mod process;

#[cfg(test)]
mod tests;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::ConfigError;
use process::{synthesize_trial, trial_variant, RenewalProcess, TrialSpec};

pub use types::{ClassLabel, Dataset, SpikeTrain, Trial, CLASS_COUNT, MAX_SPIKES_PER_TRAIN};
pub use config::{CodingType, PatternConfig, DEFAULT_BASE_FIRING_RATE};

/// Seeded spike-train generator for a fixed population size and trial length
#[derive(Debug, Clone)]
pub struct SpikeTrainGenerator {
    n_neurons: usize,
    trial_duration: f64,
    rng: StdRng,
}

impl SpikeTrainGenerator {
    pub fn new(n_neurons: usize, trial_duration: f64, seed: u64) -> Result<Self, ConfigError> {
        if n_neurons == 0 {
            return Err(ConfigError::ZeroCount { field: "n_neurons" });
        }
        config::check_trial_duration(trial_duration)?;

        Ok(Self {
            n_neurons,
            trial_duration,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn n_neurons(&self) -> usize {
        self.n_neurons
    }

    pub fn trial_duration(&self) -> f64 {
        self.trial_duration
    }

    /// Trials from an arbitrary pattern. Labeled only when `config` is a
    /// class preset.
    pub fn generate(
        &mut self,
        config: &PatternConfig,
        n_stimuli: usize,
        n_trials_per_stimulus: usize,
    ) -> Result<Dataset, ConfigError> {
        let label = ClassLabel::for_config(config);
        self.generate_inner(config, label, n_stimuli, n_trials_per_stimulus)
    }

    /// Trials of one class, generated from its preset at `base_firing_rate`
    pub fn generate_class(
        &mut self,
        label: ClassLabel,
        base_firing_rate: f64,
        n_stimuli: usize,
        n_trials_per_stimulus: usize,
    ) -> Result<Dataset, ConfigError> {
        let config = label.preset().with_base_firing_rate(base_firing_rate);
        self.generate_inner(&config, Some(label), n_stimuli, n_trials_per_stimulus)
    }

    fn generate_inner(
        &mut self,
        config: &PatternConfig,
        label: Option<ClassLabel>,
        n_stimuli: usize,
        n_trials_per_stimulus: usize,
    ) -> Result<Dataset, ConfigError> {
        config.validate()?;
        if n_stimuli == 0 {
            return Err(ConfigError::ZeroCount { field: "n_stimuli" });
        }
        if n_trials_per_stimulus == 0 {
            return Err(ConfigError::ZeroCount { field: "n_trials_per_stimulus" });
        }

        let mut trials = Vec::with_capacity(n_stimuli * n_trials_per_stimulus);

        for stimulus in 0..n_stimuli {
            for _ in 0..n_trials_per_stimulus {
                let variant = trial_variant(config, &mut self.rng);
                let renewal = RenewalProcess::new(variant.spike_regularity)?;
                let spec = TrialSpec {
                    config: &variant,
                    n_neurons: self.n_neurons,
                    duration: self.trial_duration,
                    stimulus,
                    n_stimuli,
                };
                trials.push(Trial {
                    spike_trains: synthesize_trial(spec, &renewal, &mut self.rng),
                    stimulus,
                    label,
                    duration: self.trial_duration,
                });
            }
        }

        log::debug!(
            "Generated {} trials ({} neurons, {:.2}s, label {:?})",
            trials.len(), self.n_neurons, self.trial_duration, label
        );

        Ok(Dataset {
            trials,
            n_neurons: self.n_neurons,
            trial_duration: self.trial_duration,
            n_stimuli,
        })
    }
}

/// One-shot generation with a fresh seeded generator
pub fn generate(
    config: &PatternConfig,
    n_neurons: usize,
    trial_duration: f64,
    n_stimuli: usize,
    n_trials_per_stimulus: usize,
    seed: u64,
) -> Result<Dataset, ConfigError> {
    SpikeTrainGenerator::new(n_neurons, trial_duration, seed)?
        .generate(config, n_stimuli, n_trials_per_stimulus)
}
