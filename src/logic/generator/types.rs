//! Generator Types
//!
//! Spike trains, trials and datasets. No generation logic here.

use serde::{Deserialize, Serialize};

/// Upper bound on spikes kept per neuron per trial
pub const MAX_SPIKES_PER_TRAIN: usize = 2000;

/// Spikes closer than this are treated as one event (0.1 ms)
pub const MIN_SPIKE_GAP: f64 = 1e-4;

// ============================================================================
// CLASS LABELS
// ============================================================================

/// Ground-truth pattern classes. Closed set, order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassLabel {
    #[serde(rename = "Healthy_Rate")]
    HealthyRate,
    #[serde(rename = "Healthy_Temporal")]
    HealthyTemporal,
    #[serde(rename = "Parkinsonian")]
    Parkinsonian,
    #[serde(rename = "Epileptiform")]
    Epileptiform,
    #[serde(rename = "Mixed_Pathology")]
    MixedPathology,
}

/// Number of classes
pub const CLASS_COUNT: usize = 5;

impl ClassLabel {
    pub const ALL: [ClassLabel; CLASS_COUNT] = [
        ClassLabel::HealthyRate,
        ClassLabel::HealthyTemporal,
        ClassLabel::Parkinsonian,
        ClassLabel::Epileptiform,
        ClassLabel::MixedPathology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::HealthyRate => "Healthy_Rate",
            ClassLabel::HealthyTemporal => "Healthy_Temporal",
            ClassLabel::Parkinsonian => "Parkinsonian",
            ClassLabel::Epileptiform => "Epileptiform",
            ClassLabel::MixedPathology => "Mixed_Pathology",
        }
    }

    /// Position in `ALL`, used as the class column in probability tables
    pub fn index(&self) -> usize {
        match self {
            ClassLabel::HealthyRate => 0,
            ClassLabel::HealthyTemporal => 1,
            ClassLabel::Parkinsonian => 2,
            ClassLabel::Epileptiform => 3,
            ClassLabel::MixedPathology => 4,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, ClassLabel::HealthyRate | ClassLabel::HealthyTemporal)
    }
}

impl std::fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// SPIKE TRAIN
// ============================================================================

/// Strictly increasing spike times (seconds) of one neuron in one trial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpikeTrain(Vec<f64>);

impl SpikeTrain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a train from raw event times.
    ///
    /// Drops non-finite and out-of-range times, sorts, merges events closer
    /// than [`MIN_SPIKE_GAP`] and keeps at most [`MAX_SPIKES_PER_TRAIN`].
    pub fn from_times(mut times: Vec<f64>, duration: f64) -> Self {
        times.retain(|t| t.is_finite() && *t >= 0.0 && *t <= duration);
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup_by(|later, earlier| *later - *earlier < MIN_SPIKE_GAP);
        times.truncate(MAX_SPIKES_PER_TRAIN);
        Self(times)
    }

    pub fn times(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inter-spike intervals
    pub fn intervals(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.windows(2).map(|w| w[1] - w[0])
    }

    /// True when strictly increasing and inside `[0, duration]`
    pub fn is_well_formed(&self, duration: f64) -> bool {
        self.0.windows(2).all(|w| w[0] < w[1])
            && self.0.iter().all(|t| *t >= 0.0 && *t <= duration)
    }
}

// ============================================================================
// TRIAL & DATASET
// ============================================================================

/// One recording: a spike train per neuron
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub spike_trains: Vec<SpikeTrain>,
    /// Stimulus condition the trial was generated under
    pub stimulus: usize,
    /// Ground truth, `None` for ad-hoc configs
    pub label: Option<ClassLabel>,
    /// Trial length in seconds
    pub duration: f64,
}

impl Trial {
    pub fn n_neurons(&self) -> usize {
        self.spike_trains.len()
    }

    pub fn total_spikes(&self) -> usize {
        self.spike_trains.iter().map(SpikeTrain::len).sum()
    }

    pub fn is_silent(&self) -> bool {
        self.spike_trains.iter().all(SpikeTrain::is_empty)
    }

    /// All spikes of all neurons, unsorted
    pub fn all_spikes(&self) -> impl Iterator<Item = f64> + '_ {
        self.spike_trains.iter().flat_map(|train| train.times().iter().copied())
    }
}

/// Generated trials with shared shape parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub trials: Vec<Trial>,
    pub n_neurons: usize,
    pub trial_duration: f64,
    pub n_stimuli: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn first(&self) -> Option<&Trial> {
        self.trials.first()
    }

    pub fn labels(&self) -> Vec<Option<ClassLabel>> {
        self.trials.iter().map(|t| t.label).collect()
    }

    /// Append another dataset's trials (shapes must agree)
    pub fn extend(&mut self, other: Dataset) {
        self.trials.extend(other.trials);
    }
}
