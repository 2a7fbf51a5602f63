//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment (see helpers below).

/// Default training seed
pub const DEFAULT_SEED: u64 = 42;

/// Default trials generated per class for training
pub const DEFAULT_TRIALS_PER_CLASS: usize = 30;

/// Default number of simulated neurons per trial
pub const DEFAULT_N_NEURONS: usize = 20;

/// Default trial length (seconds)
pub const DEFAULT_TRIAL_DURATION: f64 = 2.0;

/// Longest trial the generator accepts (seconds). Intensity and feature
/// grids are 1 ms, so this bounds per-neuron allocations.
pub const MAX_TRIAL_DURATION: f64 = 600.0;

/// Default number of stimulus conditions
pub const DEFAULT_N_STIMULI: usize = 5;

/// Upper bound on cross-validation folds
pub const DEFAULT_CV_FOLDS: usize = 5;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "spike-decoder";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Get training seed from environment or use default
pub fn get_seed() -> u64 {
    env_parse("SPIKE_DECODER_SEED").unwrap_or(DEFAULT_SEED)
}

/// Get trials per class from environment or use default
pub fn get_trials_per_class() -> usize {
    env_parse("SPIKE_DECODER_TRIALS_PER_CLASS").unwrap_or(DEFAULT_TRIALS_PER_CLASS)
}

/// Get the CV fold cap from environment or use default
pub fn get_cv_folds() -> usize {
    env_parse("SPIKE_DECODER_CV_FOLDS")
        .filter(|&k: &usize| k >= 2)
        .unwrap_or(DEFAULT_CV_FOLDS)
}

/// Model file path from environment, if set
pub fn get_model_path() -> Option<std::path::PathBuf> {
    std::env::var("SPIKE_DECODER_MODEL_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(std::path::PathBuf::from)
}

/// Check if classifier families are evaluated in parallel
pub fn is_parallel_enabled() -> bool {
    std::env::var("SPIKE_DECODER_PARALLEL")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
