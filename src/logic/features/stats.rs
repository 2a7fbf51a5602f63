//! Small descriptive statistics shared by the extractors.
//! Empty input gives 0, never NaN.

use crate::constants::MAX_TRIAL_DURATION;
use crate::logic::generator::Trial;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// `numerator / denominator`, or 0 when the denominator is not positive
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && numerator.is_finite() {
        numerator / denominator
    } else {
        0.0
    }
}

/// Trial length usable as a divisor (0 when malformed)
pub fn usable_duration(trial: &Trial) -> f64 {
    if trial.duration.is_finite() && trial.duration > 0.0 {
        trial.duration
    } else {
        0.0
    }
}

/// Population spike counts in bins of `bin_size` seconds. Binning stops at
/// `MAX_TRIAL_DURATION`; later spikes land in the last bin.
pub fn population_counts(trial: &Trial, bin_size: f64) -> Vec<f64> {
    let duration = usable_duration(trial).min(MAX_TRIAL_DURATION);
    if duration == 0.0 {
        return Vec::new();
    }
    let n_bins = (duration / bin_size - 1e-6).ceil().max(1.0) as usize;
    let mut counts = vec![0.0; n_bins];
    for t in trial.all_spikes() {
        let bin = ((t / bin_size) as usize).min(n_bins - 1);
        counts[bin] += 1.0;
    }
    counts
}
