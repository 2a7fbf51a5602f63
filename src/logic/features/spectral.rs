//! Spectral Feature Extraction
//!
//! Beta-band share of the population spike-count spectrum.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::logic::generator::Trial;
use super::stats::{mean, population_counts, ratio};
use super::vector::{FeatureExtractor, FeatureVector};

/// Population signal sampling step (1 ms, 1 kHz)
pub const SPECTRAL_BIN: f64 = 0.001;

/// Beta band (Hz)
pub const BETA_BAND: (f64, f64) = (13.0, 30.0);

#[derive(Debug, Clone, Default)]
pub struct SpectralFeatures {
    pub beta_power: f64,
    pub total_power: f64,
    pub beta_power_ratio: f64,
}

impl SpectralFeatures {
    pub fn from_trial(trial: &Trial) -> Self {
        let signal = population_counts(trial, SPECTRAL_BIN);
        let psd = power_spectrum(&signal);
        if psd.len() < 2 {
            return Self::default();
        }

        let resolution = 1.0 / (SPECTRAL_BIN * signal.len() as f64);
        let beta_power = band_power(&psd, resolution, BETA_BAND.0, BETA_BAND.1);
        // DC is excluded, the signal is mean-subtracted anyway
        let total_power: f64 = psd[1..].iter().sum();

        Self {
            beta_power,
            total_power,
            beta_power_ratio: ratio(beta_power, total_power),
        }
    }
}

/// One-sided power spectrum of the mean-removed, Hann-windowed signal
pub fn power_spectrum(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n < 2 {
        return Vec::new();
    }

    let offset = mean(signal);
    let window = hann_window(n);
    let mut buffer: Vec<Complex<f64>> = signal
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| Complex::new((s - offset) * w, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let norm = 1.0 / (n as f64).powi(2);
    buffer[..n / 2 + 1]
        .iter()
        .map(|c| (c.re * c.re + c.im * c.im) * norm)
        .collect()
}

/// Summed power of the bins inside `[low_hz, high_hz]`
pub fn band_power(psd: &[f64], resolution: f64, low_hz: f64, high_hz: f64) -> f64 {
    if psd.is_empty() || resolution <= 0.0 {
        return 0.0;
    }
    let start = (low_hz / resolution).ceil() as usize;
    let end = ((high_hz / resolution).floor() as usize).min(psd.len() - 1);
    if start > end {
        return 0.0;
    }
    psd[start..=end].iter().sum()
}

fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos()))
        .collect()
}

impl FeatureExtractor for SpectralFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.set(6, self.beta_power_ratio); // beta_power_ratio
    }
}
