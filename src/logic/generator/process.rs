//! Point Process Engine
//!
//! Turns a `PatternConfig` into spike times for one trial.
//!
//! Every train is a renewal process run in rescaled time: ISIs are drawn from
//! a unit-mean Gamma whose shape grows with `spike_regularity`, then mapped
//! back through the integrated intensity. The intensity carries the stimulus
//! code and the beta oscillation. Synchrony comes from a shared "common
//! input" train that neurons copy from, and bursts are injected on top.
//!
//! No two trials of a class share exact parameters: each trial draws its own
//! variant of the pattern around the preset.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Gamma, Poisson, StandardNormal};

use crate::error::ConfigError;
use super::config::{CodingType, PatternConfig};
use super::types::{SpikeTrain, MAX_SPIKES_PER_TRAIN};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Intensity integration step (1 ms)
pub const INTEGRATION_STEP: f64 = 1e-3;

/// Frequency of the pathological oscillation (Hz), inside the beta band
pub const BETA_FREQUENCY: f64 = 20.0;

/// Maximum gamma shape, reached at regularity 1
const MAX_RENEWAL_SHAPE: f64 = 20.0;

/// Period of the repeated stimulus presentation for timing codes (s)
const STIMULUS_CYCLE: f64 = 0.5;

/// Width of the stimulus-locked transient (s)
const TRANSIENT_WIDTH: f64 = 0.01;

/// Jitter applied to spikes copied from the common input (s)
const SYNC_JITTER: f64 = 0.002;

/// Expected bursts per second at `pathological_bursting = 1`
const BURST_RATE: f64 = 4.0;

/// Within-burst ISI (200 Hz)
const BURST_ISI: f64 = 0.005;

/// Trial-to-trial standard deviation of each ratio knob
const RATIO_SPREAD: f64 = 0.25;

/// Trial-to-trial relative spread of the base rate (uniform, mean preserving)
const RATE_SPREAD: f64 = 0.2;

// ============================================================================
// STIMULUS DRIVE
// ============================================================================

/// Multiplicative drive a stimulus imposes on one neuron
#[derive(Debug, Clone, Copy)]
pub struct StimulusDrive {
    /// Amplitude gain (rate code)
    pub rate_gain: f64,
    /// Extra gain at the stimulus-locked transient peak (timing code)
    pub transient_gain: f64,
    /// Transient latency inside each presentation cycle (s)
    pub latency: f64,
}

impl StimulusDrive {
    /// Drive for a neuron with preferred stimulus phase `preference` (0..1)
    pub fn new(coding: CodingType, stimulus: usize, n_stimuli: usize, preference: f64) -> Self {
        let (rate_depth, transient_gain) = match coding {
            CodingType::Rate => (0.5, 0.0),
            CodingType::Temporal => (0.0, 3.0),
            CodingType::Mixed => (0.25, 1.5),
        };
        let position = stimulus as f64 / n_stimuli.max(1) as f64;
        let tuning = (2.0 * PI * (position - preference)).cos();

        Self {
            rate_gain: 1.0 + rate_depth * tuning,
            transient_gain,
            latency: 0.05 + 0.3 * position,
        }
    }

    /// Stimulus-independent drive (used for the shared input)
    pub fn neutral(coding: CodingType, stimulus: usize, n_stimuli: usize) -> Self {
        Self { rate_gain: 1.0, ..Self::new(coding, stimulus, n_stimuli, 0.0) }
    }

    /// Gain at time `t`. The transient is zero-mean over a presentation
    /// cycle, so a timing code moves spikes without changing the mean rate.
    pub fn modulation(&self, t: f64) -> f64 {
        if self.transient_gain == 0.0 {
            return self.rate_gain;
        }
        let offset = (t - self.latency).rem_euclid(STIMULUS_CYCLE);
        let distance = offset.min(STIMULUS_CYCLE - offset);
        let transient = (-distance * distance / (2.0 * TRANSIENT_WIDTH * TRANSIENT_WIDTH)).exp();
        let cycle_mean = TRANSIENT_WIDTH * (2.0 * PI).sqrt() / STIMULUS_CYCLE;
        self.rate_gain * (1.0 + self.transient_gain * (transient - cycle_mean)).max(0.0)
    }
}

// ============================================================================
// TRIAL VARIABILITY
// ============================================================================

/// The pattern one trial is drawn from. Ratio knobs take a normal step of
/// `RATIO_SPREAD` (clamped to [0, 1]); the base rate is scaled by a factor in
/// `1 ± RATE_SPREAD`. The coding type is kept.
pub fn trial_variant<R: Rng + ?Sized>(config: &PatternConfig, rng: &mut R) -> PatternConfig {
    let rate_factor = 1.0 + RATE_SPREAD * (2.0 * rng.gen::<f64>() - 1.0);
    let mut nudge = |value: f64| {
        let step: f64 = StandardNormal.sample(rng);
        (value + RATIO_SPREAD * step).clamp(0.0, 1.0)
    };

    PatternConfig {
        coding_type: config.coding_type,
        oscillatory_power: nudge(config.oscillatory_power),
        population_synchrony: nudge(config.population_synchrony),
        spike_regularity: nudge(config.spike_regularity),
        pathological_bursting: nudge(config.pathological_bursting),
        base_firing_rate: config.base_firing_rate * rate_factor,
    }
}

// ============================================================================
// INTENSITY
// ============================================================================

/// Piecewise-constant intensity on the integration grid, with its integral
#[derive(Debug, Clone)]
pub struct Intensity {
    /// Cumulative integral at each grid edge, `cumulative[0] = 0`
    cumulative: Vec<f64>,
    duration: f64,
}

impl Intensity {
    /// `rate(t)` is sampled at bin centres
    pub fn from_fn(duration: f64, rate: impl Fn(f64) -> f64) -> Self {
        // Tolerance keeps 2.0 / 0.001 from rounding up to an empty extra bin
        let n_bins = (duration / INTEGRATION_STEP - 1e-6).ceil().max(1.0) as usize;
        let mut cumulative = Vec::with_capacity(n_bins + 1);
        cumulative.push(0.0);

        let mut total = 0.0;
        for i in 0..n_bins {
            let start = i as f64 * INTEGRATION_STEP;
            let width = INTEGRATION_STEP.min(duration - start).max(0.0);
            total += rate(start + width / 2.0).max(0.0) * width;
            cumulative.push(total);
        }

        Self { cumulative, duration }
    }

    /// Expected spike count over the trial
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Time at which the integrated intensity reaches `target`
    pub fn invert(&self, target: f64) -> f64 {
        // First edge strictly above target
        let upper = self.cumulative.partition_point(|&c| c <= target);
        if upper == 0 {
            return 0.0;
        }
        if upper >= self.cumulative.len() {
            return self.duration;
        }
        let bin = upper - 1;
        let lo = self.cumulative[bin];
        let hi = self.cumulative[upper];
        let start = bin as f64 * INTEGRATION_STEP;
        let width = INTEGRATION_STEP.min(self.duration - start).max(0.0);
        let fraction = if hi > lo { (target - lo) / (hi - lo) } else { 0.0 };
        (start + fraction * width).min(self.duration)
    }
}

/// Beta oscillation gain with phase `phase`
pub fn oscillation(power: f64, phase: f64, t: f64) -> f64 {
    1.0 + power * (2.0 * PI * BETA_FREQUENCY * t + phase).sin()
}

// ============================================================================
// RENEWAL PROCESS
// ============================================================================

/// Unit-mean gamma renewal process in rescaled time
#[derive(Debug, Clone)]
pub struct RenewalProcess {
    isi: Gamma<f64>,
    shape: f64,
}

impl RenewalProcess {
    /// Shape 1 (Poisson) at regularity 0, `MAX_RENEWAL_SHAPE` at regularity 1
    pub fn new(regularity: f64) -> Result<Self, ConfigError> {
        let shape = 1.0 + (MAX_RENEWAL_SHAPE - 1.0) * regularity * regularity;
        let isi = Gamma::new(shape, 1.0 / shape).map_err(|_| ConfigError::RatioOutOfRange {
            field: "spike_regularity",
            value: regularity,
        })?;
        Ok(Self { isi, shape })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Draw spike times for `intensity`
    pub fn sample<R: Rng + ?Sized>(&self, intensity: &Intensity, rng: &mut R) -> Vec<f64> {
        let total = intensity.total();
        if total <= 0.0 {
            return Vec::new();
        }

        let mut times = Vec::new();
        // Start mid-interval so the train has no onset artefact
        let mut position = self.isi.sample(rng) * rng.gen::<f64>();
        while position < total && times.len() < MAX_SPIKES_PER_TRAIN {
            times.push(intensity.invert(position));
            position += self.isi.sample(rng);
        }
        times
    }
}

// ============================================================================
// BURSTS
// ============================================================================

/// A population burst episode
#[derive(Debug, Clone, Copy)]
pub struct BurstEpisode {
    pub onset: f64,
    pub n_spikes: usize,
}

/// Draw the burst episodes of one trial
pub fn draw_bursts<R: Rng + ?Sized>(bursting: f64, duration: f64, rng: &mut R) -> Vec<BurstEpisode> {
    let lambda = BURST_RATE * bursting * duration;
    if lambda <= 0.0 {
        return Vec::new();
    }
    let count = match Poisson::new(lambda) {
        Ok(poisson) => poisson.sample(rng) as usize,
        Err(_) => 0,
    };
    let latest_onset = (duration - 6.0 * BURST_ISI).max(0.0);

    (0..count)
        .map(|_| BurstEpisode {
            onset: rng.gen::<f64>() * latest_onset,
            n_spikes: rng.gen_range(3..=6),
        })
        .collect()
}

/// Spikes a participating neuron fires during `episode`
pub fn burst_spikes<R: Rng + ?Sized>(episode: &BurstEpisode, rng: &mut R) -> Vec<f64> {
    let start = episode.onset + rng.gen::<f64>() * SYNC_JITTER;
    (0..episode.n_spikes)
        .map(|k| start + k as f64 * BURST_ISI + rng.gen::<f64>() * 0.001)
        .collect()
}

// ============================================================================
// TRIAL SYNTHESIS
// ============================================================================

/// Everything needed to draw one trial
#[derive(Debug, Clone, Copy)]
pub struct TrialSpec<'a> {
    pub config: &'a PatternConfig,
    pub n_neurons: usize,
    pub duration: f64,
    pub stimulus: usize,
    pub n_stimuli: usize,
}

/// Draw one spike train per neuron
pub fn synthesize_trial<R: Rng + ?Sized>(
    spec: TrialSpec<'_>,
    renewal: &RenewalProcess,
    rng: &mut R,
) -> Vec<SpikeTrain> {
    let config = spec.config;
    let synchrony = config.population_synchrony;
    let power = config.oscillatory_power;
    let base = config.base_firing_rate;

    let shared_phase = rng.gen::<f64>() * 2.0 * PI;

    // Common input, copied by each neuron with probability `synchrony`
    let shared_drive = StimulusDrive::neutral(config.coding_type, spec.stimulus, spec.n_stimuli);
    let shared_intensity = Intensity::from_fn(spec.duration, |t| {
        base * shared_drive.modulation(t) * oscillation(power, shared_phase, t)
    });
    let common_input = if synchrony > 0.0 {
        renewal.sample(&shared_intensity, rng)
    } else {
        Vec::new()
    };

    let bursts = draw_bursts(config.pathological_bursting, spec.duration, rng);
    let participation = 0.2 + 0.8 * synchrony;

    (0..spec.n_neurons)
        .map(|neuron| {
            let preference = neuron as f64 / spec.n_neurons as f64;
            let drive = StimulusDrive::new(config.coding_type, spec.stimulus, spec.n_stimuli, preference);
            let phase = shared_phase + (1.0 - synchrony) * (rng.gen::<f64>() * 2.0 - 1.0) * PI;

            // Private part carries the remaining (1 - synchrony) share of the rate
            let private_intensity = Intensity::from_fn(spec.duration, |t| {
                (1.0 - synchrony) * base * drive.modulation(t) * oscillation(power, phase, t)
            });
            let mut times = renewal.sample(&private_intensity, rng);

            for &t in &common_input {
                if rng.gen::<f64>() < synchrony {
                    times.push(t + (rng.gen::<f64>() * 2.0 - 1.0) * SYNC_JITTER);
                }
            }

            for episode in &bursts {
                if rng.gen::<f64>() < participation {
                    times.extend(burst_spikes(episode, rng));
                }
            }

            SpikeTrain::from_times(times, spec.duration)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_constant_intensity_integral() {
        let intensity = Intensity::from_fn(2.0, |_| 10.0);
        assert!((intensity.total() - 20.0).abs() < 1e-9);
        assert!((intensity.invert(10.0) - 1.0).abs() < 1e-9);
        assert_eq!(intensity.invert(25.0), 2.0);
    }

    #[test]
    fn test_partial_last_bin() {
        let intensity = Intensity::from_fn(0.0105, |_| 100.0);
        assert!((intensity.total() - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_renewal_shape_monotonic() {
        let poisson = RenewalProcess::new(0.0).unwrap();
        let regular = RenewalProcess::new(1.0).unwrap();
        assert_eq!(poisson.shape(), 1.0);
        assert_eq!(regular.shape(), MAX_RENEWAL_SHAPE);
    }

    #[test]
    fn test_renewal_rate_matches_intensity() {
        let mut rng = StdRng::seed_from_u64(7);
        let process = RenewalProcess::new(0.5).unwrap();
        let intensity = Intensity::from_fn(100.0, |_| 10.0);
        let n = process.sample(&intensity, &mut rng).len() as f64;
        // 1000 expected
        assert!((n - 1000.0).abs() < 150.0, "got {} spikes", n);
    }

    #[test]
    fn test_zero_intensity_is_silent() {
        let mut rng = StdRng::seed_from_u64(1);
        let process = RenewalProcess::new(0.3).unwrap();
        let intensity = Intensity::from_fn(1.0, |_| 0.0);
        assert!(process.sample(&intensity, &mut rng).is_empty());
    }

    #[test]
    fn test_no_bursts_without_bursting() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(draw_bursts(0.0, 2.0, &mut rng).is_empty());
    }

    #[test]
    fn test_temporal_drive_peaks_at_latency() {
        let drive = StimulusDrive::new(CodingType::Temporal, 2, 5, 0.0);
        assert!(drive.modulation(drive.latency) > 3.5);
        // Away from the transient the gain sits just below 1
        let baseline = drive.modulation(drive.latency + 0.2);
        assert!(baseline > 0.8 && baseline < 1.0, "baseline {}", baseline);
    }

    #[test]
    fn test_timing_codes_keep_the_mean_rate() {
        for coding in [CodingType::Rate, CodingType::Temporal, CodingType::Mixed] {
            for stimulus in 0..5 {
                let drive = StimulusDrive::neutral(coding, stimulus, 5);
                let intensity = Intensity::from_fn(10.0, |t| 12.0 * drive.modulation(t));
                let mean_rate = intensity.total() / 10.0;
                assert!((mean_rate - 12.0).abs() < 0.05, "{:?} stimulus {}: {}", coding, stimulus, mean_rate);
            }
        }
    }

    #[test]
    fn test_temporal_preset_fires_at_the_rate_code_rate() {
        use crate::logic::generator::config::HEALTHY_TEMPORAL;

        let rate_coded = PatternConfig { coding_type: CodingType::Rate, ..HEALTHY_TEMPORAL };
        let renewal = RenewalProcess::new(HEALTHY_TEMPORAL.spike_regularity).unwrap();

        let total_spikes = |config: &PatternConfig| -> usize {
            let mut rng = StdRng::seed_from_u64(17);
            (0..5)
                .map(|stimulus| {
                    let spec = TrialSpec { config, n_neurons: 50, duration: 20.0, stimulus, n_stimuli: 5 };
                    synthesize_trial(spec, &renewal, &mut rng).iter().map(SpikeTrain::len).sum::<usize>()
                })
                .sum()
        };

        let temporal = total_spikes(&HEALTHY_TEMPORAL) as f64;
        let rate = total_spikes(&rate_coded) as f64;
        // 5 stimuli x 50 neurons x 20 s at 12 Hz
        assert!((rate - 60_000.0).abs() < 0.03 * 60_000.0, "rate code fired {}", rate);
        assert!((temporal - rate).abs() < 0.03 * rate, "temporal {} vs rate {}", temporal, rate);
    }

    #[test]
    fn test_trial_variant_stays_valid() {
        let mut rng = StdRng::seed_from_u64(4);
        let preset = PatternConfig {
            coding_type: CodingType::Mixed,
            oscillatory_power: 0.0,
            population_synchrony: 1.0,
            spike_regularity: 0.5,
            pathological_bursting: 0.5,
            base_firing_rate: 10.0,
        };

        let variants: Vec<PatternConfig> = (0..200).map(|_| trial_variant(&preset, &mut rng)).collect();
        for v in &variants {
            assert!(v.validate().is_ok());
            assert_eq!(v.coding_type, CodingType::Mixed);
            assert!(v.base_firing_rate >= 8.0 && v.base_firing_rate <= 12.0);
        }
        // Trials actually differ, and stay centred on the preset
        assert!(variants.iter().any(|v| v.spike_regularity != preset.spike_regularity));
        let mean_regularity = variants.iter().map(|v| v.spike_regularity).sum::<f64>() / 200.0;
        assert!((mean_regularity - 0.5).abs() < 0.06, "mean regularity {}", mean_regularity);
    }
}
