//! Pattern Configuration
//!
//! Statistical knobs for the generator and the five class presets.
//! Constants and config only, no sampling.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_TRIAL_DURATION;
use crate::error::ConfigError;
use super::types::ClassLabel;

/// Default base firing rate (Hz)
pub const DEFAULT_BASE_FIRING_RATE: f64 = 12.0;

/// How the stimulus identity is carried by the population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodingType {
    /// Firing rate amplitude depends on the stimulus
    Rate,
    /// Rate fixed, stimulus-locked spike timing carries identity
    Temporal,
    /// Both at half strength
    Mixed,
}

/// Statistical signature of one pattern class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub coding_type: CodingType,
    /// Depth of beta-band modulation, 0..=1
    pub oscillatory_power: f64,
    /// 0 = independent neurons, 1 = fully shared input, 0..=1
    pub population_synchrony: f64,
    /// 1 = near periodic ISIs, 0 = Poisson, 0..=1
    pub spike_regularity: f64,
    /// Rate of injected burst episodes, 0..=1
    pub pathological_bursting: f64,
    /// Hz, > 0
    pub base_firing_rate: f64,
}

impl PatternConfig {
    /// Validated constructor
    pub fn new(
        coding_type: CodingType,
        oscillatory_power: f64,
        population_synchrony: f64,
        spike_regularity: f64,
        pathological_bursting: f64,
        base_firing_rate: f64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            coding_type,
            oscillatory_power,
            population_synchrony,
            spike_regularity,
            pathological_bursting,
            base_firing_rate,
        };
        config.validate()?;
        Ok(config)
    }

    /// Same pattern at another base rate
    pub fn with_base_firing_rate(self, base_firing_rate: f64) -> Self {
        Self { base_firing_rate, ..self }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ratio("oscillatory_power", self.oscillatory_power)?;
        check_ratio("population_synchrony", self.population_synchrony)?;
        check_ratio("spike_regularity", self.spike_regularity)?;
        check_ratio("pathological_bursting", self.pathological_bursting)?;

        if !(self.base_firing_rate.is_finite() && self.base_firing_rate > 0.0) {
            return Err(ConfigError::NonPositiveRate(self.base_firing_rate));
        }
        Ok(())
    }
}

/// Positive, finite and no longer than `MAX_TRIAL_DURATION`
pub fn check_trial_duration(duration: f64) -> Result<(), ConfigError> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(ConfigError::NonPositiveDuration(duration));
    }
    if duration > MAX_TRIAL_DURATION {
        return Err(ConfigError::DurationTooLong {
            value: duration,
            max: MAX_TRIAL_DURATION,
        });
    }
    Ok(())
}

fn check_ratio(field: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails the range check
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RatioOutOfRange { field, value })
    }
}

// ============================================================================
// CLASS PRESETS
// ============================================================================

pub const HEALTHY_RATE: PatternConfig = PatternConfig {
    coding_type: CodingType::Rate,
    oscillatory_power: 0.0,
    population_synchrony: 0.05,
    spike_regularity: 0.95,
    pathological_bursting: 0.0,
    base_firing_rate: DEFAULT_BASE_FIRING_RATE,
};

pub const HEALTHY_TEMPORAL: PatternConfig = PatternConfig {
    coding_type: CodingType::Temporal,
    oscillatory_power: 0.0,
    population_synchrony: 0.15,
    spike_regularity: 0.8,
    pathological_bursting: 0.0,
    base_firing_rate: DEFAULT_BASE_FIRING_RATE,
};

pub const PARKINSONIAN: PatternConfig = PatternConfig {
    coding_type: CodingType::Rate,
    oscillatory_power: 0.9,
    population_synchrony: 0.9,
    spike_regularity: 0.1,
    pathological_bursting: 0.4,
    base_firing_rate: DEFAULT_BASE_FIRING_RATE,
};

/// Low oscillation (unlike Parkinsonian), maximal synchrony and bursting
pub const EPILEPTIFORM: PatternConfig = PatternConfig {
    coding_type: CodingType::Temporal,
    oscillatory_power: 0.2,
    population_synchrony: 1.0,
    spike_regularity: 0.2,
    pathological_bursting: 0.9,
    base_firing_rate: DEFAULT_BASE_FIRING_RATE,
};

/// Between Parkinsonian and Epileptiform on every knob, closer to Parkinsonian
pub const MIXED_PATHOLOGY: PatternConfig = PatternConfig {
    coding_type: CodingType::Mixed,
    oscillatory_power: 0.7,
    population_synchrony: 0.8,
    spike_regularity: 0.25,
    pathological_bursting: 0.5,
    base_firing_rate: DEFAULT_BASE_FIRING_RATE,
};

impl ClassLabel {
    /// The pattern every trial of this class is generated from
    pub const fn preset(self) -> PatternConfig {
        match self {
            ClassLabel::HealthyRate => HEALTHY_RATE,
            ClassLabel::HealthyTemporal => HEALTHY_TEMPORAL,
            ClassLabel::Parkinsonian => PARKINSONIAN,
            ClassLabel::Epileptiform => EPILEPTIFORM,
            ClassLabel::MixedPathology => MIXED_PATHOLOGY,
        }
    }

    /// Class whose preset equals `config` at any base rate
    pub fn for_config(config: &PatternConfig) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|label| label.preset().with_base_firing_rate(config.base_firing_rate) == *config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for label in ClassLabel::ALL {
            assert!(label.preset().validate().is_ok(), "{} preset invalid", label);
        }
    }

    #[test]
    fn test_reject_ratio_out_of_range() {
        let config = HEALTHY_RATE;
        let bad = PatternConfig { population_synchrony: 1.2, ..config };
        assert_eq!(
            bad.validate(),
            Err(ConfigError::RatioOutOfRange { field: "population_synchrony", value: 1.2 })
        );

        let negative = PatternConfig { pathological_bursting: -0.1, ..config };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_reject_nan_ratio() {
        let bad = PatternConfig { spike_regularity: f64::NAN, ..HEALTHY_RATE };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::RatioOutOfRange { field: "spike_regularity", .. })
        ));
    }

    #[test]
    fn test_reject_non_positive_rate() {
        assert!(HEALTHY_RATE.with_base_firing_rate(0.0).validate().is_err());
        assert!(HEALTHY_RATE.with_base_firing_rate(-3.0).validate().is_err());
        assert!(HEALTHY_RATE.with_base_firing_rate(f64::INFINITY).validate().is_err());
        assert!(HEALTHY_RATE.with_base_firing_rate(15.0).validate().is_ok());
    }

    #[test]
    fn test_for_config_recognises_presets() {
        assert_eq!(
            ClassLabel::for_config(&PARKINSONIAN.with_base_firing_rate(18.0)),
            Some(ClassLabel::Parkinsonian)
        );
        let custom = PatternConfig { oscillatory_power: 0.33, ..PARKINSONIAN };
        assert_eq!(ClassLabel::for_config(&custom), None);
    }

    #[test]
    fn test_new_validates() {
        assert!(PatternConfig::new(CodingType::Mixed, 0.5, 0.5, 0.5, 0.5, 10.0).is_ok());
        assert!(PatternConfig::new(CodingType::Mixed, 1.5, 0.5, 0.5, 0.5, 10.0).is_err());
    }

    #[test]
    fn test_coding_type_serializes_lowercase() {
        let json = serde_json::to_string(&CodingType::Temporal).unwrap();
        assert_eq!(json, "\"temporal\"");
    }
}
