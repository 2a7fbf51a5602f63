use super::*;
use super::config::{EPILEPTIFORM, HEALTHY_RATE, HEALTHY_TEMPORAL, PARKINSONIAN};
use crate::error::ConfigError;

#[test]
fn test_trains_are_sorted_and_bounded_for_every_preset() {
    for label in ClassLabel::ALL {
        let dataset = generate(&label.preset(), 20, 2.0, 5, 2, 11).unwrap();
        assert_eq!(dataset.len(), 10);

        for trial in &dataset.trials {
            assert_eq!(trial.n_neurons(), 20);
            assert_eq!(trial.label, Some(label));
            for train in &trial.spike_trains {
                assert!(train.is_well_formed(2.0), "{} produced a malformed train", label);
                assert!(train.len() <= MAX_SPIKES_PER_TRAIN);
            }
        }
    }
}

#[test]
fn test_extreme_configs_stay_well_formed() {
    let extremes = [
        PatternConfig::new(CodingType::Rate, 1.0, 1.0, 1.0, 1.0, 200.0).unwrap(),
        PatternConfig::new(CodingType::Temporal, 0.0, 0.0, 0.0, 0.0, 0.5).unwrap(),
        PatternConfig::new(CodingType::Mixed, 1.0, 0.0, 0.0, 1.0, 80.0).unwrap(),
    ];
    for config in &extremes {
        let dataset = generate(config, 8, 0.75, 3, 1, 5).unwrap();
        for trial in &dataset.trials {
            for train in &trial.spike_trains {
                assert!(train.is_well_formed(0.75));
            }
        }
    }
}

#[test]
fn test_same_seed_same_dataset() {
    let a = generate(&PARKINSONIAN, 12, 1.5, 3, 2, 99).unwrap();
    let b = generate(&PARKINSONIAN, 12, 1.5, 3, 2, 99).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_different_seed_different_dataset() {
    let a = generate(&HEALTHY_TEMPORAL, 12, 1.5, 3, 1, 1).unwrap();
    let b = generate(&HEALTHY_TEMPORAL, 12, 1.5, 3, 1, 2).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_stimulus_indices_cover_all_conditions() {
    let dataset = generate(&HEALTHY_RATE, 5, 1.0, 4, 3, 0).unwrap();
    let stimuli: Vec<usize> = dataset.trials.iter().map(|t| t.stimulus).collect();
    assert_eq!(stimuli, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
    assert_eq!(dataset.n_stimuli, 4);
}

#[test]
fn test_custom_config_is_unlabeled() {
    let custom = PatternConfig { pathological_bursting: 0.55, ..EPILEPTIFORM };
    let dataset = generate(&custom, 4, 1.0, 1, 1, 0).unwrap();
    assert_eq!(dataset.labels(), vec![None]);
}

#[test]
fn test_generate_class_uses_requested_rate() {
    let mut generator = SpikeTrainGenerator::new(20, 2.0, 3).unwrap();
    let slow = generator.generate_class(ClassLabel::HealthyRate, 4.0, 1, 3).unwrap();
    let fast = generator.generate_class(ClassLabel::HealthyRate, 40.0, 1, 3).unwrap();

    let count = |d: &Dataset| d.trials.iter().map(Trial::total_spikes).sum::<usize>();
    assert!(count(&fast) > 3 * count(&slow));
    assert!(fast.trials.iter().all(|t| t.label == Some(ClassLabel::HealthyRate)));
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let bad_ratio = PatternConfig { oscillatory_power: 1.01, ..HEALTHY_RATE };
    assert!(matches!(
        generate(&bad_ratio, 10, 1.0, 1, 1, 0),
        Err(ConfigError::RatioOutOfRange { field: "oscillatory_power", .. })
    ));

    let bad_rate = HEALTHY_RATE.with_base_firing_rate(0.0);
    assert_eq!(generate(&bad_rate, 10, 1.0, 1, 1, 0), Err(ConfigError::NonPositiveRate(0.0)));

    assert_eq!(
        generate(&HEALTHY_RATE, 0, 1.0, 1, 1, 0),
        Err(ConfigError::ZeroCount { field: "n_neurons" })
    );
    assert_eq!(
        generate(&HEALTHY_RATE, 10, 0.0, 1, 1, 0),
        Err(ConfigError::NonPositiveDuration(0.0))
    );
    assert_eq!(
        generate(&HEALTHY_RATE, 10, 1.0, 0, 1, 0),
        Err(ConfigError::ZeroCount { field: "n_stimuli" })
    );
    assert_eq!(
        generate(&HEALTHY_RATE, 10, 1.0, 1, 0, 0),
        Err(ConfigError::ZeroCount { field: "n_trials_per_stimulus" })
    );
}

#[test]
fn test_overlong_trials_are_rejected_before_sampling() {
    use crate::constants::MAX_TRIAL_DURATION;

    for duration in [1e7, f64::MAX] {
        assert_eq!(
            generate(&HEALTHY_RATE, 1, duration, 1, 1, 0),
            Err(ConfigError::DurationTooLong { value: duration, max: MAX_TRIAL_DURATION })
        );
    }
    assert_eq!(
        generate(&HEALTHY_RATE, 1, f64::INFINITY, 1, 1, 0),
        Err(ConfigError::NonPositiveDuration(f64::INFINITY))
    );
    assert!(SpikeTrainGenerator::new(1, MAX_TRIAL_DURATION, 0).is_ok());
}

#[test]
fn test_mean_rate_tracks_base_rate() {
    // Trial-to-trial rate spread is mean preserving; occasional bursts add a little
    let dataset = generate(&HEALTHY_RATE, 20, 2.0, 5, 6, 21).unwrap();
    let spikes: usize = dataset.trials.iter().map(Trial::total_spikes).sum();
    let rate = spikes as f64 / (dataset.len() as f64 * 20.0 * 2.0);
    assert!((rate - 12.0).abs() < 2.5, "mean rate {}", rate);
}
