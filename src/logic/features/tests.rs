//! Integration tests: generator output through the full extractor

use crate::logic::features::{extract, extract_matrix, layout::feature_index, FEATURE_COUNT};
use crate::logic::generator::config::{EPILEPTIFORM, HEALTHY_RATE, PARKINSONIAN};
use crate::logic::generator::{generate, ClassLabel, PatternConfig, SpikeTrain, Trial};

fn mean_feature(config: &PatternConfig, name: &str, seed: u64) -> f64 {
    let index = feature_index(name).unwrap();
    let dataset = generate(config, 20, 2.0, 5, 2, seed).unwrap();
    let total: f64 = dataset.trials.iter().map(|t| extract(t).values[index]).sum();
    total / dataset.len() as f64
}

/// Every preset yields full-length, finite vectors
#[test]
fn test_vectors_are_finite_for_every_preset() {
    for label in ClassLabel::ALL {
        let dataset = generate(&label.preset(), 20, 2.0, 5, 1, 4).unwrap();
        for trial in &dataset.trials {
            let vector = extract(trial);
            assert_eq!(vector.values.len(), FEATURE_COUNT);
            assert!(vector.is_finite(), "{} produced {:?}", label, vector.values);
            assert!(vector.validate().is_ok());
        }
    }
}

/// All-silent trial gives a defined vector
#[test]
fn test_all_silent_trial() {
    let trial = Trial {
        spike_trains: vec![SpikeTrain::new(); 20],
        stimulus: 0,
        label: None,
        duration: 2.0,
    };
    let vector = extract(&trial);

    assert!(vector.is_finite());
    for (i, value) in vector.values.iter().enumerate() {
        if i == feature_index("silent_fraction").unwrap() {
            assert_eq!(*value, 1.0);
        } else {
            assert_eq!(*value, 0.0, "feature {} not zero", i);
        }
    }
}

/// Degenerate shapes never panic or produce NaN
#[test]
fn test_degenerate_trials() {
    let no_neurons = Trial { spike_trains: vec![], stimulus: 0, label: None, duration: 2.0 };
    assert!(extract(&no_neurons).is_finite());

    let zero_duration = Trial {
        spike_trains: vec![SpikeTrain::new()],
        stimulus: 0,
        label: None,
        duration: 0.0,
    };
    assert!(extract(&zero_duration).is_finite());

    let single_spike = Trial {
        spike_trains: vec![SpikeTrain::from_times(vec![1.0], 2.0)],
        stimulus: 0,
        label: None,
        duration: 2.0,
    };
    assert!(extract(&single_spike).is_finite());
}

#[test]
fn test_extraction_is_deterministic() {
    let dataset = generate(&PARKINSONIAN, 15, 2.0, 2, 1, 8).unwrap();
    for trial in &dataset.trials {
        assert_eq!(extract(trial), extract(trial));
    }
}

#[test]
fn test_matrix_rows_match_vectors() {
    let dataset = generate(&HEALTHY_RATE, 10, 1.0, 3, 1, 2).unwrap();
    let matrix = extract_matrix(&dataset.trials);
    assert_eq!(matrix.dim(), (3, FEATURE_COUNT));
    for (row, trial) in matrix.rows().into_iter().zip(&dataset.trials) {
        assert_eq!(row.to_vec(), extract(trial).values.to_vec());
    }
}

/// Raising synchrony raises the synchrony index
#[test]
fn test_synchrony_index_monotonic_in_synchrony() {
    let loose = PatternConfig { population_synchrony: 0.05, ..PARKINSONIAN };
    let tight = PatternConfig { population_synchrony: 1.0, ..PARKINSONIAN };

    let low = mean_feature(&loose, "synchrony_index", 31);
    let high = mean_feature(&tight, "synchrony_index", 31);
    assert!(high > low, "synchrony_index {} -> {}", low, high);
}

/// Epileptiform is more synchronous and more bursty than healthy rate coding
#[test]
fn test_epileptiform_exceeds_healthy_rate() {
    let sync_healthy = mean_feature(&HEALTHY_RATE, "synchrony_index", 5);
    let sync_epileptic = mean_feature(&EPILEPTIFORM, "synchrony_index", 5);
    assert!(sync_epileptic > sync_healthy);

    let burst_healthy = mean_feature(&HEALTHY_RATE, "burst_index", 5);
    let burst_epileptic = mean_feature(&EPILEPTIFORM, "burst_index", 5);
    assert!(burst_epileptic > burst_healthy);
}

/// Parkinsonian oscillation shows up in the beta band
#[test]
fn test_parkinsonian_has_more_beta_than_healthy() {
    let healthy = mean_feature(&HEALTHY_RATE, "beta_power_ratio", 12);
    let parkinsonian = mean_feature(&PARKINSONIAN, "beta_power_ratio", 12);
    assert!(parkinsonian > healthy, "beta {} vs {}", healthy, parkinsonian);
}

/// Regular presets have lower ISI CV than Poisson-like ones
#[test]
fn test_regularity_lowers_isi_cv() {
    let regular = mean_feature(&HEALTHY_RATE, "isi_cv_mean", 3);
    let irregular = mean_feature(&PARKINSONIAN, "isi_cv_mean", 3);
    assert!(regular < irregular);
}
