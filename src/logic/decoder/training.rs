//! Training Pipeline
//!
//! Balanced synthetic dataset -> feature matrix -> stratified CV of every
//! family -> best family -> held-out accuracy -> refit on everything.

use std::collections::BTreeMap;
use std::time::Instant;

use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::TrainingError;
use crate::logic::features::extract_matrix;
use crate::logic::generator::{ClassLabel, Dataset, SpikeTrainGenerator};
use crate::logic::model::crossval::{cross_validate, evaluate_fold, stratified_holdout, stratified_k_fold};
use crate::logic::model::{ClassifierFamily, CvScore, FittedPipeline, StandardScaler};
use super::types::{TrainedModel, TrainingConfig, TrainingResult};

/// Fewer trials per class cannot fill two stratified folds
pub const MIN_TRIALS_PER_CLASS: usize = 2;

// Seed streams so each stage draws independently from the base seed
const STREAM_FOLDS: u64 = 100;
const STREAM_MODEL: u64 = 200;
const STREAM_HOLDOUT: u64 = 300;

/// Independent sub-seed of `seed` for `stream`
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    seed ^ stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn model_seed(seed: u64, family: ClassifierFamily) -> u64 {
    let slot = ClassifierFamily::MENU.iter().position(|f| *f == family).unwrap_or(0) as u64;
    derive_seed(seed, STREAM_MODEL + slot)
}

// ============================================================================
// DATASET
// ============================================================================

/// `n_trials_per_class` labeled trials of every class, spread over stimuli.
/// Rows are grouped by class in label order.
pub fn build_training_set(
    config: &TrainingConfig,
    n_trials_per_class: usize,
    seed: u64,
) -> Result<Dataset, TrainingError> {
    let per_stimulus = n_trials_per_class.div_ceil(config.n_stimuli);
    let mut combined: Option<Dataset> = None;

    for label in ClassLabel::ALL {
        let class_seed = derive_seed(seed, label.index() as u64);
        let mut generator =
            SpikeTrainGenerator::new(config.n_neurons, config.trial_duration, class_seed)?;
        let mut dataset = generator.generate_class(
            label,
            config.base_firing_rate,
            config.n_stimuli,
            per_stimulus,
        )?;
        dataset.trials.truncate(n_trials_per_class);

        match combined.as_mut() {
            Some(all) => all.extend(dataset),
            None => combined = Some(dataset),
        }
    }

    combined.ok_or(TrainingError::TooFewTrials { min: MIN_TRIALS_PER_CLASS, got: 0 })
}

/// Feature matrix and class indices of a labeled dataset. Unlabeled trials
/// are skipped.
pub fn to_matrix(dataset: &Dataset) -> (Array2<f64>, Vec<usize>) {
    let labeled: Vec<usize> = (0..dataset.len())
        .filter(|&i| dataset.trials[i].label.is_some())
        .collect();
    let y: Vec<usize> = labeled
        .iter()
        .filter_map(|&i| dataset.trials[i].label.map(|l| l.index()))
        .collect();

    let x = extract_matrix(&dataset.trials);
    (x.select(Axis(0), &labeled), y)
}

// ============================================================================
// TRAINING
// ============================================================================

/// Full training run. Returns the report and the model to publish.
pub fn train(
    config: &TrainingConfig,
    n_trials_per_class: usize,
    seed: u64,
    verbose: bool,
) -> Result<(TrainingResult, TrainedModel), TrainingError> {
    if n_trials_per_class < MIN_TRIALS_PER_CLASS {
        return Err(TrainingError::TooFewTrials {
            min: MIN_TRIALS_PER_CLASS,
            got: n_trials_per_class,
        });
    }
    config.validate()?;

    let start = Instant::now();
    let dataset = build_training_set(config, n_trials_per_class, seed)?;
    let (x, y) = to_matrix(&dataset);
    log::info!(
        "Training on {} trials ({} per class, {} features, seed {})",
        y.len(), n_trials_per_class, x.ncols(), seed
    );

    let (result, model) = fit_and_select(config, x.view(), &y, n_trials_per_class, seed, verbose)?;
    log::info!(
        "Selected {} (cv {:.3}, holdout {:.3}) in {:.1}s",
        result.best_classifier,
        result.best_score().map_or(model.cv_mean, |s| s.mean),
        result.final_accuracy,
        start.elapsed().as_secs_f64()
    );
    Ok((result, model))
}

/// Model selection over an existing feature matrix
pub fn fit_and_select(
    config: &TrainingConfig,
    x: ArrayView2<f64>,
    y: &[usize],
    n_trials_per_class: usize,
    seed: u64,
    verbose: bool,
) -> Result<(TrainingResult, TrainedModel), TrainingError> {
    // Rejects all-constant matrices before any family sees them
    StandardScaler::fit(x)?;

    let n_folds = config.max_folds.min(n_trials_per_class).max(MIN_TRIALS_PER_CLASS);
    let folds = stratified_k_fold(y, n_folds, derive_seed(seed, STREAM_FOLDS));

    let evaluate = |family: &ClassifierFamily| {
        cross_validate(*family, x, y, &folds, model_seed(seed, *family))
    };
    let scores: Vec<Result<CvScore, TrainingError>> = if config.parallel {
        ClassifierFamily::MENU.par_iter().map(evaluate).collect()
    } else {
        ClassifierFamily::MENU.iter().map(evaluate).collect()
    };

    let mut per_classifier = BTreeMap::new();
    let mut best: Option<(ClassifierFamily, f64)> = None;
    for (family, score) in ClassifierFamily::MENU.into_iter().zip(scores) {
        let score = score?;
        if verbose {
            log::info!("{:<20} cv {:.3} +/- {:.3} {:?}", family, score.mean, score.std, score.fold_scores);
        } else {
            log::debug!("{:<20} cv {:.3} +/- {:.3}", family, score.mean, score.std);
        }

        if best.map_or(true, |(_, m)| score.mean > m) {
            best = Some((family, score.mean));
        }
        per_classifier.insert(family.name().to_string(), score);
    }

    let (winner, cv_mean) = best.ok_or(TrainingError::FitFailed {
        family: "none".to_string(),
        reason: "no classifier families evaluated".to_string(),
    })?;

    let split = stratified_holdout(y, config.holdout_fraction, derive_seed(seed, STREAM_HOLDOUT));
    let final_accuracy = evaluate_fold(winner, x, y, &split, model_seed(seed, winner))?;

    let pipeline = FittedPipeline::fit(winner, x, y, model_seed(seed, winner))?;
    let model = TrainedModel::new(pipeline, cv_mean, final_accuracy, config.clone(), seed);

    let result = TrainingResult {
        best_classifier: winner.name().to_string(),
        final_accuracy,
        per_classifier,
        n_trials_per_class,
        n_folds,
        seed,
    };
    Ok((result, model))
}
