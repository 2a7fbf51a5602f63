//! Spike Decoder - Main Entry Point
//!
//! Trains (or loads) a decoder, generates one trial per class preset and
//! prints the predictions as JSON on stdout.

use anyhow::Context;
use serde::Serialize;

use spike_decoder::constants;
use spike_decoder::logic::features::{ActivityPattern, PopulationActivity};
use spike_decoder::logic::decoder::storage;
use spike_decoder::{generate, ClassLabel, Decoder, PredictionResult, TrainingConfig, TrainingResult};

#[derive(Serialize)]
struct PresetReport {
    preset: ClassLabel,
    prediction: PredictionResult,
    activity_pattern: ActivityPattern,
    activity_description: &'static str,
}

#[derive(Serialize)]
struct Report {
    version: &'static str,
    training: Option<TrainingResult>,
    model_id: Option<uuid::Uuid>,
    predictions: Vec<PresetReport>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    let verbose = std::env::args().any(|a| a == "--verbose" || a == "-v");
    let seed = constants::get_seed();
    let config = TrainingConfig::from_env();
    let decoder = Decoder::with_config(config.clone());

    let model_path = constants::get_model_path();
    if let Some(path) = model_path.as_ref().filter(|p| p.exists()) {
        match decoder.load(path) {
            Ok(()) => log::info!("Using stored model from {}", path.display()),
            Err(e) => log::warn!("Stored model unusable ({}), retraining", e),
        }
    }

    if !decoder.is_trained() {
        decoder
            .train(constants::get_trials_per_class(), seed, verbose)
            .context("training failed")?;

        if let Some(path) = model_path.as_ref() {
            decoder.save(path).context("saving model failed")?;
        } else {
            log::debug!("SPIKE_DECODER_MODEL_PATH not set, default would be {}",
                storage::get_default_model_path().display());
        }
    }

    let mut predictions = Vec::with_capacity(ClassLabel::ALL.len());
    for label in ClassLabel::ALL {
        let dataset = generate(
            &label.preset().with_base_firing_rate(config.base_firing_rate),
            config.n_neurons,
            config.trial_duration,
            config.n_stimuli,
            1,
            seed.wrapping_add(1000 + label.index() as u64),
        )
        .with_context(|| format!("generating {} trial", label))?;

        let prediction = decoder.predict(&dataset)?;
        let activity = dataset
            .first()
            .map(PopulationActivity::from_trial)
            .context("generated dataset is empty")?;

        let reading = if prediction.predicted_class.is_healthy() { "healthy" } else { "pathological" };
        log::info!(
            "{:<16} -> {:<16} ({:.1}%, {})",
            label, prediction.predicted_class, prediction.confidence * 100.0, reading
        );
        predictions.push(PresetReport {
            preset: label,
            prediction,
            activity_pattern: activity.pattern,
            activity_description: activity.pattern.description(),
        });
    }

    let report = Report {
        version: constants::APP_VERSION,
        training: decoder.last_training_result(),
        model_id: decoder.model().map(|m| m.id),
        predictions,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
