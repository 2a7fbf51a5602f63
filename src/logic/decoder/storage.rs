use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{DecoderError, DecoderResult};
use crate::logic::features::layout::{validate_layout, FEATURE_COUNT};
use super::types::TrainedModel;

/// Get default model path
pub fn get_default_model_path() -> PathBuf {
    constants::get_model_path().unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(constants::APP_NAME)
            .join("decoder_model_v1.json")
    })
}

/// Validate model compatibility with the current feature layout
pub fn validate_model(model: &TrainedModel) -> DecoderResult<()> {
    validate_layout(model.feature_version, model.layout_hash)?;
    Ok(())
}

/// Parameter shapes must match the feature layout and the stated family.
/// Only needed for models that did not come out of `train`.
pub fn validate_pipeline(model: &TrainedModel) -> DecoderResult<()> {
    if model.pipeline.family() != model.family {
        return Err(DecoderError::InvalidModel(format!(
            "labelled {} but holds {}",
            model.family,
            model.pipeline.family()
        )));
    }
    model.pipeline.check_shape(FEATURE_COUNT).map_err(DecoderError::InvalidModel)
}

/// Save model to disk
pub fn save_model(model: &TrainedModel, path: &Path) -> DecoderResult<()> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(model)?;
    fs::write(path, json)?;
    log::info!("Saved {} model {} to {}", model.family, model.id, path.display());
    Ok(())
}

/// Load model from disk with validation
pub fn load_model(path: &Path) -> DecoderResult<TrainedModel> {
    if !path.exists() {
        return Err(DecoderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("model file not found: {}", path.display()),
        )));
    }

    let data = fs::read(path)?;
    let model: TrainedModel = serde_json::from_slice(&data)?;

    // Validate version/layout, then parameter shapes
    validate_model(&model)?;
    validate_pipeline(&model)?;

    log::info!(
        "Loaded {} model {} v{} (hash: {:x})",
        model.family, model.id, model.feature_version, model.layout_hash
    );
    Ok(model)
}
