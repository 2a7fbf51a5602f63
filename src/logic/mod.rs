//! Logic Module - Simulation & Decoding Engines
//!
//! - `generator/` - Synthetic spike trains per firing-pattern class
//! - `features/` - Versioned feature extraction
//! - `model/` - Classifier families, scaling, cross-validation
//! - `decoder/` - Training orchestration, model handle, persistence

pub mod generator;
pub mod features;
pub mod model;
pub mod decoder;
