//! Model Module - Classifier Families & Evaluation
//!
//! Keeps the learning side apart from the decoder handle so families can be
//! added or swapped without touching training orchestration.

pub mod classifier;
pub mod scaler;
pub mod forest;
pub mod logistic;
pub mod naive_bayes;
pub mod knn;
pub mod pipeline;
pub mod crossval;
pub mod inference;

// Re-export common types
pub use classifier::{Classifier, ClassifierFamily, ClassifierModel};
pub use crossval::{CvScore, Fold};
pub use inference::PredictionResult;
pub use pipeline::FittedPipeline;
pub use scaler::StandardScaler;
