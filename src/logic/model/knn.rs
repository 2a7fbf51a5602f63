//! k-Nearest Neighbours
//!
//! Inverse-distance weighted vote among the `k` closest training rows,
//! blended with a uniform prior so no class ever gets exactly zero.

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::logic::generator::CLASS_COUNT;
use super::classifier::{check_training_data, Classifier, ClassifierFamily};

pub const DEFAULT_K: usize = 5;

/// Share of probability mass spread uniformly over all classes
const UNIFORM_BLEND: f64 = 0.05;

/// Keeps the weight of an exact match finite
const DISTANCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNearestNeighbors {
    pub k: usize,
    pub points: Array2<f64>,
    pub labels: Vec<usize>,
}

impl Default for KNearestNeighbors {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            points: Array2::zeros((0, 0)),
            labels: Vec::new(),
        }
    }
}

impl KNearestNeighbors {
    /// (distance, training index) of the k nearest rows, closest first
    pub fn neighbors(&self, row: ArrayView1<f64>) -> Vec<(f64, usize)> {
        let mut distances: Vec<(f64, usize)> = self
            .points
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let d2: f64 = p.iter().zip(row.iter()).map(|(a, b)| (a - b).powi(2)).sum();
                (d2.sqrt(), i)
            })
            .collect();

        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        distances.truncate(self.k.min(distances.len()));
        distances
    }
}

impl Classifier for KNearestNeighbors {
    fn family(&self) -> ClassifierFamily {
        ClassifierFamily::KNearestNeighbors
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), TrainingError> {
        check_training_data(self.family(), x, y)?;
        if self.k == 0 {
            return Err(TrainingError::FitFailed {
                family: self.family().name().to_string(),
                reason: "k must be at least 1".to_string(),
            });
        }
        self.points = x.to_owned();
        self.labels = y.to_vec();
        Ok(())
    }

    fn predict_proba(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT] {
        let uniform = 1.0 / CLASS_COUNT as f64;
        if !self.is_fitted() || row.len() != self.points.ncols() {
            return [uniform; CLASS_COUNT];
        }

        let mut votes = [0.0; CLASS_COUNT];
        for (distance, index) in self.neighbors(row) {
            votes[self.labels[index]] += 1.0 / (distance + DISTANCE_EPSILON);
        }
        let total: f64 = votes.iter().sum();

        votes.map(|v| (1.0 - UNIFORM_BLEND) * v / total + UNIFORM_BLEND * uniform)
    }

    fn is_fitted(&self) -> bool {
        !self.labels.is_empty()
    }

    fn check_shape(&self, n_features: usize) -> Result<(), String> {
        if self.k == 0 || !self.is_fitted() {
            return Err(format!("k = {} with {} training rows", self.k, self.labels.len()));
        }
        if self.points.dim() != (self.labels.len(), n_features) {
            return Err(format!(
                "points {:?} do not fit {} labels x {} features",
                self.points.dim(), self.labels.len(), n_features
            ));
        }
        if let Some(bad) = self.labels.iter().find(|&&c| c >= CLASS_COUNT) {
            return Err(format!("class index {} out of range", bad));
        }
        Ok(())
    }
}
