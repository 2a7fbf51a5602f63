//! Multinomial Logistic Regression
//!
//! Softmax over linear scores, full-batch gradient descent from zero weights
//! with L2 on the weights (not the bias). Deterministic for a given input.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::logic::generator::CLASS_COUNT;
use super::classifier::{check_training_data, softmax, Classifier, ClassifierFamily};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
    /// CLASS_COUNT x n_features
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            epochs: 300,
            l2: 1e-3,
            weights: Array2::zeros((0, 0)),
            bias: Array1::zeros(CLASS_COUNT),
        }
    }
}

impl LogisticRegression {
    fn scores(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT] {
        let mut scores = [0.0; CLASS_COUNT];
        for (c, s) in scores.iter_mut().enumerate() {
            *s = self.weights.row(c).dot(&row) + self.bias[c];
        }
        scores
    }
}

impl Classifier for LogisticRegression {
    fn family(&self) -> ClassifierFamily {
        ClassifierFamily::LogisticRegression
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), TrainingError> {
        check_training_data(self.family(), x, y)?;

        let (n, d) = x.dim();
        self.weights = Array2::zeros((CLASS_COUNT, d));
        self.bias = Array1::zeros(CLASS_COUNT);

        let scale = 1.0 / n as f64;
        for _ in 0..self.epochs {
            let mut grad_w = Array2::<f64>::zeros((CLASS_COUNT, d));
            let mut grad_b = Array1::<f64>::zeros(CLASS_COUNT);

            for (row, &label) in x.rows().into_iter().zip(y) {
                let p = softmax(&self.scores(row));
                for c in 0..CLASS_COUNT {
                    let err = p[c] - if c == label { 1.0 } else { 0.0 };
                    grad_w.row_mut(c).scaled_add(err, &row);
                    grad_b[c] += err;
                }
            }

            grad_w *= scale;
            grad_w.scaled_add(self.l2, &self.weights);
            grad_b *= scale;

            self.weights.scaled_add(-self.learning_rate, &grad_w);
            self.bias.scaled_add(-self.learning_rate, &grad_b);
        }

        if self.weights.iter().chain(self.bias.iter()).any(|w| !w.is_finite()) {
            return Err(TrainingError::FitFailed {
                family: self.family().name().to_string(),
                reason: "weights diverged".to_string(),
            });
        }
        Ok(())
    }

    fn predict_proba(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT] {
        if !self.is_fitted() || row.len() != self.weights.ncols() {
            return [1.0 / CLASS_COUNT as f64; CLASS_COUNT];
        }
        softmax(&self.scores(row))
    }

    fn is_fitted(&self) -> bool {
        self.weights.nrows() == CLASS_COUNT && self.weights.ncols() > 0
    }

    fn check_shape(&self, n_features: usize) -> Result<(), String> {
        if self.weights.dim() != (CLASS_COUNT, n_features) || self.bias.len() != CLASS_COUNT {
            return Err(format!(
                "weights {:?} and bias {} do not fit {} classes x {} features",
                self.weights.dim(), self.bias.len(), CLASS_COUNT, n_features
            ));
        }
        if self.weights.iter().chain(self.bias.iter()).any(|w| !w.is_finite()) {
            return Err("non-finite weight".to_string());
        }
        Ok(())
    }
}
