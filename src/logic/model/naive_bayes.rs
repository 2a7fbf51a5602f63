//! Gaussian Naive Bayes

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::logic::generator::CLASS_COUNT;
use super::classifier::{check_training_data, softmax, Classifier, ClassifierFamily};

/// Variance smoothing relative to the largest feature variance
const VAR_SMOOTHING: f64 = 1e-9;
/// Absolute variance floor
const VAR_FLOOR: f64 = 1e-6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GaussianNB {
    /// Per-class log prior; `None` for classes absent from training
    pub log_priors: Vec<Option<f64>>,
    pub means: Vec<Vec<f64>>,
    pub variances: Vec<Vec<f64>>,
}

impl Classifier for GaussianNB {
    fn family(&self) -> ClassifierFamily {
        ClassifierFamily::GaussianNB
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), TrainingError> {
        check_training_data(self.family(), x, y)?;

        let (n, d) = x.dim();
        let mut counts = [0usize; CLASS_COUNT];
        let mut means = vec![vec![0.0; d]; CLASS_COUNT];
        for (row, &c) in x.rows().into_iter().zip(y) {
            counts[c] += 1;
            for (m, v) in means[c].iter_mut().zip(row) {
                *m += v;
            }
        }
        for (mean, &count) in means.iter_mut().zip(&counts) {
            if count > 0 {
                mean.iter_mut().for_each(|m| *m /= count as f64);
            }
        }

        let mut variances = vec![vec![0.0; d]; CLASS_COUNT];
        for (row, &c) in x.rows().into_iter().zip(y) {
            for ((var, v), m) in variances[c].iter_mut().zip(row).zip(&means[c]) {
                *var += (v - m).powi(2);
            }
        }

        let max_var = x
            .columns()
            .into_iter()
            .map(|col| col.var(0.0))
            .fold(0.0, f64::max);
        let epsilon = VAR_SMOOTHING * max_var + VAR_FLOOR;

        for (var, &count) in variances.iter_mut().zip(&counts) {
            for v in var.iter_mut() {
                let spread = if count > 0 { *v / count as f64 } else { 0.0 };
                *v = spread + epsilon;
            }
        }

        self.log_priors = counts
            .iter()
            .map(|&c| (c > 0).then(|| (c as f64 / n as f64).ln()))
            .collect();
        self.means = means;
        self.variances = variances;
        Ok(())
    }

    fn predict_proba(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT] {
        if !self.is_fitted() {
            return [1.0 / CLASS_COUNT as f64; CLASS_COUNT];
        }

        let mut scores = [f64::NEG_INFINITY; CLASS_COUNT];
        for (c, score) in scores.iter_mut().enumerate() {
            let Some(log_prior) = self.log_priors[c] else {
                continue;
            };
            let log_likelihood: f64 = row
                .iter()
                .zip(&self.means[c])
                .zip(&self.variances[c])
                .map(|((&v, &m), &var)| {
                    -0.5 * ((2.0 * std::f64::consts::PI * var).ln() + (v - m).powi(2) / var)
                })
                .sum();
            *score = log_prior + log_likelihood;
        }
        softmax(&scores)
    }

    fn is_fitted(&self) -> bool {
        self.log_priors.len() == CLASS_COUNT
    }

    fn check_shape(&self, n_features: usize) -> Result<(), String> {
        if !self.is_fitted() || self.means.len() != CLASS_COUNT || self.variances.len() != CLASS_COUNT {
            return Err(format!(
                "{} priors, {} mean rows, {} variance rows for {} classes",
                self.log_priors.len(), self.means.len(), self.variances.len(), CLASS_COUNT
            ));
        }
        if self.log_priors.iter().flatten().any(|p| !p.is_finite()) {
            return Err("non-finite log prior".to_string());
        }
        for (mean, var) in self.means.iter().zip(&self.variances) {
            if mean.len() != n_features || var.len() != n_features {
                return Err(format!(
                    "class statistics have {} means and {} variances for {} features",
                    mean.len(), var.len(), n_features
                ));
            }
            if var.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err("variance must be positive".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_statistics() {
        let x = array![[1.0, 0.0], [3.0, 0.0], [10.0, 5.0], [12.0, 7.0]];
        let mut nb = GaussianNB::default();
        nb.fit(x.view(), &[0, 0, 2, 2]).unwrap();

        assert_eq!(nb.means[0], vec![2.0, 0.0]);
        assert_eq!(nb.means[2], vec![11.0, 6.0]);
        assert!((nb.variances[0][0] - 1.0).abs() < 1e-3);
        // Zero-variance column still gets the floor
        assert!(nb.variances[0][1] > 0.0);
        assert!(nb.log_priors[1].is_none());
        assert!((nb.log_priors[0].unwrap() - 0.5f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_check_shape() {
        let x = array![[1.0, 0.0], [3.0, 0.0], [10.0, 5.0], [12.0, 7.0]];
        let mut nb = GaussianNB::default();
        assert!(nb.check_shape(2).is_err());

        nb.fit(x.view(), &[0, 0, 2, 2]).unwrap();
        assert!(nb.check_shape(2).is_ok());
        assert!(nb.check_shape(1).is_err());

        nb.means.pop();
        assert!(nb.check_shape(2).is_err());
    }

    #[test]
    fn test_predicts_nearest_class_and_ignores_absent() {
        let x = array![[1.0, 0.0], [3.0, 0.5], [10.0, 5.0], [12.0, 7.0]];
        let mut nb = GaussianNB::default();
        nb.fit(x.view(), &[0, 0, 2, 2]).unwrap();

        let p = nb.predict_proba(array![2.0, 0.2].view());
        assert!(p[0] > 0.99);
        assert_eq!(p[1], 0.0);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
