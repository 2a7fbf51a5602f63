//! Scaler + classifier, fitted together on one training portion

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::logic::generator::CLASS_COUNT;
use super::classifier::{argmax, Classifier, ClassifierFamily, ClassifierModel};
use super::scaler::StandardScaler;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub scaler: StandardScaler,
    pub model: ClassifierModel,
}

impl FittedPipeline {
    /// Fit the scaler on `x`, then the family on the scaled rows
    pub fn fit(
        family: ClassifierFamily,
        x: ArrayView2<f64>,
        y: &[usize],
        seed: u64,
    ) -> Result<Self, TrainingError> {
        let scaler = StandardScaler::fit(x)?;
        let scaled = scaler.transform(x);

        let mut model = family.build(seed);
        model.fit(scaled.view(), y)?;

        Ok(Self { scaler, model })
    }

    pub fn family(&self) -> ClassifierFamily {
        self.model.family()
    }

    /// Scaler and model both fit rows of `n_features` columns
    pub fn check_shape(&self, n_features: usize) -> Result<(), String> {
        self.scaler.check_shape(n_features)?;
        self.model
            .check_shape(n_features)
            .map_err(|reason| format!("{}: {}", self.family(), reason))
    }

    pub fn predict_proba(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT] {
        self.model.predict_proba(self.scaler.transform_row(row).view())
    }

    pub fn predict(&self, row: ArrayView1<f64>) -> usize {
        argmax(&self.predict_proba(row))
    }

    /// Fraction of rows predicted correctly; 0 for no rows
    pub fn accuracy(&self, x: ArrayView2<f64>, y: &[usize]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let correct = x
            .rows()
            .into_iter()
            .zip(y)
            .filter(|(row, label)| self.predict(row.view()) == **label)
            .count();
        correct as f64 / y.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_every_family_fits_scaled_data() {
        // Column 1 is on a very different scale than column 0
        let x = array![
            [0.0, 1000.0],
            [0.2, 1010.0],
            [0.1, 990.0],
            [5.0, 5000.0],
            [5.2, 5010.0],
            [5.1, 4990.0],
        ];
        let y = [0, 0, 0, 1, 1, 1];

        for family in ClassifierFamily::MENU {
            let pipeline = FittedPipeline::fit(family, x.view(), &y, 11).unwrap();
            assert_eq!(pipeline.family(), family);
            assert_eq!(pipeline.accuracy(x.view(), &y), 1.0, "{}", family);
        }
    }

    #[test]
    fn test_check_shape_covers_scaler_and_model() {
        let x = array![[0.0, 1.0], [0.2, 1.1], [5.0, 3.0], [5.2, 3.1]];
        let y = [0, 0, 1, 1];

        for family in ClassifierFamily::MENU {
            let mut pipeline = FittedPipeline::fit(family, x.view(), &y, 3).unwrap();
            assert!(pipeline.check_shape(2).is_ok(), "{}", family);
            assert!(pipeline.check_shape(4).is_err(), "{}", family);

            pipeline.scaler.scale.pop();
            assert!(pipeline.check_shape(2).is_err(), "{}", family);
        }
    }

    #[test]
    fn test_degenerate_matrix_rejected() {
        let x = array![[1.0, 1.0], [1.0, 1.0]];
        let err = FittedPipeline::fit(ClassifierFamily::GaussianNB, x.view(), &[0, 1], 0).unwrap_err();
        assert_eq!(err, TrainingError::DegenerateFeatures);
    }
}
