//! Feature Standardization
//!
//! Z-score parameters learned from a training matrix and applied to every
//! row the fitted model later sees.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;

/// Columns with a std below this are left unscaled
const MIN_SCALE: f64 = 1e-12;

/// Per-column mean and scale from training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    /// Columns that had (near) zero variance in training
    pub constant_columns: Vec<usize>,
}

impl StandardScaler {
    /// Fit on the rows of `x`.
    ///
    /// Constant columns get scale 1 and map to 0. A matrix where every column
    /// is constant carries no information and is rejected.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self, TrainingError> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(TrainingError::DegenerateFeatures);
        }

        let mean = x.mean_axis(Axis(0)).ok_or(TrainingError::DegenerateFeatures)?;
        let std = x.std_axis(Axis(0), 0.0);

        let mut constant_columns = Vec::new();
        let scale: Vec<f64> = std
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                if s > MIN_SCALE && s.is_finite() {
                    s
                } else {
                    constant_columns.push(i);
                    1.0
                }
            })
            .collect();

        if constant_columns.len() == x.ncols() {
            return Err(TrainingError::DegenerateFeatures);
        }

        Ok(Self {
            mean: mean.to_vec(),
            scale,
            constant_columns,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// One finite mean and positive scale per input column
    pub fn check_shape(&self, n_features: usize) -> Result<(), String> {
        if self.n_features() != n_features || self.scale.len() != n_features {
            return Err(format!(
                "scaler has {} means and {} scales for {} features",
                self.n_features(), self.scale.len(), n_features
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) || self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("scaler parameters must be finite with positive scale".to_string());
        }
        if let Some(c) = self.constant_columns.iter().find(|&&c| c >= n_features) {
            return Err(format!("constant column {} out of range", c));
        }
        Ok(())
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            self.apply(row.iter_mut());
        }
        out
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        let mut out = row.to_owned();
        self.apply(out.iter_mut());
        out
    }

    fn apply<'a>(&self, values: impl Iterator<Item = &'a mut f64>) {
        for ((v, &m), &s) in values.zip(&self.mean).zip(&self.scale) {
            *v = (*v - m) / s;
        }
    }
}
