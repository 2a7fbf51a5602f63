//! Classifier Trait & Family Menu
//!
//! Every family implements `Classifier` over z-scored feature rows and class
//! indices `0..CLASS_COUNT`. `ClassifierModel` is the serializable sum type the
//! decoder stores and persists.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::logic::generator::CLASS_COUNT;
use super::forest::RandomForest;
use super::knn::KNearestNeighbors;
use super::logistic::LogisticRegression;
use super::naive_bayes::GaussianNB;

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for the decoder's classifier families
pub trait Classifier {
    fn family(&self) -> ClassifierFamily;

    /// Fit on rows of `x` with class indices `y`
    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), TrainingError>;

    /// Class probabilities for one row, in class-label order
    fn predict_proba(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT];

    fn is_fitted(&self) -> bool;

    /// Fitted parameters fit `n_features` input columns and `CLASS_COUNT`
    /// classes, so prediction can neither panic nor read out of range.
    fn check_shape(&self, n_features: usize) -> Result<(), String>;
}

// ============================================================================
// FAMILY MENU
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifierFamily {
    RandomForest,
    LogisticRegression,
    GaussianNB,
    KNearestNeighbors,
}

impl ClassifierFamily {
    /// Evaluation order; also the tie-break order for model selection
    pub const MENU: [ClassifierFamily; 4] = [
        ClassifierFamily::RandomForest,
        ClassifierFamily::LogisticRegression,
        ClassifierFamily::GaussianNB,
        ClassifierFamily::KNearestNeighbors,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClassifierFamily::RandomForest => "RandomForest",
            ClassifierFamily::LogisticRegression => "LogisticRegression",
            ClassifierFamily::GaussianNB => "GaussianNB",
            ClassifierFamily::KNearestNeighbors => "KNearestNeighbors",
        }
    }

    /// Unfitted model with default hyper-parameters
    pub fn build(&self, seed: u64) -> ClassifierModel {
        match self {
            ClassifierFamily::RandomForest => ClassifierModel::RandomForest(RandomForest::new(seed)),
            ClassifierFamily::LogisticRegression => {
                ClassifierModel::LogisticRegression(LogisticRegression::default())
            }
            ClassifierFamily::GaussianNB => ClassifierModel::GaussianNB(GaussianNB::default()),
            ClassifierFamily::KNearestNeighbors => {
                ClassifierModel::KNearestNeighbors(KNearestNeighbors::default())
            }
        }
    }
}

impl std::fmt::Display for ClassifierFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// MODEL SUM TYPE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", content = "params")]
pub enum ClassifierModel {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
    GaussianNB(GaussianNB),
    KNearestNeighbors(KNearestNeighbors),
}

impl ClassifierModel {
    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierModel::RandomForest(m) => m,
            ClassifierModel::LogisticRegression(m) => m,
            ClassifierModel::GaussianNB(m) => m,
            ClassifierModel::KNearestNeighbors(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            ClassifierModel::RandomForest(m) => m,
            ClassifierModel::LogisticRegression(m) => m,
            ClassifierModel::GaussianNB(m) => m,
            ClassifierModel::KNearestNeighbors(m) => m,
        }
    }
}

impl Classifier for ClassifierModel {
    fn family(&self) -> ClassifierFamily {
        self.inner().family()
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), TrainingError> {
        self.inner_mut().fit(x, y)
    }

    fn predict_proba(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT] {
        self.inner().predict_proba(row)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn check_shape(&self, n_features: usize) -> Result<(), String> {
        self.inner().check_shape(n_features)
    }
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Checks shared by every family before fitting
pub(crate) fn check_training_data(
    family: ClassifierFamily,
    x: ArrayView2<f64>,
    y: &[usize],
) -> Result<(), TrainingError> {
    let fail = |reason: String| TrainingError::FitFailed {
        family: family.name().to_string(),
        reason,
    };

    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(fail(format!("empty training matrix {:?}", x.dim())));
    }
    if x.nrows() != y.len() {
        return Err(fail(format!("{} rows but {} labels", x.nrows(), y.len())));
    }
    if let Some(&bad) = y.iter().find(|&&c| c >= CLASS_COUNT) {
        return Err(fail(format!("class index {} out of range", bad)));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(fail("non-finite feature value".to_string()));
    }
    Ok(())
}

/// Numerically stable softmax; `-inf` scores get probability 0
pub(crate) fn softmax(scores: &[f64; CLASS_COUNT]) -> [f64; CLASS_COUNT] {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return [1.0 / CLASS_COUNT as f64; CLASS_COUNT];
    }

    let mut out = [0.0; CLASS_COUNT];
    let mut sum = 0.0;
    for (o, &s) in out.iter_mut().zip(scores.iter()) {
        *o = (s - max).exp();
        sum += *o;
    }
    for o in out.iter_mut() {
        *o /= sum;
    }
    out
}

/// Index of the largest value; ties go to the lowest index
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_menu_order_and_names() {
        let names: Vec<&str> = ClassifierFamily::MENU.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["RandomForest", "LogisticRegression", "GaussianNB", "KNearestNeighbors"]);
        for family in ClassifierFamily::MENU {
            assert_eq!(family.build(1).family(), family);
            assert!(!family.build(1).is_fitted());
            // Unfitted models never pass the stored-model check
            assert!(family.build(1).check_shape(3).is_err());
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0, f64::NEG_INFINITY, 0.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(p[3], 0.0);
        assert_eq!(argmax(&p), 2);

        let uniform = softmax(&[f64::NEG_INFINITY; CLASS_COUNT]);
        assert!((uniform[0] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_argmax_ties_take_first() {
        assert_eq!(argmax(&[0.3, 0.3, 0.1, 0.3, 0.0]), 0);
        assert_eq!(argmax(&[0.1, 0.2, 0.2, 0.0, 0.0]), 1);
    }

    #[test]
    fn test_check_training_data_rejects_bad_input() {
        let x = array![[0.0, 1.0], [1.0, 0.0]];
        let family = ClassifierFamily::GaussianNB;

        assert!(check_training_data(family, x.view(), &[0, 1]).is_ok());
        assert!(check_training_data(family, x.view(), &[0]).is_err());
        assert!(check_training_data(family, x.view(), &[0, 7]).is_err());

        let nan = array![[f64::NAN, 1.0], [1.0, 0.0]];
        let err = check_training_data(family, nan.view(), &[0, 1]).unwrap_err();
        assert!(matches!(err, TrainingError::FitFailed { ref family, .. } if family == "GaussianNB"));
    }
}
