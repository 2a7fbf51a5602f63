//! Stratified Splits & Cross-Validation
//!
//! All splits are seeded and keep every class's share roughly equal across
//! folds. Indices inside a fold are sorted so results never depend on
//! shuffle order beyond fold membership.

use ndarray::{ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::logic::features::stats::{mean, std_dev};
use crate::logic::generator::CLASS_COUNT;
use super::classifier::ClassifierFamily;
use super::pipeline::FittedPipeline;

/// Upper bound on the number of CV folds
pub const MAX_FOLDS: usize = 5;

/// Share of each class held out for the final accuracy estimate
pub const HOLDOUT_FRACTION: f64 = 0.2;

/// Row indices of one train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Cross-validation outcome of one family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvScore {
    pub fold_scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CvScore {
    pub fn from_folds(fold_scores: Vec<f64>) -> Self {
        Self {
            mean: mean(&fold_scores),
            std: std_dev(&fold_scores),
            fold_scores,
        }
    }
}

/// Row indices grouped by class, each group shuffled with `rng`
fn shuffled_by_class(y: &[usize], rng: &mut StdRng) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); CLASS_COUNT];
    for (i, &c) in y.iter().enumerate() {
        if let Some(group) = groups.get_mut(c) {
            group.push(i);
        }
    }
    for group in groups.iter_mut() {
        group.shuffle(rng);
    }
    groups
}

/// Stratified k-fold split. `k` below 2 is raised to 2.
pub fn stratified_k_fold(y: &[usize], k: usize, seed: u64) -> Vec<Fold> {
    let k = k.max(2);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut assignment = vec![0usize; y.len()];
    for group in shuffled_by_class(y, &mut rng) {
        for (position, &i) in group.iter().enumerate() {
            assignment[i] = position % k;
        }
    }

    (0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..y.len()).partition(|&i| assignment[i] == fold);
            Fold { train, test }
        })
        .collect()
}

/// Stratified single split holding out `test_fraction` of each class.
/// Every class with at least two rows keeps at least one row on each side.
pub fn stratified_holdout(y: &[usize], test_fraction: f64, seed: u64) -> Fold {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for group in shuffled_by_class(y, &mut rng) {
        let n = group.len();
        let n_test = if n < 2 {
            0
        } else {
            ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1)
        };
        test.extend_from_slice(&group[..n_test]);
        train.extend_from_slice(&group[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Fold { train, test }
}

/// Fit on `fold.train`, score on `fold.test`
pub fn evaluate_fold(
    family: ClassifierFamily,
    x: ArrayView2<f64>,
    y: &[usize],
    fold: &Fold,
    seed: u64,
) -> Result<f64, TrainingError> {
    let x_train = x.select(Axis(0), &fold.train);
    let y_train: Vec<usize> = fold.train.iter().map(|&i| y[i]).collect();
    let x_test = x.select(Axis(0), &fold.test);
    let y_test: Vec<usize> = fold.test.iter().map(|&i| y[i]).collect();

    let pipeline = FittedPipeline::fit(family, x_train.view(), &y_train, seed)?;
    Ok(pipeline.accuracy(x_test.view(), &y_test))
}

/// Score `family` on every fold
pub fn cross_validate(
    family: ClassifierFamily,
    x: ArrayView2<f64>,
    y: &[usize],
    folds: &[Fold],
    seed: u64,
) -> Result<CvScore, TrainingError> {
    if folds.is_empty() {
        return Err(TrainingError::FitFailed {
            family: family.name().to_string(),
            reason: "no cross-validation folds".to_string(),
        });
    }

    let fold_scores = folds
        .iter()
        .map(|fold| evaluate_fold(family, x, y, fold, seed))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CvScore::from_folds(fold_scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn labels(per_class: usize) -> Vec<usize> {
        (0..CLASS_COUNT).flat_map(|c| std::iter::repeat(c).take(per_class)).collect()
    }

    #[test]
    fn test_k_fold_partitions_rows() {
        let y = labels(10);
        let folds = stratified_k_fold(&y, 5, 42);
        assert_eq!(folds.len(), 5);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..y.len()).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), y.len());
            // Two rows of every class in each test fold
            for c in 0..CLASS_COUNT {
                assert_eq!(fold.test.iter().filter(|&&i| y[i] == c).count(), 2);
            }
        }
    }

    #[test]
    fn test_k_fold_seeded() {
        let y = labels(6);
        assert_eq!(stratified_k_fold(&y, 3, 1), stratified_k_fold(&y, 3, 1));
        assert_ne!(stratified_k_fold(&y, 3, 1), stratified_k_fold(&y, 3, 2));
    }

    #[test]
    fn test_holdout_is_stratified() {
        let y = labels(10);
        let split = stratified_holdout(&y, HOLDOUT_FRACTION, 9);
        assert_eq!(split.test.len(), 10);
        assert_eq!(split.train.len(), 40);
        for c in 0..CLASS_COUNT {
            assert_eq!(split.test.iter().filter(|&&i| y[i] == c).count(), 2);
        }

        // Two rows per class still leaves one on each side
        let small = stratified_holdout(&labels(2), HOLDOUT_FRACTION, 9);
        assert_eq!(small.test.len(), CLASS_COUNT);
        assert_eq!(small.train.len(), CLASS_COUNT);
    }

    #[test]
    fn test_cross_validate_separable() {
        let y = labels(6);
        let x = Array2::from_shape_fn((y.len(), 2), |(i, j)| {
            y[i] as f64 * 3.0 + if j == 0 { 0.01 * i as f64 } else { -0.02 * i as f64 }
        });
        let folds = stratified_k_fold(&y, 3, 5);
        let score = cross_validate(ClassifierFamily::GaussianNB, x.view(), &y, &folds, 5).unwrap();

        assert_eq!(score.fold_scores.len(), 3);
        assert!(score.mean > 0.9, "{:?}", score);
        assert!(score.std >= 0.0);
    }

    #[test]
    fn test_cv_score_stats() {
        let score = CvScore::from_folds(vec![0.5, 1.0]);
        assert_eq!(score.mean, 0.75);
        assert_eq!(score.std, 0.25);
        assert!(cross_validate(ClassifierFamily::GaussianNB, Array2::zeros((2, 2)).view(), &[0, 1], &[], 0).is_err());
    }
}
