//! Random Forest
//!
//! Bagged CART trees with gini splits over a random feature subset at each
//! node. Leaves hold class distributions; the forest averages them.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::TrainingError;
use crate::logic::generator::CLASS_COUNT;
use super::classifier::{check_training_data, Classifier, ClassifierFamily};

pub const DEFAULT_TREES: usize = 50;
pub const DEFAULT_MAX_DEPTH: usize = 8;
const MIN_SAMPLES_SPLIT: usize = 2;

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        distribution: [f64; CLASS_COUNT],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Flat CART tree, root at index 0
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

struct TreeBuilder<'a, 'b> {
    x: ArrayView2<'a, f64>,
    y: &'b [usize],
    max_depth: usize,
    max_features: usize,
    nodes: Vec<Node>,
}

impl<'a, 'b> TreeBuilder<'a, 'b> {
    fn grow(&mut self, samples: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = class_counts(self.y, samples);

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if pure || depth >= self.max_depth || samples.len() < MIN_SAMPLES_SPLIT {
            return self.leaf(&counts, samples.len());
        }

        let Some((feature, threshold)) = self.best_split(samples, &counts, rng) else {
            return self.leaf(&counts, samples.len());
        };

        let mid = partition(samples, |&i| self.x[[i, feature]] <= threshold);
        let (left_samples, right_samples) = samples.split_at_mut(mid);

        // Reserve the split slot before the children so the root stays at 0
        let index = self.nodes.len();
        self.nodes.push(Node::Split { feature, threshold, left: 0, right: 0 });
        let left = self.grow(left_samples, depth + 1, rng);
        let right = self.grow(right_samples, depth + 1, rng);
        self.nodes[index] = Node::Split { feature, threshold, left, right };
        index
    }

    fn leaf(&mut self, counts: &[usize; CLASS_COUNT], total: usize) -> usize {
        let mut distribution = [0.0; CLASS_COUNT];
        if total > 0 {
            for (d, &c) in distribution.iter_mut().zip(counts) {
                *d = c as f64 / total as f64;
            }
        } else {
            distribution = [1.0 / CLASS_COUNT as f64; CLASS_COUNT];
        }
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    /// Lowest weighted gini over a random feature subset. Keeps drawing
    /// features past `max_features` until some split improves on the parent.
    fn best_split(
        &self,
        samples: &[usize],
        parent: &[usize; CLASS_COUNT],
        rng: &mut StdRng,
    ) -> Option<(usize, f64)> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(rng);

        let n = samples.len() as f64;
        let mut best: Option<(usize, f64)> = None;
        let mut best_impurity = gini(parent, samples.len());

        let mut order: Vec<usize> = samples.to_vec();
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            order.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let mut left = [0usize; CLASS_COUNT];
            let mut right = *parent;
            for k in 0..order.len() - 1 {
                let class = self.y[order[k]];
                left[class] += 1;
                right[class] -= 1;

                let here = self.x[[order[k], feature]];
                let next = self.x[[order[k + 1], feature]];
                if next <= here {
                    continue;
                }

                let n_left = k + 1;
                let n_right = order.len() - n_left;
                let impurity = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n;
                if impurity < best_impurity - 1e-12 {
                    best_impurity = impurity;
                    best = Some((feature, 0.5 * (here + next)));
                }
            }
        }
        best
    }
}

impl DecisionTree {
    pub fn predict_proba(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT] {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { distribution }) => return *distribution,
                Some(Node::Split { feature, threshold, left, right }) => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return [1.0 / CLASS_COUNT as f64; CLASS_COUNT],
            }
        }
    }

    /// Split features in range and every child stored after its parent, which
    /// also rules out cycles
    pub fn check_shape(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { distribution } => {
                    if distribution.iter().any(|p| !p.is_finite() || *p < 0.0) {
                        return Err(format!("leaf {} has an invalid class distribution", index));
                    }
                }
                Node::Split { feature, left, right, .. } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            index, feature, n_features
                        ));
                    }
                    if let Some(child) = [*left, *right]
                        .into_iter()
                        .find(|&c| c <= index || c >= self.nodes.len())
                    {
                        return Err(format!("node {} points to child {}", index, child));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }
}

fn class_counts(y: &[usize], samples: &[usize]) -> [usize; CLASS_COUNT] {
    let mut counts = [0; CLASS_COUNT];
    for &i in samples {
        counts[y[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize; CLASS_COUNT], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / total).powi(2)).sum::<f64>()
}

/// In-place partition; returns the number of samples satisfying `pred`
fn partition(samples: &mut [usize], pred: impl Fn(&usize) -> bool) -> usize {
    let mut mid = 0;
    for i in 0..samples.len() {
        if pred(&samples[i]) {
            samples.swap(i, mid);
            mid += 1;
        }
    }
    mid
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(seed: u64) -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            seed,
            trees: Vec::new(),
        }
    }
}

impl Classifier for RandomForest {
    fn family(&self) -> ClassifierFamily {
        ClassifierFamily::RandomForest
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: &[usize]) -> Result<(), TrainingError> {
        check_training_data(self.family(), x, y)?;

        let n = x.nrows();
        let max_features = ((x.ncols() as f64).sqrt() as usize).max(1);
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.trees = (0..self.n_trees)
            .map(|_| {
                let mut tree_rng = StdRng::seed_from_u64(rng.gen());
                let mut samples: Vec<usize> = (0..n).map(|_| tree_rng.gen_range(0..n)).collect();

                let mut builder = TreeBuilder {
                    x,
                    y,
                    max_depth: self.max_depth,
                    max_features,
                    nodes: Vec::new(),
                };
                builder.grow(&mut samples, 0, &mut tree_rng);
                DecisionTree { nodes: builder.nodes }
            })
            .collect();

        log::trace!("RandomForest fitted {} trees on {} rows", self.trees.len(), n);
        Ok(())
    }

    fn predict_proba(&self, row: ArrayView1<f64>) -> [f64; CLASS_COUNT] {
        if self.trees.is_empty() {
            return [1.0 / CLASS_COUNT as f64; CLASS_COUNT];
        }
        let mut total = [0.0; CLASS_COUNT];
        for tree in &self.trees {
            for (t, p) in total.iter_mut().zip(tree.predict_proba(row)) {
                *t += p;
            }
        }
        let n = self.trees.len() as f64;
        total.map(|t| t / n)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn check_shape(&self, n_features: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check_shape(n_features).map_err(|reason| format!("tree {}: {}", i, reason))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn two_blobs() -> (Array2<f64>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let jitter = (i as f64) * 0.01;
            rows.extend_from_slice(&[-2.0 + jitter, 0.5 - jitter, jitter]);
            labels.push(0);
            rows.extend_from_slice(&[2.0 - jitter, -0.5 + jitter, jitter]);
            labels.push(3);
        }
        (Array2::from_shape_vec((40, 3), rows).unwrap(), labels)
    }

    #[test]
    fn test_separable_blobs() {
        let (x, y) = two_blobs();
        let mut forest = RandomForest::new(7);
        forest.fit(x.view(), &y).unwrap();

        assert_eq!(forest.trees.len(), DEFAULT_TREES);
        assert!(forest.trees.iter().all(|t| t.depth() <= DEFAULT_MAX_DEPTH));

        let p = forest.predict_proba(array![-2.0, 0.5, 0.1].view());
        assert!(p[0] > 0.8, "{:?}", p);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(forest.predict_proba(array![2.0, -0.5, 0.1].view())[3] > 0.8);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = two_blobs();
        let mut a = RandomForest::new(3);
        let mut b = RandomForest::new(3);
        a.fit(x.view(), &y).unwrap();
        b.fit(x.view(), &y).unwrap();

        let row = array![0.1, 0.0, 0.05];
        assert_eq!(a.predict_proba(row.view()), b.predict_proba(row.view()));
    }

    #[test]
    fn test_pure_node_is_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let mut forest = RandomForest::new(0);
        forest.fit(x.view(), &[4, 4, 4]).unwrap();
        for tree in &forest.trees {
            assert_eq!(tree.nodes.len(), 1);
        }
        assert_eq!(forest.predict_proba(array![9.0].view())[4], 1.0);
    }

    #[test]
    fn test_check_shape_rejects_bad_nodes() {
        let (x, y) = two_blobs();
        let mut forest = RandomForest::new(7);
        forest.fit(x.view(), &y).unwrap();
        assert!(forest.check_shape(3).is_ok());

        let leaf = Node::Leaf { distribution: [0.2; CLASS_COUNT] };
        let split = |feature, left, right| Node::Split { feature, threshold: 0.0, left, right };

        let out_of_range = DecisionTree { nodes: vec![split(42, 1, 2), leaf.clone(), leaf.clone()] };
        assert!(out_of_range.check_shape(3).unwrap_err().contains("feature 42"));

        let dangling = DecisionTree { nodes: vec![split(0, 1, 9), leaf.clone()] };
        assert!(dangling.check_shape(3).is_err());

        let cycle = DecisionTree { nodes: vec![split(0, 0, 1), leaf.clone()] };
        assert!(cycle.check_shape(3).is_err());

        let nan_leaf = DecisionTree { nodes: vec![Node::Leaf { distribution: [f64::NAN; CLASS_COUNT] }] };
        assert!(nan_leaf.check_shape(3).is_err());
        assert!(DecisionTree::default().check_shape(3).is_err());
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[2, 0, 0, 0, 0], 2), 0.0);
        assert!((gini(&[1, 1, 0, 0, 0], 2) - 0.5).abs() < 1e-12);
    }
}
