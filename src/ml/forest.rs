use crate::error::{AppError, Result};
use crate::ml::models::{ModelMetrics, TrainingDataset};
use ndarray::Array2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};

type TreeClassifier = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;
type TreeRegressor = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Trait for classifiers
pub trait Classifier: Send + Sync {
    /// Train the classifier
    fn train(&mut self, dataset: &TrainingDataset) -> Result<ModelMetrics>;

    /// Predict class labels
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<i32>>;

    /// Predict class probabilities, one column per entry of `classes()`
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>>;

    /// Labels seen during training, in column order of `predict_proba`
    fn classes(&self) -> &[i32];

    /// Check if model is trained
    fn is_trained(&self) -> bool;
}

/// Trait for regressors
pub trait Regressor: Send + Sync {
    /// Train the regressor
    fn train(&mut self, dataset: &TrainingDataset) -> Result<ModelMetrics>;

    /// Predict one value per row
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>>;

    /// Check if model is trained
    fn is_trained(&self) -> bool;
}

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: u16,
    pub seed: u64,
}

impl ForestParams {
    pub fn new(n_trees: usize, max_depth: u16, seed: u64) -> Self {
        Self {
            n_trees,
            max_depth,
            seed,
        }
    }

    fn validate(&self, dataset: &TrainingDataset) -> Result<()> {
        if self.n_trees == 0 {
            return Err(AppError::Model("Forest needs at least one tree".to_string()));
        }
        if dataset.n_samples == 0 || dataset.n_features == 0 {
            return Err(AppError::Model("Training dataset is empty".to_string()));
        }
        Ok(())
    }
}

fn to_dense(features: &Array2<f64>) -> DenseMatrix<f64> {
    let (rows, cols) = features.dim();
    let data: Vec<f64> = features.iter().copied().collect();
    DenseMatrix::new(rows, cols, data, false)
}

/// Draw `n` row indices with replacement. Each tree gets its own stream
/// derived from the forest seed so training order does not matter.
fn bootstrap_indices(n: usize, seed: u64, tree: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(tree as u64));
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

fn bootstrap_matrix(features: &Array2<f64>, indices: &[usize]) -> DenseMatrix<f64> {
    let cols = features.ncols();
    let mut data = Vec::with_capacity(indices.len() * cols);
    for &i in indices {
        data.extend(features.row(i).iter().copied());
    }
    DenseMatrix::new(indices.len(), cols, data, false)
}

/// Bagged ensemble of smartcore decision trees. Unlike a textbook random
/// forest, every split considers all features; only the rows are resampled.
/// Class probability is the fraction of trees voting for the class.
#[derive(Serialize, Deserialize)]
pub struct ForestClassifier {
    params: ForestParams,
    classes: Vec<i32>,
    trees: Vec<TreeClassifier>,
}

impl ForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            classes: Vec::new(),
            trees: Vec::new(),
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn votes(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_trained() {
            return Err(AppError::Model("Model not trained".to_string()));
        }

        let x = to_dense(features);
        let mut counts = Array2::<f64>::zeros((features.nrows(), self.classes.len()));

        for tree in &self.trees {
            let predictions = tree.predict(&x)?;
            for (row, label) in predictions.iter().enumerate() {
                if let Ok(col) = self.classes.binary_search(label) {
                    counts[[row, col]] += 1.0;
                }
            }
        }

        Ok(counts)
    }
}

impl Classifier for ForestClassifier {
    fn train(&mut self, dataset: &TrainingDataset) -> Result<ModelMetrics> {
        self.params.validate(dataset)?;

        let labels = dataset.class_labels();
        let mut classes = labels.clone();
        classes.sort_unstable();
        classes.dedup();

        let params = self.params;
        let tree_params = DecisionTreeClassifierParameters::default()
            .with_max_depth(params.max_depth)
            .with_criterion(SplitCriterion::Gini);

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let indices = bootstrap_indices(dataset.n_samples, params.seed, t);
                let x = bootstrap_matrix(&dataset.features, &indices);
                let y: Vec<i32> = indices.iter().map(|&i| labels[i]).collect();
                DecisionTreeClassifier::fit(&x, &y, tree_params.clone()).map_err(|e| {
                    AppError::Model(format!("Failed to train decision tree {}: {}", t, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.classes = classes;
        self.trees = trees;

        let predictions = self.predict(&dataset.features)?;
        Ok(ModelMetrics::classification(&labels, &predictions))
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<i32>> {
        let votes = self.votes(features)?;
        Ok(votes
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (col, &v) in row.iter().enumerate() {
                    if v > row[best] {
                        best = col;
                    }
                }
                self.classes[best]
            })
            .collect())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let votes = self.votes(features)?;
        Ok(votes / self.trees.len() as f64)
    }

    fn classes(&self) -> &[i32] {
        &self.classes
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty() && !self.classes.is_empty()
    }
}

/// Bagged regression trees (rows resampled, all features per split); predicts their mean
#[derive(Serialize, Deserialize)]
pub struct ForestRegressor {
    params: ForestParams,
    trees: Vec<TreeRegressor>,
}

impl ForestRegressor {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for ForestRegressor {
    fn train(&mut self, dataset: &TrainingDataset) -> Result<ModelMetrics> {
        self.params.validate(dataset)?;

        let targets = dataset.targets.to_vec();
        let params = self.params;
        let tree_params =
            DecisionTreeRegressorParameters::default().with_max_depth(params.max_depth);

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let indices = bootstrap_indices(dataset.n_samples, params.seed, t);
                let x = bootstrap_matrix(&dataset.features, &indices);
                let y: Vec<f64> = indices.iter().map(|&i| targets[i]).collect();
                DecisionTreeRegressor::fit(&x, &y, tree_params.clone()).map_err(|e| {
                    AppError::Model(format!("Failed to train regression tree {}: {}", t, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;

        let predictions = self.predict(&dataset.features)?;
        Ok(ModelMetrics::regression(&targets, &predictions))
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>> {
        if !self.is_trained() {
            return Err(AppError::Model("Model not trained".to_string()));
        }

        let x = to_dense(features);
        let mut sums = vec![0.0; features.nrows()];
        for tree in &self.trees {
            for (sum, value) in sums.iter_mut().zip(tree.predict(&x)?) {
                *sum += value;
            }
        }

        let n = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n).collect())
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::models::TrainingSample;

    fn separable_dataset() -> TrainingDataset {
        let samples: Vec<TrainingSample> = (0..200)
            .map(|i| {
                let x = i as f64 / 10.0;
                TrainingSample::new(vec![x, (i % 7) as f64], if x < 10.0 { 0.0 } else { 1.0 })
            })
            .collect();
        TrainingDataset::from_samples(&samples)
    }

    fn linear_dataset() -> TrainingDataset {
        let samples: Vec<TrainingSample> = (0..200)
            .map(|i| {
                let x = i as f64;
                TrainingSample::new(vec![x], 3.0 * x + 1.0)
            })
            .collect();
        TrainingDataset::from_samples(&samples)
    }

    #[test]
    fn test_classifier_learns_threshold() {
        let dataset = separable_dataset();
        let mut forest = ForestClassifier::new(ForestParams::new(10, 5, 7));

        let metrics = forest.train(&dataset).unwrap();

        assert!(forest.is_trained());
        assert_eq!(forest.n_trees(), 10);
        assert_eq!(forest.classes(), &[0, 1]);
        assert!(metrics.accuracy.unwrap() > 0.95);

        let sample_rows = Array2::from_shape_vec((2, 2), vec![2.0, 1.0, 18.0, 1.0]).unwrap();
        assert_eq!(forest.predict(&sample_rows).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let dataset = separable_dataset();
        let mut forest = ForestClassifier::new(ForestParams::new(8, 4, 1));
        forest.train(&dataset).unwrap();

        let proba = forest.predict_proba(&dataset.features).unwrap();
        assert_eq!(proba.ncols(), 2);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_untrained_models_fail() {
        let sample_rows = Array2::zeros((1, 2));
        assert!(ForestClassifier::new(ForestParams::new(3, 3, 0))
            .predict_proba(&sample_rows)
            .is_err());
        assert!(ForestRegressor::new(ForestParams::new(3, 3, 0))
            .predict(&sample_rows)
            .is_err());
    }

    #[test]
    fn test_regressor_tracks_linear_target() {
        let dataset = linear_dataset();
        let mut forest = ForestRegressor::new(ForestParams::new(10, 8, 3));

        let metrics = forest.train(&dataset).unwrap();
        assert!(metrics.r_squared.unwrap() > 0.95);

        let sample_rows = Array2::from_shape_vec((1, 1), vec![100.0]).unwrap();
        let prediction = forest.predict(&sample_rows).unwrap()[0];
        assert!((prediction - 301.0).abs() < 30.0);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let dataset = linear_dataset();
        let mut a = ForestRegressor::new(ForestParams::new(5, 6, 11));
        let mut b = ForestRegressor::new(ForestParams::new(5, 6, 11));
        a.train(&dataset).unwrap();
        b.train(&dataset).unwrap();

        let sample_rows = Array2::from_shape_vec((1, 1), vec![42.5]).unwrap();
        assert_eq!(a.predict(&sample_rows).unwrap(), b.predict(&sample_rows).unwrap());
    }

    #[test]
    fn test_zero_trees_rejected() {
        let dataset = linear_dataset();
        let mut forest = ForestRegressor::new(ForestParams::new(0, 6, 11));
        assert!(forest.train(&dataset).is_err());
    }
}
