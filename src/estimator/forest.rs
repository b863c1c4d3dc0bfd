use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use tracing::debug;

use crate::config::ForestParams;
use crate::errors::TrainingError;

type RegressionTree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// 배깅 기반 회귀 트리 앙상블
///
/// Each tree is fit on its own bootstrap sample (drawn with replacement, same
/// size as the training set) from a RNG seeded with `seed + tree_index`, so a
/// fixed seed reproduces the same forest no matter how rayon schedules the
/// trees. Prediction is the mean of the tree outputs.
#[derive(Debug, Serialize, Deserialize)]
pub struct BaggedForest {
    params: ForestParams,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl BaggedForest {
    /// Fit the ensemble on row-major `features` and matching `targets`, one tree per core.
    pub fn fit(
        features: &[Vec<f64>],
        targets: &[f64],
        params: ForestParams,
    ) -> Result<Self, TrainingError> {
        if features.is_empty() || features.len() != targets.len() {
            return Err(TrainingError::Fit(format!(
                "{} feature rows for {} targets",
                features.len(),
                targets.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(TrainingError::Fit("forest needs at least one tree".to_string()));
        }

        let n_samples = features.len();
        let n_features = features[0].len();
        if features.iter().any(|row| row.len() != n_features) {
            return Err(TrainingError::Fit("ragged feature rows".to_string()));
        }

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_seed = params.seed.wrapping_add(i as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);

                let mut sample_x = Vec::with_capacity(n_samples);
                let mut sample_y = Vec::with_capacity(n_samples);
                for _ in 0..n_samples {
                    let j = rng.gen_range(0..n_samples);
                    sample_x.push(features[j].clone());
                    sample_y.push(targets[j]);
                }

                let x = DenseMatrix::from_2d_vec(&sample_x)
                    .map_err(|e| TrainingError::Fit(format!("feature matrix: {:?}", e)))?;

                let mut tree_params = DecisionTreeRegressorParameters::default()
                    .with_max_depth(params.max_depth)
                    .with_min_samples_split(params.min_samples_split);
                tree_params.seed = Some(tree_seed);

                RegressionTree::fit(&x, &sample_y, tree_params)
                    .map_err(|e| TrainingError::Fit(format!("tree {}: {:?}", i, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Fitted {} trees on {} samples", trees.len(), n_samples);

        Ok(Self {
            params,
            n_features,
            trees,
        })
    }

    /// Predict one price per row. Rows must have the fit-time width and column order.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, String> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != self.n_features) {
            return Err(format!(
                "expected {} features, got {}",
                self.n_features,
                bad.len()
            ));
        }

        let x = DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(|e| format!("{:?}", e))?;

        let mut sums = vec![0.0; rows.len()];
        for tree in &self.trees {
            let predictions = tree.predict(&x).map_err(|e| format!("{:?}", e))?;
            for (sum, p) in sums.iter_mut().zip(predictions) {
                *sum += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n_trees).collect())
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<f64, String> {
        let predictions = self.predict(&[row.to_vec()])?;
        predictions
            .into_iter()
            .next()
            .ok_or_else(|| "empty prediction".to_string())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
