use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::{mean, mean_squared_error};
use crate::errors::TrainingError;
use crate::estimator::BaggedForest;

/// 평가 구간 성능 지표
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub r2: f64,
    /// Rows in the evaluation split
    pub n_samples: usize,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        let mse = mean_squared_error(y_true, y_pred);

        let mean_true = mean(y_true);
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean_true).powi(2)).sum();
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| (t - p).powi(2))
            .sum();

        // Constant targets: perfect fit scores 1, anything else 0
        let r2 = if ss_tot != 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Self {
            rmse: mse.sqrt(),
            r2,
            n_samples: y_true.len(),
        }
    }
}

/// Share of the model's accuracy attributable to one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Permutation importance over the evaluation split, ranked highest first.
///
/// Each column is shuffled in turn (seeded per column) and the increase in
/// squared error is recorded. Increases are clamped at zero and normalised to
/// sum to one; when no column matters every score is zero.
pub fn permutation_importance(
    forest: &BaggedForest,
    feature_names: &[String],
    rows: &[Vec<f64>],
    targets: &[f64],
    seed: u64,
) -> Result<Vec<FeatureImportance>, TrainingError> {
    let baseline_pred = forest.predict(rows).map_err(TrainingError::Fit)?;
    let baseline = mean_squared_error(targets, &baseline_pred);

    let increases = (0..feature_names.len())
        .into_par_iter()
        .map(|col| {
            let mut column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(col as u64));
            column.shuffle(&mut rng);

            let permuted: Vec<Vec<f64>> = rows
                .iter()
                .zip(column)
                .map(|(row, value)| {
                    let mut row = row.clone();
                    row[col] = value;
                    row
                })
                .collect();

            let pred = forest.predict(&permuted).map_err(TrainingError::Fit)?;
            Ok((mean_squared_error(targets, &pred) - baseline).max(0.0))
        })
        .collect::<Result<Vec<f64>, TrainingError>>()?;

    let total: f64 = increases.iter().sum();
    let mut ranked: Vec<FeatureImportance> = feature_names
        .iter()
        .zip(increases)
        .map(|(name, inc)| FeatureImportance {
            feature: name.clone(),
            importance: if total > 0.0 { inc / total } else { 0.0 },
        })
        .collect();

    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestParams;
    use rand::Rng;

    #[test]
    fn test_metrics_by_hand() {
        let metrics = RegressionMetrics::compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 5.0]);
        // mse = 4/3, ss_tot = 2, ss_res = 4
        assert!((metrics.rmse - (4.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((metrics.r2 - (1.0 - 4.0 / 2.0)).abs() < 1e-12);
        assert_eq!(metrics.n_samples, 3);
    }

    #[test]
    fn test_perfect_prediction() {
        let y = [100.0, 250.0, 175.0];
        let metrics = RegressionMetrics::compute(&y, &y);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn test_signal_feature_ranks_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for _ in 0..300 {
            let signal: f64 = rng.gen_range(0.0..100.0);
            let noise: f64 = rng.gen_range(0.0..100.0);
            rows.push(vec![noise, signal]);
            targets.push(signal * 50.0);
        }

        let params = ForestParams {
            n_trees: 10,
            max_depth: 8,
            min_samples_split: 2,
            seed: 5,
        };
        let forest = BaggedForest::fit(&rows, &targets, params).unwrap();
        let names = vec!["Noise".to_string(), "Signal".to_string()];

        let ranked = permutation_importance(&forest, &names, &rows, &targets, 5).unwrap();
        assert_eq!(ranked[0].feature, "Signal");
        let total: f64 = ranked.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
