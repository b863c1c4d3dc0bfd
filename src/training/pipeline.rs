use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::TrainingConfig;
use crate::errors::TrainingError;
use crate::estimator::{BaggedForest, ModelArtifact};

use super::{
    engineer_features, permutation_importance, train_test_split, FeatureImportance,
    HistoricalDataset, RegressionMetrics, SchemaPolicy,
};

/// Summary of one training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub dataset_path: String,
    pub n_rows: usize,
    pub n_columns: usize,
    pub dropped_rows: usize,
    pub feature_names: Vec<String>,
    /// Value used to fill gaps in each feature column, same order as `feature_names`
    pub medians: Vec<f64>,
    pub n_train: usize,
    pub n_eval: usize,
    pub metrics: RegressionMetrics,
    pub importances: Vec<FeatureImportance>,
    pub model_path: String,
    pub elapsed_secs: f64,
}

impl TrainingReport {
    pub fn print_summary(&self) {
        println!("\n=== Training Results ===");
        println!("Dataset: {} ({} rows, {} columns)", self.dataset_path, self.n_rows, self.n_columns);
        println!("Using {} features: {:?}", self.feature_names.len(), self.feature_names);
        if self.dropped_rows > 0 {
            println!("Dropped {} row(s) without a sale price", self.dropped_rows);
        }
        println!("Imputation medians:");
        for (name, median) in self.feature_names.iter().zip(&self.medians) {
            println!("  {:<14} {}", name, median);
        }
        println!("Training set size: {}", self.n_train);
        println!("Test set size: {}", self.n_eval);
        println!("RMSE: ${:.2}", self.metrics.rmse);
        println!("R² Score: {:.4}", self.metrics.r2);
        println!("Top 5 Most Important Features:");
        for (rank, f) in self.importances.iter().take(5).enumerate() {
            println!("  [{}] {:<14} {:.4}", rank + 1, f.feature, f.importance);
        }
        println!("Model saved to {} ({:.2}s)", self.model_path, self.elapsed_secs);
    }
}

/// Fitted artifact and its report, before persistence
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub report: TrainingReport,
}

/// Offline batch job: load → engineer → split → fit → evaluate → persist.
///
/// Not meant to run concurrently with itself against the same artifact path.
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Run every stage and persist the artifact, overwriting the previous one.
    pub fn run(&self) -> Result<TrainingReport, TrainingError> {
        let outcome = self.train()?;

        let path = Path::new(&self.config.model_path);
        outcome.artifact.save(path)?;
        info!("Model saved to {}", path.display());

        Ok(outcome.report)
    }

    /// Stages 1–5 without touching the artifact location.
    pub fn train(&self) -> Result<TrainingOutcome, TrainingError> {
        let started = Instant::now();
        let cfg = &self.config;

        let dataset = HistoricalDataset::load(&cfg.dataset_path)?;

        let policy = if cfg.allow_partial_schema {
            SchemaPolicy::AllowPartial
        } else {
            SchemaPolicy::Strict
        };
        let matrix = engineer_features(&dataset, policy)?;
        info!(
            "Feature matrix: {} rows x {} features {:?}",
            matrix.n_samples(),
            matrix.n_features(),
            matrix.feature_names
        );

        let split = train_test_split(
            &matrix.rows,
            &matrix.targets,
            cfg.eval_ratio,
            cfg.forest.seed,
        )?;
        info!(
            "Training set size: {} | Test set size: {}",
            split.train_rows.len(),
            split.eval_rows.len()
        );

        info!(
            "Training bagged forest ({} trees, max depth {}, min split {})",
            cfg.forest.n_trees, cfg.forest.max_depth, cfg.forest.min_samples_split
        );
        let forest = BaggedForest::fit(&split.train_rows, &split.train_targets, cfg.forest)?;
        info!("Fitted {} trees", forest.n_trees());

        let eval_predictions = forest
            .predict(&split.eval_rows)
            .map_err(TrainingError::Fit)?;
        let metrics = RegressionMetrics::compute(&split.eval_targets, &eval_predictions);
        info!("RMSE: {:.2} | R²: {:.4}", metrics.rmse, metrics.r2);

        let importances = permutation_importance(
            &forest,
            &matrix.feature_names,
            &split.eval_rows,
            &split.eval_targets,
            cfg.forest.seed,
        )?;

        let report = TrainingReport {
            dataset_path: dataset.source().display().to_string(),
            n_rows: dataset.n_rows(),
            n_columns: dataset.n_columns(),
            dropped_rows: matrix.dropped_rows,
            feature_names: matrix.feature_names.clone(),
            medians: matrix.medians,
            n_train: split.train_rows.len(),
            n_eval: split.eval_rows.len(),
            metrics,
            importances: importances.clone(),
            model_path: cfg.model_path.clone(),
            elapsed_secs: started.elapsed().as_secs_f64(),
        };

        let artifact = ModelArtifact {
            feature_names: matrix.feature_names,
            forest,
            importances,
            metrics,
        };

        Ok(TrainingOutcome { artifact, report })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::write_sales_csv;
    use super::*;
    use crate::config::ForestParams;
    use crate::estimator::{PriceEstimator, TrainedEstimator};
    use crate::features::{FeatureVector, RawInput};
    use std::fs;
    use tempfile::tempdir;

    fn config_for(dir: &Path) -> TrainingConfig {
        TrainingConfig {
            dataset_path: dir.join("train.csv").display().to_string(),
            model_path: dir.join("model.json").display().to_string(),
            allow_partial_schema: false,
            eval_ratio: 0.2,
            forest: ForestParams {
                n_trees: 10,
                max_depth: 12,
                min_samples_split: 5,
                seed: 42,
            },
        }
    }

    fn raw_input_for(row: &[f64]) -> RawInput {
        RawInput {
            overall_qual: Some(row[0]),
            area: Some(row[1]),
            parking: Some(row[2]),
            bathrooms: Some(row[6]),
            bedrooms: Some(row[7] - row[6]),
            year_built: Some(row[8]),
            location: None,
        }
    }

    #[test]
    fn test_run_reports_and_persists() {
        let dir = tempdir().unwrap();
        write_sales_csv(&dir.path().join("train.csv"), 200, 1);
        let config = config_for(dir.path());

        let report = TrainingPipeline::new(config.clone()).run().unwrap();

        assert_eq!(report.n_rows, 200);
        assert_eq!(report.n_eval, 40);
        assert_eq!(report.n_train, 160);
        assert_eq!(report.feature_names.len(), 10);
        assert_eq!(report.importances.len(), 10);
        assert!(report.metrics.r2 > 0.5);
        assert!(Path::new(&config.model_path).is_file());
    }

    /// Evaluation split as the pipeline sees it, rebuilt from the same config
    fn evaluation_rows(config: &TrainingConfig) -> Vec<Vec<f64>> {
        let dataset = HistoricalDataset::load(&config.dataset_path).unwrap();
        let matrix = engineer_features(&dataset, SchemaPolicy::Strict).unwrap();
        train_test_split(&matrix.rows, &matrix.targets, config.eval_ratio, config.forest.seed)
            .unwrap()
            .eval_rows
    }

    #[test]
    fn test_loaded_artifact_reproduces_evaluation_predictions() {
        let dir = tempdir().unwrap();
        write_sales_csv(&dir.path().join("train.csv"), 150, 2);
        let config = config_for(dir.path());

        let outcome = TrainingPipeline::new(config.clone()).train().unwrap();
        let eval_rows = evaluation_rows(&config);
        let expected = outcome.artifact.forest.predict(&eval_rows).unwrap();

        let model_path = Path::new(&config.model_path);
        outcome.artifact.save(model_path).unwrap();

        let estimator = TrainedEstimator::new(ModelArtifact::load(model_path).unwrap()).unwrap();
        for (row, expected) in eval_rows.iter().zip(&expected) {
            let features = FeatureVector::derive(&raw_input_for(row));
            assert_eq!(&features.to_vec(), row);
            assert_eq!(estimator.estimate(&features).unwrap(), *expected);
        }
    }

    #[test]
    fn test_training_is_reproducible() {
        let dir = tempdir().unwrap();
        write_sales_csv(&dir.path().join("train.csv"), 120, 3);
        let config = config_for(dir.path());
        let pipeline = TrainingPipeline::new(config.clone());

        let a = pipeline.train().unwrap();
        let b = pipeline.train().unwrap();
        let eval_rows = evaluation_rows(&config);
        assert_eq!(
            a.artifact.forest.predict(&eval_rows).unwrap(),
            b.artifact.forest.predict(&eval_rows).unwrap()
        );
        assert_eq!(a.report.metrics, b.report.metrics);
    }

    #[test]
    fn test_header_only_dataset_aborts_without_artifact() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        fs::write(
            &config.dataset_path,
            "Id,OverallQual,GrLivArea,GarageCars,GarageArea,TotalBsmtSF,1stFlrSF,FullBath,TotRmsAbvGrd,YearBuilt,YearRemodAdd,SalePrice\n",
        )
        .unwrap();

        let err = TrainingPipeline::new(config.clone()).run().unwrap_err();

        assert!(matches!(err, TrainingError::EmptyDataset { rows: 0, .. }));
        assert!(!Path::new(&config.model_path).exists());
    }

    #[test]
    fn test_report_carries_imputation_medians() {
        let dir = tempdir().unwrap();
        write_sales_csv(&dir.path().join("train.csv"), 80, 4);

        let report = TrainingPipeline::new(config_for(dir.path())).run().unwrap();

        assert_eq!(report.medians.len(), report.feature_names.len());
        // OverallQual is drawn from 1..=10
        assert!((1.0..=10.0).contains(&report.medians[0]));
    }

    #[test]
    fn test_missing_dataset_leaves_previous_artifact() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        fs::write(&config.model_path, b"previous artifact").unwrap();

        let err = TrainingPipeline::new(config.clone()).run().unwrap_err();

        assert!(matches!(err, TrainingError::DatasetNotFound { .. }));
        assert_eq!(fs::read(&config.model_path).unwrap(), b"previous artifact");
    }

    #[test]
    fn test_missing_target_aborts_without_artifact() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        fs::write(
            &config.dataset_path,
            "OverallQual,GrLivArea,GarageCars,GarageArea,TotalBsmtSF,1stFlrSF,FullBath,TotRmsAbvGrd,YearBuilt,YearRemodAdd\n5,1500,1,300,750,750,2,5,2010,2015\n",
        )
        .unwrap();

        let err = TrainingPipeline::new(config.clone()).run().unwrap_err();

        assert!(matches!(err, TrainingError::MissingTarget(_)));
        assert!(!Path::new(&config.model_path).exists());
    }

    #[test]
    fn test_partial_schema_training_records_subset() {
        let dir = tempdir().unwrap();
        let mut csv = String::from("GrLivArea,YearBuilt,SalePrice\n");
        for i in 0..60 {
            let area = 800 + i * 40;
            let year = 1950 + i;
            csv.push_str(&format!("{},{},{}\n", area, year, area * 90 + (year - 1950) * 500));
        }
        let mut config = config_for(dir.path());
        fs::write(&config.dataset_path, csv).unwrap();

        let strict = TrainingPipeline::new(config.clone()).run().unwrap_err();
        assert!(matches!(strict, TrainingError::IncompleteSchema { .. }));

        config.allow_partial_schema = true;
        let report = TrainingPipeline::new(config.clone()).run().unwrap();
        assert_eq!(report.feature_names, vec!["GrLivArea", "YearBuilt"]);

        let artifact = ModelArtifact::load(Path::new(&config.model_path)).unwrap();
        assert_eq!(artifact.feature_names, vec!["GrLivArea", "YearBuilt"]);
    }
}
