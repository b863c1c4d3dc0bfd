use std::path::Path;

use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::errors::ArtifactError;
use crate::estimator::{ModelArtifact, TrainedEstimator};
use crate::training::TrainingPipeline;

use super::EstimationService;

/// Bring up the estimation service.
///
/// With no artifact on disk and auto-training enabled, one training run is
/// attempted first; its failure is logged and never stops startup. Whatever
/// goes wrong while loading, the service still comes up on the fixed formula.
pub fn initialize(config: &ServiceConfig) -> EstimationService {
    let model_path = Path::new(config.model_path());

    if !model_path.exists() && config.auto_train {
        info!(
            "No model at {}, training from {}",
            model_path.display(),
            config.training.dataset_path
        );
        match TrainingPipeline::new(config.training.clone()).run() {
            Ok(report) => info!(
                "Startup training finished: RMSE {:.2}, R² {:.4}",
                report.metrics.rmse, report.metrics.r2
            ),
            Err(e) => warn!("Startup training failed: {}", e),
        }
    }

    match ModelArtifact::load(model_path).and_then(TrainedEstimator::new) {
        Ok(estimator) => {
            info!(
                "Loaded model from {} ({} features)",
                model_path.display(),
                estimator.artifact().feature_names.len()
            );
            EstimationService::new(Box::new(estimator))
        }
        Err(ArtifactError::NotFound(path)) => {
            info!("No model at {}, using heuristic estimator", path.display());
            EstimationService::heuristic()
        }
        Err(e) => {
            warn!("Could not load model ({}), using heuristic estimator", e);
            EstimationService::heuristic()
        }
    }
}
