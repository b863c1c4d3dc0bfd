use crate::errors::{ArtifactError, EstimationError};
use crate::features::FeatureVector;

use super::{ModelArtifact, PriceEstimator};

/// 학습된 포레스트로 가격을 예측하는 추정기
pub struct TrainedEstimator {
    artifact: ModelArtifact,
}

impl TrainedEstimator {
    pub fn new(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl PriceEstimator for TrainedEstimator {
    fn name(&self) -> &str {
        "bagged_forest"
    }

    fn is_trained(&self) -> bool {
        true
    }

    fn estimate(&self, features: &FeatureVector) -> Result<f64, EstimationError> {
        // Re-derive the row in fit-time order; a partial-schema model sees only its subset
        let row = features
            .project(&self.artifact.feature_names)
            .map_err(|name| EstimationError::Prediction(format!("unknown feature '{}'", name)))?;

        self.artifact
            .forest
            .predict_one(&row)
            .map_err(EstimationError::Prediction)
    }
}
