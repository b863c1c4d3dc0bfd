use crate::errors::EstimationError;
use crate::features::FeatureVector;

/// A single way of turning a feature vector into a price.
///
/// The service picks one implementation at startup and shares it across
/// request threads, so implementations hold only read-only state.
pub trait PriceEstimator: Send + Sync {
    fn name(&self) -> &str;

    /// True when predictions come from a model fit on historical sales
    fn is_trained(&self) -> bool;

    fn estimate(&self, features: &FeatureVector) -> Result<f64, EstimationError>;
}
