use crate::errors::EstimationError;
use crate::features::FeatureVector;

use super::PriceEstimator;

pub const BASE_PRICE: f64 = 50_000.0;
pub const PRICE_PER_SQFT: f64 = 100.0;
pub const PRICE_PER_GARAGE_CAR: f64 = 15_000.0;
pub const PRICE_PER_BATHROOM: f64 = 10_000.0;
/// Quality rating that leaves the price unscaled
pub const REFERENCE_QUALITY: f64 = 5.0;

/// 학습된 모델이 없을 때 사용하는 고정 가격 공식
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEstimator;

impl HeuristicEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn price(features: &FeatureVector) -> f64 {
        let area_price = features.gr_liv_area * PRICE_PER_SQFT;
        let quality_multiplier = features.overall_qual / REFERENCE_QUALITY;
        let garage_price = features.garage_cars * PRICE_PER_GARAGE_CAR;
        let bathroom_price = features.full_bath * PRICE_PER_BATHROOM;

        (BASE_PRICE + area_price + garage_price + bathroom_price) * quality_multiplier
    }
}

impl PriceEstimator for HeuristicEstimator {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn is_trained(&self) -> bool {
        false
    }

    fn estimate(&self, features: &FeatureVector) -> Result<f64, EstimationError> {
        Ok(Self::price(features))
    }
}
