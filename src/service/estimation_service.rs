use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::EstimationError;
use crate::estimator::{HeuristicEstimator, PriceEstimator};
use crate::features::{FeatureVector, RawInput};

use super::{ErrorPayload, EstimationResponse, EstimationResult, HealthStatus};

const UNKNOWN_LOCATION: &str = "Unknown";

/// 가격 추정 서비스
///
/// The estimator is chosen once at startup and never swapped; requests only
/// read it, so one instance can be shared across threads.
pub struct EstimationService {
    estimator: Box<dyn PriceEstimator>,
}

impl EstimationService {
    pub fn new(estimator: Box<dyn PriceEstimator>) -> Self {
        Self { estimator }
    }

    /// Service backed by the fixed formula only
    pub fn heuristic() -> Self {
        Self::new(Box::new(HeuristicEstimator::new()))
    }

    pub fn model_loaded(&self) -> bool {
        self.estimator.is_trained()
    }

    pub fn estimator_name(&self) -> &str {
        self.estimator.name()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            model_loaded: self.model_loaded(),
        }
    }

    /// Estimate one decoded request. `None`, `null` and non-object payloads carry no data.
    pub fn estimate(&self, payload: Option<&Value>) -> Result<EstimationResult, EstimationError> {
        let object = match payload {
            Some(Value::Object(map)) => map,
            _ => return Err(EstimationError::NoData),
        };

        let raw = RawInput::from_payload(object);
        let features = FeatureVector::derive(&raw);

        let price = self.estimator.estimate(&features)?;
        if !price.is_finite() {
            return Err(EstimationError::Prediction(format!(
                "{} produced a non-finite price",
                self.estimator.name()
            )));
        }
        debug!("{} estimate: {:.2}", self.estimator.name(), price);

        Ok(EstimationResult {
            success: true,
            predicted_price: price,
            location: raw.location.unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            features_used: features,
            model_used: self.model_loaded(),
        })
    }

    /// Like [`estimate`](Self::estimate), but every failure becomes an error payload.
    ///
    /// A panic inside the estimator is contained to this request.
    pub fn respond(&self, payload: Option<&Value>) -> EstimationResponse {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.estimate(payload)));
        match outcome {
            Ok(Ok(result)) => EstimationResponse::Success(result),
            Ok(Err(err)) => {
                debug!("Rejected request: {}", err);
                EstimationResponse::Failure(ErrorPayload::from(&err))
            }
            Err(_) => {
                warn!("Estimator '{}' panicked while handling a request", self.estimator_name());
                EstimationResponse::Failure(ErrorPayload::from(&EstimationError::Prediction(
                    "internal estimator failure".to_string(),
                )))
            }
        }
    }

    /// Decode a raw request body and respond to it. An empty body carries no data.
    pub fn respond_text(&self, body: &str) -> EstimationResponse {
        if body.trim().is_empty() {
            return EstimationResponse::Failure(ErrorPayload::from(&EstimationError::NoData));
        }
        match serde_json::from_str::<Value>(body) {
            Ok(value) => self.respond(Some(&value)),
            Err(e) => EstimationResponse::Failure(ErrorPayload::from(&EstimationError::Malformed(
                e.to_string(),
            ))),
        }
    }
}

impl Default for EstimationService {
    fn default() -> Self {
        Self::heuristic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct PanickingEstimator;

    impl PriceEstimator for PanickingEstimator {
        fn name(&self) -> &str {
            "panicking"
        }

        fn is_trained(&self) -> bool {
            true
        }

        fn estimate(&self, _features: &FeatureVector) -> Result<f64, EstimationError> {
            panic!("boom")
        }
    }

    struct NanEstimator;

    impl PriceEstimator for NanEstimator {
        fn name(&self) -> &str {
            "nan"
        }

        fn is_trained(&self) -> bool {
            true
        }

        fn estimate(&self, _features: &FeatureVector) -> Result<f64, EstimationError> {
            Ok(f64::NAN)
        }
    }

    #[test]
    fn test_heuristic_example_request() {
        let service = EstimationService::heuristic();
        let payload = json!({
            "area": 2000,
            "overallQual": 7,
            "parking": 2,
            "bathrooms": 3,
            "bedrooms": 3,
            "yearBuilt": 2005,
            "location": "Ames"
        });

        let result = service.estimate(Some(&payload)).unwrap();

        // (50000 + 200000 + 30000 + 30000) * 7 / 5
        assert!((result.predicted_price - 434_000.0).abs() < 1e-6);
        assert_eq!(result.location, "Ames");
        assert!(!result.model_used);
        assert_eq!(result.features_used.garage_area, 600.0);
        assert_eq!(result.features_used.tot_rms_abv_grd, 6.0);
        assert_eq!(result.features_used.year_remod_add, 2010.0);
    }

    #[test]
    fn test_reference_house_without_model() {
        let service = EstimationService::heuristic();
        let payload = json!({
            "overallQual": 8,
            "area": 2000,
            "parking": 2,
            "bathrooms": 2,
            "bedrooms": 3,
            "yearBuilt": 2015
        });

        let result = service.estimate(Some(&payload)).unwrap();

        assert_eq!(result.features_used.overall_qual, 8.0);
        assert_eq!(result.features_used.gr_liv_area, 2000.0);
        assert!((result.predicted_price - 480_000.0).abs() < 1e-6);
        assert!(!result.model_used);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let service = EstimationService::heuristic();
        let result = service.estimate(Some(&json!({}))).unwrap();

        assert_eq!(result.features_used, FeatureVector::default());
        assert_eq!(result.location, "Unknown");
        assert!((result.predicted_price - 235_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_payload_is_no_data() {
        let service = EstimationService::heuristic();
        assert_eq!(service.estimate(None).unwrap_err(), EstimationError::NoData);
        assert_eq!(service.estimate(Some(&Value::Null)).unwrap_err(), EstimationError::NoData);
        assert_eq!(
            service.estimate(Some(&json!([1, 2, 3]))).unwrap_err(),
            EstimationError::NoData
        );
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let service = EstimationService::heuristic();
        let result = service
            .estimate(Some(&json!({ "area": "big", "overallQual": "7", "location": 12 })))
            .unwrap();

        assert_eq!(result.features_used.gr_liv_area, 1500.0);
        assert_eq!(result.features_used.overall_qual, 7.0);
        assert_eq!(result.location, "12");
    }

    #[test]
    fn test_huge_values_still_price() {
        let service = EstimationService::heuristic();
        let payload = json!({ "area": 1e307, "overallQual": 1e308, "parking": 2 });

        let result = service.estimate(Some(&payload)).unwrap();

        assert_eq!(result.features_used.gr_liv_area, 1500.0);
        assert_eq!(result.features_used.overall_qual, 5.0);
        assert_eq!(result.features_used.garage_cars, 2.0);
        assert!(result.predicted_price.is_finite());
    }

    #[test]
    fn test_respond_text_errors() {
        let service = EstimationService::heuristic();

        let empty = serde_json::to_value(service.respond_text("  ")).unwrap();
        assert_eq!(empty, json!({ "success": false, "error": "No data provided" }));

        let broken = serde_json::to_value(service.respond_text("{\"area\": ")).unwrap();
        assert_eq!(broken["success"], json!(false));
        assert!(broken["error"].as_str().unwrap().starts_with("Malformed request body"));

        let null = serde_json::to_value(service.respond_text("null")).unwrap();
        assert_eq!(null["error"], json!("No data provided"));
    }

    #[test]
    fn test_respond_contains_panics_and_bad_prices() {
        let service = EstimationService::new(Box::new(PanickingEstimator));
        let response = service.respond(Some(&json!({})));
        assert!(!response.is_success());

        let service = EstimationService::new(Box::new(NanEstimator));
        match service.respond(Some(&json!({}))) {
            EstimationResponse::Failure(payload) => assert!(payload.error.contains("non-finite")),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_health_reports_estimator_kind() {
        let service = EstimationService::heuristic();
        let health = service.health();
        assert_eq!(health.status, "healthy");
        assert!(!health.model_loaded);
        assert_eq!(service.estimator_name(), "heuristic");

        let service = EstimationService::new(Box::new(NanEstimator));
        assert!(service.health().model_loaded);
    }
}
