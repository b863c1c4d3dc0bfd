pub mod bootstrap;
pub mod estimation_service;
pub mod pool;
pub mod response;

pub use bootstrap::initialize;
pub use estimation_service::EstimationService;
pub use pool::EstimationPool;
pub use response::{ErrorPayload, EstimationResponse, EstimationResult, HealthStatus};
