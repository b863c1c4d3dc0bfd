pub mod artifact;
pub mod estimator_trait;
pub mod forest;
pub mod heuristic;
pub mod trained;

pub use artifact::ModelArtifact;
pub use estimator_trait::PriceEstimator;
pub use forest::BaggedForest;
pub use heuristic::HeuristicEstimator;
pub use trained::TrainedEstimator;
