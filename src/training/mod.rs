pub mod dataset;
pub mod engineering;
pub mod evaluation;
pub mod pipeline;
pub mod split;

pub use dataset::HistoricalDataset;
pub use engineering::{engineer_features, SchemaPolicy};
pub use evaluation::{permutation_importance, FeatureImportance, RegressionMetrics};
pub use pipeline::TrainingPipeline;
pub use split::train_test_split;
