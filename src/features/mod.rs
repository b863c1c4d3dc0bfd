pub mod raw_input;
pub mod schema;

pub use raw_input::RawInput;
pub use schema::{canonical_feature_name, FeatureVector, FEATURE_NAMES};
