use std::env;

const DEFAULT_MODEL_PATH: &str = "model.json";

// Bagged tree ensemble
pub const N_TREES: usize = 100;
pub const MAX_DEPTH: u16 = 20;
pub const MIN_SAMPLES_SPLIT: usize = 5;
pub const RANDOM_SEED: u64 = 42;

// Train/evaluation split
pub const EVAL_RATIO: f64 = 0.2;

pub fn get_model_path() -> String {
    env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: N_TREES,
            max_depth: MAX_DEPTH,
            min_samples_split: MIN_SAMPLES_SPLIT,
            seed: RANDOM_SEED,
        }
    }
}

/// Settings for one offline training run
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Dataset file or glob pattern
    pub dataset_path: String,
    /// Where the fitted artifact is written (overwritten on success)
    pub model_path: String,
    /// Train on whatever schema columns the dataset has instead of requiring all ten
    pub allow_partial_schema: bool,
    pub eval_ratio: f64,
    pub forest: ForestParams,
}

impl TrainingConfig {
    pub fn from_env() -> Self {
        Self {
            dataset_path: super::get_dataset_path(),
            model_path: get_model_path(),
            ..Default::default()
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: super::DEFAULT_DATASET_PATH.to_string(),
            model_path: DEFAULT_MODEL_PATH.to_string(),
            allow_partial_schema: false,
            eval_ratio: EVAL_RATIO,
            forest: ForestParams::default(),
        }
    }
}
