use std::env;

use super::TrainingConfig;

/// Startup settings of the estimation service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Artifact location plus the settings used for an inline training run
    pub training: TrainingConfig,
    /// Run the training pipeline once at startup when no artifact exists
    pub auto_train: bool,
    /// Worker threads for batch estimation
    pub workers: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            training: TrainingConfig::from_env(),
            auto_train: get_auto_train(),
            workers: get_worker_count(),
        }
    }

    pub fn model_path(&self) -> &str {
        &self.training.model_path
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            training: TrainingConfig::default(),
            auto_train: true,
            workers: default_worker_count(),
        }
    }
}

pub fn get_auto_train() -> bool {
    match env::var("AUTO_TRAIN") {
        Ok(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        Err(_) => true,
    }
}

pub fn get_worker_count() -> usize {
    env::var("ESTIMATOR_WORKERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(default_worker_count)
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
