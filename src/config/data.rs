use std::env;

/// Dataset location used when `DATASET_PATH` is not set. May also be a glob pattern.
pub const DEFAULT_DATASET_PATH: &str = "train.csv";

/// Target column of the historical sales table
pub const TARGET_COLUMN: &str = "SalePrice";

pub fn get_dataset_path() -> String {
    env::var("DATASET_PATH").unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string())
}
