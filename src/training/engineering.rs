use tracing::{info, warn};

use crate::common::median;
use crate::config::TARGET_COLUMN;
use crate::errors::TrainingError;
use crate::features::FEATURE_NAMES;

use super::HistoricalDataset;

/// One row to fit on and one to evaluate against
const MIN_USABLE_ROWS: usize = 2;

/// How to treat schema columns the dataset does not have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaPolicy {
    /// Every schema column must be present
    Strict,
    /// Train on the intersection of schema and dataset columns, schema order kept
    AllowPartial,
}

/// Numeric training table after column selection and imputation
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Fit-time column order
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    /// Median used to fill each column, same order as `feature_names`
    pub medians: Vec<f64>,
    /// Rows dropped because their target was missing
    pub dropped_rows: usize,
}

impl FeatureMatrix {
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

/// Select the schema columns, fill their gaps with the column median and pull out the target.
///
/// Medians are taken over every usable row before any train/evaluation split.
pub fn engineer_features(
    dataset: &HistoricalDataset,
    policy: SchemaPolicy,
) -> Result<FeatureMatrix, TrainingError> {
    let mut used = Vec::new();
    let mut missing = Vec::new();
    for name in FEATURE_NAMES {
        match dataset.feature_column_index(name) {
            Some(idx) => used.push((name.to_string(), idx)),
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        match policy {
            SchemaPolicy::Strict => return Err(TrainingError::IncompleteSchema { missing }),
            SchemaPolicy::AllowPartial => {
                warn!("Training without missing columns: {}", missing.join(", "))
            }
        }
    }
    if used.is_empty() {
        return Err(TrainingError::NoFeatureColumns);
    }

    let target_idx = dataset
        .column_index(TARGET_COLUMN)
        .ok_or_else(|| TrainingError::MissingTarget(TARGET_COLUMN.to_string()))?;

    let raw_targets = dataset.numeric_column(target_idx);
    let keep: Vec<usize> = raw_targets
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|_| i))
        .collect();
    let dropped_rows = raw_targets.len() - keep.len();
    if dropped_rows > 0 {
        warn!("Dropping {} row(s) without a {} value", dropped_rows, TARGET_COLUMN);
    }
    if keep.len() < MIN_USABLE_ROWS {
        return Err(TrainingError::EmptyDataset {
            rows: keep.len(),
            required: MIN_USABLE_ROWS,
        });
    }
    let targets: Vec<f64> = keep.iter().filter_map(|&i| raw_targets[i]).collect();

    let mut columns = Vec::with_capacity(used.len());
    let mut medians = Vec::with_capacity(used.len());
    for (name, idx) in &used {
        let raw = dataset.numeric_column(*idx);
        let values: Vec<Option<f64>> = keep.iter().map(|&i| raw[i]).collect();
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let fill = median(&present).ok_or_else(|| TrainingError::EmptyColumn(name.clone()))?;

        let filled = values.len() - present.len();
        if filled > 0 {
            info!("{}: filled {} missing value(s) with median {}", name, filled, fill);
        }

        columns.push(values.into_iter().map(|v| v.unwrap_or(fill)).collect::<Vec<f64>>());
        medians.push(fill);
    }

    let rows = (0..keep.len())
        .map(|r| columns.iter().map(|col| col[r]).collect())
        .collect();

    Ok(FeatureMatrix {
        feature_names: used.into_iter().map(|(name, _)| name).collect(),
        rows,
        targets,
        medians,
        dropped_rows,
    })
}
