use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::errors::TrainingError;

/// 데이터셋 위치를 실제 파일 하나로 확정하는 유틸리티
pub struct DataLoader;

impl DataLoader {
    /// Resolve a dataset location that is either a plain file path or a glob pattern.
    ///
    /// A pattern matching several files resolves to the first one in sorted order.
    pub fn resolve_source(location: &str) -> Result<PathBuf, TrainingError> {
        let direct = Path::new(location);
        if direct.is_file() {
            return Ok(direct.to_path_buf());
        }

        // Not a valid pattern and nothing at that path: the file is missing
        let entries = match glob(location) {
            Ok(entries) => entries,
            Err(e) if direct.exists() => {
                return Err(TrainingError::InvalidPattern {
                    pattern: location.to_string(),
                    message: e.to_string(),
                })
            }
            Err(e) => {
                warn!("'{}' is not a valid pattern ({}), treating it as a path", location, e);
                return Err(TrainingError::DatasetNotFound {
                    source_path: location.to_string(),
                });
            }
        };

        let mut data_files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        data_files.push(path);
                    }
                }
                Err(e) => warn!("Error reading path: {}", e),
            }
        }

        if data_files.is_empty() {
            return Err(TrainingError::DatasetNotFound {
                source_path: location.to_string(),
            });
        }

        data_files.sort();
        let chosen = data_files.remove(0);
        if !data_files.is_empty() {
            info!(
                "Pattern '{}' matched {} file(s), using {}",
                location,
                data_files.len() + 1,
                chosen.display()
            );
            for skipped in &data_files {
                info!("  skipped {}", skipped.display());
            }
        }

        Ok(chosen)
    }
}
