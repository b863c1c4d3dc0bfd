use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ArtifactError;
use crate::features::FEATURE_NAMES;
use crate::training::{FeatureImportance, RegressionMetrics};

use super::BaggedForest;

/// Fitted forest plus everything captured about it at training time.
///
/// `feature_names` is the exact fit-time column order; serving feeds the
/// forest positionally in this order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub forest: BaggedForest,
    pub importances: Vec<FeatureImportance>,
    pub metrics: RegressionMetrics,
}

impl ModelArtifact {
    /// Write the artifact, replacing any previous one only once the new file is complete.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }

        let tmp_path = temp_path(path);
        let file = File::create(&tmp_path).map_err(|source| io_error(&tmp_path, source))?;
        let mut writer = BufWriter::new(file);

        let written = serde_json::to_writer(&mut writer, self)
            .map_err(ArtifactError::from)
            .and_then(|_| writer.flush().map_err(|source| io_error(&tmp_path, source)));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        drop(writer);

        fs::rename(&tmp_path, path).map_err(|source| io_error(path, source))
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.is_file() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| io_error(path, source))?;
        let artifact: Self = serde_json::from_reader(BufReader::new(file))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Every fit-time feature must be a schema field, otherwise serving cannot build the row.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.feature_names.len() != self.forest.n_features() {
            return Err(ArtifactError::FeatureCountMismatch {
                names: self.feature_names.len(),
                fitted: self.forest.n_features(),
            });
        }
        if let Some(unknown) = self
            .feature_names
            .iter()
            .find(|name| !FEATURE_NAMES.contains(&name.as_str()))
        {
            return Err(ArtifactError::UnknownFeature(unknown.clone()));
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}
