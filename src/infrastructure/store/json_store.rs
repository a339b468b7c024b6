//! Filesystem model store.
//!
//! Artifacts live as JSON files in a model directory:
//!   - `segment_model.json`: the fitted segment model
//!   - `demand_models.json`: a list of tagged demand model artifacts

use crate::domain::entities::segment::SegmentModel;
use crate::domain::error::DomainError;
use crate::domain::ports::demand_model::DemandModel;
use crate::domain::ports::model_store::ModelStore;
use crate::infrastructure::models::gradient_boost::{GradientBoostArtifact, GradientBoostModel};
use crate::infrastructure::models::linear::{LinearArtifact, LinearDemandModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SEGMENT_MODEL_FILE: &str = "segment_model.json";
pub const DEMAND_MODELS_FILE: &str = "demand_models.json";

/// Persisted demand model artifact, tagged by variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandArtifact {
    GradientBoost(GradientBoostArtifact),
    Linear(LinearArtifact),
}

impl DemandArtifact {
    fn build(self) -> Result<Arc<dyn DemandModel>, DomainError> {
        match self {
            DemandArtifact::GradientBoost(a) => Ok(Arc::new(GradientBoostModel::new(a)?)),
            DemandArtifact::Linear(a) => Ok(Arc::new(LinearDemandModel::new(a)?)),
        }
    }
}

pub struct JsonModelStore {
    dir: PathBuf,
}

impl JsonModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<T, DomainError> {
        let path = self.dir.join(file);
        let raw = fs::read_to_string(&path).map_err(|e| {
            DomainError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            DomainError::ModelUnavailable(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DomainError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| DomainError::ModelUnavailable(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(value)
            .map_err(|e| DomainError::ModelUnavailable(e.to_string()))?;
        fs::write(path, raw).map_err(|e| {
            DomainError::ModelUnavailable(format!("cannot write {}: {}", path.display(), e))
        })
    }

    /// Persist a freshly fitted segment model into the model directory.
    pub fn save_segment_model(&self, model: &SegmentModel) -> Result<(), DomainError> {
        Self::write_json(&self.dir.join(SEGMENT_MODEL_FILE), model)
    }

    pub fn save_demand_artifacts(&self, artifacts: &[DemandArtifact]) -> Result<(), DomainError> {
        Self::write_json(&self.dir.join(DEMAND_MODELS_FILE), &artifacts)
    }
}

impl ModelStore for JsonModelStore {
    fn load_segment_model(&self) -> Result<SegmentModel, DomainError> {
        self.read_json(SEGMENT_MODEL_FILE)
    }

    fn load_demand_models(&self) -> Result<Vec<Arc<dyn DemandModel>>, DomainError> {
        let artifacts: Vec<DemandArtifact> = self.read_json(DEMAND_MODELS_FILE)?;
        artifacts.into_iter().map(DemandArtifact::build).collect()
    }
}
