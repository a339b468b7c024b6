//! Demand model registry.
//!
//! Holds every loaded demand model variant behind one lookup surface so
//! the optimizer queries a single primary model while the tracer compares
//! all of them for agreement. Loading is lazy and memoized; the first
//! request pays the cold cost.

use crate::domain::entities::market_context::MarketContext;
use crate::domain::error::DomainError;
use crate::domain::ports::demand_model::{DemandFeatures, DemandModel, FeatureContribution};
use crate::domain::ports::model_store::ModelStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Explicit per-prediction knobs. Defaults are "as trained, no external
/// adjustment"; sensitivity scenarios override elasticity, the pipeline
/// overrides the external adjustment.
#[derive(Debug, Clone, Copy)]
pub struct PredictOptions {
    pub elasticity_modifier: f64,
    pub external_adjustment: f64,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            elasticity_modifier: 1.0,
            external_adjustment: 1.0,
        }
    }
}

type ModelMap = BTreeMap<String, Arc<dyn DemandModel>>;

pub struct ModelRegistry {
    store: Arc<dyn ModelStore>,
    primary: String,
    models: RwLock<Option<Arc<ModelMap>>>,
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn ModelStore>, primary: impl Into<String>) -> Self {
        Self {
            store,
            primary: primary.into(),
            models: RwLock::new(None),
        }
    }

    pub fn primary_model(&self) -> &str {
        &self.primary
    }

    /// Lazily load and memoize the model map. A concurrent first use may
    /// load twice; both loads produce the same artifacts and the second
    /// write is dropped.
    fn models(&self) -> Result<Arc<ModelMap>, DomainError> {
        if let Some(models) = self.models.read().as_ref() {
            return Ok(models.clone());
        }
        let loaded = self.store.load_demand_models()?;
        if loaded.is_empty() {
            return Err(DomainError::NoModelsLoaded);
        }
        let map: ModelMap = loaded
            .into_iter()
            .map(|m| (m.name().to_string(), m))
            .collect();
        tracing::info!(models = map.len(), "demand models loaded");
        let map = Arc::new(map);
        let mut guard = self.models.write();
        if guard.is_none() {
            *guard = Some(map.clone());
        }
        Ok(guard.as_ref().cloned().unwrap_or(map))
    }

    pub fn model_names(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.models()?.keys().cloned().collect())
    }

    /// Demand probability from one named model, clamped to [0, 1].
    pub fn predict(
        &self,
        ctx: &MarketContext,
        price: f64,
        model_name: &str,
        opts: PredictOptions,
    ) -> Result<f64, DomainError> {
        let models = self.models()?;
        let model = models
            .get(model_name)
            .ok_or_else(|| DomainError::ModelUnavailable(model_name.to_string()))?;
        let features = DemandFeatures::from_context(ctx, price, opts.external_adjustment);
        let raw = model.predict(&features, opts.elasticity_modifier)?;
        Ok(raw.clamp(0.0, 1.0))
    }

    /// One prediction per loaded model, for agreement analysis. Map order
    /// is deterministic (sorted by model name).
    pub fn predict_all(
        &self,
        ctx: &MarketContext,
        price: f64,
        opts: PredictOptions,
    ) -> Result<BTreeMap<String, f64>, DomainError> {
        let models = self.models()?;
        let features = DemandFeatures::from_context(ctx, price, opts.external_adjustment);
        let mut out = BTreeMap::new();
        for (name, model) in models.iter() {
            let raw = model.predict(&features, opts.elasticity_modifier)?;
            out.insert(name.clone(), raw.clamp(0.0, 1.0));
        }
        Ok(out)
    }

    /// Feature importances/coefficients for a named model, when exposed.
    pub fn explain(&self, model_name: &str) -> Result<Option<Vec<FeatureContribution>>, DomainError> {
        let models = self.models()?;
        let model = models
            .get(model_name)
            .ok_or_else(|| DomainError::ModelUnavailable(model_name.to_string()))?;
        Ok(model.explain())
    }
}
